//! Order aggregation
//!
//! The controller hands in one buy request (supply asset) and one sell request (shares)
//! per call. Both are valued at the pre-trade price and only their difference is executed
//! against the external position:
//!
//! ```plain
//!   buy_amount ──┐                         ┌── net buy  ──► transfer_from caller, deposit
//!                ├── compare ── equal? ─no─┤
//!   sell_shares ─┘  (at pre-trade price)   └── net sell ──► withdraw, transfer to caller
//!                         │
//!                        yes ──► nothing moves, nothing is booked
//! ```
//!
//! The shares issued for the buy leg are solved from the position value after the trade:
//! `total * new_value / old_value + sell_shares - total`.

use alloy_primitives::U256;

use crate::{
    adapters::YieldSource,
    journal::{JournalCollection, LogType},
    protocols::{Erc20, SwapRouter, Transactional},
    types::{CallContext, StrategyEvent},
    utils::{
        common::{mul_div, only_controller, proportion},
        error::*,
    },
};

use super::executable::ExecutableStrategy;

impl<Y, T, R> ExecutableStrategy<Y, T, R>
where
    Y: YieldSource,
    T: Erc20 + Transactional,
    R: SwapRouter,
{
    /// Nets a buy and a sell request into a single deposit or withdrawal.
    ///
    /// A failed call leaves the ledger, the position and the controller's balance as they
    /// were before the call.
    ///
    /// # Arguments
    /// * `buy_amount` - supply asset pulled from the controller
    /// * `sell_shares` - shares redeemed for the controller
    /// * `min_shares_from_buy` - lower bound for the shares issued for `buy_amount`
    /// * `min_amount_from_sell` - lower bound for the supply asset owed for `sell_shares`
    ///
    /// # Returns
    /// `(shares_from_buy, amount_from_sell)`
    pub fn aggregate_orders(
        &mut self,
        context: &CallContext,
        buy_amount: U256,
        sell_shares: U256,
        min_shares_from_buy: U256,
        min_amount_from_sell: U256,
    ) -> ManagerResult<(U256, U256)> {
        let mut journal = self.open_journal(context);
        let result = self.atomically(|strategy| {
            strategy.execute_orders(
                context,
                buy_amount,
                sell_shares,
                min_shares_from_buy,
                min_amount_from_sell,
                &mut journal,
            )
        });
        self.journal.commit(journal, result.clone().map(|_| ()));
        result
    }

    fn execute_orders(
        &mut self,
        context: &CallContext,
        buy_amount: U256,
        sell_shares: U256,
        min_shares_from_buy: U256,
        min_amount_from_sell: U256,
        journal: &mut JournalCollection,
    ) -> ManagerResult<(U256, U256)> {
        only_controller(context.caller, self.data.controller)?;

        let total_shares = self.data.total_shares;
        if sell_shares > total_shares {
            return Err(ManagerError::InsufficientShares);
        }

        // Both legs are valued at the pre-trade price.
        let asset_amount = self.asset_amount()?;
        let amount_from_sell = proportion(sell_shares, asset_amount, total_shares)?;
        if amount_from_sell < min_amount_from_sell {
            return Err(ManagerError::SlippageExceeded);
        }

        if buy_amount == amount_from_sell {
            // The legs cancel out. Nothing is moved and the ledger is left untouched.
            let shares_from_buy = proportion(buy_amount, total_shares, asset_amount)?;
            journal.append_note(
                Ok(()),
                LogType::Order,
                format!(
                    "Buy of {} offsets sell of {} shares. No external call made.",
                    buy_amount, sell_shares
                ),
            );
            return Ok((shares_from_buy, amount_from_sell));
        }

        if buy_amount > amount_from_sell {
            self.buy(context, buy_amount - amount_from_sell, journal)?;
        } else {
            self.sell(context, amount_from_sell - buy_amount, journal)?;
        }

        let new_asset_amount = self.asset_amount()?;
        let shares_from_buy = if asset_amount.is_zero() {
            // First deposit into an empty position mints 1:1.
            new_asset_amount
        } else {
            mul_div(total_shares, new_asset_amount, asset_amount)?
                .checked_add(sell_shares)
                .and_then(|shares| shares.checked_sub(total_shares))
                .ok_or_else(|| arithmetic_err("Shares from buy underflowed."))?
        };

        if shares_from_buy < min_shares_from_buy {
            return Err(ManagerError::InsufficientSharesFromBuy);
        }

        let new_total_shares = total_shares
            .checked_add(shares_from_buy)
            .and_then(|shares| shares.checked_sub(sell_shares))
            .ok_or_else(|| arithmetic_err("Total shares underflowed."))?;

        if !buy_amount.is_zero() {
            journal.append_event(StrategyEvent::Buy {
                amount: buy_amount,
                shares: shares_from_buy,
            });
        }
        if !sell_shares.is_zero() {
            journal.append_event(StrategyEvent::Sell {
                shares: sell_shares,
                amount: amount_from_sell,
            });
        }

        self.data.total_shares(new_total_shares);
        journal.append_note(
            Ok(()),
            LogType::Order,
            format!(
                "Total shares moved from {} to {} at position value {}.",
                total_shares, new_total_shares, new_asset_amount
            ),
        );

        Ok((shares_from_buy, amount_from_sell))
    }

    /// Pulls `amount` of the supply asset from the caller and deposits it.
    fn buy(
        &mut self,
        context: &CallContext,
        amount: U256,
        journal: &mut JournalCollection,
    ) -> ManagerResult<()> {
        let holder = self.settings.strategy;
        let received = self.tokens.transfer_from(
            self.settings.asset,
            holder,
            context.caller,
            holder,
            amount,
        )?;
        if !received {
            return Err(ManagerError::TransferFailed(format!(
                "Could not pull {} of the supply asset from {}.",
                amount, context.caller
            )));
        }

        self.supply(amount)?;
        journal.append_note(
            Ok(()),
            LogType::Order,
            format!("Net buy: deposited {}.", amount),
        );
        Ok(())
    }

    /// Withdraws `amount` of value and hands the strategy's whole supply asset balance to
    /// the caller.
    fn sell(
        &mut self,
        context: &CallContext,
        amount: U256,
        journal: &mut JournalCollection,
    ) -> ManagerResult<()> {
        let holder = self.settings.strategy;
        let withdrawn = self.source.withdraw(holder, amount)?;

        let balance = self.tokens.balance_of(self.settings.asset, holder)?;
        if !balance.is_zero() {
            let sent = self
                .tokens
                .transfer(self.settings.asset, holder, context.caller, balance)?;
            if !sent {
                return Err(ManagerError::TransferFailed(format!(
                    "Could not send {} of the supply asset to {}.",
                    balance, context.caller
                )));
            }
        }

        journal.append_note(
            Ok(()),
            LogType::Order,
            format!(
                "Net sell: withdrew {} (requested {}), sent {} to {}.",
                withdrawn, amount, balance, context.caller
            ),
        );
        Ok(())
    }

    /// Approves the yield source and deposits `amount` of the supply asset already held by
    /// the strategy.
    pub(crate) fn supply(&mut self, amount: U256) -> ManagerResult<()> {
        let holder = self.settings.strategy;
        let spender = self.source.spender();
        let approved = self
            .tokens
            .approve(self.settings.asset, holder, spender, amount)
            .map_err(deposit_err)?;
        if !approved {
            return Err(ManagerError::ExternalDepositFailed(format!(
                "Approval of {} to {} was rejected.",
                amount, spender
            )));
        }
        self.source.deposit(holder, amount)
    }
}
