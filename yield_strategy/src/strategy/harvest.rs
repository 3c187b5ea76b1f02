//! Harvesting
//!
//! Claims rewards, sells them for the supply asset and deposits the proceeds. The gain
//! shows up in the position value, so the price of every outstanding share rises and no
//! shares are issued.

use alloy_primitives::{Address, U256};

use crate::{
    adapters::{RewardSource, YieldSource},
    journal::{JournalCollection, LogType},
    protocols::{Erc20, SwapRouter, Transactional},
    types::CallContext,
    utils::{common::only_direct_caller, error::*},
};

use super::executable::ExecutableStrategy;

impl<Y, T, R> ExecutableStrategy<Y, T, R>
where
    Y: YieldSource + RewardSource,
    T: Erc20 + Transactional,
    R: SwapRouter,
{
    /// Claims, swaps and reinvests rewards. Only callable by an externally owned account.
    /// A failed harvest leaves the rewards unclaimed.
    pub fn harvest(&mut self, context: &CallContext) -> ManagerResult<()> {
        let mut journal = self.open_journal(context);
        let result = self.atomically(|strategy| strategy.execute_harvest(context, &mut journal));
        self.journal.commit(journal, result.clone());
        result
    }

    fn execute_harvest(
        &mut self,
        context: &CallContext,
        journal: &mut JournalCollection,
    ) -> ManagerResult<()> {
        only_direct_caller(context)?;

        let holder = self.settings.strategy;
        let rewards = self.source.claim_rewards(holder, context.timestamp)?;
        let deadline = context
            .timestamp
            .checked_add(self.settings.swap_deadline_window)
            .ok_or_else(|| arithmetic_err("Swap deadline overflowed."))?;

        for reward in rewards {
            self.swap_reward(reward, deadline, journal)?;
        }

        let proceeds = self.tokens.balance_of(self.settings.asset, holder)?;
        if proceeds.is_zero() {
            journal.append_note(Ok(()), LogType::Harvest, "Nothing to reinvest.");
            return Ok(());
        }

        self.supply(proceeds)?;
        journal.append_note(
            Ok(()),
            LogType::Harvest,
            format!("Reinvested {} of the supply asset.", proceeds),
        );
        Ok(())
    }

    fn swap_reward(
        &mut self,
        reward: Address,
        deadline: u64,
        journal: &mut JournalCollection,
    ) -> ManagerResult<()> {
        let holder = self.settings.strategy;
        let balance = self.tokens.balance_of(reward, holder)?;
        if balance.is_zero() {
            return Ok(());
        }

        let router = self.settings.swap_router;
        let approved = self
            .tokens
            .approve(reward, holder, router, balance)
            .map_err(external_err)?;
        if !approved {
            return Err(ManagerError::ExternalCallFailed(format!(
                "Approval of {} to the swap router was rejected.",
                reward
            )));
        }

        let path = self.settings.route_for(reward);
        let amounts = self
            .router
            .swap_exact_input(holder, balance, U256::ZERO, path, holder, deadline)
            .map_err(external_err)?;

        journal.append_note(
            Ok(()),
            LogType::Harvest,
            format!(
                "Swapped {} of {} for {}.",
                balance,
                reward,
                amounts.last().copied().unwrap_or_default()
            ),
        );
        Ok(())
    }
}
