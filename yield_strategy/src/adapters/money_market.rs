//! Money market adapter
//!
//! Deposits mint money market tokens, withdrawals redeem an exact underlying amount. Both
//! calls report a status code instead of reverting, so anything but zero is a failure.

use alloy_primitives::{Address, U256};

use super::{RewardSource, YieldSource};
use crate::{
    constants::MONEY_MARKET_SUCCESS,
    protocols::{CToken, Comptroller},
    utils::error::*,
};

#[derive(Clone, Debug)]
pub struct MoneyMarketConfig {
    /// The money market token, also the spender of the supply asset
    pub c_token: Address,
    /// Token paid out by the comptroller
    pub reward_token: Address,
}

pub struct MoneyMarketAdapter<C, M> {
    pub config: MoneyMarketConfig,
    c_token: C,
    comptroller: M,
}

impl<C: CToken, M: Comptroller> MoneyMarketAdapter<C, M> {
    pub fn new(config: MoneyMarketConfig, c_token: C, comptroller: M) -> Self {
        Self {
            config,
            c_token,
            comptroller,
        }
    }
}

fn is_success(status: U256) -> bool {
    status == U256::from(MONEY_MARKET_SUCCESS)
}

impl<C: CToken, M: Comptroller> YieldSource for MoneyMarketAdapter<C, M> {
    fn spender(&self) -> Address {
        self.config.c_token
    }

    fn current_value(&self, holder: Address) -> ManagerResult<U256> {
        self.c_token.balance_of_underlying(holder)
    }

    fn deposit(&mut self, holder: Address, amount: U256) -> ManagerResult<()> {
        let status = self.c_token.mint(holder, amount).map_err(deposit_err)?;
        if !is_success(status) {
            return Err(ManagerError::ExternalDepositFailed(format!(
                "mint returned status {}",
                status
            )));
        }
        Ok(())
    }

    fn withdraw(&mut self, holder: Address, amount: U256) -> ManagerResult<U256> {
        let status = self
            .c_token
            .redeem_underlying(holder, amount)
            .map_err(withdraw_err)?;
        if !is_success(status) {
            return Err(ManagerError::ExternalWithdrawFailed(format!(
                "redeemUnderlying returned status {}",
                status
            )));
        }
        Ok(amount)
    }
}

impl<C: CToken, M: Comptroller> RewardSource for MoneyMarketAdapter<C, M> {
    fn claim_rewards(&mut self, holder: Address, _now: u64) -> ManagerResult<Vec<Address>> {
        self.comptroller.claim_comp(holder).map_err(external_err)?;
        Ok(vec![self.config.reward_token])
    }
}
