//! Lending pool adapter
//!
//! The position is the balance of the pool's interest-bearing token, which grows every
//! block. Rewards are paid in a staked token that must go through a cooldown before it can
//! be redeemed for the sellable reward token:
//!
//! ```plain
//!   no cooldown ──cooldown()──► cooling ──cooldown elapsed──► redeemable ──window elapsed──┐
//!        ▲                                                        │                        │
//!        └────────────────────────redeem()────────────────────────┘◄───────cooldown()──────┘
//! ```

use alloy_primitives::{Address, U256};
use chrono::Duration;

use super::{RewardSource, YieldSource};
use crate::{
    constants::{
        staked_reward_cooldown, staked_reward_unstake_window, LENDING_POOL_REFERRAL_CODE,
        LOG_TARGET,
    },
    protocols::{AaveIncentives, Erc20, LendingPool},
    utils::error::*,
};

/// Addresses and timing of a lending pool deployment
#[derive(Clone, Debug)]
pub struct LendingPoolConfig {
    pub asset: Address,
    pub pool: Address,
    /// Interest-bearing token minted by the pool
    pub a_token: Address,
    /// Token the incentives controller pays out
    pub staked_reward_token: Address,
    /// Token obtained when redeeming the staked reward token
    pub reward_token: Address,
    pub cooldown: Duration,
    pub unstake_window: Duration,
}

impl LendingPoolConfig {
    pub fn new(
        asset: Address,
        pool: Address,
        a_token: Address,
        staked_reward_token: Address,
        reward_token: Address,
    ) -> Self {
        Self {
            asset,
            pool,
            a_token,
            staked_reward_token,
            reward_token,
            cooldown: staked_reward_cooldown(),
            unstake_window: staked_reward_unstake_window(),
        }
    }
}

pub struct LendingPoolAdapter<P, I, T> {
    pub config: LendingPoolConfig,
    pool: P,
    incentives: I,
    tokens: T,
}

impl<P, I, T> LendingPoolAdapter<P, I, T>
where
    P: LendingPool,
    I: AaveIncentives,
    T: Erc20,
{
    pub fn new(config: LendingPoolConfig, pool: P, incentives: I, tokens: T) -> Self {
        Self {
            config,
            pool,
            incentives,
            tokens,
        }
    }

    /// Moves the staked reward token one step through its cooldown lifecycle.
    /// Returns `true` if staked tokens were redeemed.
    fn progress_cooldown(&mut self, holder: Address, now: u64) -> ManagerResult<bool> {
        let staked = self
            .tokens
            .balance_of(self.config.staked_reward_token, holder)
            .map_err(external_err)?;
        if staked.is_zero() {
            return Ok(false);
        }

        let cooldown_start = self
            .incentives
            .stakers_cooldown(holder)
            .map_err(external_err)?;
        let cooldown = self.config.cooldown.num_seconds().max(0) as u64;
        let window = self.config.unstake_window.num_seconds().max(0) as u64;
        let redeemable_from = cooldown_start.saturating_add(cooldown);
        let redeemable_until = redeemable_from.saturating_add(window);

        if cooldown_start == 0 || now > redeemable_until {
            log::info!(target: LOG_TARGET, "starting staked reward cooldown for {}", holder);
            self.incentives.cooldown(holder).map_err(external_err)?;
            return Ok(false);
        }

        if now > redeemable_from {
            log::info!(target: LOG_TARGET, "redeeming {} staked reward tokens", staked);
            self.incentives
                .redeem(holder, holder, staked)
                .map_err(external_err)?;
            return Ok(true);
        }

        Ok(false)
    }
}

impl<P, I, T> YieldSource for LendingPoolAdapter<P, I, T>
where
    P: LendingPool,
    I: AaveIncentives,
    T: Erc20,
{
    fn spender(&self) -> Address {
        self.config.pool
    }

    fn current_value(&self, holder: Address) -> ManagerResult<U256> {
        self.tokens.balance_of(self.config.a_token, holder)
    }

    fn deposit(&mut self, holder: Address, amount: U256) -> ManagerResult<()> {
        self.pool
            .deposit(
                holder,
                self.config.asset,
                amount,
                holder,
                LENDING_POOL_REFERRAL_CODE,
            )
            .map_err(deposit_err)
    }

    fn withdraw(&mut self, holder: Address, amount: U256) -> ManagerResult<U256> {
        self.pool
            .withdraw(holder, self.config.asset, amount, holder)
            .map_err(withdraw_err)
    }
}

impl<P, I, T> RewardSource for LendingPoolAdapter<P, I, T>
where
    P: LendingPool,
    I: AaveIncentives,
    T: Erc20,
{
    fn claim_rewards(&mut self, holder: Address, now: u64) -> ManagerResult<Vec<Address>> {
        self.incentives
            .claim_rewards(holder, vec![self.config.a_token], U256::MAX, holder)
            .map_err(external_err)?;

        self.progress_cooldown(holder, now)?;

        Ok(vec![self.config.reward_token])
    }
}
