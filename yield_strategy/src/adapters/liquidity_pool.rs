//! Liquidity pool adapter
//!
//! The supply asset is added single-sided to a stable swap pool and the LP tokens are staked
//! in the pool's gauge. The position is valued at the pool's virtual price, so it moves with
//! the pool rather than only upwards.

use alloy_primitives::{Address, U256};

use super::{RewardSource, YieldSource};
use crate::{
    constants::scale,
    protocols::{Erc20, LiquidityGauge, StableSwapPool},
    utils::{
        common::{mul_div, mul_div_up},
        error::*,
    },
};

#[derive(Clone, Debug)]
pub struct LiquidityPoolConfig {
    /// The pool, also the spender of the supply asset
    pub pool: Address,
    pub lp_token: Address,
    pub gauge: Address,
    /// Token minted for gauge stakers
    pub reward_token: Address,
    /// Index of the supply asset among the pool's coins
    pub coin_index: usize,
    pub n_coins: usize,
    /// `10^(18 - asset decimals)`
    pub precision: U256,
}

pub struct LiquidityPoolAdapter<P, G, T> {
    pub config: LiquidityPoolConfig,
    pool: P,
    gauge: G,
    tokens: T,
}

impl<P, G, T> LiquidityPoolAdapter<P, G, T>
where
    P: StableSwapPool,
    G: LiquidityGauge,
    T: Erc20,
{
    pub fn new(config: LiquidityPoolConfig, pool: P, gauge: G, tokens: T) -> Self {
        Self {
            config,
            pool,
            gauge,
            tokens,
        }
    }

    /// LP tokens worth `amount` of the supply asset, rounded up
    fn lp_for_amount(&self, amount: U256) -> ManagerResult<U256> {
        let virtual_price = self.pool.get_virtual_price().map_err(withdraw_err)?;
        let normalized = amount
            .checked_mul(self.config.precision)
            .ok_or_else(|| arithmetic_err("Normalized withdrawal amount overflowed."))?;
        mul_div_up(normalized, scale(), virtual_price)
    }
}

impl<P, G, T> YieldSource for LiquidityPoolAdapter<P, G, T>
where
    P: StableSwapPool,
    G: LiquidityGauge,
    T: Erc20,
{
    fn spender(&self) -> Address {
        self.config.pool
    }

    fn current_value(&self, holder: Address) -> ManagerResult<U256> {
        let staked = self.gauge.balance_of(holder)?;
        if staked.is_zero() {
            return Ok(U256::ZERO);
        }
        let virtual_price = self.pool.get_virtual_price()?;
        let normalized = mul_div(staked, virtual_price, scale())?;
        normalized
            .checked_div(self.config.precision)
            .ok_or_else(|| arithmetic_err("Pool precision was zero."))
    }

    fn deposit(&mut self, holder: Address, amount: U256) -> ManagerResult<()> {
        let mut amounts = vec![U256::ZERO; self.config.n_coins];
        let slot = amounts.get_mut(self.config.coin_index).ok_or_else(|| {
            ManagerError::Custom("Coin index is outside of the pool's coins.".to_string())
        })?;
        *slot = amount;

        let minted = self
            .pool
            .add_liquidity(holder, amounts, U256::ZERO)
            .map_err(deposit_err)?;

        let approved = self
            .tokens
            .approve(self.config.lp_token, holder, self.config.gauge, minted)
            .map_err(deposit_err)?;
        if !approved {
            return Err(ManagerError::ExternalDepositFailed(
                "LP token approval to the gauge was rejected.".to_string(),
            ));
        }

        self.gauge.deposit(holder, minted).map_err(deposit_err)
    }

    fn withdraw(&mut self, holder: Address, amount: U256) -> ManagerResult<U256> {
        let staked = self.gauge.balance_of(holder).map_err(withdraw_err)?;
        let lp = self.lp_for_amount(amount)?.min(staked);
        if lp.is_zero() {
            return Ok(U256::ZERO);
        }

        self.gauge.withdraw(holder, lp).map_err(withdraw_err)?;

        let coin_index = i128::try_from(self.config.coin_index)
            .map_err(|_| ManagerError::Custom("Coin index does not fit in i128.".to_string()))?;
        self.pool
            .remove_liquidity_one_coin(holder, lp, coin_index, U256::ZERO)
            .map_err(withdraw_err)
    }
}

impl<P, G, T> RewardSource for LiquidityPoolAdapter<P, G, T>
where
    P: StableSwapPool,
    G: LiquidityGauge,
    T: Erc20,
{
    fn claim_rewards(&mut self, holder: Address, _now: u64) -> ManagerResult<Vec<Address>> {
        self.gauge.mint_rewards(holder).map_err(external_err)?;
        Ok(vec![self.config.reward_token])
    }
}
