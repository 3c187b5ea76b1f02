//! Share pricing

use alloy_primitives::U256;

use crate::{
    adapters::YieldSource,
    constants::{max_price, scale},
    protocols::{Erc20, SwapRouter},
    utils::{common::mul_div, error::*},
};

use super::executable::ExecutableStrategy;

impl<Y, T, R> ExecutableStrategy<Y, T, R>
where
    Y: YieldSource,
    T: Erc20,
    R: SwapRouter,
{
    /// Value of the external position, denominated in the supply asset
    pub fn asset_amount(&self) -> ManagerResult<U256> {
        self.source.current_value(self.settings.strategy)
    }

    /// Supply asset per share in 18 decimal fixed point, rounded down.
    ///
    /// Without outstanding shares the price is nominal (`1e18`) for an empty position and
    /// [`max_price`] for a position that already holds value. The latter must not be
    /// used as a divisor.
    pub fn sync_price(&self) -> ManagerResult<U256> {
        let asset_amount = self.asset_amount()?;
        price_of(asset_amount, self.data.total_shares)
    }
}

pub(crate) fn price_of(asset_amount: U256, total_shares: U256) -> ManagerResult<U256> {
    if total_shares.is_zero() {
        if asset_amount.is_zero() {
            return Ok(scale());
        }
        return Ok(max_price());
    }
    mul_div(asset_amount, scale(), total_shares)
}
