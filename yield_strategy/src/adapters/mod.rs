//! Adapters translating a strategy's deposits, withdrawals and reward claims into calls on
//! one family of external protocols.
//!
//! The order engine only ever talks to [`YieldSource`]; harvesting additionally needs
//! [`RewardSource`].

use alloy_primitives::{Address, U256};

#[cfg(test)]
use mockall::automock;

use crate::utils::error::ManagerResult;

pub mod lending_pool;
pub mod liquidity_pool;
pub mod money_market;

pub use lending_pool::{LendingPoolAdapter, LendingPoolConfig};
pub use liquidity_pool::{LiquidityPoolAdapter, LiquidityPoolConfig};
pub use money_market::{MoneyMarketAdapter, MoneyMarketConfig};

/// External position valued in the supply asset
#[cfg_attr(test, automock)]
pub trait YieldSource {
    /// Account the supply asset must be approved to before a deposit
    fn spender(&self) -> Address;

    /// Value of `holder`'s position, denominated in the supply asset
    fn current_value(&self, holder: Address) -> ManagerResult<U256>;

    /// Moves `amount` of the supply asset held by `holder` into the position
    fn deposit(&mut self, holder: Address, amount: U256) -> ManagerResult<()>;

    /// Pulls `amount` of value out of the position back to `holder` as supply asset.
    /// Returns what the protocol reported as withdrawn.
    fn withdraw(&mut self, holder: Address, amount: U256) -> ManagerResult<U256>;
}

/// Incentive tokens accrued by the external position
pub trait RewardSource {
    /// Claims whatever rewards are available to `holder` and returns the tokens that are
    /// ready to be sold.
    fn claim_rewards(&mut self, holder: Address, now: u64) -> ManagerResult<Vec<Address>>;
}
