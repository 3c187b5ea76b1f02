//! Mutable strategy data

use alloy_primitives::{Address, U256};

use crate::{
    types::StrategyInput,
    utils::{common::string_to_address, error::ManagerError},
};

/// Share ledger and access roles of a strategy
///
/// Outstanding shares only change through order aggregation. Code outside the crate can
/// read them through [`ExecutableStrategy::total_shares`](crate::ExecutableStrategy::total_shares)
/// but cannot write them:
///
/// ```compile_fail
/// use alloy_primitives::U256;
/// use yield_strategy::StrategyData;
///
/// let mut data = StrategyData::default();
/// data.total_shares(U256::MAX);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrategyData {
    /// Outstanding claims on the external position
    pub(crate) total_shares: U256,
    /// The only account allowed to aggregate orders
    pub controller: Address,
    /// The account allowed to replace the controller
    pub owner: Address,
}

impl StrategyData {
    /// Sets the outstanding shares.
    pub(crate) fn total_shares(&mut self, total_shares: U256) -> &mut Self {
        self.total_shares = total_shares;
        self
    }

    /// Sets the controller.
    pub fn controller(&mut self, controller: Address) -> &mut Self {
        self.controller = controller;
        self
    }

    /// Sets the owner.
    pub fn owner(&mut self, owner: Address) -> &mut Self {
        self.owner = owner;
        self
    }
}

impl TryFrom<&StrategyInput> for StrategyData {
    type Error = ManagerError;

    fn try_from(value: &StrategyInput) -> Result<Self, Self::Error> {
        let mut data = StrategyData::default();
        data.controller(string_to_address(value.controller.clone())?)
            .owner(string_to_address(value.owner.clone())?);
        Ok(data)
    }
}
