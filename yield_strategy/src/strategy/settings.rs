//! Strategy settings
//!
//! Set once at deployment. Only the swap configuration may be tuned afterwards.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::{
    constants::SWAP_DEADLINE_WINDOW,
    types::{StrategyInput, SwapPath},
    utils::{common::string_to_address, error::ManagerError},
};

/// Settings fixed at construction
#[derive(Clone, Debug, PartialEq)]
pub struct StrategySettings {
    /// Identifier of the strategy among its siblings
    pub key: u32,
    /// Account holding the external position and the strategy's token balances
    pub strategy: Address,
    /// The supply asset accepted for deposits and returned on withdrawals
    pub asset: Address,
    /// Exchange router used to sell rewards
    pub swap_router: Address,
    /// Swap routes by reward token. Rewards without a route are swapped directly into the asset.
    pub swap_paths: HashMap<Address, Vec<Address>>,
    /// Seconds between a harvest and its swap deadline
    pub swap_deadline_window: u64,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            key: 0,
            strategy: Address::ZERO,
            asset: Address::ZERO,
            swap_router: Address::ZERO,
            swap_paths: HashMap::new(),
            swap_deadline_window: SWAP_DEADLINE_WINDOW,
        }
    }
}

impl StrategySettings {
    /// Sets the key for the strategy.
    pub fn key(&mut self, key: u32) -> &mut Self {
        self.key = key;
        self
    }

    /// Sets the account holding the strategy's position.
    pub fn strategy(&mut self, strategy: Address) -> &mut Self {
        self.strategy = strategy;
        self
    }

    /// Sets the supply asset.
    pub fn asset(&mut self, asset: Address) -> &mut Self {
        self.asset = asset;
        self
    }

    /// Sets the swap router.
    pub fn swap_router(&mut self, swap_router: Address) -> &mut Self {
        self.swap_router = swap_router;
        self
    }

    /// Sets the swap route of one reward token.
    pub fn swap_path(&mut self, swap_path: SwapPath) -> &mut Self {
        self.swap_paths.insert(swap_path.reward, swap_path.path);
        self
    }

    /// Sets the swap deadline window, denominated in seconds.
    pub fn swap_deadline_window(&mut self, swap_deadline_window: u64) -> &mut Self {
        self.swap_deadline_window = swap_deadline_window;
        self
    }

    /// Route used to sell `reward` for the supply asset
    pub fn route_for(&self, reward: Address) -> Vec<Address> {
        self.swap_paths
            .get(&reward)
            .cloned()
            .unwrap_or_else(|| vec![reward, self.asset])
    }
}

impl TryFrom<&StrategyInput> for StrategySettings {
    type Error = ManagerError;

    fn try_from(value: &StrategyInput) -> Result<Self, Self::Error> {
        let mut settings = StrategySettings::default();
        settings
            .key(value.key)
            .strategy(string_to_address(value.strategy.clone())?)
            .asset(string_to_address(value.asset.clone())?)
            .swap_router(string_to_address(value.swap_router.clone())?)
            .swap_deadline_window(value.swap_deadline_window.unwrap_or(SWAP_DEADLINE_WINDOW));

        for input in value.swap_paths.iter().cloned() {
            let swap_path = SwapPath::try_from(input)?;
            if swap_path.path.last() != Some(&settings.asset) {
                return Err(ManagerError::DecodingError(format!(
                    "Swap path for {} does not end at the supply asset.",
                    swap_path.reward
                )));
            }
            settings.swap_path(swap_path);
        }

        Ok(settings)
    }
}
