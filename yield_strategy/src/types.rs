use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolEvent};
use candid::{CandidType, Nat};
use serde::Deserialize;

use crate::utils::{common::string_to_address, error::*};

/// Identity and environment of the account invoking a strategy operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// The immediate caller
    pub caller: Address,
    /// `false` when the call was relayed through an intermediary contract
    pub is_direct_caller: bool,
    /// Current time in seconds
    pub timestamp: u64,
}

impl CallContext {
    /// Context of a call made directly by an externally owned account.
    pub fn direct(caller: Address, timestamp: u64) -> Self {
        Self {
            caller,
            is_direct_caller: true,
            timestamp,
        }
    }

    /// Context of a call relayed through another contract.
    pub fn relayed(caller: Address, timestamp: u64) -> Self {
        Self {
            caller,
            is_direct_caller: false,
            timestamp,
        }
    }
}

sol!(
    // Strategy events
    event Buy(uint256 amount, uint256 shares);
    event Sell(uint256 shares, uint256 amount);
    event ControllerChanged(address previous, address current);
);

/// Events emitted by a strategy
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StrategyEvent {
    Buy { amount: U256, shares: U256 },
    Sell { shares: U256, amount: U256 },
    ControllerChanged { previous: Address, current: Address },
}

impl StrategyEvent {
    /// Topic 0 of the event log
    pub fn topic(&self) -> B256 {
        match self {
            StrategyEvent::Buy { .. } => Buy::SIGNATURE_HASH,
            StrategyEvent::Sell { .. } => Sell::SIGNATURE_HASH,
            StrategyEvent::ControllerChanged { .. } => ControllerChanged::SIGNATURE_HASH,
        }
    }

    /// ABI encoded, non-indexed event data
    pub fn encode_data(&self) -> Vec<u8> {
        match self {
            StrategyEvent::Buy { amount, shares } => Buy {
                amount: *amount,
                shares: *shares,
            }
            .encode_data(),
            StrategyEvent::Sell { shares, amount } => Sell {
                shares: *shares,
                amount: *amount,
            }
            .encode_data(),
            StrategyEvent::ControllerChanged { previous, current } => ControllerChanged {
                previous: *previous,
                current: *current,
            }
            .encode_data(),
        }
    }
}

/// Swap route for one reward token
#[derive(Clone, Debug, Deserialize, CandidType, PartialEq)]
pub struct SwapPathInput {
    pub reward: String,
    pub path: Vec<String>,
}

/// Strategy configuration as supplied by the deployer
#[derive(Clone, Debug, Deserialize, CandidType, PartialEq)]
pub struct StrategyInput {
    pub key: u32,
    /// Account holding the external position on behalf of the strategy
    pub strategy: String,
    pub asset: String,
    pub owner: String,
    pub controller: String,
    pub swap_router: String,
    #[serde(default)]
    pub swap_paths: Vec<SwapPathInput>,
    #[serde(default)]
    pub swap_deadline_window: Option<u64>,
}

impl StrategyInput {
    /// Parses a JSON strategy configuration
    pub fn from_json(input: &str) -> ManagerResult<Self> {
        serde_json::from_str(input).map_err(|err| ManagerError::DecodingError(err.to_string()))
    }
}

/// Decoded swap route
#[derive(Clone, Debug, PartialEq)]
pub struct SwapPath {
    pub reward: Address,
    pub path: Vec<Address>,
}

impl TryFrom<SwapPathInput> for SwapPath {
    type Error = ManagerError;

    fn try_from(value: SwapPathInput) -> Result<Self, Self::Error> {
        let reward = string_to_address(value.reward)?;
        let path = value
            .path
            .into_iter()
            .map(string_to_address)
            .collect::<Result<Vec<_>, _>>()?;

        if path.len() < 2 || path.first() != Some(&reward) {
            return Err(ManagerError::DecodingError(format!(
                "Swap path for {} must start at the reward token and contain at least two hops.",
                reward
            )));
        }

        Ok(Self { reward, path })
    }
}

/// Public view of a strategy
#[derive(Clone, Debug, CandidType, Deserialize, PartialEq)]
pub struct StrategyQuery {
    pub key: u32,
    pub asset: String,
    pub controller: String,
    pub owner: String,
    pub total_shares: Nat,
    pub price: Nat,
    pub journal_entries: u64,
}
