//! Share-accounted yield strategies.
//!
//! A strategy wraps one external yield source, issues shares against the value it holds
//! there, nets the controller's buy and sell requests into a single deposit or withdrawal
//! and reinvests harvested rewards.

pub mod adapters;
pub mod constants;
pub mod journal;
pub mod protocols;
pub mod strategy;
pub mod types;
mod utils;

#[cfg(test)]
mod testing;

pub use strategy::{
    ExecutableStrategy, StableStrategy, StrategyCell, StrategyData, StrategySettings,
};
pub use types::{CallContext, StrategyEvent, StrategyInput, StrategyQuery, SwapPath, SwapPathInput};
pub use utils::{
    common::{nat_to_u256, u256_to_nat},
    error::{ManagerError, ManagerResult},
};
