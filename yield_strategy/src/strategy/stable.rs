//! Persisted form of a strategy's settings and ledger

use std::borrow::Cow;

use candid::{CandidType, Decode, Encode, Nat};
use ic_stable_structures::{storable::Bound, Storable};
use serde::Deserialize;

use crate::{
    types::{StrategyInput, SwapPathInput},
    utils::{
        common::{nat_to_u256, u256_to_nat},
        error::*,
    },
};

use super::{data::StrategyData, settings::StrategySettings};

/// Stable strategy struct
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub struct StableStrategy {
    /// Settings in their deployment form
    pub input: StrategyInput,
    pub total_shares: Nat,
}

impl StableStrategy {
    pub fn capture(settings: &StrategySettings, data: &StrategyData) -> Self {
        let mut swap_paths: Vec<SwapPathInput> = settings
            .swap_paths
            .iter()
            .map(|(reward, path)| SwapPathInput {
                reward: reward.to_string(),
                path: path.iter().map(|hop| hop.to_string()).collect(),
            })
            .collect();
        swap_paths.sort_by(|a, b| a.reward.cmp(&b.reward));

        Self {
            input: StrategyInput {
                key: settings.key,
                strategy: settings.strategy.to_string(),
                asset: settings.asset.to_string(),
                owner: data.owner.to_string(),
                controller: data.controller.to_string(),
                swap_router: settings.swap_router.to_string(),
                swap_paths,
                swap_deadline_window: Some(settings.swap_deadline_window),
            },
            total_shares: u256_to_nat(&data.total_shares),
        }
    }

    pub fn decode(&self) -> ManagerResult<(StrategySettings, StrategyData)> {
        let settings = StrategySettings::try_from(&self.input)?;
        let mut data = StrategyData::try_from(&self.input)?;
        data.total_shares(nat_to_u256(&self.total_shares)?);
        Ok((settings, data))
    }
}

impl Storable for StableStrategy {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Owned(Encode!(self).unwrap())
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        Decode!(bytes.as_ref(), Self).unwrap()
    }

    const BOUND: Bound = Bound::Unbounded;
}
