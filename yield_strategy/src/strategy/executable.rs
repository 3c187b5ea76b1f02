//! The executable strategy: settings, share ledger, journal and the external collaborators
//! it trades through.

use alloy_primitives::{Address, U256};

use crate::{
    adapters::YieldSource,
    journal::{Journal, JournalCollection, LogType},
    protocols::{Erc20, SwapRouter, Transactional},
    types::{CallContext, StrategyEvent, StrategyInput, StrategyQuery},
    utils::{
        common::{only_owner, u256_to_nat},
        error::*,
    },
};

use super::{data::StrategyData, settings::StrategySettings, stable::StableStrategy};

/// A strategy bound to its external collaborators.
///
/// The share ledger is only written by the strategy's own operations. Hosts read it
/// through [`ExecutableStrategy::data`]:
///
/// ```compile_fail
/// use alloy_primitives::U256;
/// use yield_strategy::ExecutableStrategy;
///
/// fn inflate<Y, T, R>(strategy: &mut ExecutableStrategy<Y, T, R>) {
///     strategy.data.total_shares = U256::MAX;
/// }
/// ```
pub struct ExecutableStrategy<Y, T, R> {
    /// Immutable settings and configurations
    pub settings: StrategySettings,
    /// Mutable state
    pub(crate) data: StrategyData,
    /// Record of every operation and the events it emitted
    pub(crate) journal: Journal,
    /// External yield source
    pub(crate) source: Y,
    /// Token contracts
    pub(crate) tokens: T,
    /// Router used to sell harvested rewards
    pub(crate) router: R,
}

impl<Y, T, R> ExecutableStrategy<Y, T, R>
where
    Y: YieldSource,
    T: Erc20,
    R: SwapRouter,
{
    pub fn new(
        settings: StrategySettings,
        data: StrategyData,
        source: Y,
        tokens: T,
        router: R,
    ) -> ExecutableStrategy<Y, T, R> {
        ExecutableStrategy {
            settings,
            data,
            journal: Journal::default(),
            source,
            tokens,
            router,
        }
    }

    /// Builds a fresh strategy with no outstanding shares from a deployment input.
    pub fn from_input(
        input: &StrategyInput,
        source: Y,
        tokens: T,
        router: R,
    ) -> ManagerResult<Self> {
        let settings = StrategySettings::try_from(input)?;
        let data = StrategyData::try_from(input)?;
        Ok(Self::new(settings, data, source, tokens, router))
    }

    /// Rebuilds a strategy from a persisted snapshot.
    pub fn restore(
        stable: &StableStrategy,
        source: Y,
        tokens: T,
        router: R,
    ) -> ManagerResult<Self> {
        let (settings, data) = stable.decode()?;
        Ok(Self::new(settings, data, source, tokens, router))
    }

    /// Captures settings and ledger for persistence.
    pub fn snapshot(&self) -> StableStrategy {
        StableStrategy::capture(&self.settings, &self.data)
    }

    /// Returns the supply asset.
    pub fn asset_address(&self) -> Address {
        self.settings.asset
    }

    pub fn total_shares(&self) -> U256 {
        self.data.total_shares
    }

    pub fn data(&self) -> &StrategyData {
        &self.data
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Replaces the controller. Only the owner may call this.
    pub fn set_controller(
        &mut self,
        context: &CallContext,
        new_controller: Address,
    ) -> ManagerResult<()> {
        let mut journal = self.open_journal(context);
        let result = self.update_controller(context, new_controller, &mut journal);
        self.journal.commit(journal, result.clone());
        result
    }

    fn update_controller(
        &mut self,
        context: &CallContext,
        new_controller: Address,
        journal: &mut JournalCollection,
    ) -> ManagerResult<()> {
        only_owner(context.caller, self.data.owner)?;

        let previous = self.data.controller;
        self.data.controller(new_controller);

        journal
            .append_note(
                Ok(()),
                LogType::Admin,
                format!("Controller changed from {} to {}.", previous, new_controller),
            )
            .append_event(StrategyEvent::ControllerChanged {
                previous,
                current: new_controller,
            });
        Ok(())
    }

    /// Public view of the strategy
    pub fn query(&self) -> ManagerResult<StrategyQuery> {
        Ok(StrategyQuery {
            key: self.settings.key,
            asset: self.settings.asset.to_string(),
            controller: self.data.controller.to_string(),
            owner: self.data.owner.to_string(),
            total_shares: u256_to_nat(&self.data.total_shares),
            price: u256_to_nat(&self.sync_price()?),
            journal_entries: self.journal.len() as u64,
        })
    }

    pub(crate) fn open_journal(&self, context: &CallContext) -> JournalCollection {
        JournalCollection::open(Some(self.settings.key), context.timestamp)
    }
}

impl<Y, T, R> ExecutableStrategy<Y, T, R>
where
    T: Transactional,
{
    /// Runs `call` as one unit. On error the ledger and every external effect since the
    /// start of the call are rolled back before the error is returned.
    pub(crate) fn atomically<V>(
        &mut self,
        call: impl FnOnce(&mut Self) -> ManagerResult<V>,
    ) -> ManagerResult<V> {
        let checkpoint = self.tokens.checkpoint()?;
        let data = self.data.clone();

        match call(self) {
            Ok(value) => {
                self.tokens.release(checkpoint);
                Ok(value)
            }
            Err(err) => {
                self.data = data;
                self.tokens.revert_to(checkpoint)?;
                Err(err)
            }
        }
    }
}
