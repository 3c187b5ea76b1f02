//! Strategy journal
//!
//! Every operation opens a [`JournalCollection`], appends notes and events while it runs
//! and commits the collection into the strategy's [`Journal`] once the outcome is known.
//! Events are only kept for successful operations; a failed operation leaves its notes
//! and a closing `ExecutionResult` entry carrying the error.

use std::collections::VecDeque;

use alloy_primitives::B256;
use log::Level;

use crate::{
    constants::{LOG_TARGET, MAX_JOURNAL_ENTRIES},
    types::StrategyEvent,
    utils::error::ManagerResult,
};

/// Category of a journal entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogType {
    Info,
    Order,
    Harvest,
    Admin,
    Event,
    ExecutionResult,
}

/// Journal entry
#[derive(Clone, Debug, PartialEq)]
pub struct JournalEntry {
    pub timestamp: u64,
    pub entry: ManagerResult<()>,
    pub log_type: LogType,
    pub strategy_id: Option<u32>,
    pub note: Option<String>,
    pub event: Option<StrategyEvent>,
}

/// Builder for journal entries
impl JournalEntry {
    /// Create a new instance of a journal entry
    /// Fills the `timestamp`, `entry` and `log_type` fields
    pub fn new(entry: ManagerResult<()>, log_type: LogType, timestamp: u64) -> Self {
        Self {
            timestamp,
            entry,
            log_type,
            strategy_id: None,
            note: None,
            event: None,
        }
    }

    /// Fills the `strategy_id` field of the entry
    pub fn strategy(mut self, id: Option<u32>) -> Self {
        self.strategy_id = id;
        self
    }

    /// Fills the `note` field of the entry
    pub fn note<S: AsRef<str>>(mut self, text: S) -> Self {
        self.note = Some(text.as_ref().to_string());
        self
    }

    /// Fills the `event` field of the entry
    pub fn event(mut self, event: StrategyEvent) -> Self {
        self.event = Some(event);
        self
    }

    /// Topic and hex encoded data of the attached event, if any
    pub fn event_log(&self) -> Option<(B256, String)> {
        self.event
            .as_ref()
            .map(|event| (event.topic(), format!("0x{}", hex::encode(event.encode_data()))))
    }
}

/// Entries produced by a single strategy operation
#[derive(Debug)]
pub struct JournalCollection {
    strategy_id: Option<u32>,
    timestamp: u64,
    entries: Vec<JournalEntry>,
}

impl JournalCollection {
    /// Opens a collection for one operation
    pub fn open(strategy_id: Option<u32>, timestamp: u64) -> Self {
        Self {
            strategy_id,
            timestamp,
            entries: vec![],
        }
    }

    /// Appends a note and mirrors it to the `log` facade
    pub fn append_note<S: AsRef<str>>(
        &mut self,
        entry: ManagerResult<()>,
        log_type: LogType,
        note: S,
    ) -> &mut Self {
        let level = if entry.is_ok() { Level::Info } else { Level::Warn };
        log::log!(
            target: LOG_TARGET,
            level,
            "[strategy {:?}] {:?}: {}",
            self.strategy_id,
            log_type,
            note.as_ref()
        );

        self.entries.push(
            JournalEntry::new(entry, log_type, self.timestamp)
                .strategy(self.strategy_id)
                .note(note),
        );
        self
    }

    /// Appends an event. Dropped if the operation fails.
    pub fn append_event(&mut self, event: StrategyEvent) -> &mut Self {
        log::debug!(target: LOG_TARGET, "[strategy {:?}] emitting {:?}", self.strategy_id, event);

        self.entries.push(
            JournalEntry::new(Ok(()), LogType::Event, self.timestamp)
                .strategy(self.strategy_id)
                .event(event),
        );
        self
    }

    /// Seals the collection with the operation's outcome
    fn seal(mut self, outcome: ManagerResult<()>) -> Vec<JournalEntry> {
        if let Err(err) = &outcome {
            self.entries.retain(|entry| entry.event.is_none());
            log::warn!(
                target: LOG_TARGET,
                "[strategy {:?}] operation failed: {:?}",
                self.strategy_id,
                err
            );
            self.entries.push(
                JournalEntry::new(outcome, LogType::ExecutionResult, self.timestamp)
                    .strategy(self.strategy_id)
                    .note("The operation was aborted."),
            );
        }
        self.entries
    }
}

/// Bounded journal owned by a strategy
#[derive(Clone, Debug)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(MAX_JOURNAL_ENTRIES)
    }
}

impl Journal {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Commits the entries of a finished operation
    pub fn commit(&mut self, collection: JournalCollection, outcome: ManagerResult<()>) {
        for entry in collection.seal(outcome) {
            if self.entries.len() == self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back(entry);
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    /// Events emitted by successful operations, oldest first
    pub fn events(&self) -> impl Iterator<Item = &StrategyEvent> {
        self.entries.iter().filter_map(|entry| entry.event.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
