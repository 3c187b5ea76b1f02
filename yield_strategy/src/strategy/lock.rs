//! Single-writer strategy cell
//!
//! A strategy assumes nothing else touches its shares or its external position between
//! reading and writing them. Hosts that share a strategy between callers keep it in a
//! [`StrategyCell`]: every call borrows the strategy exclusively, and a call arriving while
//! another one is in flight (an overlapping call, or an adapter calling back into the
//! strategy) is refused with [`ManagerError::Locked`] instead of interleaving.
//!
//! ```plain
//!                   ┌──────────┐
//!              ┌────► Unlocked │
//!              │    └──────────┘
//!              │         │
//!     call     │   with_strategy ───► nested with_strategy ───► Err(Locked)
//!     returns  │         │
//!              │         ▼
//!              │    ┌─────────┐
//!              └────┤ Locked  │
//!                   └─────────┘
//! ```

use std::{cell::RefCell, rc::Rc};

use crate::utils::error::{ManagerError, ManagerResult};

pub struct StrategyCell<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> Clone for StrategyCell<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> StrategyCell<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(strategy)),
        }
    }

    /// Runs a state-mutating call with exclusive access to the strategy.
    ///
    /// # Returns
    /// * `Err(ManagerError::Locked)` - another call holds the strategy
    /// * otherwise the result of `call`
    pub fn with_strategy<R>(
        &self,
        call: impl FnOnce(&mut S) -> ManagerResult<R>,
    ) -> ManagerResult<R> {
        let mut strategy = self
            .inner
            .try_borrow_mut()
            .map_err(|_| ManagerError::Locked)?;
        call(&mut strategy)
    }

    /// Runs a read-only call. Refused while a state-mutating call is in flight.
    pub fn read<R>(&self, call: impl FnOnce(&S) -> ManagerResult<R>) -> ManagerResult<R> {
        let strategy = self.inner.try_borrow().map_err(|_| ManagerError::Locked)?;
        call(&strategy)
    }

    /// Returns `true` while a state-mutating call is in flight.
    pub fn is_locked(&self) -> bool {
        self.inner.try_borrow().is_err()
    }
}
