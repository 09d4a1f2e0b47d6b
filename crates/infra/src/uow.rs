//! Unit of work: atomic all-or-nothing persistence plus deferred event
//! dispatch.
//!
//! `begin` locks the store for the whole scope and clones the committed state
//! into a working copy. Writes go through repositories bound to that copy;
//! events are queued, not published. `commit` swaps the copy into the shared
//! state and only then dispatches the queue in emission order. Dropping the
//! scope without committing discards everything — zero observable side
//! effects, zero dispatched events.

use std::sync::MutexGuard;

use finledger_accounting::LedgerEvent;
use finledger_core::{LedgerError, LedgerResult};
use finledger_events::{Event, EventBus};

use crate::memory::{
    LedgerState, MemAccounts, MemImportBatches, MemStatementEntries, MemTransactions, MemoryStore,
};

/// One flat transactional scope. Nesting is not supported: holding the store
/// lock for the lifetime of the scope means a second `begin` blocks until the
/// first scope ends.
pub struct UnitOfWork<'a> {
    committed: MutexGuard<'a, LedgerState>,
    working: LedgerState,
    queued: Vec<LedgerEvent>,
    bus: &'a EventBus<LedgerEvent>,
}

impl<'a> UnitOfWork<'a> {
    /// Open a scope over the store.
    ///
    /// Fails with `Persistence` if the store lock is poisoned (a writer
    /// panicked mid-scope in another thread).
    pub fn begin(
        store: &'a MemoryStore,
        bus: &'a EventBus<LedgerEvent>,
    ) -> LedgerResult<UnitOfWork<'a>> {
        let committed = store
            .state
            .lock()
            .map_err(|_| LedgerError::persistence("ledger store lock poisoned"))?;
        let working = committed.clone();
        Ok(UnitOfWork {
            committed,
            working,
            queued: Vec::new(),
            bus,
        })
    }

    /// Accounts repository bound to this scope.
    pub fn accounts(&mut self) -> MemAccounts<'_> {
        MemAccounts {
            state: &mut self.working,
        }
    }

    /// Transactions repository bound to this scope.
    pub fn transactions(&mut self) -> MemTransactions<'_> {
        MemTransactions {
            state: &mut self.working,
        }
    }

    /// Import-batch repository bound to this scope.
    pub fn import_batches(&mut self) -> MemImportBatches<'_> {
        MemImportBatches {
            state: &mut self.working,
        }
    }

    /// Statement-entry repository bound to this scope.
    pub fn statement_entries(&mut self) -> MemStatementEntries<'_> {
        MemStatementEntries {
            state: &mut self.working,
        }
    }

    /// Queue a domain event for dispatch after a successful commit.
    pub fn raise(&mut self, event: LedgerEvent) {
        self.queued.push(event);
    }

    /// Events queued so far, in emission order.
    pub fn queued_events(&self) -> &[LedgerEvent] {
        &self.queued
    }

    /// Atomically publish the staged writes, then dispatch queued events in
    /// emission order.
    ///
    /// The swap happens under the lock held since `begin`, so no reader ever
    /// sees a partial commit. The lock is released *before* dispatch so
    /// handlers may read the freshly committed state.
    pub fn commit(mut self) -> LedgerResult<()> {
        *self.committed = std::mem::take(&mut self.working);
        let queued = std::mem::take(&mut self.queued);
        let bus = self.bus;

        tracing::debug!(events = queued.len(), "unit of work committed");
        drop(self); // releases the store lock

        for event in &queued {
            tracing::debug!(event_type = event.event_type(), "dispatching domain event");
            bus.publish(event);
        }
        Ok(())
    }

    /// Discard all staged writes and queued events, restoring pre-scope state.
    ///
    /// Dropping the scope has the same effect; this method just makes the
    /// intent explicit at call sites.
    pub fn rollback(self) {
        tracing::debug!(events = self.queued.len(), "unit of work rolled back");
    }
}

impl core::fmt::Debug for UnitOfWork<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("queued_events", &self.queued.len())
            .finish_non_exhaustive()
    }
}
