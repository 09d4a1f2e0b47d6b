//! Synchronous in-process event bus (typed handler registry).
//!
//! The bus decouples a committed mutation from its side effects. Dispatch is
//! deliberately synchronous and ordered: a slow handler blocks later handlers
//! and the caller. That trade-off favors audit-ordering guarantees over
//! throughput, which is the right call for a single-user local ledger.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::event::Event;
use crate::handler::EventHandler;

/// In-process pub/sub bus keyed by event kind.
///
/// - `subscribe` appends to the ordered handler list for one kind
/// - `publish` invokes that list synchronously, in registration order
/// - a handler error is logged and **never** propagates to the publisher
pub struct EventBus<E: Event> {
    handlers: RwLock<HashMap<E::Kind, Vec<Arc<dyn EventHandler<E>>>>>,
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    ///
    /// Handlers fire in registration order. The same handler instance may be
    /// registered for several kinds.
    pub fn subscribe(&self, kind: E::Kind, handler: Arc<dyn EventHandler<E>>) {
        // A poisoned registry would mean a subscriber panicked mid-write; the
        // map itself is still structurally intact, so keep serving it.
        let mut handlers = match self.handlers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        handlers.entry(kind).or_default().push(handler);
    }

    /// Dispatch an event to every handler registered for its kind.
    ///
    /// Failures are isolated per handler: one failing handler neither blocks
    /// the remaining handlers nor surfaces to the caller.
    pub fn publish(&self, event: &E) {
        let snapshot: Vec<Arc<dyn EventHandler<E>>> = {
            let handlers = match self.handlers.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            handlers.get(&event.kind()).cloned().unwrap_or_default()
        };

        for handler in snapshot {
            if let Err(error) = handler.handle(event) {
                tracing::warn!(
                    handler = handler.name(),
                    event_type = event.event_type(),
                    %error,
                    "event handler failed; continuing with remaining handlers"
                );
            }
        }
    }

    /// Number of handlers registered for a kind (diagnostics/tests).
    pub fn handler_count(&self, kind: E::Kind) -> usize {
        match self.handlers.read() {
            Ok(guard) => guard.get(&kind).map_or(0, Vec::len),
            Err(poisoned) => poisoned.into_inner().get(&kind).map_or(0, Vec::len),
        }
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Event> core::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}
