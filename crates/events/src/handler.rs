use crate::event::Event;

/// Reacts to a published domain event with a side effect (audit log, metrics,
/// cache refresh, ...).
///
/// Handler failures are **contained by the bus**: an `Err` is logged and never
/// reaches the publisher, because a side effect must never roll back an
/// already-committed financial write. Handlers that need to signal anything to
/// the writer are a design smell — events are facts, not requests.
pub trait EventHandler<E: Event>: Send + Sync {
    /// Handler name used in dispatch logs.
    fn name(&self) -> &str;

    /// Process one event.
    fn handle(&self, event: &E) -> anyhow::Result<()>;
}

/// Adapter turning a closure into an [`EventHandler`].
///
/// Mostly useful in tests and small compositions where a full handler type
/// would be noise.
pub struct FnHandler<F> {
    name: String,
    func: F,
}

impl<F> FnHandler<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<E, F> EventHandler<E> for FnHandler<F>
where
    E: Event,
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &E) -> anyhow::Result<()> {
        (self.func)(event)
    }
}
