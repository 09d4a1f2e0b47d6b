use chrono::{DateTime, Utc};

/// A domain event: an immutable fact about a committed state change.
///
/// Events are:
/// - **immutable** (facts, never commands)
/// - named in the **past tense** (`AccountCreated`, not `CreateAccount`)
/// - published only **after** a successful commit
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Discriminant used to key handler registration.
    ///
    /// For a sum type over event variants this is the tag of the variant, so a
    /// handler subscribes to exactly one concrete kind of fact.
    type Kind: Copy + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync + 'static;

    /// The runtime kind of this event instance.
    fn kind(&self) -> Self::Kind;

    /// Stable event name/type identifier (e.g. "ledger.account.created").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
