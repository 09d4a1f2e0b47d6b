//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities are defined by their identity, not their attribute values. Two
/// entities with the same id are the same entity even if their state differs.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
