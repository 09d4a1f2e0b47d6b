//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — they represent
/// concepts where identity doesn't matter, only the values do.
///
/// - `Money { amount: 100, currency: USD }` is a value object
/// - `Account { id: AccountId(...), code: "..." }` is an entity
///
/// To "modify" a value object, create a new one with the new values. This keeps
/// them safe to share and gives them primitive-like value semantics.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
