//! Domain error model.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Validation variants are raised synchronously at construction/write time and
/// never leave a partially built entity behind. `Persistence` is surfaced at
/// commit, after the unit of work has already rolled back. Side-effect failures
/// (event handlers) never appear here — the event bus contains them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Posting sums per currency did not reach exact zero.
    ///
    /// Carries the per-currency imbalance so the caller can correct input
    /// without knowing ledger internals.
    #[error("transaction does not balance: {}", format_imbalance(.0))]
    UnbalancedTransaction(BTreeMap<String, Decimal>),

    /// A transaction needs at least two postings.
    #[error("transaction requires at least 2 postings, got {0}")]
    InsufficientPostings(usize),

    /// Currency code is not a recognized ISO 4217 code.
    #[error("invalid currency code: '{0}'")]
    InvalidCurrency(String),

    /// Arithmetic attempted between values of different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// An account with the same code already exists.
    #[error("account '{0}' already exists")]
    DuplicateAccount(String),

    /// Declared parent is missing or would introduce a cycle.
    #[error("invalid account hierarchy: {0}")]
    InvalidHierarchy(String),

    /// The account exists but has been deactivated.
    #[error("account '{0}' is inactive")]
    InactiveAccount(String),

    /// No account with the given id or code.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The same statement content has already been imported.
    #[error("statement already imported (checksum {0})")]
    DuplicateImport(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    InvalidInput(String),

    /// A requested resource was not found (domain-level).
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage failure surfaced at commit. Staged writes were discarded.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl LedgerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_hierarchy(msg: impl Into<String>) -> Self {
        Self::InvalidHierarchy(msg.into())
    }

    pub fn account_not_found(msg: impl Into<String>) -> Self {
        Self::AccountNotFound(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// True for errors a caller can fix by correcting input.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

fn format_imbalance(imbalance: &BTreeMap<String, Decimal>) -> String {
    let parts: Vec<String> = imbalance
        .iter()
        .map(|(currency, delta)| format!("{currency} {delta:+}"))
        .collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unbalanced_error_reports_per_currency_deltas() {
        let mut imbalance = BTreeMap::new();
        imbalance.insert("USD".to_string(), dec!(100.00));
        imbalance.insert("BRL".to_string(), dec!(-0.01));

        let err = LedgerError::UnbalancedTransaction(imbalance);
        let msg = err.to_string();
        assert!(msg.contains("USD +100.00"));
        assert!(msg.contains("BRL -0.01"));
    }

    #[test]
    fn persistence_is_not_a_validation_error() {
        assert!(!LedgerError::persistence("disk gone").is_validation());
        assert!(LedgerError::DuplicateAccount("CASH".into()).is_validation());
    }
}
