//! Double-entry ledger domain: value objects, entities, and domain events.
//!
//! Pure domain logic only: no IO, no persistence concerns. Entities are built
//! through validating factories and are append-only afterwards, apart from the
//! explicitly exposed soft mutations (`rename`, `deactivate`).

pub mod account;
pub mod events;
pub mod import;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountState, AccountType, NewAccount};
pub use events::{
    AccountCreated, AccountDeactivated, AccountRenamed, LedgerEvent, LedgerEventKind,
    StatementImported, TransactionRecorded,
};
pub use import::{
    ImportBatch, ImportSource, ImportStatus, StatementEntry, StatementStatus,
};
pub use money::{CurrencyCode, Money};
pub use transaction::{Posting, Transaction, TransactionDraft};
