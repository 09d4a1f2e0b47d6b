//! Concrete ledger domain events.
//!
//! Every committed mutation emits one of these facts. They are published only
//! after a successful commit, in emission order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use finledger_core::{AccountId, ImportBatchId, TransactionId};
use finledger_events::Event;

use crate::account::AccountType;
use crate::import::ImportSource;
use crate::money::CurrencyCode;

/// A new account entered the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreated {
    pub account_id: AccountId,
    pub code: String,
    pub account_type: AccountType,
    pub currency: CurrencyCode,
    pub occurred_at: DateTime<Utc>,
}

/// An account's display name changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRenamed {
    pub account_id: AccountId,
    pub code: String,
    pub old_name: String,
    pub new_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// An account was closed for new postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeactivated {
    pub account_id: AccountId,
    pub code: String,
    pub occurred_at: DateTime<Utc>,
}

/// A balanced transaction was committed to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecorded {
    pub transaction_id: TransactionId,
    pub date: NaiveDate,
    pub description: String,
    pub posting_count: usize,
    pub affected_accounts: Vec<AccountId>,
    pub occurred_at: DateTime<Utc>,
}

/// A statement file finished importing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementImported {
    pub batch_id: ImportBatchId,
    pub source: ImportSource,
    pub entry_count: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Tag used to key handler registration on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerEventKind {
    AccountCreated,
    AccountRenamed,
    AccountDeactivated,
    TransactionRecorded,
    StatementImported,
}

impl LedgerEventKind {
    /// Every kind, for handlers that subscribe to the whole stream.
    ///
    /// Lives next to the enum so adding a variant means updating this list in
    /// the same diff.
    pub const ALL: [LedgerEventKind; 5] = [
        LedgerEventKind::AccountCreated,
        LedgerEventKind::AccountRenamed,
        LedgerEventKind::AccountDeactivated,
        LedgerEventKind::TransactionRecorded,
        LedgerEventKind::StatementImported,
    ];
}

/// Sum type over every ledger domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    AccountCreated(AccountCreated),
    AccountRenamed(AccountRenamed),
    AccountDeactivated(AccountDeactivated),
    TransactionRecorded(TransactionRecorded),
    StatementImported(StatementImported),
}

impl Event for LedgerEvent {
    type Kind = LedgerEventKind;

    fn kind(&self) -> LedgerEventKind {
        match self {
            LedgerEvent::AccountCreated(_) => LedgerEventKind::AccountCreated,
            LedgerEvent::AccountRenamed(_) => LedgerEventKind::AccountRenamed,
            LedgerEvent::AccountDeactivated(_) => LedgerEventKind::AccountDeactivated,
            LedgerEvent::TransactionRecorded(_) => LedgerEventKind::TransactionRecorded,
            LedgerEvent::StatementImported(_) => LedgerEventKind::StatementImported,
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::AccountCreated(_) => "ledger.account.created",
            LedgerEvent::AccountRenamed(_) => "ledger.account.renamed",
            LedgerEvent::AccountDeactivated(_) => "ledger.account.deactivated",
            LedgerEvent::TransactionRecorded(_) => "ledger.transaction.recorded",
            LedgerEvent::StatementImported(_) => "ledger.statement.imported",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::AccountCreated(e) => e.occurred_at,
            LedgerEvent::AccountRenamed(e) => e.occurred_at,
            LedgerEvent::AccountDeactivated(e) => e.occurred_at,
            LedgerEvent::TransactionRecorded(e) => e.occurred_at,
            LedgerEvent::StatementImported(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_covers_every_kind_exactly_once() {
        // Forces the list through the exhaustive match in `kind`: every
        // variant's tag must appear, and none twice.
        let events = [
            LedgerEvent::AccountCreated(AccountCreated {
                account_id: AccountId::new(),
                code: "Assets:Checking".into(),
                account_type: AccountType::Asset,
                currency: CurrencyCode::new("USD").unwrap(),
                occurred_at: Utc::now(),
            }),
            LedgerEvent::AccountRenamed(AccountRenamed {
                account_id: AccountId::new(),
                code: "Assets:Checking".into(),
                old_name: "a".into(),
                new_name: "b".into(),
                occurred_at: Utc::now(),
            }),
            LedgerEvent::AccountDeactivated(AccountDeactivated {
                account_id: AccountId::new(),
                code: "Assets:Checking".into(),
                occurred_at: Utc::now(),
            }),
            LedgerEvent::TransactionRecorded(TransactionRecorded {
                transaction_id: TransactionId::new(),
                date: chrono::NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                description: "x".into(),
                posting_count: 2,
                affected_accounts: vec![],
                occurred_at: Utc::now(),
            }),
            LedgerEvent::StatementImported(StatementImported {
                batch_id: ImportBatchId::new(),
                source: ImportSource::Csv,
                entry_count: 0,
                occurred_at: Utc::now(),
            }),
        ];

        assert_eq!(events.len(), LedgerEventKind::ALL.len());
        for event in &events {
            assert!(LedgerEventKind::ALL.contains(&event.kind()));
        }
        for (i, kind) in LedgerEventKind::ALL.iter().enumerate() {
            assert!(!LedgerEventKind::ALL[i + 1..].contains(kind));
        }
    }

    #[test]
    fn kind_and_type_name_agree_per_variant() {
        let ev = LedgerEvent::AccountCreated(AccountCreated {
            account_id: AccountId::new(),
            code: "Assets:Checking".into(),
            account_type: AccountType::Asset,
            currency: CurrencyCode::new("USD").unwrap(),
            occurred_at: Utc::now(),
        });
        assert_eq!(ev.kind(), LedgerEventKind::AccountCreated);
        assert_eq!(ev.event_type(), "ledger.account.created");
    }
}
