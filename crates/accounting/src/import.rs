//! Statement import entities: `ImportBatch` and `StatementEntry`.
//!
//! An import batch groups everything pulled from one statement file; its
//! SHA-256 content checksum is what the duplicate-import guard keys on. Each
//! statement line becomes a `StatementEntry` that later gets matched against
//! an existing transaction or posted as a new one.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finledger_core::{
    Entity, ImportBatchId, LedgerError, LedgerResult, StatementEntryId, TransactionId,
};

use crate::money::CurrencyCode;

/// Where a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportSource {
    Csv,
    Ofx,
    Manual,
    Api,
    Other,
}

/// Batch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportStatus {
    Pending,
    Completed,
    Failed,
    Reversed,
}

/// One statement-file import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatch {
    id: ImportBatchId,
    source: ImportSource,
    status: ImportStatus,
    filename: Option<String>,
    /// SHA-256 over the raw statement content, hex-encoded.
    checksum: String,
    entry_count: usize,
    error_message: Option<String>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl ImportBatch {
    pub fn create(
        source: ImportSource,
        checksum: impl Into<String>,
        filename: Option<String>,
        now: DateTime<Utc>,
    ) -> LedgerResult<ImportBatch> {
        let checksum = checksum.into();
        if checksum.is_empty() {
            return Err(LedgerError::invalid_input(
                "import batch requires a content checksum",
            ));
        }
        Ok(ImportBatch {
            id: ImportBatchId::new(),
            source,
            status: ImportStatus::Pending,
            filename,
            checksum,
            entry_count: 0,
            error_message: None,
            started_at: now,
            completed_at: None,
        })
    }

    pub fn source(&self) -> ImportSource {
        self.source
    }

    pub fn status(&self) -> ImportStatus {
        self.status
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Mark the batch finished with the number of entries it staged.
    pub fn complete(&mut self, entry_count: usize, now: DateTime<Utc>) -> LedgerResult<()> {
        if self.status != ImportStatus::Pending {
            return Err(LedgerError::invalid_input(format!(
                "import batch {} is not pending (status {:?})",
                self.id, self.status
            )));
        }
        self.status = ImportStatus::Completed;
        self.entry_count = entry_count;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Mark the batch failed, keeping the error for operators.
    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> LedgerResult<()> {
        if self.status != ImportStatus::Pending {
            return Err(LedgerError::invalid_input(format!(
                "import batch {} is not pending (status {:?})",
                self.id, self.status
            )));
        }
        self.status = ImportStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(now);
        Ok(())
    }
}

impl Entity for ImportBatch {
    type Id = ImportBatchId;

    fn id(&self) -> &ImportBatchId {
        &self.id
    }
}

/// Processing state of one imported statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementStatus {
    /// Freshly imported, awaiting processing.
    Imported,
    /// Reconciled against an existing ledger transaction.
    Matched,
    /// Converted into a new ledger transaction.
    Posted,
}

/// One raw line from an imported statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementEntry {
    id: StatementEntryId,
    batch_id: ImportBatchId,
    /// External identity (OFX FITID, CSV row hash, ...), unique within a batch.
    external_id: String,
    memo: String,
    payee: Option<String>,
    amount: Decimal,
    currency: CurrencyCode,
    occurred_on: NaiveDate,
    status: StatementStatus,
    transaction_id: Option<TransactionId>,
}

impl StatementEntry {
    pub fn create(
        batch_id: ImportBatchId,
        external_id: impl Into<String>,
        memo: impl Into<String>,
        amount: Decimal,
        currency: CurrencyCode,
        occurred_on: NaiveDate,
    ) -> LedgerResult<StatementEntry> {
        let external_id = external_id.into();
        if external_id.trim().is_empty() {
            return Err(LedgerError::invalid_input(
                "statement entry requires an external id",
            ));
        }
        if amount.is_zero() {
            return Err(LedgerError::invalid_input(
                "statement entry amount cannot be zero",
            ));
        }
        Ok(StatementEntry {
            id: StatementEntryId::new(),
            batch_id,
            external_id,
            memo: memo.into(),
            payee: None,
            amount,
            currency,
            occurred_on,
            status: StatementStatus::Imported,
            transaction_id: None,
        })
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        let payee = payee.into();
        self.payee = (!payee.trim().is_empty()).then(|| payee.trim().to_string());
        self
    }

    pub fn batch_id(&self) -> ImportBatchId {
        self.batch_id
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn payee(&self) -> Option<&str> {
        self.payee.as_deref()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_on
    }

    pub fn status(&self) -> StatementStatus {
        self.status
    }

    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.transaction_id
    }

    /// Reconcile against an existing transaction (duplicate detected).
    pub fn mark_matched(&mut self, existing: TransactionId) -> LedgerResult<()> {
        self.transition(StatementStatus::Matched, existing)
    }

    /// Record that the entry became a new ledger transaction.
    pub fn mark_posted(&mut self, transaction: TransactionId) -> LedgerResult<()> {
        self.transition(StatementStatus::Posted, transaction)
    }

    fn transition(&mut self, next: StatementStatus, tx: TransactionId) -> LedgerResult<()> {
        if self.status != StatementStatus::Imported {
            return Err(LedgerError::invalid_input(format!(
                "statement entry {} already processed (status {:?})",
                self.id, self.status
            )));
        }
        self.status = next;
        self.transaction_id = Some(tx);
        Ok(())
    }
}

impl Entity for StatementEntry {
    type Id = StatementEntryId;

    fn id(&self) -> &StatementEntryId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    fn entry() -> StatementEntry {
        StatementEntry::create(
            ImportBatchId::new(),
            "FITID-1",
            "Coffee",
            dec!(-4.50),
            usd(),
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn batch_completes_exactly_once() {
        let mut batch =
            ImportBatch::create(ImportSource::Ofx, "abc123", Some("oct.ofx".into()), Utc::now())
                .unwrap();
        assert_eq!(batch.status(), ImportStatus::Pending);

        batch.complete(12, Utc::now()).unwrap();
        assert_eq!(batch.status(), ImportStatus::Completed);
        assert_eq!(batch.entry_count(), 12);

        assert!(batch.complete(1, Utc::now()).is_err());
        assert!(batch.fail("late", Utc::now()).is_err());
    }

    #[test]
    fn failed_batch_keeps_the_error_message() {
        let mut batch = ImportBatch::create(ImportSource::Csv, "abc", None, Utc::now()).unwrap();
        batch.fail("malformed row 3", Utc::now()).unwrap();
        assert_eq!(batch.status(), ImportStatus::Failed);
        assert_eq!(batch.error_message(), Some("malformed row 3"));
    }

    #[test]
    fn batch_requires_a_checksum() {
        assert!(ImportBatch::create(ImportSource::Csv, "", None, Utc::now()).is_err());
    }

    #[test]
    fn entry_transitions_only_out_of_imported() {
        let mut e = entry();
        let tx = TransactionId::new();
        e.mark_posted(tx).unwrap();
        assert_eq!(e.status(), StatementStatus::Posted);
        assert_eq!(e.transaction_id(), Some(tx));

        assert!(e.mark_matched(TransactionId::new()).is_err());
    }

    #[test]
    fn entry_rejects_zero_amounts_and_blank_external_ids() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        assert!(
            StatementEntry::create(ImportBatchId::new(), " ", "m", dec!(1), usd(), date).is_err()
        );
        assert!(
            StatementEntry::create(ImportBatchId::new(), "x", "m", dec!(0), usd(), date).is_err()
        );
    }
}
