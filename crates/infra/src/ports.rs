//! Repository ports.
//!
//! Pure contracts consumed above the transaction boundary. They carry no
//! transactional semantics of their own — atomicity belongs to the unit of
//! work that binds their adapters to one scope.

use chrono::NaiveDate;

use finledger_accounting::{Account, AccountType, ImportBatch, StatementEntry, Transaction};
use finledger_core::{
    AccountId, ImportBatchId, LedgerResult, StatementEntryId, TransactionId,
};

/// Inclusive business-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Chart-of-accounts persistence contract.
pub trait AccountRepository {
    /// Insert or update. Fails with `DuplicateAccount` when the code already
    /// belongs to a different account.
    fn save(&mut self, account: Account) -> LedgerResult<()>;

    fn find_by_id(&self, id: AccountId) -> LedgerResult<Option<Account>>;

    fn find_by_code(&self, code: &str) -> LedgerResult<Option<Account>>;

    fn find_by_type(&self, account_type: AccountType) -> LedgerResult<Vec<Account>>;

    fn find_children(&self, parent: AccountId) -> LedgerResult<Vec<Account>>;

    fn list_all(&self, active_only: bool) -> LedgerResult<Vec<Account>>;
}

/// Transaction persistence contract. Append-only: saving an existing id is an
/// error, matching the no-edit/no-delete policy of the ledger.
pub trait TransactionRepository {
    fn save(&mut self, transaction: Transaction) -> LedgerResult<()>;

    fn find_by_id(&self, id: TransactionId) -> LedgerResult<Option<Transaction>>;

    /// Transactions touching one account, optionally restricted to a range,
    /// in insertion order.
    fn find_by_account(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> LedgerResult<Vec<Transaction>>;

    fn find_by_date_range(&self, range: DateRange) -> LedgerResult<Vec<Transaction>>;

    fn find_by_import_batch(&self, batch_id: ImportBatchId) -> LedgerResult<Vec<Transaction>>;
}

/// Import-batch persistence contract.
pub trait ImportBatchRepository {
    fn save(&mut self, batch: ImportBatch) -> LedgerResult<()>;

    fn find_by_id(&self, id: ImportBatchId) -> LedgerResult<Option<ImportBatch>>;

    /// Lookup by content checksum — the duplicate-import guard. Must be read
    /// in the same unit-of-work scope as the write it protects.
    fn find_by_checksum(&self, checksum: &str) -> LedgerResult<Option<ImportBatch>>;
}

/// Statement-entry persistence contract.
pub trait StatementEntryRepository {
    fn save(&mut self, entry: StatementEntry) -> LedgerResult<()>;

    fn find_by_id(&self, id: StatementEntryId) -> LedgerResult<Option<StatementEntry>>;

    fn find_by_batch(&self, batch_id: ImportBatchId) -> LedgerResult<Vec<StatementEntry>>;
}
