//! In-memory transactional store.
//!
//! The committed ledger lives in one [`LedgerState`] behind a mutex. A unit of
//! work locks the store for its whole scope (single active transaction),
//! mutates a working copy, and swaps it back wholesale on commit — so readers
//! of the committed state can never observe a half-applied scope.

use std::collections::HashMap;

use finledger_accounting::{Account, AccountType, ImportBatch, StatementEntry, Transaction};
use finledger_core::{
    AccountId, Entity, ImportBatchId, LedgerError, LedgerResult, StatementEntryId, TransactionId,
};

use crate::ports::{
    AccountRepository, DateRange, ImportBatchRepository, StatementEntryRepository,
    TransactionRepository,
};

/// The whole committed ledger, snapshot-cloneable.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    accounts: HashMap<AccountId, Account>,
    accounts_by_code: HashMap<String, AccountId>,
    transactions: HashMap<TransactionId, Transaction>,
    /// Insertion order, for deterministic queries and audit-stable listings.
    transaction_order: Vec<TransactionId>,
    batches: HashMap<ImportBatchId, ImportBatch>,
    batches_by_checksum: HashMap<String, ImportBatchId>,
    entries: HashMap<StatementEntryId, StatementEntry>,
}

impl LedgerState {
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn account_by_code(&self, code: &str) -> Option<&Account> {
        self.accounts_by_code
            .get(code)
            .and_then(|id| self.accounts.get(id))
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Committed transactions in insertion order.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transaction_order
            .iter()
            .filter_map(|id| self.transactions.get(id))
    }

    /// Ids of the account itself plus every transitive child.
    pub fn descendants(&self, root: AccountId) -> Vec<AccountId> {
        let mut result = vec![root];
        let mut frontier = vec![root];
        while let Some(current) = frontier.pop() {
            for account in self.accounts.values() {
                let id = *Entity::id(account);
                if account.parent() == Some(current) && !result.contains(&id) {
                    result.push(id);
                    frontier.push(id);
                }
            }
        }
        result
    }
}

/// Shared store holding the committed state.
///
/// Locking is delegated to [`crate::uow::UnitOfWork`] for writes; reads go
/// through [`MemoryStore::snapshot`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) state: std::sync::Mutex<LedgerState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the committed state for read-only projections.
    pub fn snapshot(&self) -> LedgerResult<LedgerState> {
        let state = self
            .state
            .lock()
            .map_err(|_| LedgerError::persistence("ledger store lock poisoned"))?;
        Ok(state.clone())
    }
}

/// Account adapter bound to one unit-of-work working copy.
pub struct MemAccounts<'a> {
    pub(crate) state: &'a mut LedgerState,
}

impl AccountRepository for MemAccounts<'_> {
    fn save(&mut self, account: Account) -> LedgerResult<()> {
        let id = *Entity::id(&account);
        if let Some(existing) = self.state.accounts_by_code.get(account.code()) {
            if *existing != id {
                return Err(LedgerError::DuplicateAccount(account.code().to_string()));
            }
        }
        self.state
            .accounts_by_code
            .insert(account.code().to_string(), id);
        self.state.accounts.insert(id, account);
        Ok(())
    }

    fn find_by_id(&self, id: AccountId) -> LedgerResult<Option<Account>> {
        Ok(self.state.accounts.get(&id).cloned())
    }

    fn find_by_code(&self, code: &str) -> LedgerResult<Option<Account>> {
        Ok(self.state.account_by_code(code).cloned())
    }

    fn find_by_type(&self, account_type: AccountType) -> LedgerResult<Vec<Account>> {
        let mut matches: Vec<Account> = self
            .state
            .accounts
            .values()
            .filter(|a| a.account_type() == account_type)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(matches)
    }

    fn find_children(&self, parent: AccountId) -> LedgerResult<Vec<Account>> {
        let mut children: Vec<Account> = self
            .state
            .accounts
            .values()
            .filter(|a| a.parent() == Some(parent))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(children)
    }

    fn list_all(&self, active_only: bool) -> LedgerResult<Vec<Account>> {
        let mut all: Vec<Account> = self
            .state
            .accounts
            .values()
            .filter(|a| !active_only || a.is_active())
            .cloned()
            .collect();
        all.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(all)
    }
}

/// Transaction adapter bound to one unit-of-work working copy.
pub struct MemTransactions<'a> {
    pub(crate) state: &'a mut LedgerState,
}

impl TransactionRepository for MemTransactions<'_> {
    fn save(&mut self, transaction: Transaction) -> LedgerResult<()> {
        let id = *Entity::id(&transaction);
        if self.state.transactions.contains_key(&id) {
            // The ledger is append-only; corrections are reversing transactions.
            return Err(LedgerError::invalid_input(format!(
                "transaction {id} already recorded; the ledger is append-only"
            )));
        }
        self.state.transaction_order.push(id);
        self.state.transactions.insert(id, transaction);
        Ok(())
    }

    fn find_by_id(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        Ok(self.state.transactions.get(&id).cloned())
    }

    fn find_by_account(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .state
            .transactions()
            .filter(|tx| tx.postings().iter().any(|p| p.account_id() == account_id))
            .filter(|tx| range.is_none_or(|r| r.contains(tx.date())))
            .cloned()
            .collect())
    }

    fn find_by_date_range(&self, range: DateRange) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .state
            .transactions()
            .filter(|tx| range.contains(tx.date()))
            .cloned()
            .collect())
    }

    fn find_by_import_batch(&self, batch_id: ImportBatchId) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .state
            .transactions()
            .filter(|tx| tx.import_batch() == Some(batch_id))
            .cloned()
            .collect())
    }
}

/// Import-batch adapter bound to one unit-of-work working copy.
pub struct MemImportBatches<'a> {
    pub(crate) state: &'a mut LedgerState,
}

impl ImportBatchRepository for MemImportBatches<'_> {
    fn save(&mut self, batch: ImportBatch) -> LedgerResult<()> {
        let id = *Entity::id(&batch);
        self.state
            .batches_by_checksum
            .insert(batch.checksum().to_string(), id);
        self.state.batches.insert(id, batch);
        Ok(())
    }

    fn find_by_id(&self, id: ImportBatchId) -> LedgerResult<Option<ImportBatch>> {
        Ok(self.state.batches.get(&id).cloned())
    }

    fn find_by_checksum(&self, checksum: &str) -> LedgerResult<Option<ImportBatch>> {
        Ok(self
            .state
            .batches_by_checksum
            .get(checksum)
            .and_then(|id| self.state.batches.get(id))
            .cloned())
    }
}

/// Statement-entry adapter bound to one unit-of-work working copy.
pub struct MemStatementEntries<'a> {
    pub(crate) state: &'a mut LedgerState,
}

impl StatementEntryRepository for MemStatementEntries<'_> {
    fn save(&mut self, entry: StatementEntry) -> LedgerResult<()> {
        self.state.entries.insert(*Entity::id(&entry), entry);
        Ok(())
    }

    fn find_by_id(&self, id: StatementEntryId) -> LedgerResult<Option<StatementEntry>> {
        Ok(self.state.entries.get(&id).cloned())
    }

    fn find_by_batch(&self, batch_id: ImportBatchId) -> LedgerResult<Vec<StatementEntry>> {
        let mut entries: Vec<StatementEntry> = self
            .state
            .entries
            .values()
            .filter(|e| e.batch_id() == batch_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.external_id().cmp(b.external_id()));
        Ok(entries)
    }
}
