//! Application service layer: the use cases collaborators call, each executed
//! inside exactly one unit-of-work scope, plus the composition root.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use finledger_accounting::{
    Account, AccountCreated, AccountDeactivated, AccountRenamed, CurrencyCode, ImportBatch,
    ImportSource, LedgerEvent, Money, NewAccount, Posting, StatementEntry, StatementImported,
    Transaction, TransactionDraft, TransactionRecorded,
};
use finledger_core::{
    AccountId, Entity, LedgerError, LedgerResult, StatementEntryId, TransactionId,
};
use finledger_events::EventBus;

use crate::clock::{Clock, SystemClock};
use crate::handlers::{AuditLogHandler, MetricsHandler, subscribe_all};
use crate::memory::MemoryStore;
use crate::ports::{
    AccountRepository, ImportBatchRepository, StatementEntryRepository, TransactionRepository,
};
use crate::query::BalanceQueryService;
use crate::uow::UnitOfWork;

/// One leg of a transaction to record, account referenced by code.
#[derive(Debug, Clone)]
pub struct PostingInput {
    pub account_code: String,
    pub amount: Money,
    pub note: Option<String>,
}

impl PostingInput {
    pub fn new(account_code: impl Into<String>, amount: Money) -> Self {
        Self {
            account_code: account_code.into(),
            amount,
            note: None,
        }
    }
}

/// Input for [`LedgerService::record_transaction`].
#[derive(Debug, Clone)]
pub struct NewTransactionInput {
    pub date: NaiveDate,
    pub description: String,
    pub postings: Vec<PostingInput>,
    pub tags: Vec<String>,
    pub reference: Option<String>,
}

impl NewTransactionInput {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        postings: Vec<PostingInput>,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            postings,
            tags: Vec::new(),
            reference: None,
        }
    }
}

/// One parsed statement line handed over by an importer.
#[derive(Debug, Clone)]
pub struct StatementEntryInput {
    pub external_id: String,
    pub memo: String,
    pub payee: Option<String>,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub occurred_on: NaiveDate,
}

/// A whole statement file to import.
///
/// `content` is the raw bytes of the source file; its SHA-256 is the
/// duplicate-import guard.
#[derive(Debug, Clone)]
pub struct StatementImport {
    pub source: ImportSource,
    pub filename: Option<String>,
    pub content: Vec<u8>,
    pub entries: Vec<StatementEntryInput>,
}

/// The ledger's write-side facade.
///
/// Every operation opens one unit-of-work scope, stages writes through the
/// bound repositories, queues domain events, and commits atomically. Any
/// failure before commit leaves zero observable state and dispatches zero
/// events.
pub struct LedgerService {
    store: Arc<MemoryStore>,
    bus: Arc<EventBus<LedgerEvent>>,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    pub fn new(
        store: Arc<MemoryStore>,
        bus: Arc<EventBus<LedgerEvent>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, bus, clock }
    }

    /// Read-only balance projections over the same store.
    pub fn queries(&self) -> BalanceQueryService<'_> {
        BalanceQueryService::new(&self.store)
    }

    /// Create an account in the chart.
    ///
    /// Fails with `DuplicateAccount` on code collision and `InvalidHierarchy`
    /// when the declared parent is missing or its ancestor chain loops.
    pub fn create_account(&self, spec: NewAccount) -> LedgerResult<Account> {
        let now = self.clock.now();
        let mut uow = UnitOfWork::begin(&self.store, &self.bus)?;

        if uow.accounts().find_by_code(&spec.code)?.is_some() {
            return Err(LedgerError::DuplicateAccount(spec.code));
        }
        if let Some(parent) = spec.parent {
            ensure_valid_parent(&mut uow, parent)?;
        }

        let account = Account::create(spec, now)?;
        uow.accounts().save(account.clone())?;
        uow.raise(LedgerEvent::AccountCreated(AccountCreated {
            account_id: *Entity::id(&account),
            code: account.code().to_string(),
            account_type: account.account_type(),
            currency: account.currency(),
            occurred_at: now,
        }));
        uow.commit()?;

        tracing::info!(code = account.code(), "account created");
        Ok(account)
    }

    /// Change an account's display name.
    pub fn rename_account(&self, id: AccountId, new_name: &str) -> LedgerResult<Account> {
        let now = self.clock.now();
        let mut uow = UnitOfWork::begin(&self.store, &self.bus)?;

        let mut account = uow
            .accounts()
            .find_by_id(id)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;
        let old_name = account.name().to_string();
        account.rename(new_name, now)?;
        uow.accounts().save(account.clone())?;
        uow.raise(LedgerEvent::AccountRenamed(AccountRenamed {
            account_id: id,
            code: account.code().to_string(),
            old_name,
            new_name: account.name().to_string(),
            occurred_at: now,
        }));
        uow.commit()?;
        Ok(account)
    }

    /// Close an account for new postings. Idempotent: returns `false` (and
    /// emits nothing) when the account was already inactive.
    pub fn deactivate_account(&self, id: AccountId) -> LedgerResult<bool> {
        let now = self.clock.now();
        let mut uow = UnitOfWork::begin(&self.store, &self.bus)?;

        let mut account = uow
            .accounts()
            .find_by_id(id)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;
        let transitioned = account.deactivate(now);
        if transitioned {
            uow.accounts().save(account.clone())?;
            uow.raise(LedgerEvent::AccountDeactivated(AccountDeactivated {
                account_id: id,
                code: account.code().to_string(),
                occurred_at: now,
            }));
        }
        uow.commit()?;
        Ok(transitioned)
    }

    /// Record a balanced transaction against active accounts.
    pub fn record_transaction(&self, input: NewTransactionInput) -> LedgerResult<Transaction> {
        let mut uow = UnitOfWork::begin(&self.store, &self.bus)?;
        let transaction = self.stage_transaction(&mut uow, input, None)?;
        uow.commit()?;

        tracing::info!(
            description = transaction.description(),
            postings = transaction.postings().len(),
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Import a statement file: persist the batch and its entries.
    ///
    /// The checksum lookup and the batch write share one scope, so a
    /// concurrent duplicate import cannot slip between check and write. A
    /// repeated import of the same content fails with `DuplicateImport` and
    /// leaves no partial batch behind.
    pub fn import_statement(&self, import: StatementImport) -> LedgerResult<ImportBatch> {
        let now = self.clock.now();
        let checksum = content_checksum(&import.content);
        let mut uow = UnitOfWork::begin(&self.store, &self.bus)?;

        if uow.import_batches().find_by_checksum(&checksum)?.is_some() {
            return Err(LedgerError::DuplicateImport(checksum));
        }

        let mut batch = ImportBatch::create(import.source, checksum, import.filename, now)?;
        let batch_id = *Entity::id(&batch);
        let entry_count = import.entries.len();

        for input in import.entries {
            let mut entry = StatementEntry::create(
                batch_id,
                input.external_id,
                input.memo,
                input.amount,
                input.currency,
                input.occurred_on,
            )?;
            if let Some(payee) = input.payee {
                entry = entry.with_payee(payee);
            }
            uow.statement_entries().save(entry)?;
        }

        batch.complete(entry_count, now)?;
        uow.import_batches().save(batch.clone())?;
        uow.raise(LedgerEvent::StatementImported(StatementImported {
            batch_id,
            source: batch.source(),
            entry_count,
            occurred_at: now,
        }));
        uow.commit()?;

        tracing::info!(%batch_id, entries = entry_count, "statement imported");
        Ok(batch)
    }

    /// Turn one imported statement entry into a ledger transaction, marking
    /// the entry posted in the same scope.
    pub fn post_statement_entry(
        &self,
        entry_id: StatementEntryId,
        input: NewTransactionInput,
    ) -> LedgerResult<Transaction> {
        let mut uow = UnitOfWork::begin(&self.store, &self.bus)?;

        let mut entry = uow
            .statement_entries()
            .find_by_id(entry_id)?
            .ok_or_else(|| LedgerError::not_found(format!("statement entry {entry_id}")))?;

        let transaction = self.stage_transaction(&mut uow, input, Some(entry.batch_id()))?;
        entry.mark_posted(*Entity::id(&transaction))?;
        uow.statement_entries().save(entry)?;
        uow.commit()?;
        Ok(transaction)
    }

    /// Reconcile an imported statement entry against an existing transaction.
    pub fn match_statement_entry(
        &self,
        entry_id: StatementEntryId,
        transaction_id: TransactionId,
    ) -> LedgerResult<()> {
        let mut uow = UnitOfWork::begin(&self.store, &self.bus)?;

        let mut entry = uow
            .statement_entries()
            .find_by_id(entry_id)?
            .ok_or_else(|| LedgerError::not_found(format!("statement entry {entry_id}")))?;
        if uow.transactions().find_by_id(transaction_id)?.is_none() {
            return Err(LedgerError::not_found(format!(
                "transaction {transaction_id}"
            )));
        }
        entry.mark_matched(transaction_id)?;
        uow.statement_entries().save(entry)?;
        uow.commit()
    }

    /// Resolve, validate, and stage one transaction inside an open scope,
    /// queuing its `TransactionRecorded` event.
    fn stage_transaction(
        &self,
        uow: &mut UnitOfWork<'_>,
        input: NewTransactionInput,
        import_batch: Option<finledger_core::ImportBatchId>,
    ) -> LedgerResult<Transaction> {
        let now = self.clock.now();

        let mut postings = Vec::with_capacity(input.postings.len());
        for leg in &input.postings {
            let account = uow
                .accounts()
                .find_by_code(&leg.account_code)?
                .ok_or_else(|| LedgerError::account_not_found(&leg.account_code))?;
            if !account.is_active() {
                return Err(LedgerError::InactiveAccount(account.code().to_string()));
            }
            // Multi-currency sub-ledgers are deliberately not supported: a
            // posting must be denominated in its account's declared currency.
            if leg.amount.currency() != account.currency() {
                return Err(LedgerError::CurrencyMismatch {
                    left: leg.amount.currency().to_string(),
                    right: account.currency().to_string(),
                });
            }
            let posting = match &leg.note {
                Some(note) => Posting::with_note(*Entity::id(&account), leg.amount, note)?,
                None => Posting::new(*Entity::id(&account), leg.amount)?,
            };
            postings.push(posting);
        }

        let mut draft = TransactionDraft::new(input.date, input.description, postings);
        draft.tags = input.tags;
        draft.reference = input.reference;
        draft.import_batch = import_batch;

        let transaction = Transaction::create(draft, now)?;
        uow.transactions().save(transaction.clone())?;
        uow.raise(LedgerEvent::TransactionRecorded(TransactionRecorded {
            transaction_id: *Entity::id(&transaction),
            date: transaction.date(),
            description: transaction.description().to_string(),
            posting_count: transaction.postings().len(),
            affected_accounts: transaction.affected_accounts(),
            occurred_at: now,
        }));
        Ok(transaction)
    }
}

/// Everything a collaborator needs, wired together.
pub struct LedgerContext {
    pub store: Arc<MemoryStore>,
    pub bus: Arc<EventBus<LedgerEvent>>,
    pub metrics: Arc<MetricsHandler>,
    pub service: LedgerService,
}

/// Composition root: builds the store, the event bus with the stock audit and
/// metrics handlers, the system clock, and the service — passed explicitly,
/// no globals.
pub fn compose() -> LedgerContext {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let metrics = Arc::new(MetricsHandler::new());

    subscribe_all(&bus, Arc::new(AuditLogHandler::new()));
    subscribe_all(&bus, metrics.clone());

    let service = LedgerService::new(store.clone(), bus.clone(), Arc::new(SystemClock));
    LedgerContext {
        store,
        bus,
        metrics,
        service,
    }
}

/// Walk the ancestor chain of a proposed parent: it must exist and must not
/// already contain a loop.
fn ensure_valid_parent(uow: &mut UnitOfWork<'_>, parent: AccountId) -> LedgerResult<()> {
    let mut seen: Vec<AccountId> = Vec::new();
    let mut current = Some(parent);
    while let Some(id) = current {
        if seen.contains(&id) {
            return Err(LedgerError::invalid_hierarchy(format!(
                "ancestor chain of {parent} contains a cycle"
            )));
        }
        seen.push(id);
        let account = uow.accounts().find_by_id(id)?.ok_or_else(|| {
            LedgerError::invalid_hierarchy(format!("parent account {id} does not exist"))
        })?;
        current = account.parent();
    }
    Ok(())
}

fn content_checksum(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
