//! Transactional infrastructure for the ledger: repository ports, the
//! in-memory store, the unit of work, the balance query service, the
//! application service layer, and the stock event handlers.
//!
//! The composition root ([`compose`]) wires everything explicitly — no
//! ambient globals, no container.

pub mod clock;
pub mod handlers;
pub mod memory;
pub mod ports;
pub mod query;
pub mod service;
pub mod uow;


pub use clock::{Clock, FixedClock, SystemClock};
pub use handlers::{AuditLogHandler, MetricsHandler};
pub use memory::MemoryStore;
pub use ports::{
    AccountRepository, DateRange, ImportBatchRepository, StatementEntryRepository,
    TransactionRepository,
};
pub use query::BalanceQueryService;
pub use service::{
    LedgerContext, LedgerService, NewTransactionInput, PostingInput, StatementEntryInput,
    StatementImport, compose,
};
pub use uow::UnitOfWork;
