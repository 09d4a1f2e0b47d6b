//! Balance/aggregation queries: read-only projections over committed postings.

use chrono::NaiveDate;

use finledger_accounting::Money;
use finledger_core::{AccountId, Entity, LedgerError, LedgerResult};

use crate::memory::{LedgerState, MemoryStore};

/// Read-only balance projections over the committed store.
///
/// Balances are derived, never stored: an account's balance is the sum of the
/// postings against it (and, for parent accounts, against its descendants) up
/// to and including the as-of date. Historical postings of inactive accounts
/// are always included.
#[derive(Debug)]
pub struct BalanceQueryService<'a> {
    store: &'a MemoryStore,
}

impl<'a> BalanceQueryService<'a> {
    pub fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Balance of one account (including descendants) as of a date.
    ///
    /// `None` means "all history". Only postings in the account's declared
    /// currency contribute; a descendant ledger kept in another currency is
    /// reported under its own account, not converted.
    pub fn balance(&self, account_id: AccountId, as_of: Option<NaiveDate>) -> LedgerResult<Money> {
        let state = self.store.snapshot()?;
        balance_in(&state, account_id, as_of)
    }

    /// Balance lookup by account code.
    pub fn balance_by_code(&self, code: &str, as_of: Option<NaiveDate>) -> LedgerResult<Money> {
        let state = self.store.snapshot()?;
        let account = state
            .account_by_code(code)
            .ok_or_else(|| LedgerError::account_not_found(code))?;
        let id = *Entity::id(account);
        balance_in(&state, id, as_of)
    }

    /// Per-account balances for the whole chart, sorted by code.
    ///
    /// Rows hold **direct** postings only — a parent row does not roll up its
    /// children, otherwise the same posting would count once under the child
    /// and again under every ancestor and the report would stop summing to
    /// zero. Includes inactive accounts; display-side sign conventions
    /// (`AccountType::normal_sign`) are left to callers.
    pub fn trial_balance(&self, as_of: Option<NaiveDate>) -> LedgerResult<Vec<(String, Money)>> {
        let state = self.store.snapshot()?;
        let mut rows = Vec::new();
        for account in state.accounts() {
            let id = *Entity::id(account);
            let total = sum_postings(&state, &[id], account.currency(), as_of)?;
            rows.push((account.code().to_string(), total));
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(rows)
    }
}

fn balance_in(
    state: &LedgerState,
    account_id: AccountId,
    as_of: Option<NaiveDate>,
) -> LedgerResult<Money> {
    let account = state
        .account(account_id)
        .ok_or_else(|| LedgerError::account_not_found(account_id.to_string()))?;
    let scope = state.descendants(account_id);
    sum_postings(state, &scope, account.currency(), as_of)
}

fn sum_postings(
    state: &LedgerState,
    scope: &[AccountId],
    currency: finledger_accounting::CurrencyCode,
    as_of: Option<NaiveDate>,
) -> LedgerResult<Money> {
    let mut total = Money::zero(currency);
    for tx in state.transactions() {
        if as_of.is_some_and(|cutoff| tx.date() > cutoff) {
            continue;
        }
        for posting in tx.postings() {
            if scope.contains(&posting.account_id()) && posting.amount().currency() == currency {
                total = total.try_add(posting.amount())?;
            }
        }
    }
    Ok(total)
}
