//! Chart-of-accounts entity and its account-type value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use finledger_core::{AccountId, Entity, LedgerError, LedgerResult};

use crate::money::CurrencyCode;

/// The five fundamental double-entry account types.
///
/// Accounting equation: Assets = Liabilities + Equity, Profit = Income - Expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountType {
    /// Whether a debit (positive posting) increases the balance.
    ///
    /// Assets and expenses have debit nature; liabilities, equity and income
    /// have credit nature.
    pub fn is_debit_positive(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }

    /// Display-only sign convention: +1 for debit-positive types, -1 otherwise.
    ///
    /// Never used to alter a stored amount.
    pub fn normal_sign(&self) -> i8 {
        if self.is_debit_positive() { 1 } else { -1 }
    }

    /// Balance-sheet types represent a position at a point in time.
    pub fn is_balance_sheet(&self) -> bool {
        matches!(
            self,
            AccountType::Asset | AccountType::Liability | AccountType::Equity
        )
    }

    /// Income-statement types represent flow over a period.
    pub fn is_income_statement(&self) -> bool {
        !self.is_balance_sheet()
    }
}

impl core::fmt::Display for AccountType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            AccountType::Asset => "ASSET",
            AccountType::Liability => "LIABILITY",
            AccountType::Equity => "EQUITY",
            AccountType::Income => "INCOME",
            AccountType::Expense => "EXPENSE",
        };
        f.write_str(name)
    }
}

/// Lifecycle state: one allowed transition, Active -> Inactive.
///
/// There is deliberately no reactivation; a closed account stays closed and
/// keeps its history queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    Active,
    Inactive,
}

impl AccountState {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountState::Active)
    }
}

/// Input for the account factory.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Hierarchical human-readable code, e.g. "Assets:Checking".
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub currency: CurrencyCode,
    pub parent: Option<AccountId>,
}

/// A ledger account.
///
/// Constructed only through [`Account::create`]; append-only afterwards apart
/// from `rename` and `deactivate`. Uniqueness of the code and validity of the
/// parent reference are enforced where the repository is available (service
/// layer + repository save).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    code: String,
    name: String,
    account_type: AccountType,
    currency: CurrencyCode,
    state: AccountState,
    parent: Option<AccountId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Validating factory.
    pub fn create(spec: NewAccount, now: DateTime<Utc>) -> LedgerResult<Account> {
        let code = validate_code(&spec.code)?;
        let name = validate_name(&spec.name)?;

        Ok(Account {
            id: AccountId::new(),
            code,
            name,
            account_type: spec.account_type,
            currency: spec.currency,
            state: AccountState::Active,
            parent: spec.parent,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn state(&self) -> AccountState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn parent(&self) -> Option<AccountId> {
        self.parent
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Change the display name. The account is untouched if the new name is
    /// invalid.
    pub fn rename(&mut self, new_name: &str, now: DateTime<Utc>) -> LedgerResult<()> {
        self.name = validate_name(new_name)?;
        self.updated_at = now;
        Ok(())
    }

    /// Close the account for new postings. Idempotent: returns `true` only on
    /// the Active -> Inactive transition, `false` if already inactive.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state = AccountState::Inactive;
        self.updated_at = now;
        true
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &AccountId {
        &self.id
    }
}

fn validate_code(code: &str) -> LedgerResult<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(LedgerError::invalid_input("account code must not be empty"));
    }
    if code.split(':').any(|segment| segment.trim().is_empty()) {
        return Err(LedgerError::invalid_input(format!(
            "account code '{code}' has an empty hierarchy segment"
        )));
    }
    Ok(code.to_string())
}

fn validate_name(name: &str) -> LedgerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::invalid_input("account name must not be empty"));
    }
    Ok(name.to_string())
}
