//! Transaction entity and posting value object.
//!
//! A transaction is a set of postings that must balance: per currency, the
//! signed amounts sum to exactly zero. Construction is all-or-nothing — either
//! a fully valid, immutable transaction exists or none does.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finledger_core::{AccountId, Entity, ImportBatchId, LedgerError, LedgerResult, TransactionId};

use crate::money::Money;

/// A single signed monetary movement against one account.
///
/// Positive amount = debit, negative = credit. Zero amounts are meaningless in
/// a ledger and are rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    account_id: AccountId,
    amount: Money,
    note: Option<String>,
}

impl Posting {
    pub fn new(account_id: AccountId, amount: Money) -> LedgerResult<Posting> {
        if amount.is_zero() {
            return Err(LedgerError::invalid_input("posting amount cannot be zero"));
        }
        Ok(Posting {
            account_id,
            amount,
            note: None,
        })
    }

    pub fn with_note(
        account_id: AccountId,
        amount: Money,
        note: impl Into<String>,
    ) -> LedgerResult<Posting> {
        let mut posting = Posting::new(account_id, amount)?;
        let note = note.into();
        let trimmed = note.trim();
        posting.note = (!trimmed.is_empty()).then(|| trimmed.to_string());
        Ok(posting)
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn is_debit(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn is_credit(&self) -> bool {
        self.amount.is_negative()
    }
}

impl finledger_core::ValueObject for Posting {}

/// Input for the transaction factory.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Business date the transaction occurred.
    pub date: NaiveDate,
    pub description: String,
    pub postings: Vec<Posting>,
    pub tags: Vec<String>,
    /// External reference (e.g. bank FITID).
    pub reference: Option<String>,
    /// Set when the transaction came out of a statement import.
    pub import_batch: Option<ImportBatchId>,
}

impl TransactionDraft {
    pub fn new(date: NaiveDate, description: impl Into<String>, postings: Vec<Posting>) -> Self {
        Self {
            date,
            description: description.into(),
            postings,
            tags: Vec::new(),
            reference: None,
            import_batch: None,
        }
    }
}

/// A balanced, immutable double-entry transaction.
///
/// Postings keep their construction order and cannot change after the factory
/// succeeds. There is no mutation or deletion API: corrections are modeled as
/// new reversing transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    date: NaiveDate,
    description: String,
    postings: Vec<Posting>,
    tags: Vec<String>,
    reference: Option<String>,
    import_batch: Option<ImportBatchId>,
    created_at: DateTime<Utc>,
}

impl Transaction {
    /// Validating factory.
    ///
    /// Groups postings by currency and requires each group to sum to exactly
    /// zero (decimal comparison, no epsilon). Fails with
    /// [`LedgerError::InsufficientPostings`] below two postings and
    /// [`LedgerError::UnbalancedTransaction`] carrying the per-currency
    /// imbalance otherwise.
    pub fn create(draft: TransactionDraft, now: DateTime<Utc>) -> LedgerResult<Transaction> {
        let description = draft.description.trim().to_string();
        if description.is_empty() {
            return Err(LedgerError::invalid_input(
                "transaction description must not be empty",
            ));
        }

        if draft.postings.len() < 2 {
            return Err(LedgerError::InsufficientPostings(draft.postings.len()));
        }

        check_balance(&draft.postings)?;

        let tags = normalize_tags(draft.tags);

        Ok(Transaction {
            id: TransactionId::new(),
            date: draft.date,
            description,
            postings: draft.postings,
            tags,
            reference: draft.reference,
            import_batch: draft.import_batch,
            created_at: now,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn import_batch(&self) -> Option<ImportBatchId> {
        self.import_batch
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Accounts touched by this transaction, in posting order, deduplicated.
    pub fn affected_accounts(&self) -> Vec<AccountId> {
        let mut seen = Vec::new();
        for posting in &self.postings {
            if !seen.contains(&posting.account_id()) {
                seen.push(posting.account_id());
            }
        }
        seen
    }

    /// Signed total this transaction moves on one account.
    pub fn amount_for(&self, account_id: AccountId) -> Decimal {
        self.postings
            .iter()
            .filter(|p| p.account_id() == account_id)
            .map(|p| p.amount().amount())
            .sum()
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &TransactionId {
        &self.id
    }
}

fn check_balance(postings: &[Posting]) -> LedgerResult<()> {
    let mut sums: BTreeMap<String, Decimal> = BTreeMap::new();
    for posting in postings {
        let entry = sums
            .entry(posting.amount().currency().to_string())
            .or_insert(Decimal::ZERO);
        *entry += posting.amount().amount();
    }

    sums.retain(|_, sum| !sum.is_zero());
    if sums.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::UnbalancedTransaction(sums))
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::CurrencyCode;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::new("USD").unwrap())
    }

    fn brl(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::new("BRL").unwrap())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn posting(amount: Money) -> Posting {
        Posting::new(AccountId::new(), amount).unwrap()
    }

    #[test]
    fn balanced_transaction_is_created_with_postings_in_order() {
        let cash = AccountId::new();
        let salary = AccountId::new();
        let postings = vec![
            Posting::new(cash, usd(dec!(500.00))).unwrap(),
            Posting::new(salary, usd(dec!(-500.00))).unwrap(),
        ];

        let tx = Transaction::create(
            TransactionDraft::new(date(), "Pay", postings.clone()),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(tx.postings(), postings.as_slice());
        assert_eq!(tx.affected_accounts(), vec![cash, salary]);
        assert_eq!(tx.amount_for(cash), dec!(500.00));
    }

    #[test]
    fn fewer_than_two_postings_is_rejected() {
        let err = Transaction::create(
            TransactionDraft::new(date(), "Lonely", vec![posting(usd(dec!(10)))]),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientPostings(1));

        let err = Transaction::create(
            TransactionDraft::new(date(), "Empty", vec![]),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientPostings(0));
    }

    #[test]
    fn imbalance_reports_the_exact_per_currency_delta() {
        let postings = vec![posting(usd(dec!(500.00))), posting(usd(dec!(-400.00)))];
        let err =
            Transaction::create(TransactionDraft::new(date(), "Off", postings), Utc::now())
                .unwrap_err();

        match err {
            LedgerError::UnbalancedTransaction(imbalance) => {
                assert_eq!(imbalance.len(), 1);
                assert_eq!(imbalance["USD"], dec!(100.00));
            }
            other => panic!("expected unbalanced error, got {other:?}"),
        }
    }

    #[test]
    fn balance_is_checked_per_currency() {
        // Each currency group balances independently.
        let postings = vec![
            posting(usd(dec!(100))),
            posting(usd(dec!(-100))),
            posting(brl(dec!(30))),
            posting(brl(dec!(-30))),
        ];
        assert!(
            Transaction::create(TransactionDraft::new(date(), "Mixed", postings), Utc::now())
                .is_ok()
        );

        // One balanced group does not excuse another that is off.
        let postings = vec![
            posting(usd(dec!(100))),
            posting(usd(dec!(-100))),
            posting(brl(dec!(30))),
            posting(brl(dec!(-29.99))),
        ];
        let err =
            Transaction::create(TransactionDraft::new(date(), "Mixed", postings), Utc::now())
                .unwrap_err();
        match err {
            LedgerError::UnbalancedTransaction(imbalance) => {
                assert_eq!(imbalance["BRL"], dec!(0.01));
                assert!(!imbalance.contains_key("USD"));
            }
            other => panic!("expected unbalanced error, got {other:?}"),
        }
    }

    #[test]
    fn zero_postings_and_blank_descriptions_are_rejected() {
        assert!(Posting::new(AccountId::new(), usd(dec!(0))).is_err());

        let postings = vec![posting(usd(dec!(1))), posting(usd(dec!(-1)))];
        let err = Transaction::create(
            TransactionDraft::new(date(), "   ", postings),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let mut draft = TransactionDraft::new(
            date(),
            "Tagged",
            vec![posting(usd(dec!(1))), posting(usd(dec!(-1)))],
        );
        draft.tags = vec![" food ".into(), "food".into(), "".into(), "fixed".into()];
        let tx = Transaction::create(draft, Utc::now()).unwrap();
        assert_eq!(tx.tags(), ["food", "fixed"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Any set of debit/credit pairs sums to zero, so creation succeeds
        /// and the postings survive unchanged.
        #[test]
        fn balanced_posting_sets_always_create(
            cents in prop::collection::vec(1i64..1_000_000i64, 1..8)
        ) {
            let mut postings = Vec::new();
            for c in &cents {
                let amount = Decimal::new(*c, 2);
                postings.push(posting(usd(amount)));
                postings.push(posting(usd(-amount)));
            }

            let tx = Transaction::create(
                TransactionDraft::new(date(), "prop", postings.clone()),
                Utc::now(),
            ).unwrap();

            prop_assert_eq!(tx.postings(), postings.as_slice());
            let total: Decimal = tx.postings().iter().map(|p| p.amount().amount()).sum();
            prop_assert_eq!(total, Decimal::ZERO);
        }

        /// Skewing any balanced set by a nonzero delta is rejected, and the
        /// reported imbalance is exactly that delta.
        #[test]
        fn imbalances_are_rejected_with_the_exact_delta(
            cents in prop::collection::vec(1i64..1_000_000i64, 1..8),
            skew in prop_oneof![-1_000_000i64..0, 1i64..1_000_000],
        ) {
            let mut postings = Vec::new();
            for c in &cents {
                let amount = Decimal::new(*c, 2);
                postings.push(posting(usd(amount)));
                postings.push(posting(usd(-amount)));
            }
            let delta = Decimal::new(skew, 2);
            postings.push(posting(usd(delta)));

            let err = Transaction::create(
                TransactionDraft::new(date(), "prop", postings),
                Utc::now(),
            ).unwrap_err();

            match err {
                LedgerError::UnbalancedTransaction(imbalance) => {
                    prop_assert_eq!(imbalance["USD"], delta);
                }
                other => prop_assert!(false, "expected unbalanced error, got {other:?}"),
            }
        }
    }
}
