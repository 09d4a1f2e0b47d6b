//! Monetary value objects: `CurrencyCode` and `Money`.
//!
//! `Money` pairs an exact decimal amount with its currency, so amounts in
//! different currencies can never be mixed by accident. Arithmetic is defined
//! only between same-currency operands and fails loudly otherwise.

use core::cmp::Ordering;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finledger_core::{LedgerError, LedgerResult, ValueObject};

/// ISO 4217 currency code: exactly three ASCII uppercase letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    pub fn new(code: &str) -> LedgerResult<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(LedgerError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }

    pub fn as_str(&self) -> &str {
        // Invariant: constructed from ASCII uppercase only.
        core::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for CurrencyCode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ValueObject for CurrencyCode {}

/// Immutable monetary value (exact decimal amount + currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
}

impl Money {
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Build from an amount and a raw currency string.
    pub fn parse(amount: Decimal, currency: &str) -> LedgerResult<Self> {
        Ok(Self::new(amount, CurrencyCode::new(currency)?))
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Add two same-currency values.
    pub fn try_add(&self, other: &Money) -> LedgerResult<Money> {
        self.check_same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, self.currency))
    }

    /// Subtract two same-currency values.
    pub fn try_sub(&self, other: &Money) -> LedgerResult<Money> {
        self.check_same_currency(other)?;
        Ok(Money::new(self.amount - other.amount, self.currency))
    }

    pub fn neg(&self) -> Money {
        Money::new(-self.amount, self.currency)
    }

    pub fn abs(&self) -> Money {
        Money::new(self.amount.abs(), self.currency)
    }

    fn check_same_currency(&self, other: &Money) -> LedgerResult<()> {
        if self.currency != other.currency {
            return Err(LedgerError::CurrencyMismatch {
                left: self.currency.to_string(),
                right: other.currency.to_string(),
            });
        }
        Ok(())
    }
}

/// Ordering is defined only between same-currency values.
impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}

impl ValueObject for Money {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::parse(amount, "USD").unwrap()
    }

    #[test]
    fn currency_codes_must_be_three_uppercase_letters() {
        assert!(CurrencyCode::new("USD").is_ok());
        assert!(CurrencyCode::new("BRL").is_ok());

        for bad in ["usd", "US", "USDX", "U$D", "", "12A"] {
            let err = CurrencyCode::new(bad).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidCurrency(_)), "{bad}");
        }
    }

    #[test]
    fn addition_is_exact_and_value_based() {
        let sum = usd(dec!(100.00)).try_add(&usd(dec!(-100.00))).unwrap();
        assert_eq!(sum, usd(dec!(0)));
        assert!(sum.is_zero());
    }

    #[test]
    fn equality_is_value_based_and_idempotent() {
        let a = usd(dec!(10.50));
        let b = usd(dec!(10.50));
        assert_eq!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn mixed_currency_arithmetic_is_rejected() {
        let brl = Money::parse(dec!(10), "BRL").unwrap();
        let err = usd(dec!(10)).try_add(&brl).unwrap_err();
        assert_eq!(
            err,
            LedgerError::CurrencyMismatch {
                left: "USD".into(),
                right: "BRL".into(),
            }
        );
    }

    #[test]
    fn ordering_only_exists_within_one_currency() {
        let brl = Money::parse(dec!(10), "BRL").unwrap();
        assert!(usd(dec!(5)) < usd(dec!(7)));
        assert_eq!(usd(dec!(5)).partial_cmp(&brl), None);
    }

    #[test]
    fn neg_and_abs_preserve_currency() {
        let m = usd(dec!(-12.34));
        assert_eq!(m.neg(), usd(dec!(12.34)));
        assert_eq!(m.abs(), usd(dec!(12.34)));
        assert_eq!(m.abs().currency().as_str(), "USD");
    }
}
