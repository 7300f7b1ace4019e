//! Money handling.
//!
//! Prices are kept as [`Decimal`] in the currency's standard unit (rupees,
//! not paise). Payment providers want integer minor units, which is what
//! [`to_minor_units`] produces.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors from money conversions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// Amount is zero or negative.
    #[error("amount must be greater than zero")]
    NotPositive,
    /// Amount has more precision than the currency's minor unit.
    #[error("amount {0} has more than two decimal places")]
    TooPrecise(Decimal),
    /// Amount does not fit in an `i64` of minor units.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// ISO 4217 currency codes accepted for payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Number of minor units in one major unit.
    #[must_use]
    pub const fn minor_unit_factor(self) -> i64 {
        100
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// Convert a positive amount to integer minor units (e.g. 499.50 INR -> 49950).
///
/// # Errors
///
/// Returns `PriceError` if the amount is not positive, has sub-minor-unit
/// precision or overflows `i64`.
pub fn to_minor_units(amount: Decimal, currency: CurrencyCode) -> Result<i64, PriceError> {
    if amount <= Decimal::ZERO {
        return Err(PriceError::NotPositive);
    }

    let minor = amount
        .checked_mul(Decimal::from(currency.minor_unit_factor()))
        .ok_or(PriceError::OutOfRange(amount))?;

    if minor.fract() != Decimal::ZERO {
        return Err(PriceError::TooPrecise(amount));
    }

    minor.to_i64().ok_or(PriceError::OutOfRange(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_whole_rupees() {
        assert_eq!(to_minor_units(dec("250"), CurrencyCode::INR), Ok(25_000));
    }

    #[test]
    fn test_fractional_amount() {
        assert_eq!(to_minor_units(dec("499.50"), CurrencyCode::INR), Ok(49_950));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(
            to_minor_units(Decimal::ZERO, CurrencyCode::INR),
            Err(PriceError::NotPositive)
        );
        assert_eq!(
            to_minor_units(dec("-5"), CurrencyCode::INR),
            Err(PriceError::NotPositive)
        );
    }

    #[test]
    fn test_rejects_sub_paise() {
        assert!(matches!(
            to_minor_units(dec("10.005"), CurrencyCode::INR),
            Err(PriceError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("inr".parse::<CurrencyCode>(), Ok(CurrencyCode::INR));
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
