//! Money values and currency-aware minor-unit arithmetic.
//!
//! Amounts are exact decimals in major units. Precision is a property of the
//! currency, never of the value.

pub mod currency;
pub mod format;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub use currency::{get_decimal_places, is_currency_code, CurrencyInfo, SymbolPosition};
pub use format::{format, parse, CurrencyDisplay, CurrencyFormat, FormatOptions};

/// Amount in major units plus its ISO-4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency::normalize_code(currency),
        }
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn decimal_places(&self) -> u32 {
        get_decimal_places(&self.currency)
    }

    pub fn to_minor_units(&self) -> Result<i64> {
        to_minor_units(self.amount, &self.currency)
    }

    /// Whether the amount fits the currency's minor unit exactly.
    pub fn has_valid_precision(&self) -> bool {
        has_valid_precision(self.amount, &self.currency)
    }
}

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias
/// when splitting totals for display.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use tourops_engine::money::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Convert a major-unit amount to integer minor units (cents, fils, yen).
///
/// Rounds half away from zero at the currency's own precision, so
/// `1.005 BHD` is `1005` while `1.005 USD` is `101`.
pub fn to_minor_units(amount: Decimal, currency: &str) -> Result<i64> {
    let places = get_decimal_places(currency);
    let multiplier = Decimal::from(10i64.pow(places));
    amount
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(multiplier)
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| {
            EngineError::Validation(format!("{amount} {currency} does not fit in minor units"))
        })
}

pub fn from_minor_units(minor: i64, currency: &str) -> Decimal {
    Decimal::new(minor, get_decimal_places(currency))
}

pub fn has_valid_precision(amount: Decimal, currency: &str) -> bool {
    amount.normalize().scale() <= get_decimal_places(currency)
}
