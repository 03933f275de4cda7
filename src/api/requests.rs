//! Request DTOs for the JSON adapter.
//!
//! Stored models arrive as raw JSON and go through the structural guards
//! inside the handlers, so a malformed model is a 422 rather than an
//! extractor rejection.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::availability::TourSchedule;
use crate::money::CurrencyDisplay;
use crate::pricing::PartyComposition;

/// Request to expand a tour schedule into runs
#[derive(Debug, Deserialize)]
pub struct ResolveAvailabilityRequest {
    pub schedule: TourSchedule,
    pub from: String,
    pub to: String,
}

/// Request to evaluate remaining capacity
#[derive(Debug, Deserialize)]
pub struct RemainingCapacityRequest {
    pub capacity_model: Value,
    pub booked_count: u32,
    #[serde(default)]
    pub capacity_override: Option<u32>,
}

/// Request to price a party
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub pricing_model: Value,
    pub party: PartyComposition,
}

/// Request for a model's headline price
#[derive(Debug, Deserialize)]
pub struct BasePriceRequest {
    pub pricing_model: Value,
}

/// Request to convert an amount to minor units
#[derive(Debug, Deserialize)]
pub struct MinorUnitsRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

/// Request to format an amount for display
#[derive(Debug, Deserialize)]
pub struct FormatMoneyRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub display: CurrencyDisplay,
    #[serde(default)]
    pub trim_zero_fraction: bool,
}
