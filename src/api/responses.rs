//! Response DTOs for the JSON adapter.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::availability::ResolvedRun;
use crate::cache::CacheStats;
use crate::money::Money;
use crate::pricing::{PriceBreakdown, PriceLine};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl From<Money> for MoneyResponse {
    fn from(money: Money) -> Self {
        Self {
            amount: money.amount,
            currency: money.currency,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cache: CacheStats,
}

/// Response for availability resolution
#[derive(Debug, Serialize)]
pub struct ResolveAvailabilityResponse {
    pub tour_id: String,
    pub from: String,
    pub to: String,
    pub count: usize,
    pub runs: Vec<ResolvedRun>,
}

/// Response for a decoded tour run key
#[derive(Debug, Serialize)]
pub struct TourRunKeyResponse {
    pub key: String,
    pub tour_id: String,
    pub date: String,
    pub time: String,
}

/// Response for remaining capacity
#[derive(Debug, Serialize)]
pub struct RemainingCapacityResponse {
    pub remaining: i64,
    pub overbooked: bool,
}

#[derive(Debug, Serialize)]
pub struct QuoteLineResponse {
    pub label: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

impl From<PriceLine> for QuoteLineResponse {
    fn from(line: PriceLine) -> Self {
        Self {
            label: line.label,
            quantity: line.quantity,
            unit_price: line.unit_price,
            total: line.total,
        }
    }
}

/// Response for a priced party
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub pricing_type: String,
    pub party_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<u32>,
    pub lines: Vec<QuoteLineResponse>,
    pub total: MoneyResponse,
    pub total_minor_units: i64,
}

impl QuoteResponse {
    pub fn new(breakdown: PriceBreakdown, total_minor_units: i64) -> Self {
        Self {
            pricing_type: breakdown.pricing_type,
            party_size: breakdown.party_size,
            units: breakdown.units,
            lines: breakdown.lines.into_iter().map(Into::into).collect(),
            total: breakdown.total.into(),
            total_minor_units,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BasePriceResponse {
    pub base_price: MoneyResponse,
}

#[derive(Debug, Serialize)]
pub struct MinorUnitsResponse {
    pub minor_units: i64,
    pub decimals: u32,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct FormatMoneyResponse {
    pub formatted: String,
    pub currency: String,
}

/// Generic error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
