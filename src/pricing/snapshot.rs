//! Frozen booking-option pricing, captured at booking time.
//!
//! A snapshot keeps the model and the computed breakdown together so later
//! edits to the live option never change what a customer was quoted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calculators::{compute_breakdown, PriceBreakdown};
use super::models::{PartyComposition, PricingModel};
use crate::error::Result;
use crate::money::Money;

/// Whether the party shares the run with other bookings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceMode {
    #[default]
    Shared,
    Private,
}

/// A sellable configuration of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOption {
    pub id: String,
    pub name: String,
    pub pricing_model: PricingModel,
    #[serde(default)]
    pub experience_mode: ExperienceMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOptionSnapshot {
    snapshot_id: Uuid,
    option_id: String,
    option_name: String,
    pricing_model: PricingModel,
    experience_mode: ExperienceMode,
    price_breakdown: PriceBreakdown,
    captured_at: DateTime<Utc>,
}

impl BookingOptionSnapshot {
    /// Price `party` against `option` and freeze the result.
    pub fn capture(
        option: &BookingOption,
        party: &PartyComposition,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let price_breakdown = compute_breakdown(&option.pricing_model, party)?;
        Ok(Self {
            snapshot_id: Uuid::new_v4(),
            option_id: option.id.clone(),
            option_name: option.name.clone(),
            pricing_model: option.pricing_model.clone(),
            experience_mode: option.experience_mode,
            price_breakdown,
            captured_at: now,
        })
    }

    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    pub fn option_id(&self) -> &str {
        &self.option_id
    }

    pub fn option_name(&self) -> &str {
        &self.option_name
    }

    pub fn pricing_model(&self) -> &PricingModel {
        &self.pricing_model
    }

    pub fn experience_mode(&self) -> ExperienceMode {
        self.experience_mode
    }

    pub fn price_breakdown(&self) -> &PriceBreakdown {
        &self.price_breakdown
    }

    pub fn total(&self) -> &Money {
        &self.price_breakdown.total
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
