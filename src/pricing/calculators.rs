//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no storage access. Every entry point
//! validates the model before any arithmetic runs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::models::{
    default_tier, BasePlusPersonPricing, FlatRatePricing, PartyComposition, PerPersonPricing,
    PerUnitPricing, PricingModel, TieredGroupPricing,
};
use crate::error::{EngineError, Result};
use crate::money::{currency, get_decimal_places, round_money, Money};

/// One line of a computed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub label: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl PriceLine {
    fn new(label: impl Into<String>, quantity: u32, unit_price: Decimal) -> Result<Self> {
        let label = label.into();
        let total = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| {
                EngineError::Validation(format!("{quantity} x {unit_price} for '{label}' overflows"))
            })?;
        Ok(Self {
            label,
            quantity,
            unit_price,
            total,
        })
    }
}

/// Result of pricing a party against one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub pricing_type: String,
    pub party_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<u32>,
    pub lines: Vec<PriceLine>,
    pub total: Money,
}

/// Total price for `party`.
pub fn compute_total(model: &PricingModel, party: &PartyComposition) -> Result<Money> {
    compute_breakdown(model, party).map(|breakdown| breakdown.total)
}

/// Itemized price for `party`.
///
/// Admission failures (party too large or small for the model) are
/// validation errors; a tiered-group model with no tier for the party size
/// is a configuration error.
pub fn compute_breakdown(model: &PricingModel, party: &PartyComposition) -> Result<PriceBreakdown> {
    model.validate()?;
    let party_size = party.size()?;
    if party_size == 0 {
        return Err(EngineError::Validation(
            "party must include at least one participant".to_string(),
        ));
    }

    let currency = get_currency(model)?;
    let (lines, units) = match model {
        PricingModel::PerPerson(p) => (per_person_lines(p, party)?, None),
        PricingModel::PerUnit(p) => {
            let (lines, units) = per_unit_lines(p, party, party_size)?;
            (lines, Some(units))
        }
        PricingModel::FlatRate(p) => (flat_rate_lines(p, party_size)?, None),
        PricingModel::TieredGroup(p) => (tiered_group_lines(p, party_size)?, None),
        PricingModel::BasePlusPerson(p) => (base_plus_person_lines(p, party_size)?, None),
    };

    let sum = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.total))
        .ok_or_else(|| EngineError::Validation("price total overflows".to_string()))?;
    let total = Money::new(round_money(sum, get_decimal_places(&currency)), &currency);

    debug!(
        pricing_type = model.type_name(),
        party_size,
        total = %total.amount,
        currency = %total.currency,
        "computed price"
    );

    Ok(PriceBreakdown {
        pricing_type: model.type_name().to_string(),
        party_size,
        units,
        lines,
        total,
    })
}

/// Headline price shown without a party: the default tier for per-person
/// models, otherwise the unit, flat, first-tier or base price.
pub fn get_base_price(model: &PricingModel) -> Result<Decimal> {
    match model {
        PricingModel::PerPerson(p) => default_tier(&p.tiers)
            .map(|t| t.price.amount)
            .ok_or_else(|| EngineError::configuration("per_person model has no tiers")),
        PricingModel::PerUnit(p) => Ok(p.price_per_unit.amount),
        PricingModel::FlatRate(p) => Ok(p.price.amount),
        PricingModel::TieredGroup(p) => p
            .tiers
            .first()
            .map(|t| t.price.amount)
            .ok_or_else(|| EngineError::configuration("tiered_group model has no tiers")),
        PricingModel::BasePlusPerson(p) => Ok(p.base_price.amount),
    }
}

/// Currency of the model's headline price.
pub fn get_currency(model: &PricingModel) -> Result<String> {
    model
        .prices()
        .first()
        .map(|m| currency::normalize_code(&m.currency))
        .ok_or_else(|| {
            EngineError::configuration(format!("{} model has no prices", model.type_name()))
        })
}

fn per_person_lines(p: &PerPersonPricing, party: &PartyComposition) -> Result<Vec<PriceLine>> {
    let mut counts = vec![0u32; p.tiers.len()];

    for (key, count) in &party.tiers {
        let index = p
            .tiers
            .iter()
            .position(|t| t.id == *key)
            .or_else(|| p.tiers.iter().position(|t| t.name.eq_ignore_ascii_case(key)))
            .ok_or_else(|| EngineError::Validation(format!("unknown pricing tier '{key}'")))?;
        counts[index] = add_count(counts[index], *count)?;
    }

    if party.unassigned > 0 {
        let default = default_tier(&p.tiers)
            .ok_or_else(|| EngineError::configuration("per_person model has no tiers"))?;
        if let Some(index) = p.tiers.iter().position(|t| t.id == default.id) {
            counts[index] = add_count(counts[index], party.unassigned)?;
        }
    }

    p.tiers
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(tier, count)| PriceLine::new(tier.name.clone(), count, tier.price.amount))
        .collect()
}

fn add_count(current: u32, count: u32) -> Result<u32> {
    current
        .checked_add(count)
        .ok_or_else(|| EngineError::Validation("party size overflows".to_string()))
}

fn per_unit_lines(
    p: &PerUnitPricing,
    party: &PartyComposition,
    size: u32,
) -> Result<(Vec<PriceLine>, u32)> {
    let units = party.units.unwrap_or_else(|| size.div_ceil(p.max_occupancy));
    if units == 0 {
        return Err(EngineError::Validation(format!(
            "at least one {} is required",
            p.unit_name
        )));
    }

    let capacity = u64::from(units) * u64::from(p.max_occupancy);
    if u64::from(size) > capacity {
        return Err(EngineError::Validation(format!(
            "party of {size} exceeds {units} x {} people per {}",
            p.max_occupancy, p.unit_name
        )));
    }
    if let Some(min) = p.min_occupancy {
        let required = u64::from(units) * u64::from(min);
        if u64::from(size) < required {
            return Err(EngineError::Validation(format!(
                "party of {size} is below the minimum of {min} per {} for {units} {}",
                p.unit_name,
                unit_label(p, units)
            )));
        }
    }

    let mut lines = vec![PriceLine::new(unit_label(p, units), units, p.price_per_unit.amount)?];

    if let (Some(base), Some(fee)) = (p.base_occupancy, &p.extra_person_fee) {
        let included = u64::from(units) * u64::from(base);
        let extra = u64::from(size).saturating_sub(included);
        if extra > 0 {
            // extra <= size, so it fits
            let extra = u32::try_from(extra).unwrap_or(u32::MAX);
            lines.push(PriceLine::new("Extra person", extra, fee.amount)?);
        }
    }

    Ok((lines, units))
}

fn unit_label(p: &PerUnitPricing, units: u32) -> String {
    if units == 1 {
        p.unit_name.clone()
    } else {
        p.unit_name_plural.clone()
    }
}

fn flat_rate_lines(p: &FlatRatePricing, size: u32) -> Result<Vec<PriceLine>> {
    let min = p.min_participants.unwrap_or(1);
    if size < min || size > p.max_participants {
        return Err(EngineError::Validation(format!(
            "flat rate admits {min} to {} participants, party has {size}",
            p.max_participants
        )));
    }
    Ok(vec![PriceLine::new("Flat rate", 1, p.price.amount)?])
}

fn tiered_group_lines(p: &TieredGroupPricing, size: u32) -> Result<Vec<PriceLine>> {
    let tier = p
        .tiers
        .iter()
        .find(|t| t.contains(size))
        .ok_or_else(|| EngineError::configuration(format!("no group tier matches party size {size}")))?;
    Ok(vec![PriceLine::new(
        format!("Group of {}-{}", tier.min_size, tier.max_size),
        1,
        tier.price.amount,
    )?])
}

fn base_plus_person_lines(p: &BasePlusPersonPricing, size: u32) -> Result<Vec<PriceLine>> {
    if size > p.max_participants {
        return Err(EngineError::Validation(format!(
            "party of {size} exceeds the maximum of {} participants",
            p.max_participants
        )));
    }
    let mut lines = vec![PriceLine::new(
        format!("Base price (includes {})", p.included_participants),
        1,
        p.base_price.amount,
    )?];
    let extra = size.saturating_sub(p.included_participants);
    if extra > 0 {
        lines.push(PriceLine::new("Additional participant", extra, p.per_person_price.amount)?);
    }
    Ok(lines)
}
