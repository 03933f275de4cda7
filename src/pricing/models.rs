//! Pricing model variants and party composition.
//!
//! Models deserialize from the stored JSON shape, discriminated by `type`.
//! Raw JSON should go through [`PricingModel::from_value`](crate::pricing::guard)
//! so shape errors name the offending field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::money::Money;

/// One per-person price band (Adult, Child, Senior...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub age_min: Option<u32>,
    #[serde(default)]
    pub age_max: Option<u32>,
}

impl PricingTier {
    /// Whether the tier's age band contains `age`. Tiers with no band match nothing.
    pub fn matches_age(&self, age: u32) -> bool {
        if self.age_min.is_none() && self.age_max.is_none() {
            return false;
        }
        self.age_min.map_or(true, |min| age >= min) && self.age_max.map_or(true, |max| age <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerPersonPricing {
    pub tiers: Vec<PricingTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerUnitPricing {
    pub unit_name: String,
    pub unit_name_plural: String,
    pub price_per_unit: Money,
    #[serde(default)]
    pub min_occupancy: Option<u32>,
    #[serde(default)]
    pub base_occupancy: Option<u32>,
    #[serde(default)]
    pub extra_person_fee: Option<Money>,
    pub max_occupancy: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRatePricing {
    pub price: Money,
    #[serde(default)]
    pub min_participants: Option<u32>,
    pub max_participants: u32,
}

/// Inclusive party-size band with a fixed price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTier {
    pub min_size: u32,
    pub max_size: u32,
    pub price: Money,
}

impl GroupTier {
    pub fn contains(&self, size: u32) -> bool {
        self.min_size <= size && size <= self.max_size
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieredGroupPricing {
    pub tiers: Vec<GroupTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePlusPersonPricing {
    pub base_price: Money,
    pub included_participants: u32,
    pub per_person_price: Money,
    pub max_participants: u32,
}

/// The five pricing strategies. Exactly one is active per model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PricingModel {
    PerPerson(PerPersonPricing),
    PerUnit(PerUnitPricing),
    FlatRate(FlatRatePricing),
    TieredGroup(TieredGroupPricing),
    BasePlusPerson(BasePlusPersonPricing),
}

impl PricingModel {
    /// The `type` discriminator as stored.
    pub fn type_name(&self) -> &'static str {
        match self {
            PricingModel::PerPerson(_) => "per_person",
            PricingModel::PerUnit(_) => "per_unit",
            PricingModel::FlatRate(_) => "flat_rate",
            PricingModel::TieredGroup(_) => "tiered_group",
            PricingModel::BasePlusPerson(_) => "base_plus_person",
        }
    }

    /// Every price the model carries, in declaration order.
    pub fn prices(&self) -> Vec<&Money> {
        match self {
            PricingModel::PerPerson(p) => p.tiers.iter().map(|t| &t.price).collect(),
            PricingModel::PerUnit(p) => std::iter::once(&p.price_per_unit)
                .chain(p.extra_person_fee.as_ref())
                .collect(),
            PricingModel::FlatRate(p) => vec![&p.price],
            PricingModel::TieredGroup(p) => p.tiers.iter().map(|t| &t.price).collect(),
            PricingModel::BasePlusPerson(p) => vec![&p.base_price, &p.per_person_price],
        }
    }
}

/// Who is booking. Per-person models price `tiers` by tier id (or name)
/// and `unassigned` participants at the default tier; every other model only
/// looks at the headcount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyComposition {
    #[serde(default)]
    pub tiers: BTreeMap<String, u32>,
    #[serde(default)]
    pub unassigned: u32,
    /// Units requested for per-unit pricing; derived from headcount when absent.
    #[serde(default)]
    pub units: Option<u32>,
}

impl PartyComposition {
    pub fn of_size(size: u32) -> Self {
        Self {
            unassigned: size,
            ..Self::default()
        }
    }

    pub fn from_tiers<K: Into<String>>(counts: impl IntoIterator<Item = (K, u32)>) -> Self {
        let mut tiers = BTreeMap::new();
        for (key, count) in counts {
            let entry = tiers.entry(key.into()).or_insert(0u32);
            *entry = entry.saturating_add(count);
        }
        Self {
            tiers,
            ..Self::default()
        }
    }

    /// Assign each participant age to a tier (see [`select_tier_for_age`]).
    /// Ages matching no band, with no default tier to fall back on, stay unassigned.
    pub fn from_ages(tiers: &[PricingTier], ages: &[u32]) -> Self {
        let mut party = Self::default();
        for age in ages {
            match select_tier_for_age(tiers, *age) {
                Some(tier) => *party.tiers.entry(tier.id.clone()).or_insert(0) += 1,
                None => party.unassigned += 1,
            }
        }
        party
    }

    pub fn with_units(mut self, units: u32) -> Self {
        self.units = Some(units);
        self
    }

    /// Total headcount. Counts come from callers, so the sum is checked.
    pub fn size(&self) -> Result<u32> {
        self.tiers
            .values()
            .try_fold(self.unassigned, |acc, count| acc.checked_add(*count))
            .ok_or_else(|| EngineError::Validation("party size overflows".to_string()))
    }
}

/// The tier flagged `isDefault`, else the first tier in list order.
pub fn default_tier(tiers: &[PricingTier]) -> Option<&PricingTier> {
    tiers.iter().find(|t| t.is_default).or_else(|| tiers.first())
}

/// First tier (in list order) whose age band contains `age`, else the default tier.
pub fn select_tier_for_age(tiers: &[PricingTier], age: u32) -> Option<&PricingTier> {
    tiers
        .iter()
        .find(|t| t.matches_age(age))
        .or_else(|| default_tier(tiers))
}
