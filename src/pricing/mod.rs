//! Pricing engine module.
//!
//! Evaluates the five booking-option pricing models against a party and
//! freezes the result into snapshots at booking time.

pub mod calculators;
pub mod guard;
pub mod models;
pub mod snapshot;

// Re-export commonly used items
pub use calculators::{
    compute_breakdown, compute_total, get_base_price, get_currency, PriceBreakdown, PriceLine,
};
pub use models::{
    default_tier, select_tier_for_age, BasePlusPersonPricing, FlatRatePricing, GroupTier,
    PartyComposition, PerPersonPricing, PerUnitPricing, PricingModel, PricingTier,
    TieredGroupPricing,
};
pub use snapshot::{BookingOption, BookingOptionSnapshot, ExperienceMode};
