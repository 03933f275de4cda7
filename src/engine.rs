//! Engine facade owning configuration and the formatter cache.
//!
//! The free functions in each module stay usable on their own; the engine
//! adds the configured range limit, organization-timezone fallback and
//! memoized formatters on top of them.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use crate::availability::{self, ResolvedRun, TourSchedule};
use crate::cache::FormatterCache;
use crate::calendar::{today_in, DateKey};
use crate::capacity::CapacityModel;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::money::{FormatOptions, Money};
use crate::pricing::{
    self, BookingOption, BookingOptionSnapshot, PartyComposition, PriceBreakdown, PricingModel,
};

/// Pricing and availability engine. Cloning shares the cache.
#[derive(Clone)]
pub struct TourEngine {
    config: EngineConfig,
    cache: FormatterCache,
}

impl TourEngine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = FormatterCache::new(config.formatter_cache_capacity);
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: EngineConfig, cache: FormatterCache) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &FormatterCache {
        &self.cache
    }

    /// Organization zone, or the configured default when `name` is unknown.
    pub fn timezone(&self, name: &str) -> Tz {
        self.cache.timezone(name).unwrap_or_else(|| {
            warn!(timezone = name, fallback = %self.config.default_timezone, "unknown timezone, using fallback");
            self.config.default_timezone
        })
    }

    /// The organization's current date.
    pub fn today(&self, timezone: &str, now: DateTime<Utc>) -> DateKey {
        today_in(&self.timezone(timezone), now)
    }

    /// Resolve one tour's runs, enforcing the configured range limit.
    pub fn resolve_runs(&self, schedule: &TourSchedule, from: DateKey, to: DateKey) -> Result<Vec<ResolvedRun>> {
        availability::validate_range(from, to, Some(self.config.max_range_days))?;
        availability::resolve_runs(schedule, from, to)
    }

    pub fn resolve_many(&self, schedules: &[TourSchedule], from: DateKey, to: DateKey) -> Result<Vec<ResolvedRun>> {
        availability::validate_range(from, to, Some(self.config.max_range_days))?;
        availability::resolve_many(schedules, from, to)
    }

    /// Runs in `[from, to]` that have not yet departed in the organization's zone.
    pub fn upcoming_runs(
        &self,
        schedule: &TourSchedule,
        from: DateKey,
        to: DateKey,
        timezone: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ResolvedRun>> {
        let runs = self.resolve_runs(schedule, from, to)?;
        Ok(availability::drop_departed(runs, &self.timezone(timezone), now))
    }

    /// Remaining capacity for a raw stored capacity model.
    pub fn remaining_capacity(
        &self,
        model: &Value,
        booked_count: u32,
        capacity_override: Option<u32>,
    ) -> Result<i64> {
        let model = CapacityModel::from_value(model)?.with_override(capacity_override);
        Ok(model.remaining(booked_count))
    }

    /// Price a party against a raw stored pricing model.
    pub fn quote(&self, model: &Value, party: &PartyComposition) -> Result<PriceBreakdown> {
        let model = PricingModel::from_value(model)?;
        pricing::compute_breakdown(&model, party)
    }

    /// Headline price of a raw stored pricing model.
    pub fn base_price(&self, model: &Value) -> Result<Money> {
        let model = PricingModel::from_value(model)?;
        let amount = pricing::get_base_price(&model)?;
        Ok(Money::new(amount, &pricing::get_currency(&model)?))
    }

    pub fn capture_snapshot(
        &self,
        option: &BookingOption,
        party: &PartyComposition,
        now: DateTime<Utc>,
    ) -> Result<BookingOptionSnapshot> {
        BookingOptionSnapshot::capture(option, party, now)
    }

    pub fn format_money(&self, amount: Decimal, currency: &str, options: FormatOptions) -> Result<String> {
        self.cache.currency_format(currency).format(amount, options)
    }

    pub fn parse_money(&self, text: &str, currency: &str) -> Result<Decimal> {
        self.cache.currency_format(currency).parse(text)
    }
}

impl Default for TourEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
