//! In-memory caching using moka
//!
//! Memoizes per-currency formatting rules and timezone lookups. Both are
//! pure functions of their key, so entries never expire; the capacity bound
//! only protects against callers feeding arbitrary codes.

use std::sync::Arc;

use chrono_tz::Tz;
use moka::sync::Cache;
use serde::Serialize;
use tracing::debug;

use crate::calendar::parse_timezone;
use crate::money::{currency, CurrencyFormat};

pub const DEFAULT_CAPACITY: u64 = 512;

/// Formatter and timezone memo, shared by clones.
#[derive(Clone)]
pub struct FormatterCache {
    /// Currency code -> resolved formatting rules
    formats: Cache<String, Arc<CurrencyFormat>>,
    /// IANA name -> zone (None for unknown names)
    timezones: Cache<String, Option<Tz>>,
}

impl FormatterCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            formats: Cache::builder().max_capacity(capacity).build(),
            timezones: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Formatting rules for `code`, built once per normalized code.
    pub fn currency_format(&self, code: &str) -> Arc<CurrencyFormat> {
        let code = currency::normalize_code(code);
        self.formats.get_with(code.clone(), || {
            debug!(currency = %code, "building currency formatter");
            Arc::new(CurrencyFormat::for_currency(&code))
        })
    }

    /// Zone for an IANA identifier, `None` when the name is unknown.
    pub fn timezone(&self, name: &str) -> Option<Tz> {
        let name = name.trim().to_string();
        self.timezones
            .get_with(name.clone(), || parse_timezone(&name))
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            formats_size: self.formats.entry_count(),
            timezones_size: self.timezones.entry_count(),
        }
    }
}

impl Default for FormatterCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub formats_size: u64,
    pub timezones_size: u64,
}
