//! Engine configuration loaded from environment variables.
//!
//! All settings come from the environment (or a `.env` file via `dotenvy`).
//! Missing or unparsable values fall back to the defaults below.

use std::net::SocketAddr;

use chrono_tz::Tz;
use tracing::warn;

use crate::cache;
use crate::calendar::parse_timezone;

const DEFAULT_MAX_RANGE_DAYS: u32 = 366;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Socket address the JSON adapter binds to.
    pub listen_addr: SocketAddr,

    /// Zone used when an organization's configured timezone is unknown.
    pub default_timezone: Tz,

    /// Largest inclusive date range the resolver will expand.
    pub max_range_days: u32,

    /// Entry bound for each formatter memo cache.
    pub formatter_cache_capacity: u64,
}

impl EngineConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = parse_env("LISTEN_ADDR", defaults.listen_addr);

        let default_timezone = match std::env::var("DEFAULT_TIMEZONE") {
            Ok(name) => parse_timezone(&name).unwrap_or_else(|| {
                warn!(timezone = %name, "DEFAULT_TIMEZONE is not an IANA zone, using UTC");
                Tz::UTC
            }),
            Err(_) => defaults.default_timezone,
        };

        let max_range_days = parse_env("MAX_RANGE_DAYS", defaults.max_range_days);
        let formatter_cache_capacity =
            parse_env("FORMATTER_CACHE_CAPACITY", defaults.formatter_cache_capacity);

        Self {
            listen_addr,
            default_timezone,
            max_range_days,
            formatter_cache_capacity,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            default_timezone: Tz::UTC,
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
            formatter_cache_capacity: cache::DEFAULT_CAPACITY,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid configuration value, using default");
            default
        }),
        Err(_) => default,
    }
}
