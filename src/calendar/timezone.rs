//! Organization-timezone date and time extraction.
//!
//! Wall-clock values come from the IANA database (`chrono-tz`), never from
//! naive UTC offset math.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use super::{DateKey, TimeOfDay};
use crate::error::{EngineError, Result};

/// Look up an IANA zone identifier.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Look up an IANA zone, falling back to `fallback` for unknown identifiers.
/// Organization timezones are user input, so this never fails.
pub fn resolve_timezone(name: &str, fallback: Tz) -> Tz {
    match parse_timezone(name) {
        Some(tz) => tz,
        None => {
            warn!(timezone = name, fallback = %fallback, "unknown timezone, using fallback");
            fallback
        }
    }
}

/// The organization's current calendar date.
pub fn today_in(tz: &Tz, now: DateTime<Utc>) -> DateKey {
    date_key_in(now, tz)
}

/// The calendar date an instant falls on in `tz`.
pub fn date_key_in(ts: DateTime<Utc>, tz: &Tz) -> DateKey {
    DateKey::from(ts.with_timezone(tz).date_naive())
}

/// The wall-clock time an instant shows in `tz`, truncated to minutes.
pub fn wall_clock_time(ts: DateTime<Utc>, tz: &Tz) -> TimeOfDay {
    TimeOfDay::from_naive(ts.with_timezone(tz).time())
}

/// The instant a departure at local `time` on `date` leaves, in `tz`.
///
/// Times repeated by a DST fall-back resolve to the earlier instant; times
/// skipped by a spring-forward do not exist and are rejected.
pub fn run_start_utc(date: DateKey, time: TimeOfDay, tz: &Tz) -> Result<DateTime<Utc>> {
    let local = date.date().and_time(time.as_naive());
    tz.from_local_datetime(&local)
        .earliest()
        .map(|start| start.with_timezone(&Utc))
        .ok_or_else(|| {
            EngineError::Validation(format!("{date} {time} does not exist in {tz}"))
        })
}
