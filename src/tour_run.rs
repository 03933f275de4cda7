//! Tour run identity: `tourId|YYYY-MM-DD|HH:MM`.
//!
//! A run key has no stored row behind it. It correlates a resolved departure
//! slot with booking rows that reference the same `(tour, date, time)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar::{normalize_date_key, DateInput, DateKey, TimeOfDay};
use crate::error::{EngineError, Result};

const SEPARATOR: char = '|';

/// Decoded `(tour, date, time)` triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TourRunKey {
    // Field order drives the derived Ord: date, then time, then tour.
    date: DateKey,
    time: TimeOfDay,
    tour_id: String,
}

impl TourRunKey {
    pub fn new(tour_id: impl Into<String>, date: DateKey, time: TimeOfDay) -> Result<Self> {
        let tour_id = tour_id.into();
        validate_tour_id(&tour_id)?;
        Ok(Self {
            date,
            time,
            tour_id,
        })
    }

    pub fn tour_id(&self) -> &str {
        &self.tour_id
    }

    pub fn date(&self) -> DateKey {
        self.date
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }
}

fn validate_tour_id(tour_id: &str) -> Result<()> {
    if tour_id.is_empty() {
        return Err(EngineError::Validation("tour id must not be empty".to_string()));
    }
    if tour_id.contains(SEPARATOR) {
        return Err(EngineError::Validation(format!(
            "tour id '{tour_id}' must not contain '{SEPARATOR}'"
        )));
    }
    Ok(())
}

impl fmt::Display for TourRunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}{SEPARATOR}{}", self.tour_id, self.date, self.time)
    }
}

impl FromStr for TourRunKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

impl Serialize for TourRunKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TourRunKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        decode(&raw).map_err(serde::de::Error::custom)
    }
}

/// Encode a run key. `date` may be a preformatted key or any raw date value;
/// it is normalized through the calendar module.
pub fn encode<'a>(tour_id: &str, date: impl Into<DateInput<'a>>, time: &str) -> Result<String> {
    let date = normalize_date_key(date)?;
    let time = TimeOfDay::parse(time)?;
    Ok(TourRunKey::new(tour_id, date, time)?.to_string())
}

/// Decode a run key. Any malformed segment rejects the whole key.
pub fn decode(key: &str) -> Result<TourRunKey> {
    let invalid = || EngineError::InvalidTourRunKey(key.to_string());

    let mut parts = key.split(SEPARATOR);
    let (Some(tour_id), Some(date), Some(time), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    if tour_id.is_empty() {
        return Err(invalid());
    }

    let date = DateKey::parse(date).map_err(|_| invalid())?;
    let time = TimeOfDay::parse(time).map_err(|_| invalid())?;

    Ok(TourRunKey {
        date,
        time,
        tour_id: tour_id.to_string(),
    })
}

pub fn is_valid(key: &str) -> bool {
    decode(key).is_ok()
}
