//! Remaining-capacity evaluation for shared-seat and unit-based tours.
//!
//! Results are a snapshot at read time. The booking write path must
//! re-check capacity inside its own transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{EngineError, Result};

/// How many participants a run can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapacityModel {
    /// One pool of seats consumed by headcount.
    #[serde(rename_all = "camelCase")]
    Shared { total_seats: u32 },
    /// Whole units (boats, vehicles), each holding up to `occupancy_per_unit` people.
    #[serde(rename_all = "camelCase")]
    Unit {
        total_units: u32,
        occupancy_per_unit: u32,
        /// Headcount cap from an availability-window override. Only set
        /// through [`CapacityModel::with_override`], never read from storage.
        #[serde(skip)]
        people_cap: Option<u32>,
    },
}

impl CapacityModel {
    pub fn shared(total_seats: u32) -> Self {
        CapacityModel::Shared { total_seats }
    }

    pub fn unit(total_units: u32, occupancy_per_unit: u32) -> Self {
        CapacityModel::Unit {
            total_units,
            occupancy_per_unit,
            people_cap: None,
        }
    }

    /// Structural guard: confirm a raw JSON object matches its declared
    /// `type` before any arithmetic runs.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| EngineError::invalid_model("capacity", "<root>", "must be an object"))?;
        let declared = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::invalid_model("capacity", "type", "must be a string"))?;

        let required: &[&str] = match declared {
            "shared" => &["totalSeats"],
            "unit" => &["totalUnits", "occupancyPerUnit"],
            other => {
                return Err(EngineError::invalid_model(
                    other,
                    "type",
                    "is not a known capacity model",
                ))
            }
        };
        for field in required {
            match obj.get(*field) {
                Some(v) if v.as_u64().is_some_and(|n| n <= u64::from(u32::MAX)) => {}
                Some(_) => {
                    return Err(EngineError::invalid_model(
                        declared,
                        *field,
                        "must be a non-negative integer",
                    ))
                }
                None => return Err(EngineError::invalid_model(declared, *field, "is missing")),
            }
        }

        let model: CapacityModel = serde_json::from_value(value.clone())
            .map_err(|e| EngineError::invalid_model(declared, "<root>", e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            CapacityModel::Shared { .. } => Ok(()),
            CapacityModel::Unit {
                occupancy_per_unit, ..
            } => {
                if *occupancy_per_unit == 0 {
                    Err(EngineError::configuration(
                        "unit capacity requires occupancyPerUnit of at least 1",
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Apply a window's `maxParticipantsOverride`: shared pools take it as
    /// their seat count, unit pools cap headcount at it.
    pub fn with_override(self, max_participants: Option<u32>) -> Self {
        match (self, max_participants) {
            (_, None) => self,
            (CapacityModel::Shared { .. }, Some(seats)) => CapacityModel::Shared { total_seats: seats },
            (
                CapacityModel::Unit {
                    total_units,
                    occupancy_per_unit,
                    ..
                },
                Some(cap),
            ) => CapacityModel::Unit {
                total_units,
                occupancy_per_unit,
                people_cap: Some(cap),
            },
        }
    }

    /// Total people the run can hold.
    pub fn people_capacity(&self) -> i64 {
        match self {
            CapacityModel::Shared { total_seats } => i64::from(*total_seats),
            CapacityModel::Unit {
                total_units,
                occupancy_per_unit,
                people_cap,
            } => {
                let physical = i64::from(*total_units) * i64::from(*occupancy_per_unit);
                match people_cap {
                    Some(cap) => physical.min(i64::from(*cap)),
                    None => physical,
                }
            }
        }
    }

    /// Remaining headcount given `booked_count` confirmed participants.
    ///
    /// Not clamped: a negative result means the run is overbooked.
    pub fn remaining(&self, booked_count: u32) -> i64 {
        let remaining = self.people_capacity() - i64::from(booked_count);
        if remaining < 0 {
            warn!(
                capacity = self.people_capacity(),
                booked_count, "run is overbooked"
            );
        }
        remaining
    }

    /// Units still free for unit-based selling. A partly filled unit counts
    /// as consumed, so callers track `units_consumed` themselves.
    pub fn units_remaining(&self, units_consumed: u32) -> Option<i64> {
        match self {
            CapacityModel::Shared { .. } => None,
            CapacityModel::Unit { total_units, .. } => {
                Some(i64::from(*total_units) - i64::from(units_consumed))
            }
        }
    }

    pub fn is_overbooked(&self, booked_count: u32) -> bool {
        i64::from(booked_count) > self.people_capacity()
    }
}

/// Remaining headcount for `model`.
pub fn remaining(model: &CapacityModel, booked_count: u32) -> i64 {
    model.remaining(booked_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shared_remaining() {
        let model = CapacityModel::shared(20);
        assert_eq!(remaining(&model, 0), 20);
        assert_eq!(remaining(&model, 13), 7);
        assert_eq!(remaining(&model, 20), 0);
    }

    #[test]
    fn test_shared_overbooked_not_clamped() {
        let model = CapacityModel::shared(20);
        assert_eq!(remaining(&model, 22), -2);
        assert!(model.is_overbooked(22));
        assert!(!model.is_overbooked(20));
    }

    #[test]
    fn test_unit_remaining_people() {
        // 3 boats of 6
        let model = CapacityModel::unit(3, 6);
        assert_eq!(model.people_capacity(), 18);
        assert_eq!(remaining(&model, 10), 8);
        assert_eq!(remaining(&model, 19), -1);
    }

    #[test]
    fn test_units_remaining() {
        let model = CapacityModel::unit(4, 2);
        assert_eq!(model.units_remaining(3), Some(1));
        assert_eq!(model.units_remaining(5), Some(-1));
        assert_eq!(CapacityModel::shared(10).units_remaining(1), None);
    }

    #[test]
    fn test_with_override() {
        let shared = CapacityModel::shared(20).with_override(Some(8));
        assert_eq!(shared.remaining(2), 6);

        let unit = CapacityModel::unit(3, 6).with_override(Some(12));
        assert_eq!(unit.people_capacity(), 12);
        // A cap above the physical capacity changes nothing
        let unit = CapacityModel::unit(3, 6).with_override(Some(40));
        assert_eq!(unit.people_capacity(), 18);

        assert_eq!(
            CapacityModel::shared(20).with_override(None),
            CapacityModel::shared(20)
        );
    }

    // ==================== guard tests ====================

    #[test]
    fn test_from_value_shared() {
        let model = CapacityModel::from_value(&json!({"type": "shared", "totalSeats": 14})).unwrap();
        assert_eq!(model, CapacityModel::shared(14));
    }

    #[test]
    fn test_from_value_unit() {
        let model = CapacityModel::from_value(&json!({
            "type": "unit", "totalUnits": 2, "occupancyPerUnit": 8
        }))
        .unwrap();
        assert_eq!(model, CapacityModel::unit(2, 8));
    }

    #[test]
    fn test_from_value_ignores_stored_people_cap() {
        let model = CapacityModel::from_value(&json!({
            "type": "unit", "totalUnits": 2, "occupancyPerUnit": 6, "peopleCap": 3
        }))
        .unwrap();
        assert_eq!(model, CapacityModel::unit(2, 6));
        assert_eq!(model.people_capacity(), 12);

        // The cap stays runtime-only
        let value = serde_json::to_value(model.with_override(Some(5))).unwrap();
        assert!(value.get("peopleCap").is_none());
    }

    #[test]
    fn test_from_value_names_offending_field() {
        let err = CapacityModel::from_value(&json!({"type": "unit", "totalUnits": 2})).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidModel {
                declared_type: "unit".to_string(),
                field: "occupancyPerUnit".to_string(),
                reason: "is missing".to_string(),
            }
        );

        let err = CapacityModel::from_value(&json!({"type": "shared", "totalSeats": -1})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidModel { ref field, .. } if field == "totalSeats"));

        let err = CapacityModel::from_value(&json!({"type": "rooms", "beds": 3})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidModel { ref field, .. } if field == "type"));

        assert!(CapacityModel::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_from_value_zero_occupancy_is_configuration_error() {
        let err = CapacityModel::from_value(&json!({
            "type": "unit", "totalUnits": 2, "occupancyPerUnit": 0
        }))
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));
    }
}
