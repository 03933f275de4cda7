//! Structural and logical validation of pricing models.
//!
//! [`PricingModel::from_value`] confirms a raw JSON object matches its
//! declared `type` before it is deserialized; [`PricingModel::validate`]
//! then rejects combinations that are well-typed but unusable.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::models::{PricingModel, PricingTier};
use crate::error::{EngineError, Result};
use crate::money::{currency, is_currency_code, Money};

/// Field checks against one JSON object of a declared model type.
struct Shape<'a> {
    declared: &'a str,
    obj: &'a Map<String, Value>,
    prefix: String,
}

impl<'a> Shape<'a> {
    fn new(declared: &'a str, value: &'a Value, prefix: String) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            let field = if prefix.is_empty() { "<root>".to_string() } else { prefix.clone() };
            EngineError::invalid_model(declared, field, "must be an object")
        })?;
        Ok(Self {
            declared,
            obj,
            prefix,
        })
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    fn error(&self, field: &str, reason: &str) -> EngineError {
        EngineError::invalid_model(self.declared, self.path(field), reason)
    }

    /// Present and not `null`.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.obj.get(field).filter(|v| !v.is_null())
    }

    fn string(&self, field: &str) -> Result<()> {
        match self.get(field) {
            Some(Value::String(_)) => Ok(()),
            Some(_) => Err(self.error(field, "must be a string")),
            None => Err(self.error(field, "is missing")),
        }
    }

    fn uint(&self, field: &str) -> Result<()> {
        match self.get(field) {
            Some(v) if v.as_u64().is_some_and(|n| n <= u64::from(u32::MAX)) => Ok(()),
            Some(_) => Err(self.error(field, "must be a non-negative integer")),
            None => Err(self.error(field, "is missing")),
        }
    }

    fn optional_uint(&self, field: &str) -> Result<()> {
        match self.get(field) {
            Some(_) => self.uint(field),
            None => Ok(()),
        }
    }

    fn optional_bool(&self, field: &str) -> Result<()> {
        match self.get(field) {
            Some(Value::Bool(_)) | None => Ok(()),
            Some(_) => Err(self.error(field, "must be a boolean")),
        }
    }

    fn money(&self, field: &str) -> Result<()> {
        let value = self.get(field).ok_or_else(|| self.error(field, "is missing"))?;
        let money = Shape::new(self.declared, value, self.path(field))?;
        match money.get("amount") {
            Some(Value::Number(_)) => {}
            Some(Value::String(s)) if s.trim().parse::<Decimal>().is_ok() => {}
            Some(_) => return Err(money.error("amount", "must be a decimal number")),
            None => return Err(money.error("amount", "is missing")),
        }
        money.string("currency")?;
        match money.get("currency").and_then(Value::as_str) {
            Some(code) if is_currency_code(code.trim()) => Ok(()),
            _ => Err(money.error("currency", "must be a three-letter ISO-4217 code")),
        }
    }

    fn optional_money(&self, field: &str) -> Result<()> {
        match self.get(field) {
            Some(_) => self.money(field),
            None => Ok(()),
        }
    }

    fn array(&self, field: &str) -> Result<&'a Vec<Value>> {
        match self.get(field) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(self.error(field, "must be an array")),
            None => Err(self.error(field, "is missing")),
        }
    }
}

fn check_shape(declared: &str, value: &Value) -> Result<()> {
    let root = Shape::new(declared, value, String::new())?;
    match declared {
        "per_person" => {
            for (i, item) in root.array("tiers")?.iter().enumerate() {
                let tier = Shape::new(declared, item, format!("tiers[{i}]"))?;
                tier.string("id")?;
                tier.string("name")?;
                tier.money("price")?;
                tier.optional_bool("isDefault")?;
                tier.optional_uint("ageMin")?;
                tier.optional_uint("ageMax")?;
                if let Some(order) = tier.get("sortOrder") {
                    if order.as_i64().is_none() {
                        return Err(tier.error("sortOrder", "must be an integer"));
                    }
                }
            }
        }
        "per_unit" => {
            root.string("unitName")?;
            root.string("unitNamePlural")?;
            root.money("pricePerUnit")?;
            root.optional_uint("minOccupancy")?;
            root.optional_uint("baseOccupancy")?;
            root.optional_money("extraPersonFee")?;
            root.uint("maxOccupancy")?;
        }
        "flat_rate" => {
            root.money("price")?;
            root.optional_uint("minParticipants")?;
            root.uint("maxParticipants")?;
        }
        "tiered_group" => {
            for (i, item) in root.array("tiers")?.iter().enumerate() {
                let tier = Shape::new(declared, item, format!("tiers[{i}]"))?;
                tier.uint("minSize")?;
                tier.uint("maxSize")?;
                tier.money("price")?;
            }
        }
        "base_plus_person" => {
            root.money("basePrice")?;
            root.uint("includedParticipants")?;
            root.money("perPersonPrice")?;
            root.uint("maxParticipants")?;
        }
        other => {
            return Err(EngineError::invalid_model(
                other,
                "type",
                "is not a known pricing model",
            ))
        }
    }
    Ok(())
}

impl PricingModel {
    /// Type-guard a raw JSON model, deserialize it, and run [`validate`](Self::validate).
    pub fn from_value(value: &Value) -> Result<Self> {
        let declared = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::invalid_model("pricing", "type", "must be a string"))?;
        check_shape(declared, value)?;

        let model: PricingModel = serde_json::from_value(value.clone())
            .map_err(|e| EngineError::invalid_model(declared, "<root>", e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Reject logically invalid configurations, reporting every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        check_prices(&self.prices(), &mut errors);

        match self {
            PricingModel::PerPerson(p) => check_person_tiers(&p.tiers, &mut errors),
            PricingModel::PerUnit(p) => {
                if p.max_occupancy == 0 {
                    errors.push("maxOccupancy must be at least 1".to_string());
                }
                if p.extra_person_fee.is_some() && p.base_occupancy.is_none() {
                    errors.push("extraPersonFee requires baseOccupancy".to_string());
                }
                if let Some(base) = p.base_occupancy {
                    if base > p.max_occupancy {
                        errors.push(format!(
                            "baseOccupancy {base} exceeds maxOccupancy {}",
                            p.max_occupancy
                        ));
                    }
                }
                if let Some(min) = p.min_occupancy {
                    if min > p.max_occupancy {
                        errors.push(format!(
                            "minOccupancy {min} exceeds maxOccupancy {}",
                            p.max_occupancy
                        ));
                    }
                }
            }
            PricingModel::FlatRate(p) => {
                if p.max_participants == 0 {
                    errors.push("maxParticipants must be at least 1".to_string());
                }
                if let Some(min) = p.min_participants {
                    if min > p.max_participants {
                        errors.push(format!(
                            "minParticipants {min} exceeds maxParticipants {}",
                            p.max_participants
                        ));
                    }
                }
            }
            PricingModel::TieredGroup(p) => {
                if p.tiers.is_empty() {
                    errors.push("tiered_group model has no tiers".to_string());
                }
                for (i, tier) in p.tiers.iter().enumerate() {
                    if tier.min_size == 0 {
                        errors.push(format!("tiers[{i}] minSize must be at least 1"));
                    }
                    if tier.min_size > tier.max_size {
                        errors.push(format!(
                            "tiers[{i}] minSize {} exceeds maxSize {}",
                            tier.min_size, tier.max_size
                        ));
                    }
                }
                for (i, pair) in p.tiers.windows(2).enumerate() {
                    let (prev, next) = (&pair[0], &pair[1]);
                    if next.min_size <= prev.max_size {
                        errors.push(format!(
                            "tiers[{}] ({}-{}) overlaps or precedes tiers[{i}] ({}-{})",
                            i + 1,
                            next.min_size,
                            next.max_size,
                            prev.min_size,
                            prev.max_size
                        ));
                    } else if next.min_size > prev.max_size.saturating_add(1) {
                        errors.push(format!(
                            "gap between tiers[{i}] (ends {}) and tiers[{}] (starts {})",
                            prev.max_size,
                            i + 1,
                            next.min_size
                        ));
                    }
                }
            }
            PricingModel::BasePlusPerson(p) => {
                if p.max_participants == 0 {
                    errors.push("maxParticipants must be at least 1".to_string());
                }
                if p.included_participants > p.max_participants {
                    errors.push(format!(
                        "includedParticipants {} exceeds maxParticipants {}",
                        p.included_participants, p.max_participants
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Configuration {
                message: format!("invalid {} pricing model", self.type_name()),
                errors,
            })
        }
    }
}

/// Shared currency, non-negative amounts, and precision within the currency's minor unit.
fn check_prices(prices: &[&Money], errors: &mut Vec<String>) {
    let currencies: BTreeSet<String> = prices
        .iter()
        .map(|m| currency::normalize_code(&m.currency))
        .collect();
    if currencies.len() > 1 {
        errors.push(format!(
            "prices mix currencies: {}",
            currencies.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    for money in prices {
        if money.amount.is_sign_negative() && !money.amount.is_zero() {
            errors.push(format!("price {} {} is negative", money.amount, money.currency));
        }
        if !money.has_valid_precision() {
            errors.push(format!(
                "price {} has more than {} decimal places for {}",
                money.amount,
                money.decimal_places(),
                money.currency
            ));
        }
    }
}

fn check_person_tiers(tiers: &[PricingTier], errors: &mut Vec<String>) {
    if tiers.is_empty() {
        errors.push("per_person model has no tiers".to_string());
        return;
    }
    let mut ids = BTreeSet::new();
    for tier in tiers {
        if !ids.insert(tier.id.as_str()) {
            errors.push(format!("duplicate tier id '{}'", tier.id));
        }
        if let (Some(min), Some(max)) = (tier.age_min, tier.age_max) {
            if min > max {
                errors.push(format!("tier '{}' ageMin {min} exceeds ageMax {max}", tier.id));
            }
        }
    }
    let defaults = tiers.iter().filter(|t| t.is_default).count();
    if defaults > 1 {
        errors.push(format!("{defaults} tiers are flagged isDefault, expected at most one"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn usd(amount: &str) -> Value {
        json!({"amount": amount, "currency": "USD"})
    }

    fn invalid_field(err: EngineError) -> (String, String) {
        match err {
            EngineError::InvalidModel {
                declared_type,
                field,
                ..
            } => (declared_type, field),
            other => panic!("expected InvalidModel, got {other:?}"),
        }
    }

    fn config_errors(err: EngineError) -> Vec<String> {
        match err {
            EngineError::Configuration { errors, .. } => errors,
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    // ==================== shape tests ====================

    #[test]
    fn test_accepts_every_variant() {
        let models = [
            json!({"type": "per_person", "tiers": [
                {"id": "adult", "name": "Adult", "price": usd("50"), "isDefault": true},
                {"id": "child", "name": "Child", "price": usd("30"), "ageMin": 3, "ageMax": 12}
            ]}),
            json!({"type": "per_unit", "unitName": "boat", "unitNamePlural": "boats",
                   "pricePerUnit": usd("400"), "baseOccupancy": 4, "extraPersonFee": usd("25"),
                   "maxOccupancy": 8}),
            json!({"type": "flat_rate", "price": usd("900"), "minParticipants": 2, "maxParticipants": 12}),
            json!({"type": "tiered_group", "tiers": [
                {"minSize": 1, "maxSize": 4, "price": usd("200")},
                {"minSize": 5, "maxSize": 8, "price": usd("350")}
            ]}),
            json!({"type": "base_plus_person", "basePrice": usd("100"), "includedParticipants": 2,
                   "perPersonPrice": usd("20"), "maxParticipants": 10}),
        ];
        for value in &models {
            let model = PricingModel::from_value(value).unwrap();
            assert_eq!(model.type_name(), value["type"]);
        }
    }

    #[test]
    fn test_missing_type() {
        let (declared, field) = invalid_field(PricingModel::from_value(&json!({"price": usd("1")})).unwrap_err());
        assert_eq!((declared.as_str(), field.as_str()), ("pricing", "type"));
    }

    #[test]
    fn test_unknown_type() {
        let (declared, field) =
            invalid_field(PricingModel::from_value(&json!({"type": "per_hour"})).unwrap_err());
        assert_eq!((declared.as_str(), field.as_str()), ("per_hour", "type"));
    }

    #[test]
    fn test_shape_mismatch_names_field() {
        // A flat_rate payload declared as per_unit
        let value = json!({"type": "per_unit", "price": usd("900"), "maxParticipants": 12});
        let (declared, field) = invalid_field(PricingModel::from_value(&value).unwrap_err());
        assert_eq!((declared.as_str(), field.as_str()), ("per_unit", "unitName"));

        let value = json!({"type": "flat_rate", "price": usd("900"), "maxParticipants": "twelve"});
        let (_, field) = invalid_field(PricingModel::from_value(&value).unwrap_err());
        assert_eq!(field, "maxParticipants");
    }

    #[test]
    fn test_nested_field_paths() {
        let value = json!({"type": "per_person", "tiers": [
            {"id": "adult", "name": "Adult", "price": usd("50")},
            {"id": "child", "name": "Child", "price": {"amount": "thirty", "currency": "USD"}}
        ]});
        let (_, field) = invalid_field(PricingModel::from_value(&value).unwrap_err());
        assert_eq!(field, "tiers[1].price.amount");

        let value = json!({"type": "tiered_group", "tiers": [
            {"minSize": 1, "maxSize": 4, "price": {"amount": 200, "currency": "dollars"}}
        ]});
        let (_, field) = invalid_field(PricingModel::from_value(&value).unwrap_err());
        assert_eq!(field, "tiers[0].price.currency");
    }

    #[test]
    fn test_null_optional_fields_allowed() {
        let value = json!({"type": "flat_rate", "price": usd("900"), "minParticipants": null,
                           "maxParticipants": 12});
        assert!(PricingModel::from_value(&value).is_ok());
    }

    // ==================== configuration tests ====================

    #[test]
    fn test_extra_fee_without_base_occupancy() {
        let value = json!({"type": "per_unit", "unitName": "kayak", "unitNamePlural": "kayaks",
                           "pricePerUnit": usd("60"), "extraPersonFee": usd("15"), "maxOccupancy": 2});
        let errors = config_errors(PricingModel::from_value(&value).unwrap_err());
        assert_eq!(errors, vec!["extraPersonFee requires baseOccupancy".to_string()]);
    }

    #[test]
    fn test_tiered_group_overlap_and_gap() {
        let overlap = json!({"type": "tiered_group", "tiers": [
            {"minSize": 1, "maxSize": 5, "price": usd("200")},
            {"minSize": 5, "maxSize": 8, "price": usd("350")}
        ]});
        let errors = config_errors(PricingModel::from_value(&overlap).unwrap_err());
        assert!(errors[0].contains("overlaps"));

        let gap = json!({"type": "tiered_group", "tiers": [
            {"minSize": 1, "maxSize": 4, "price": usd("200")},
            {"minSize": 6, "maxSize": 8, "price": usd("350")}
        ]});
        let errors = config_errors(PricingModel::from_value(&gap).unwrap_err());
        assert!(errors[0].contains("gap"));

        let out_of_order = json!({"type": "tiered_group", "tiers": [
            {"minSize": 5, "maxSize": 8, "price": usd("350")},
            {"minSize": 1, "maxSize": 4, "price": usd("200")}
        ]});
        assert!(PricingModel::from_value(&out_of_order).is_err());
    }

    #[test]
    fn test_precision_and_currency_mix() {
        let value = json!({"type": "base_plus_person",
                           "basePrice": {"amount": "100.005", "currency": "USD"},
                           "includedParticipants": 2,
                           "perPersonPrice": {"amount": "20", "currency": "EUR"},
                           "maxParticipants": 10});
        let errors = config_errors(PricingModel::from_value(&value).unwrap_err());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("mix currencies")));
        assert!(errors.iter().any(|e| e.contains("decimal places")));

        // Three decimals are fine for BHD
        let value = json!({"type": "flat_rate", "price": {"amount": "12.125", "currency": "BHD"},
                           "maxParticipants": 4});
        assert!(PricingModel::from_value(&value).is_ok());
    }

    #[test]
    fn test_per_person_tier_problems() {
        let value = json!({"type": "per_person", "tiers": [
            {"id": "a", "name": "Adult", "price": usd("50"), "isDefault": true},
            {"id": "a", "name": "Also adult", "price": usd("-5"), "isDefault": true,
             "ageMin": 18, "ageMax": 10}
        ]});
        let errors = config_errors(PricingModel::from_value(&value).unwrap_err());
        assert_eq!(errors.len(), 4);

        let empty = json!({"type": "per_person", "tiers": []});
        assert_eq!(
            config_errors(PricingModel::from_value(&empty).unwrap_err()),
            vec!["per_person model has no tiers".to_string()]
        );
    }

    #[test]
    fn test_bounds_problems() {
        let value = json!({"type": "base_plus_person", "basePrice": usd("100"),
                           "includedParticipants": 12, "perPersonPrice": usd("20"),
                           "maxParticipants": 10});
        assert_eq!(config_errors(PricingModel::from_value(&value).unwrap_err()).len(), 1);

        let value = json!({"type": "flat_rate", "price": usd("100"), "minParticipants": 5,
                           "maxParticipants": 4});
        assert_eq!(config_errors(PricingModel::from_value(&value).unwrap_err()).len(), 1);
    }
}
