//! Field-level checks shared by the record and update schemas.

use serde_json::{json, Map, Value};

use crate::entity::EntityKind;
use crate::error::{CopperError, Result};
use crate::models::CustomField;

/// Schema-level checks run before a record crosses the transformer boundary.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CopperError::validation(field, "must not be empty"));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if v < 0.0 => Err(CopperError::invalid_value(field, "must be >= 0", json!(v))),
        _ => Ok(()),
    }
}

pub fn in_range(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<()> {
    match value {
        Some(v) if v < min || v > max => Err(CopperError::invalid_value(
            field,
            format!("must be between {} and {}", min, max),
            json!(v),
        )),
        _ => Ok(()),
    }
}

/// Case-insensitive membership check against a closed vocabulary.
pub fn one_of(field: &str, value: Option<&str>, allowed: &[&str]) -> Result<()> {
    match value {
        Some(v) if !allowed.iter().any(|a| a.eq_ignore_ascii_case(v)) => Err(CopperError::invalid_value(
            field,
            format!("must be one of {}", allowed.join(", ")),
            json!(v),
        )),
        _ => Ok(()),
    }
}

/// Industry labels: letters, digits, spaces, `&` and `-`.
pub fn industry(value: Option<&str>) -> Result<()> {
    match value {
        Some(v)
            if v.is_empty()
                || !v.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '&' | '-')) =>
        {
            Err(CopperError::invalid_value("industry", "contains unsupported characters", json!(v)))
        }
        _ => Ok(()),
    }
}

pub fn custom_fields(fields: &[CustomField]) -> Result<()> {
    for cf in fields {
        if cf.custom_field_definition_id <= 0 {
            return Err(CopperError::invalid_value(
                "custom_fields.custom_field_definition_id",
                "must be a positive integer",
                json!(cf.custom_field_definition_id),
            ));
        }
    }
    Ok(())
}

/// Every required field of `kind` is present, non-null, and not an empty string or list.
pub fn required_fields(kind: EntityKind, payload: &Map<String, Value>) -> Result<()> {
    for field in kind.required_fields() {
        let present = match payload.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(CopperError::validation(
                *field,
                format!("{} requires `{}`", kind.label(), field),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_reject_empty_values() {
        let payload = json!({ "name": "Jane", "emails": [] });
        let err = required_fields(EntityKind::Person, payload.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "emails"));

        let payload = json!({ "name": "Deal", "pipeline_id": 1 });
        let err = required_fields(EntityKind::Opportunity, payload.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "pipeline_stage_id"));
    }

    #[test]
    fn industry_pattern() {
        assert!(industry(Some("Software & IT")).is_ok());
        assert!(industry(Some("Agri-Tech 2")).is_ok());
        assert!(industry(Some("Finance/Banking")).is_err());
        assert!(industry(None).is_ok());
    }

    #[test]
    fn closed_vocabulary_ignores_case() {
        assert!(one_of("status", Some("open"), &["Open", "Won"]).is_ok());
        assert!(one_of("status", Some("Pending"), &["Open", "Won"]).is_err());
    }
}
