//! Shared pieces every entity transformer is built from.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Value};

use crate::envelope::{Relationship, RelationshipData};
use crate::error::{CopperError, Result};
use crate::models::ContactMethod;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Render a CRM id in its wire form. The only place ids become strings.
pub fn stringify_id(id: i64) -> String {
    id.to_string()
}

/// Value of the first `work` entry, else the first entry, else `None`.
pub fn primary_contact<T: ContactMethod>(methods: &[T]) -> Option<&str> {
    methods
        .iter()
        .find(|m| m.category().is_some_and(|c| c.eq_ignore_ascii_case("work")))
        .or_else(|| methods.first())
        .map(|m| m.value())
}

pub fn build_relationship(kind: &str, id: Option<i64>, name: Option<&str>) -> Relationship {
    Relationship {
        data: id.map(|id| RelationshipData {
            kind: kind.to_string(),
            id: stringify_id(id),
            name: name.map(str::to_string),
        }),
    }
}

/// Input accepted by the datetime normalizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    Unix(i64),
    DateTime(DateTime<Utc>),
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp::Unix(secs)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::DateTime(dt)
    }
}

/// Format as `YYYY-MM-DDTHH:MM:SSZ`. `None` and the zero epoch both yield `None`.
pub fn format_datetime<T: Into<Timestamp>>(value: Option<T>) -> Result<Option<String>> {
    let dt = match value.map(Into::into) {
        None | Some(Timestamp::Unix(0)) => return Ok(None),
        Some(Timestamp::Unix(secs)) => DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
            CopperError::invalid_value("timestamp", "out of range unix timestamp", json!(secs))
        })?,
        Some(Timestamp::DateTime(dt)) => dt,
    };
    Ok(Some(dt.format(TIMESTAMP_FORMAT).to_string()))
}

/// Normalizer for untyped JSON. Only integers and `null` are accepted.
pub fn format_datetime_value(field: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(secs) => format_datetime(Some(secs)),
            None => Err(CopperError::invalid_value(field, "timestamp must be integer seconds", value.clone())),
        },
        other => Err(CopperError::invalid_value(
            field,
            "timestamp must be unix seconds or a datetime",
            other.clone(),
        )),
    }
}

/// Inverse of the normalizer: ISO-8601 string or integer seconds back to unix seconds.
pub fn parse_timestamp(field: &str, value: &Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| CopperError::invalid_value(field, "timestamp must be integer seconds", value.clone())),
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(Some(dt.timestamp()));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .map(|naive| Some(naive.and_utc().timestamp()))
                .map_err(|_| CopperError::invalid_value(field, "expected ISO-8601 datetime", value.clone()))
        }
        other => Err(CopperError::invalid_value(field, "expected ISO-8601 datetime", other.clone())),
    }
}

/// Parse a relationship or argument id back into the CRM's integer form.
pub fn parse_id(value: &str, fragment: &Value) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        CopperError::transformation(format!("id `{}` is not an integer", value), Some(fragment.clone()))
    })
}
