use serde::{Deserialize, Serialize};
use serde_json::json;

use super::common::{nullable, ActivityType, CustomField, ParentRef};
use crate::error::{CopperError, Result};
use crate::validate::{self, Validate};

pub const ACTIVITY_CATEGORIES: &[&str] = &["user", "system"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub parent: ParentRef,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub activity_date: Option<i64>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub date_created: Option<i64>,
    #[serde(default)]
    pub date_modified: Option<i64>,
}

impl Validate for Activity {
    fn validate(&self) -> Result<()> {
        validate_type(Some(&self.activity_type))?;
        validate_parent(Some(&self.parent))?;
        validate::custom_fields(&self.custom_fields)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityUpdate {
    #[serde(default, rename = "type")]
    pub activity_type: Option<ActivityType>,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub activity_date: Option<i64>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub custom_fields: Option<Vec<CustomField>>,
}

impl Validate for ActivityUpdate {
    fn validate(&self) -> Result<()> {
        validate_type(self.activity_type.as_ref())?;
        validate_parent(self.parent.as_ref())?;
        validate::custom_fields(self.custom_fields.as_deref().unwrap_or_default())
    }
}

fn validate_type(activity_type: Option<&ActivityType>) -> Result<()> {
    let Some(t) = activity_type else { return Ok(()) };
    validate::one_of("type.category", Some(&t.category), ACTIVITY_CATEGORIES)?;
    // Copper's built-in "Note" type has id 0.
    if t.id < 0 {
        return Err(CopperError::invalid_value("type.id", "must be >= 0", json!(t.id)));
    }
    Ok(())
}

fn validate_parent(parent: Option<&ParentRef>) -> Result<()> {
    match parent {
        Some(p) if p.id <= 0 => Err(CopperError::invalid_value("parent.id", "must be a positive integer", json!(p.id))),
        _ => Ok(()),
    }
}
