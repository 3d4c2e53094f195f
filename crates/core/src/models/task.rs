use serde::{Deserialize, Serialize};

use super::common::{nullable, CustomField, ParentRef};
use super::opportunity::PRIORITIES;
use crate::error::Result;
use crate::validate::{self, Validate};

pub const TASK_STATUSES: &[&str] = &["Open", "Completed"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub related_resource: Option<ParentRef>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub reminder_date: Option<i64>,
    #[serde(default)]
    pub completed_date: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub date_created: Option<i64>,
    #[serde(default)]
    pub date_modified: Option<i64>,
}

impl Validate for Task {
    fn validate(&self) -> Result<()> {
        validate::non_empty("name", &self.name)?;
        validate::one_of("status", self.status.as_deref(), TASK_STATUSES)?;
        validate::one_of("priority", self.priority.as_deref(), PRIORITIES)?;
        validate::custom_fields(&self.custom_fields)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub related_resource: Option<ParentRef>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub reminder_date: Option<i64>,
    #[serde(default)]
    pub completed_date: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub custom_fields: Option<Vec<CustomField>>,
}

impl Validate for TaskUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate::non_empty("name", name)?;
        }
        validate::one_of("status", self.status.as_deref(), TASK_STATUSES)?;
        validate::one_of("priority", self.priority.as_deref(), PRIORITIES)?;
        validate::custom_fields(self.custom_fields.as_deref().unwrap_or_default())
    }
}
