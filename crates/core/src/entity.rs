use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CopperError;

/// The CRM record kinds exposed through the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Person,
    Company,
    Opportunity,
    Activity,
    Task,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Person,
        EntityKind::Company,
        EntityKind::Opportunity,
        EntityKind::Activity,
        EntityKind::Task,
    ];

    /// Envelope `type` literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Company => "company",
            EntityKind::Opportunity => "opportunity",
            EntityKind::Activity => "activity",
            EntityKind::Task => "task",
        }
    }

    /// REST collection path segment, also used for plural tool names.
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::Person => "people",
            EntityKind::Company => "companies",
            EntityKind::Opportunity => "opportunities",
            EntityKind::Activity => "activities",
            EntityKind::Task => "tasks",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Person => "Person",
            EntityKind::Company => "Company",
            EntityKind::Opportunity => "Opportunity",
            EntityKind::Activity => "Activity",
            EntityKind::Task => "Task",
        }
    }

    /// Fields that must be present and non-empty in a create payload.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Person => &["name", "emails"],
            EntityKind::Company => &["name"],
            EntityKind::Opportunity => &["name", "pipeline_id", "pipeline_stage_id"],
            EntityKind::Activity => &["type", "parent"],
            EntityKind::Task => &["name"],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CopperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "person" | "people" => Ok(EntityKind::Person),
            "company" | "companies" => Ok(EntityKind::Company),
            "opportunity" | "opportunities" => Ok(EntityKind::Opportunity),
            "activity" | "activities" => Ok(EntityKind::Activity),
            "task" | "tasks" => Ok(EntityKind::Task),
            other => Err(CopperError::invalid_value(
                "type",
                "unknown entity type",
                serde_json::Value::String(other.to_string()),
            )),
        }
    }
}

/// Kinds of record an activity or task can hang off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParentType {
    Person,
    Company,
    Opportunity,
    Lead,
    Project,
    Task,
}

impl ParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentType::Person => "person",
            ParentType::Company => "company",
            ParentType::Opportunity => "opportunity",
            ParentType::Lead => "lead",
            ParentType::Project => "project",
            ParentType::Task => "task",
        }
    }
}

impl std::fmt::Display for ParentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParentType {
    type Err = CopperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "person" => Ok(ParentType::Person),
            "company" => Ok(ParentType::Company),
            "opportunity" => Ok(ParentType::Opportunity),
            "lead" => Ok(ParentType::Lead),
            "project" => Ok(ParentType::Project),
            "task" => Ok(ParentType::Task),
            other => Err(CopperError::invalid_value(
                "parent.type",
                "must be one of person, company, opportunity, lead, project, task",
                serde_json::Value::String(other.to_string()),
            )),
        }
    }
}

impl TryFrom<String> for ParentType {
    type Error = CopperError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParentType> for String {
    fn from(value: ParentType) -> Self {
        value.as_str().to_string()
    }
}
