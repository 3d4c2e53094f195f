//! The normalized MCP entity envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::entity::EntityKind;

pub const SOURCE: &str = "copper";

fn default_source() -> String {
    SOURCE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpEnvelope {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub relationships: BTreeMap<String, Relationship>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl McpEnvelope {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            source: default_source(),
            source_id: None,
            attributes: Map::new(),
            relationships: BTreeMap::new(),
            meta: Map::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    /// Populated relationship target, if any.
    pub fn related(&self, name: &str) -> Option<&RelationshipData> {
        self.relationships.get(name).and_then(|r| r.data.as_ref())
    }
}

/// `{"data": {...}}` or `{"data": null}`; the `data` key is always written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Incoming envelopes sometimes carry raw numeric ids.
fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "relationship id must be a string or number, got {}",
            other
        ))),
    }
}
