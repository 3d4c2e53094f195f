//! Bidirectional mapping between Copper records and MCP envelopes.
//!
//! Each entity kind has a [`Transformer`] implementation. The two directions
//! are built from a pair of small builders so the shared rules (id
//! stringification, timestamp format, custom-field shape, null handling) live
//! in one place:
//!
//! - [`EnvelopeBuilder`] assembles the forward (Copper → MCP) envelope.
//! - [`PayloadBuilder`] flattens an envelope back into a Copper payload and
//!   runs the create/update schema checks before handing it out.

pub mod activity;
pub mod company;
pub mod helpers;
pub mod opportunity;
pub mod person;
pub mod task;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::entity::{EntityKind, ParentType};
use crate::envelope::{McpEnvelope, Relationship};
use crate::error::{CopperError, Result};
use crate::models::{Address, CustomField};
use crate::validate::{self, Validate};

pub use activity::ActivityTransformer;
pub use company::CompanyTransformer;
pub use helpers::{build_relationship, format_datetime, primary_contact, stringify_id};
pub use opportunity::OpportunityTransformer;
pub use person::PersonTransformer;
pub use task::TaskTransformer;

/// Which schema a reverse-transformed payload must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

pub trait Transformer {
    const KIND: EntityKind;
    type Record: DeserializeOwned + Validate;
    type Update: DeserializeOwned + Validate;

    /// Copper record → envelope. The record is assumed already validated.
    fn forward(record: &Self::Record) -> Result<McpEnvelope>;

    /// Envelope → Copper payload, without schema checks.
    fn reverse(builder: &mut PayloadBuilder<'_>) -> Result<()>;
}

/// Parse, validate and forward-transform a raw Copper record.
pub fn record_to_mcp<T: Transformer>(raw: Value) -> Result<McpEnvelope> {
    let record: T::Record = serde_json::from_value(raw)
        .map_err(|e| CopperError::validation(T::KIND.as_str(), e.to_string()))?;
    record.validate()?;
    T::forward(&record)
}

/// Reverse-transform an envelope and check the payload against the create or update schema.
pub fn envelope_to_payload<T: Transformer>(envelope: &McpEnvelope, mode: WriteMode) -> Result<Map<String, Value>> {
    let mut builder = PayloadBuilder::new(envelope, T::KIND)?;
    T::reverse(&mut builder)?;
    let payload = builder.finish();

    match mode {
        WriteMode::Create => {
            validate::required_fields(T::KIND, &payload)?;
            parse_payload::<T::Record>(T::KIND, &payload)?.validate()?;
        }
        WriteMode::Update => parse_payload::<T::Update>(T::KIND, &payload)?.validate()?,
    }
    Ok(payload)
}

fn parse_payload<R: DeserializeOwned>(kind: EntityKind, payload: &Map<String, Value>) -> Result<R> {
    serde_json::from_value(Value::Object(payload.clone()))
        .map_err(|e| CopperError::validation(kind.as_str(), e.to_string()))
}

/// Forward transform dispatched on entity kind.
pub fn to_mcp(kind: EntityKind, raw: Value) -> Result<McpEnvelope> {
    match kind {
        EntityKind::Person => record_to_mcp::<PersonTransformer>(raw),
        EntityKind::Company => record_to_mcp::<CompanyTransformer>(raw),
        EntityKind::Opportunity => record_to_mcp::<OpportunityTransformer>(raw),
        EntityKind::Activity => record_to_mcp::<ActivityTransformer>(raw),
        EntityKind::Task => record_to_mcp::<TaskTransformer>(raw),
    }
}

/// Reverse transform dispatched on the envelope's own `type`.
pub fn from_mcp(envelope: &McpEnvelope, mode: WriteMode) -> Result<Map<String, Value>> {
    from_mcp_as(envelope.kind, envelope, mode)
}

/// Reverse transform with the transformer for `kind`. An envelope of another type is a transformation error.
pub fn from_mcp_as(kind: EntityKind, envelope: &McpEnvelope, mode: WriteMode) -> Result<Map<String, Value>> {
    match kind {
        EntityKind::Person => envelope_to_payload::<PersonTransformer>(envelope, mode),
        EntityKind::Company => envelope_to_payload::<CompanyTransformer>(envelope, mode),
        EntityKind::Opportunity => envelope_to_payload::<OpportunityTransformer>(envelope, mode),
        EntityKind::Activity => envelope_to_payload::<ActivityTransformer>(envelope, mode),
        EntityKind::Task => envelope_to_payload::<TaskTransformer>(envelope, mode),
    }
}

// ── Forward builder ───────────────────────────────────────────

pub struct EnvelopeBuilder {
    envelope: McpEnvelope,
}

impl EnvelopeBuilder {
    pub fn new(kind: EntityKind, id: Option<i64>) -> Self {
        let mut envelope = McpEnvelope::new(kind);
        envelope.source_id = id.map(stringify_id);
        Self { envelope }
    }

    pub fn attr(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.envelope.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Optional scalars are omitted rather than written as null.
    pub fn attr_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.attr(key, v);
        }
        self
    }

    /// Timestamp attributes are always present, null when unset.
    pub fn timestamp(&mut self, key: &str, secs: Option<i64>) -> Result<&mut Self> {
        let formatted = format_datetime(secs)?;
        self.attr(key, formatted.map(Value::String).unwrap_or(Value::Null));
        Ok(self)
    }

    pub fn timestamps(&mut self, created: Option<i64>, modified: Option<i64>) -> Result<&mut Self> {
        self.timestamp("created_at", created)?;
        self.timestamp("updated_at", modified)
    }

    pub fn address(&mut self, address: Option<&Address>) -> &mut Self {
        if let Some(a) = address {
            self.attr("address", json!(a));
        }
        self
    }

    pub fn relationship(&mut self, name: &str, kind: &str, id: Option<i64>, display: Option<&str>) -> &mut Self {
        self.envelope
            .relationships
            .insert(name.to_string(), build_relationship(kind, id, display));
        self
    }

    pub fn meta(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.envelope.meta.insert(key.to_string(), value.into());
        self
    }

    pub fn custom_fields(&mut self, fields: &[CustomField]) -> &mut Self {
        let entries: Vec<Value> = fields
            .iter()
            .map(|cf| json!({ "id": stringify_id(cf.custom_field_definition_id), "value": cf.value }))
            .collect();
        self.meta("custom_fields", entries)
    }

    pub fn build(mut self, interaction_count: Option<i64>) -> McpEnvelope {
        self.meta("interaction_count", interaction_count.unwrap_or(0));
        self.envelope
    }
}

// ── Reverse builder ───────────────────────────────────────────

pub struct PayloadBuilder<'a> {
    envelope: &'a McpEnvelope,
    payload: Map<String, Value>,
}

impl<'a> PayloadBuilder<'a> {
    pub fn new(envelope: &'a McpEnvelope, expected: EntityKind) -> Result<Self> {
        if envelope.kind != expected {
            return Err(CopperError::transformation(
                format!("expected a {} envelope, got {}", expected, envelope.kind),
                Some(json!({ "type": envelope.kind })),
            ));
        }
        Ok(Self { envelope, payload: Map::new() })
    }

    pub fn envelope(&self) -> &'a McpEnvelope {
        self.envelope
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.payload.insert(field.to_string(), value);
    }

    /// Copy non-null attributes to same-named top-level fields.
    pub fn attrs(&mut self, keys: &[&str]) {
        for key in keys {
            self.attr_as(key, key);
        }
    }

    pub fn attr_as(&mut self, attr: &str, field: &str) {
        if let Some(v) = self.envelope.attribute(attr) {
            self.payload.insert(field.to_string(), v.clone());
        }
    }

    /// ISO-8601 attribute back to unix seconds.
    pub fn timestamp_attr(&mut self, attr: &str, field: &str) -> Result<()> {
        if let Some(v) = self.envelope.attribute(attr) {
            if let Some(secs) = helpers::parse_timestamp(attr, v)? {
                self.payload.insert(field.to_string(), json!(secs));
            }
        }
        Ok(())
    }

    /// Copy non-null meta entries to top-level fields.
    pub fn meta_as(&mut self, key: &str, field: &str) {
        if let Some(v) = self.envelope.meta.get(key).filter(|v| !v.is_null()) {
            self.payload.insert(field.to_string(), v.clone());
        }
    }

    /// `meta[key]` back to a Copper contact list, with the flat `attr` written into
    /// the entry it was read from: the first `work` entry, else the first entry.
    /// An empty or absent list gets a leading work entry. Other entries keep their order.
    pub fn contact_list(&mut self, key: &str, attr: &str, value_key: &str) -> Result<()> {
        let flat = match self.envelope.attribute(attr) {
            None => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => return Err(CopperError::invalid_value(attr, "must be a string", other.clone())),
        };
        let mut list = match self.envelope.meta.get(key).filter(|v| !v.is_null()) {
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                return Err(CopperError::transformation(
                    format!("meta.{key} must be a list"),
                    Some(other.clone()),
                ))
            }
            None if flat.is_none() => return Ok(()),
            None => Vec::new(),
        };

        if let Some(flat) = flat {
            let is_work = |entry: &Value| {
                entry
                    .get("category")
                    .and_then(Value::as_str)
                    .is_some_and(|c| c.eq_ignore_ascii_case("work"))
            };
            let primary = list.iter().position(is_work).or_else(|| (!list.is_empty()).then_some(0));
            match primary {
                Some(i) => match &mut list[i] {
                    Value::Object(entry) => {
                        entry.insert(value_key.to_string(), json!(flat));
                    }
                    entry => *entry = json!(flat),
                },
                None => list.insert(0, json!({ value_key: flat, "category": "work" })),
            }
        }
        self.payload.insert(key.to_string(), Value::Array(list));
        Ok(())
    }

    /// Reject relationship names this entity does not define.
    pub fn known_relationships(&self, allowed: &[&str]) -> Result<()> {
        for name in self.envelope.relationships.keys() {
            if !allowed.contains(&name.as_str()) {
                return Err(CopperError::transformation(
                    format!("unknown relationship `{}` for {}", name, self.envelope.kind),
                    Some(relationship_fragment(name, &self.envelope.relationships[name])),
                ));
            }
        }
        Ok(())
    }

    /// `relationships[name].data.id` → `field` as an integer. Absent or null data leaves `field` unset.
    pub fn relationship_id(&mut self, name: &str, expected_type: &str, field: &str) -> Result<()> {
        let Some(data) = self.envelope.related(name) else { return Ok(()) };
        let fragment = relationship_fragment(name, &self.envelope.relationships[name]);
        if !data.kind.eq_ignore_ascii_case(expected_type) {
            return Err(CopperError::transformation(
                format!("relationship `{}` must point at a {}, got {}", name, expected_type, data.kind),
                Some(fragment),
            ));
        }
        let id = helpers::parse_id(&data.id, &fragment)?;
        self.payload.insert(field.to_string(), json!(id));
        Ok(())
    }

    /// Typed `{type, id}` reference (activity parent, task related resource).
    pub fn typed_ref(&mut self, name: &str, field: &str) -> Result<()> {
        let Some(data) = self.envelope.related(name) else { return Ok(()) };
        let fragment = relationship_fragment(name, &self.envelope.relationships[name]);
        let kind: ParentType = data.kind.parse().map_err(|_| {
            CopperError::transformation(
                format!("unknown relationship type `{}` for `{}`", data.kind, name),
                Some(fragment.clone()),
            )
        })?;
        let id = helpers::parse_id(&data.id, &fragment)?;
        self.payload.insert(field.to_string(), json!({ "type": kind.as_str(), "id": id }));
        Ok(())
    }

    /// `meta.custom_fields` in list form, or the legacy id-keyed map, back to Copper's list form.
    pub fn custom_fields(&mut self) -> Result<()> {
        let Some(raw) = self.envelope.meta.get("custom_fields").filter(|v| !v.is_null()) else {
            return Ok(());
        };
        let pairs: Vec<(Value, Value)> = match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(o) => Ok((
                        o.get("id").cloned().unwrap_or(Value::Null),
                        o.get("value").cloned().unwrap_or(Value::Null),
                    )),
                    other => Err(CopperError::transformation(
                        "custom field entries must be objects",
                        Some(other.clone()),
                    )),
                })
                .collect::<Result<Vec<_>>>()?,
            Value::Object(map) => map.iter().map(|(k, v)| (Value::String(k.clone()), v.clone())).collect(),
            other => {
                return Err(CopperError::transformation(
                    "meta.custom_fields must be a list or an object",
                    Some(other.clone()),
                ))
            }
        };

        let mut fields = Vec::with_capacity(pairs.len());
        for (id, value) in pairs {
            let fragment = json!({ "id": id, "value": value });
            let definition_id = match &id {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
            .ok_or_else(|| CopperError::transformation("custom field id is not an integer", Some(fragment.clone())))?;
            fields.push(json!({ "custom_field_definition_id": definition_id, "value": value }));
        }
        self.payload.insert("custom_fields".into(), Value::Array(fields));
        Ok(())
    }

    pub fn finish(self) -> Map<String, Value> {
        self.payload
    }
}

fn relationship_fragment(name: &str, rel: &Relationship) -> Value {
    json!({ name: rel })
}

#[cfg(test)]
mod tests;
