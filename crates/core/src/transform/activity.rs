use serde_json::{json, Value};

use super::helpers::{parse_id, stringify_id};
use super::{EnvelopeBuilder, PayloadBuilder, Transformer};
use crate::entity::EntityKind;
use crate::envelope::McpEnvelope;
use crate::error::{CopperError, Result};
use crate::models::{Activity, ActivityUpdate};

pub struct ActivityTransformer;

const RELATIONSHIPS: &[&str] = &["parent", "assignee", "user"];

impl Transformer for ActivityTransformer {
    const KIND: EntityKind = EntityKind::Activity;
    type Record = Activity;
    type Update = ActivityUpdate;

    fn forward(a: &Activity) -> Result<McpEnvelope> {
        let mut b = EnvelopeBuilder::new(Self::KIND, a.id);
        b.attr_opt("name", a.details.as_deref())
            .attr_opt("details", a.details.as_deref())
            .attr(
                "activity_type",
                json!({
                    "category": a.activity_type.category,
                    "id": stringify_id(a.activity_type.id),
                }),
            )
            .attr("tags", a.tags.clone());
        b.timestamp("activity_date", a.activity_date)?;
        b.timestamps(a.date_created, a.date_modified)?;

        b.relationship("parent", a.parent.kind.as_str(), Some(a.parent.id), None)
            .relationship("assignee", "user", a.assignee_id, None)
            .relationship("user", "user", a.user_id, None);

        b.custom_fields(&a.custom_fields);
        Ok(b.build(None))
    }

    fn reverse(b: &mut PayloadBuilder<'_>) -> Result<()> {
        b.known_relationships(RELATIONSHIPS)?;

        // `name` mirrors `details` on the way out, so an edited name wins.
        let env = b.envelope();
        if env.attribute("name").is_some() {
            b.attr_as("name", "details");
        } else {
            b.attr_as("details", "details");
        }
        if let Some(t) = env.attribute("activity_type") {
            b.set("type", activity_type_payload(t)?);
        }
        b.attrs(&["tags"]);
        b.timestamp_attr("activity_date", "activity_date")?;

        b.typed_ref("parent", "parent")?;
        b.relationship_id("assignee", "user", "assignee_id")?;
        b.relationship_id("user", "user", "user_id")?;
        b.custom_fields()
    }
}

/// `{category, id: "<n>"}` back to `{category, id: n}`.
fn activity_type_payload(value: &Value) -> Result<Value> {
    let category = value.get("category").and_then(Value::as_str);
    let id = match value.get("id") {
        Some(Value::String(s)) => Some(parse_id(s, value)?),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    };
    match (category, id) {
        (Some(category), Some(id)) => Ok(json!({ "category": category, "id": id })),
        _ => Err(CopperError::transformation(
            "activity_type requires a category and an id",
            Some(value.clone()),
        )),
    }
}
