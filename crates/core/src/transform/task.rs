use super::{EnvelopeBuilder, PayloadBuilder, Transformer};
use crate::entity::EntityKind;
use crate::envelope::McpEnvelope;
use crate::error::Result;
use crate::models::{Task, TaskUpdate};

pub struct TaskTransformer;

const RELATIONSHIPS: &[&str] = &["related_resource", "assignee"];

impl Transformer for TaskTransformer {
    const KIND: EntityKind = EntityKind::Task;
    type Record = Task;
    type Update = TaskUpdate;

    fn forward(t: &Task) -> Result<McpEnvelope> {
        let mut b = EnvelopeBuilder::new(Self::KIND, t.id);
        b.attr("name", t.name.as_str())
            .attr_opt("details", t.details.as_deref())
            .attr_opt("status", t.status.as_deref())
            .attr_opt("priority", t.priority.as_deref())
            .attr("tags", t.tags.clone());
        b.timestamp("due_date", t.due_date)?;
        b.timestamp("reminder_date", t.reminder_date)?;
        b.timestamp("completed_date", t.completed_date)?;
        b.timestamps(t.date_created, t.date_modified)?;

        let related = t.related_resource.as_ref();
        b.relationship(
            "related_resource",
            related.map(|r| r.kind.as_str()).unwrap_or_default(),
            related.map(|r| r.id),
            None,
        )
        .relationship("assignee", "user", t.assignee_id, None);

        b.custom_fields(&t.custom_fields);
        Ok(b.build(None))
    }

    fn reverse(b: &mut PayloadBuilder<'_>) -> Result<()> {
        b.known_relationships(RELATIONSHIPS)?;
        b.attrs(&["name", "details", "status", "priority", "tags"]);
        b.timestamp_attr("due_date", "due_date")?;
        b.timestamp_attr("reminder_date", "reminder_date")?;
        b.timestamp_attr("completed_date", "completed_date")?;

        b.typed_ref("related_resource", "related_resource")?;
        b.relationship_id("assignee", "user", "assignee_id")?;
        b.custom_fields()
    }
}
