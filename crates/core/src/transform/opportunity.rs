use super::{EnvelopeBuilder, PayloadBuilder, Transformer};
use crate::entity::EntityKind;
use crate::envelope::McpEnvelope;
use crate::error::Result;
use crate::models::{Opportunity, OpportunityUpdate};

pub struct OpportunityTransformer;

/// (relationship name, target type, Copper field)
const RELATIONSHIPS: &[(&str, &str, &str)] = &[
    ("company", "company", "company_id"),
    ("primary_contact", "person", "primary_contact_id"),
    ("assignee", "user", "assignee_id"),
    ("pipeline", "pipeline", "pipeline_id"),
    ("pipeline_stage", "pipeline_stage", "pipeline_stage_id"),
    ("customer_source", "customer_source", "customer_source_id"),
    ("loss_reason", "loss_reason", "loss_reason_id"),
];

impl Transformer for OpportunityTransformer {
    const KIND: EntityKind = EntityKind::Opportunity;
    type Record = Opportunity;
    type Update = OpportunityUpdate;

    fn forward(o: &Opportunity) -> Result<McpEnvelope> {
        let mut b = EnvelopeBuilder::new(Self::KIND, o.id);
        b.attr("name", o.name.as_str())
            .attr_opt("status", o.status.as_deref())
            .attr_opt("priority", o.priority.as_deref())
            .attr_opt("monetary_value", o.monetary_value.clone())
            .attr_opt("win_probability", o.win_probability)
            .attr_opt("details", o.details.as_deref())
            .attr("tags", o.tags.clone());
        b.timestamp("close_date", o.close_date)?;
        b.timestamps(o.date_created, o.date_modified)?;

        b.relationship("company", "company", o.company_id, o.company_name.as_deref())
            .relationship("primary_contact", "person", o.primary_contact_id, None)
            .relationship("assignee", "user", o.assignee_id, None)
            .relationship("pipeline", "pipeline", Some(o.pipeline_id), None)
            .relationship("pipeline_stage", "pipeline_stage", Some(o.pipeline_stage_id), None)
            .relationship("customer_source", "customer_source", o.customer_source_id, None)
            .relationship("loss_reason", "loss_reason", o.loss_reason_id, None);

        b.custom_fields(&o.custom_fields);
        Ok(b.build(o.interaction_count))
    }

    fn reverse(b: &mut PayloadBuilder<'_>) -> Result<()> {
        let names: Vec<&str> = RELATIONSHIPS.iter().map(|(name, _, _)| *name).collect();
        b.known_relationships(&names)?;

        b.attrs(&["name", "status", "priority", "monetary_value", "win_probability", "details", "tags"]);
        b.timestamp_attr("close_date", "close_date")?;
        for (name, kind, field) in RELATIONSHIPS {
            b.relationship_id(name, kind, field)?;
        }
        b.custom_fields()
    }
}
