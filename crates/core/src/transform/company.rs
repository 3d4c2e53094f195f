use serde_json::json;

use super::{primary_contact, EnvelopeBuilder, PayloadBuilder, Transformer};
use crate::entity::EntityKind;
use crate::envelope::McpEnvelope;
use crate::error::Result;
use crate::models::{Company, CompanyUpdate};

pub struct CompanyTransformer;

const RELATIONSHIPS: &[&str] = &["assignee", "primary_contact"];

impl Transformer for CompanyTransformer {
    const KIND: EntityKind = EntityKind::Company;
    type Record = Company;
    type Update = CompanyUpdate;

    fn forward(c: &Company) -> Result<McpEnvelope> {
        let mut b = EnvelopeBuilder::new(Self::KIND, c.id);
        b.attr("name", c.name.as_str())
            .attr_opt("phone", primary_contact(&c.phone_numbers))
            .attr_opt("website", primary_contact(&c.websites))
            .attr_opt("industry", c.industry.as_deref())
            .attr_opt("annual_revenue", c.annual_revenue.clone())
            .attr_opt("employee_count", c.employee_count)
            .attr_opt("status", c.status.as_deref())
            .attr_opt("email_domain", c.email_domain.as_deref())
            .attr_opt("details", c.details.as_deref())
            .attr("tags", c.tags.clone())
            .address(c.address.as_ref());
        b.timestamps(c.date_created, c.date_modified)?;

        b.relationship("assignee", "user", c.assignee_id, None)
            .relationship("primary_contact", "person", c.primary_contact_id, None);

        b.meta("contact_type_id", c.contact_type_id)
            .meta("phone_numbers", json!(c.phone_numbers))
            .meta("socials", json!(c.socials))
            .meta("websites", json!(c.websites))
            .custom_fields(&c.custom_fields);

        Ok(b.build(c.interaction_count))
    }

    fn reverse(b: &mut PayloadBuilder<'_>) -> Result<()> {
        b.known_relationships(RELATIONSHIPS)?;
        b.attrs(&[
            "name", "industry", "annual_revenue", "employee_count", "status", "email_domain", "details", "tags",
            "address",
        ]);
        b.relationship_id("assignee", "user", "assignee_id")?;
        b.relationship_id("primary_contact", "person", "primary_contact_id")?;

        b.meta_as("contact_type_id", "contact_type_id");
        b.meta_as("socials", "socials");
        b.contact_list("phone_numbers", "phone", "number")?;
        b.contact_list("websites", "website", "url")?;

        b.custom_fields()
    }
}
