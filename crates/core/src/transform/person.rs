use serde_json::json;

use super::{primary_contact, EnvelopeBuilder, PayloadBuilder, Transformer};
use crate::entity::EntityKind;
use crate::envelope::McpEnvelope;
use crate::error::Result;
use crate::models::{Person, PersonUpdate};

pub struct PersonTransformer;

const RELATIONSHIPS: &[&str] = &["company", "assignee"];

impl Transformer for PersonTransformer {
    const KIND: EntityKind = EntityKind::Person;
    type Record = Person;
    type Update = PersonUpdate;

    fn forward(p: &Person) -> Result<McpEnvelope> {
        let (first_name, last_name) = if p.has_name_components() {
            (p.first_name.clone(), p.last_name.clone())
        } else {
            split_name(&p.name)
        };

        let mut b = EnvelopeBuilder::new(Self::KIND, p.id);
        b.attr("name", p.name.as_str())
            .attr_opt("prefix", p.prefix.as_deref())
            .attr_opt("first_name", first_name)
            .attr_opt("middle_name", p.middle_name.as_deref())
            .attr_opt("last_name", last_name)
            .attr_opt("suffix", p.suffix.as_deref())
            .attr_opt("title", p.title.as_deref())
            .attr_opt("company", p.company_name.as_deref())
            .attr_opt("email", primary_contact(&p.emails))
            .attr_opt("phone", primary_contact(&p.phone_numbers))
            .attr_opt("details", p.details.as_deref())
            .attr("tags", p.tags.clone())
            .address(p.address.as_ref());
        b.timestamps(p.date_created, p.date_modified)?;

        b.relationship("company", "company", p.company_id, p.company_name.as_deref())
            .relationship("assignee", "user", p.assignee_id, None);

        b.meta("contact_type_id", p.contact_type_id)
            .meta("emails", json!(p.emails))
            .meta("phone_numbers", json!(p.phone_numbers))
            .meta("socials", json!(p.socials))
            .meta("websites", json!(p.websites))
            .custom_fields(&p.custom_fields);

        Ok(b.build(p.interaction_count))
    }

    fn reverse(b: &mut PayloadBuilder<'_>) -> Result<()> {
        b.known_relationships(RELATIONSHIPS)?;
        b.attrs(&[
            "name", "prefix", "first_name", "middle_name", "last_name", "suffix", "title", "details", "tags", "address",
        ]);
        b.attr_as("company", "company_name");
        b.relationship_id("company", "company", "company_id")?;
        b.relationship_id("assignee", "user", "assignee_id")?;

        b.meta_as("contact_type_id", "contact_type_id");
        b.meta_as("socials", "socials");
        b.meta_as("websites", "websites");
        b.contact_list("emails", "email", "email")?;
        b.contact_list("phone_numbers", "phone", "number")?;

        b.custom_fields()
    }
}

/// First token and the rest, for records without structured name parts.
fn split_name(name: &str) -> (Option<String>, Option<String>) {
    let mut parts = name.split_whitespace();
    let first = parts.next().map(str::to_string);
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, Some(rest).filter(|r| !r.is_empty()))
}
