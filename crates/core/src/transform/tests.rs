use serde_json::{json, Value};

use super::*;
use crate::envelope::McpEnvelope;

fn forward(kind: EntityKind, raw: Value) -> McpEnvelope {
    to_mcp(kind, raw).expect("forward transform")
}

fn rel(env: &McpEnvelope, name: &str) -> Value {
    serde_json::to_value(&env.relationships[name]).unwrap()["data"].clone()
}

#[test]
fn person_primary_email_and_source_id() {
    let env = forward(
        EntityKind::Person,
        json!({
            "id": 123,
            "name": "Jane Doe",
            "emails": [
                { "email": "jane@personal.com", "category": "personal" },
                { "email": "jane@work.com", "category": "work" }
            ]
        }),
    );
    assert_eq!(env.attributes["email"], "jane@work.com");
    assert_eq!(env.source_id.as_deref(), Some("123"));
    assert_eq!(env.source, "copper");
    assert_eq!(env.attributes["first_name"], "Jane");
    assert_eq!(env.attributes["last_name"], "Doe");
    // full list kept in original order
    assert_eq!(env.meta["emails"][0]["email"], "jane@personal.com");
    assert_eq!(env.meta["interaction_count"], 0);
    assert_eq!(rel(&env, "company"), Value::Null);
}

#[test]
fn activity_parent_and_date() {
    let env = forward(
        EntityKind::Activity,
        json!({
            "type": { "category": "user", "id": 123 },
            "details": "Test note",
            "activity_date": 1234567890,
            "parent": { "type": "person", "id": 456 }
        }),
    );
    assert_eq!(rel(&env, "parent"), json!({ "type": "person", "id": "456" }));
    assert_eq!(env.attributes["activity_date"], "2009-02-13T23:31:30Z");
    assert_eq!(env.attributes["activity_type"], json!({ "category": "user", "id": "123" }));
    assert_eq!(env.attributes["name"], "Test note");
    assert_eq!(env.attributes["created_at"], Value::Null);
}

#[test]
fn activity_parent_type_is_lower_cased() {
    let env = forward(
        EntityKind::Activity,
        json!({ "type": { "category": "user", "id": 0 }, "parent": { "type": "Opportunity", "id": 9 } }),
    );
    assert_eq!(rel(&env, "parent")["type"], "opportunity");
}

#[test]
fn negative_opportunity_value_fails_before_any_write() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "opportunity",
        "attributes": { "name": "Big deal", "monetary_value": -1000 },
        "relationships": {
            "pipeline": { "data": { "type": "pipeline", "id": "1" } },
            "pipeline_stage": { "data": { "type": "pipeline_stage", "id": "2" } }
        }
    }))
    .unwrap();
    let err = from_mcp(&env, WriteMode::Create).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "monetary_value"));
}

#[test]
fn company_without_assignee_has_null_relationship() {
    let env = forward(EntityKind::Company, json!({ "id": 5, "name": "Acme", "assignee_id": null }));
    assert_eq!(rel(&env, "assignee"), Value::Null);
    let wire = serde_json::to_value(&env).unwrap();
    assert_eq!(wire["relationships"]["assignee"], json!({ "data": null }));
}

#[test]
fn task_without_assignee_leaves_field_unset() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "task",
        "attributes": { "name": "Send proposal", "due_date": "2024-03-01T12:00:00Z", "created_at": null },
        "relationships": {
            "related_resource": { "data": { "type": "opportunity", "id": "77" } }
        }
    }))
    .unwrap();
    let payload = from_mcp(&env, WriteMode::Create).unwrap();
    assert!(!payload.contains_key("assignee_id"));
    assert!(!payload.contains_key("created_at"));
    assert_eq!(payload["related_resource"], json!({ "type": "opportunity", "id": 77 }));
    assert_eq!(payload["due_date"], 1709294400);
}

#[test]
fn null_relationship_data_is_not_sent() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "company",
        "attributes": { "name": "Acme" },
        "relationships": { "assignee": { "data": null } }
    }))
    .unwrap();
    let payload = from_mcp(&env, WriteMode::Update).unwrap();
    assert!(!payload.contains_key("assignee_id"));
}

#[test]
fn opportunity_round_trip_keeps_ids_and_scalars() {
    let raw = json!({
        "id": 900,
        "name": "Renewal",
        "pipeline_id": 11,
        "pipeline_stage_id": 12,
        "company_id": 13,
        "company_name": "Acme",
        "primary_contact_id": 14,
        "assignee_id": 15,
        "customer_source_id": 16,
        "loss_reason_id": 17,
        "status": "Open",
        "priority": "High",
        "monetary_value": 25000,
        "win_probability": 40,
        "close_date": 1735689600,
        "details": "Annual renewal",
        "tags": ["q1"],
        "custom_fields": [{ "custom_field_definition_id": 3, "value": "gold" }]
    });
    let env = forward(EntityKind::Opportunity, raw.clone());
    assert_eq!(env.meta["custom_fields"], json!([{ "id": "3", "value": "gold" }]));
    assert_eq!(rel(&env, "company")["name"], "Acme");

    let payload = from_mcp(&env, WriteMode::Create).unwrap();
    for field in [
        "pipeline_id",
        "pipeline_stage_id",
        "company_id",
        "primary_contact_id",
        "assignee_id",
        "customer_source_id",
        "loss_reason_id",
        "name",
        "status",
        "priority",
        "monetary_value",
        "win_probability",
        "close_date",
        "details",
        "tags",
    ] {
        assert_eq!(payload[field], raw[field], "field {}", field);
    }
    assert_eq!(
        payload["custom_fields"],
        json!([{ "custom_field_definition_id": 3, "value": "gold" }])
    );
}

#[test]
fn person_round_trip() {
    let raw = json!({
        "id": 1,
        "name": "Jane Doe",
        "title": "CTO",
        "company_id": 2,
        "company_name": "Acme",
        "assignee_id": 3,
        "contact_type_id": 4,
        "details": "met at conf",
        "emails": [{ "email": "jane@acme.com", "category": "work" }],
        "phone_numbers": [{ "number": "555-0100", "category": "mobile" }],
        "address": { "city": "Berlin", "country": "DE" },
        "tags": ["vip"]
    });
    let env = forward(EntityKind::Person, raw.clone());
    assert_eq!(env.attributes["address"]["city"], "Berlin");
    let payload = from_mcp(&env, WriteMode::Create).unwrap();
    for field in ["name", "title", "company_id", "company_name", "assignee_id", "contact_type_id", "details", "tags"] {
        assert_eq!(payload[field], raw[field], "field {}", field);
    }
    assert_eq!(payload["emails"], raw["emails"]);
    assert_eq!(payload["phone_numbers"], raw["phone_numbers"]);
}

#[test]
fn activity_round_trip() {
    let raw = json!({
        "id": 50,
        "type": { "category": "user", "id": 123 },
        "details": "Call",
        "activity_date": 1234567890,
        "parent": { "type": "company", "id": 456 },
        "assignee_id": 7,
        "user_id": 8
    });
    let env = forward(EntityKind::Activity, raw.clone());
    let payload = from_mcp(&env, WriteMode::Create).unwrap();
    for field in ["type", "details", "activity_date", "parent", "assignee_id", "user_id"] {
        assert_eq!(payload[field], raw[field], "field {}", field);
    }
}

#[test]
fn person_create_from_flat_email() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "person",
        "attributes": { "name": "Sam Lee", "email": "sam@example.com" }
    }))
    .unwrap();
    let payload = from_mcp(&env, WriteMode::Create).unwrap();
    assert_eq!(payload["emails"], json!([{ "email": "sam@example.com", "category": "work" }]));
}

#[test]
fn create_enforces_required_fields() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "person",
        "attributes": { "name": "No Email" }
    }))
    .unwrap();
    let err = from_mcp(&env, WriteMode::Create).unwrap_err();
    assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "emails"));

    // the same envelope is a valid partial update
    assert!(from_mcp(&env, WriteMode::Update).is_ok());

    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "opportunity",
        "attributes": { "name": "Deal" },
        "relationships": { "pipeline": { "data": { "type": "pipeline", "id": "1" } } }
    }))
    .unwrap();
    let err = from_mcp(&env, WriteMode::Create).unwrap_err();
    assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "pipeline_stage_id"));
}

#[test]
fn forward_rejects_records_missing_required_fields() {
    assert!(to_mcp(EntityKind::Person, json!({ "id": 1, "name": "Jane" })).is_err());
    assert!(to_mcp(EntityKind::Opportunity, json!({ "id": 1, "name": "Deal", "pipeline_id": 2 })).is_err());
}

#[test]
fn mismatched_relationship_type_is_a_transformation_error() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "person",
        "attributes": { "name": "Jane" },
        "relationships": { "company": { "data": { "type": "person", "id": "9" } } }
    }))
    .unwrap();
    let err = from_mcp(&env, WriteMode::Update).unwrap_err();
    assert_eq!(err.code(), "TRANSFORMATION_ERROR");
    match err {
        CopperError::Transformation { fragment: Some(fragment), .. } => {
            assert_eq!(fragment["company"]["data"]["type"], "person");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_relationship_and_bad_ids_are_rejected() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "task",
        "attributes": { "name": "x" },
        "relationships": { "owner": { "data": { "type": "user", "id": "1" } } }
    }))
    .unwrap();
    assert_eq!(from_mcp(&env, WriteMode::Update).unwrap_err().code(), "TRANSFORMATION_ERROR");

    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "task",
        "attributes": { "name": "x" },
        "relationships": { "assignee": { "data": { "type": "user", "id": "abc" } } }
    }))
    .unwrap();
    assert_eq!(from_mcp(&env, WriteMode::Update).unwrap_err().code(), "TRANSFORMATION_ERROR");

    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "activity",
        "attributes": { "activity_type": { "category": "user", "id": "0" } },
        "relationships": { "parent": { "data": { "type": "invoice", "id": "1" } } }
    }))
    .unwrap();
    assert_eq!(from_mcp(&env, WriteMode::Create).unwrap_err().code(), "TRANSFORMATION_ERROR");
}

#[test]
fn legacy_custom_field_map_is_accepted() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "company",
        "attributes": { "name": "Acme" },
        "meta": { "custom_fields": { "12": "blue" } }
    }))
    .unwrap();
    let payload = from_mcp(&env, WriteMode::Create).unwrap();
    assert_eq!(
        payload["custom_fields"],
        json!([{ "custom_field_definition_id": 12, "value": "blue" }])
    );
}

#[test]
fn envelope_kind_must_match_transformer() {
    let env = McpEnvelope::new(EntityKind::Company);
    let err = envelope_to_payload::<PersonTransformer>(&env, WriteMode::Update).unwrap_err();
    assert_eq!(err.code(), "TRANSFORMATION_ERROR");

    let err = from_mcp_as(EntityKind::Task, &env, WriteMode::Update).unwrap_err();
    assert_eq!(err.details()["fragment"], json!({ "type": "company" }));
    assert!(from_mcp_as(EntityKind::Company, &env, WriteMode::Update).is_ok());
}

#[test]
fn task_timestamps_are_always_present() {
    let env = forward(EntityKind::Task, json!({ "id": 3, "name": "Call back", "due_date": 0 }));
    assert_eq!(env.attributes["due_date"], Value::Null);
    assert_eq!(env.attributes["reminder_date"], Value::Null);
    assert!(!env.attributes.contains_key("status"));
    assert_eq!(rel(&env, "related_resource"), Value::Null);
}

#[test]
fn edited_primary_email_replaces_its_entry_in_place() {
    let mut env = forward(
        EntityKind::Person,
        json!({
            "id": 1,
            "name": "Jane Doe",
            "emails": [
                { "email": "jane@home.com", "category": "personal" },
                { "email": "old@acme.com", "category": "work" },
                { "email": "second@acme.com", "category": "work" }
            ]
        }),
    );
    assert_eq!(env.attributes["email"], "old@acme.com");
    env.attributes.insert("email".into(), json!("new@acme.com"));

    let payload = from_mcp(&env, WriteMode::Update).unwrap();
    assert_eq!(
        payload["emails"],
        json!([
            { "email": "jane@home.com", "category": "personal" },
            { "email": "new@acme.com", "category": "work" },
            { "email": "second@acme.com", "category": "work" }
        ])
    );
}

#[test]
fn edited_phone_without_work_entry_replaces_first() {
    let mut env = forward(
        EntityKind::Person,
        json!({
            "id": 1,
            "name": "Jane Doe",
            "emails": [{ "email": "jane@acme.com", "category": "work" }],
            "phone_numbers": [
                { "number": "555-0100", "category": "mobile" },
                { "number": "555-0101", "category": "home" }
            ]
        }),
    );
    env.attributes.insert("phone".into(), json!("555-0199"));

    let payload = from_mcp(&env, WriteMode::Update).unwrap();
    assert_eq!(
        payload["phone_numbers"],
        json!([
            { "number": "555-0199", "category": "mobile" },
            { "number": "555-0101", "category": "home" }
        ])
    );
    assert_eq!(payload["emails"], json!([{ "email": "jane@acme.com", "category": "work" }]));
}

#[test]
fn flat_contact_on_empty_list_becomes_work_entry() {
    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "person",
        "attributes": { "email": "sam@example.com" },
        "meta": { "emails": [] }
    }))
    .unwrap();
    let payload = from_mcp(&env, WriteMode::Update).unwrap();
    assert_eq!(payload["emails"], json!([{ "email": "sam@example.com", "category": "work" }]));

    let env: McpEnvelope = serde_json::from_value(json!({
        "type": "person",
        "meta": { "emails": "sam@example.com" }
    }))
    .unwrap();
    let err = from_mcp(&env, WriteMode::Update).unwrap_err();
    assert_eq!(err.code(), "TRANSFORMATION_ERROR");
}

#[test]
fn edited_company_website_and_phone_are_written_back() {
    let mut env = forward(
        EntityKind::Company,
        json!({
            "id": 5,
            "name": "Acme",
            "websites": ["http://old.example"],
            "phone_numbers": [
                { "number": "555-0100", "category": "other" },
                { "number": "555-0200", "category": "work" }
            ]
        }),
    );
    assert_eq!(env.attributes["website"], "http://old.example");
    env.attributes.insert("website".into(), json!("https://new.example"));
    env.attributes.insert("phone".into(), json!("555-0299"));

    let payload = from_mcp(&env, WriteMode::Update).unwrap();
    assert_eq!(payload["websites"][0]["url"], "https://new.example");
    assert_eq!(payload["websites"].as_array().unwrap().len(), 1);
    assert_eq!(
        payload["phone_numbers"],
        json!([
            { "number": "555-0100", "category": "other" },
            { "number": "555-0299", "category": "work" }
        ])
    );
}

#[test]
fn edited_activity_name_becomes_details() {
    let mut env = forward(
        EntityKind::Activity,
        json!({
            "id": 50,
            "type": { "category": "user", "id": 0 },
            "details": "old note",
            "parent": { "type": "person", "id": 1 }
        }),
    );
    env.attributes.insert("name".into(), json!("new note"));
    let payload = from_mcp(&env, WriteMode::Update).unwrap();
    assert_eq!(payload["details"], "new note");

    env.attributes.remove("name");
    env.attributes.insert("details".into(), json!("edited details"));
    let payload = from_mcp(&env, WriteMode::Update).unwrap();
    assert_eq!(payload["details"], "edited details");
}

#[test]
fn partial_address_has_no_null_members() {
    let env = forward(
        EntityKind::Company,
        json!({ "id": 5, "name": "Acme", "address": { "city": "Berlin" } }),
    );
    assert_eq!(env.attributes["address"], json!({ "city": "Berlin" }));

    let payload = from_mcp(&env, WriteMode::Update).unwrap();
    assert_eq!(payload["address"], json!({ "city": "Berlin" }));
}
