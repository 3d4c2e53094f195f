//! Argument extraction for CRM tools.

use copper_client::Page;
use copper_core::{CopperError, EntityKind, McpEnvelope, ParentType};
use serde_json::{json, Map, Value};

/// First of `keys` holding an integer or a numeric string.
pub fn id(args: &Value, keys: &[&str]) -> Result<i64, CopperError> {
    let field = keys.first().copied().unwrap_or("id");
    let Some((key, raw)) = keys.iter().find_map(|k| args.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v))) else {
        return Err(CopperError::validation(field, "is required"));
    };
    let parsed = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match parsed {
        Some(id) if id > 0 => Ok(id),
        _ => Err(CopperError::invalid_value(key, "must be a positive integer id", raw.clone())),
    }
}

pub fn page(args: &Value) -> Result<Page, CopperError> {
    Ok(Page::new(optional_u32(args, "page_size")?, optional_u32(args, "page_number")?))
}

fn optional_u32(args: &Value, key: &str) -> Result<Option<u32>, CopperError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| CopperError::invalid_value(key, "must be a non-negative integer", v.clone())),
    }
}

/// Search body: a bare string searches by name, an object is passed through.
pub fn query(args: &Value) -> Result<Map<String, Value>, CopperError> {
    match args.get("query") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::String(s)) => {
            let mut body = Map::new();
            body.insert("name".into(), json!(s));
            Ok(body)
        }
        Some(Value::Object(o)) => Ok(o.clone()),
        Some(other) => Err(CopperError::invalid_value("query", "must be a string or an object", other.clone())),
    }
}

/// The `data` envelope. A missing `type` defaults to the tool's entity kind.
pub fn envelope(args: &Value, kind: EntityKind) -> Result<McpEnvelope, CopperError> {
    let mut data = match args.get("data") {
        Some(Value::Object(o)) => o.clone(),
        Some(other) => return Err(CopperError::invalid_value("data", "must be an object", other.clone())),
        None => return Err(CopperError::validation("data", "is required")),
    };
    data.entry("type").or_insert_with(|| json!(kind.as_str()));
    serde_json::from_value(Value::Object(data)).map_err(|e| CopperError::validation("data", e.to_string()))
}

pub fn parent_type(args: &Value, key: &str) -> Result<ParentType, CopperError> {
    match args.get(key) {
        Some(Value::String(s)) => s.parse().map_err(|_| {
            CopperError::invalid_value(
                key,
                "must be one of person, company, opportunity, lead, project, task",
                json!(s),
            )
        }),
        Some(other) => Err(CopperError::invalid_value(key, "must be a string", other.clone())),
        None => Err(CopperError::validation(key, "is required")),
    }
}

/// An entity type name (singular or plural) restricted to `allowed`.
pub fn entity_kind(args: &Value, key: &str, allowed: &[EntityKind]) -> Result<EntityKind, CopperError> {
    let raw = match args.get(key) {
        Some(Value::String(s)) => s,
        Some(other) => return Err(CopperError::invalid_value(key, "must be a string", other.clone())),
        None => return Err(CopperError::validation(key, "is required")),
    };
    raw.parse::<EntityKind>().ok().filter(|k| allowed.contains(k)).ok_or_else(|| {
        let names = allowed.iter().map(EntityKind::as_str).collect::<Vec<_>>().join(", ");
        CopperError::invalid_value(key, format!("must be one of {names}"), json!(raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        assert_eq!(id(&json!({ "person_id": 12 }), &["person_id", "id"]).unwrap(), 12);
        assert_eq!(id(&json!({ "id": "34" }), &["person_id", "id"]).unwrap(), 34);

        let err = id(&json!({ "person_id": "abc" }), &["person_id", "id"]).unwrap_err();
        assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "person_id"));
        let err = id(&json!({}), &["task_id", "id"]).unwrap_err();
        assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "task_id"));
    }

    #[test]
    fn string_query_searches_by_name() {
        assert_eq!(query(&json!({ "query": "Jane" })).unwrap()["name"], "Jane");
        assert_eq!(query(&json!({ "query": { "emails": ["a@b.c"] } })).unwrap()["emails"][0], "a@b.c");
        assert!(query(&json!({ "query": 5 })).is_err());
    }

    #[test]
    fn envelope_type_defaults_to_kind() {
        let env = envelope(&json!({ "data": { "attributes": { "name": "Acme" } } }), EntityKind::Company).unwrap();
        assert_eq!(env.kind, EntityKind::Company);
        assert!(envelope(&json!({}), EntityKind::Company).is_err());
    }

    #[test]
    fn page_arguments() {
        let p = page(&json!({ "page_size": 500, "page_number": 2 })).unwrap();
        assert_eq!((p.size, p.number), (200, 2));
        assert!(page(&json!({ "page_size": -1 })).is_err());
    }

    #[test]
    fn entity_kinds_accept_plurals_within_allowed_set() {
        let allowed = [EntityKind::Person, EntityKind::Company];
        assert_eq!(entity_kind(&json!({ "t": "people" }), "t", &allowed).unwrap(), EntityKind::Person);
        let err = entity_kind(&json!({ "t": "task" }), "t", &allowed).unwrap_err();
        assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "t"));
        assert!(entity_kind(&json!({}), "t", &allowed).is_err());
    }
}
