//! In-memory `CrmBackend` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use copper_client::{ApiError, CrmBackend, Page};
use copper_core::{EntityKind, ParentType};
use serde_json::{json, Map, Value};

/// One backend call, recorded in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub kind: EntityKind,
    pub id: Option<i64>,
    pub body: Option<Value>,
}

/// Stores Copper-native records keyed by kind and id.
pub struct MemoryBackend {
    records: Mutex<HashMap<(EntityKind, i64), Value>>,
    links: Mutex<Vec<((EntityKind, i64), (EntityKind, i64))>>,
    next_id: AtomicI64,
    calls: Mutex<Vec<Call>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            links: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1000),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Seed a record. Its `id` field is used as the key.
    pub fn insert(&self, kind: EntityKind, record: Value) {
        let id = record["id"].as_i64().unwrap_or_else(|| self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut record = record;
        record["id"] = json!(id);
        self.records.lock().unwrap().insert((kind, id), record);
    }

    /// Relate two records in both directions.
    pub fn link(&self, from: (EntityKind, i64), to: (EntityKind, i64)) {
        let mut links = self.links.lock().unwrap();
        links.push((from, to));
        links.push((to, from));
    }

    pub fn record(&self, kind: EntityKind, id: i64) -> Option<Value> {
        self.records.lock().unwrap().get(&(kind, id)).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, method: &'static str, kind: EntityKind, id: Option<i64>, body: Option<Value>) {
        self.calls.lock().unwrap().push(Call { method, kind, id, body });
    }

    fn not_found(kind: EntityKind, id: i64) -> ApiError {
        ApiError::NotFound {
            resource_type: kind.endpoint().to_string(),
            resource_id: id.to_string(),
        }
    }

    fn page_of(mut records: Vec<Value>, page: Page) -> Vec<Value> {
        records.sort_by_key(|r| r["id"].as_i64());
        let skip = (page.number as usize - 1) * page.size as usize;
        records.into_iter().skip(skip).take(page.size as usize).collect()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrmBackend for MemoryBackend {
    async fn list(&self, kind: EntityKind, page: Page) -> Result<Vec<Value>, ApiError> {
        self.log("list", kind, None, None);
        let records = self.records.lock().unwrap();
        let matching = records.iter().filter(|((k, _), _)| *k == kind).map(|(_, r)| r.clone()).collect();
        Ok(Self::page_of(matching, page))
    }

    async fn search(&self, kind: EntityKind, query: Map<String, Value>, page: Page) -> Result<Vec<Value>, ApiError> {
        self.log("search", kind, None, Some(Value::Object(query.clone())));
        let needle = query.get("name").and_then(Value::as_str).map(str::to_lowercase);
        let records = self.records.lock().unwrap();
        let matching = records
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .filter(|(_, r)| match (&needle, r["name"].as_str()) {
                (None, _) => true,
                (Some(n), Some(name)) => name.to_lowercase().contains(n.as_str()),
                (Some(_), None) => false,
            })
            .map(|(_, r)| r.clone())
            .collect();
        Ok(Self::page_of(matching, page))
    }

    async fn get(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError> {
        self.log("get", kind, Some(id), None);
        self.record(kind, id).ok_or_else(|| Self::not_found(kind, id))
    }

    async fn create(&self, kind: EntityKind, payload: Map<String, Value>) -> Result<Value, ApiError> {
        self.log("create", kind, None, Some(Value::Object(payload.clone())));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut record = Value::Object(payload);
        record["id"] = json!(id);
        record["date_created"] = json!(1_700_000_000);
        self.records.lock().unwrap().insert((kind, id), record.clone());
        Ok(record)
    }

    async fn update(&self, kind: EntityKind, id: i64, payload: Map<String, Value>) -> Result<Value, ApiError> {
        self.log("update", kind, Some(id), Some(Value::Object(payload.clone())));
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&(kind, id)).ok_or_else(|| Self::not_found(kind, id))?;
        if let Value::Object(existing) = record {
            existing.extend(payload);
            existing.insert("date_modified".into(), json!(1_700_000_100));
        }
        Ok(record.clone())
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError> {
        self.log("delete", kind, Some(id), None);
        self.records
            .lock()
            .unwrap()
            .remove(&(kind, id))
            .map(|_| json!({ "id": id, "is_deleted": true }))
            .ok_or_else(|| Self::not_found(kind, id))
    }

    async fn activities_for(&self, parent: ParentType, id: i64, page: Page) -> Result<Vec<Value>, ApiError> {
        self.log("activities_for", EntityKind::Activity, Some(id), Some(json!({ "type": parent.as_str() })));
        let records = self.records.lock().unwrap();
        let matching = records
            .iter()
            .filter(|((k, _), r)| {
                *k == EntityKind::Activity
                    && r["parent"]["id"].as_i64() == Some(id)
                    && r["parent"]["type"]
                        .as_str()
                        .is_some_and(|t| t.eq_ignore_ascii_case(parent.as_str()))
            })
            .map(|(_, r)| r.clone())
            .collect();
        Ok(Self::page_of(matching, page))
    }

    async fn related(&self, kind: EntityKind, id: i64, target: EntityKind) -> Result<Vec<Value>, ApiError> {
        self.log("related", kind, Some(id), Some(json!({ "target": target.endpoint() })));
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .filter(|(from, to)| *from == (kind, id) && to.0 == target)
            .map(|(_, (k, other))| json!({ "id": other, "type": k.as_str() }))
            .collect())
    }
}
