use async_trait::async_trait;
use copper_core::{EntityKind, ParentType};
use serde_json::{json, Map, Value};

use crate::client::CopperClient;
use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Copper pagination parameters. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub size: u32,
    pub number: u32,
}

impl Page {
    pub fn new(size: Option<u32>, number: Option<u32>) -> Self {
        Self {
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            number: number.unwrap_or(1).max(1),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("page_size", self.size.to_string()), ("page_number", self.number.to_string())]
    }

    fn merge_into(&self, body: &mut Map<String, Value>) {
        body.insert("page_size".into(), json!(self.size));
        body.insert("page_number".into(), json!(self.number));
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// CRUD over Copper entity kinds. Payloads and responses are Copper-native JSON.
#[async_trait]
pub trait CrmBackend: Send + Sync {
    async fn list(&self, kind: EntityKind, page: Page) -> Result<Vec<Value>, ApiError>;

    /// `query` is a Copper search body (e.g. `{"name": "Jane"}`).
    async fn search(&self, kind: EntityKind, query: Map<String, Value>, page: Page) -> Result<Vec<Value>, ApiError>;

    async fn get(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError>;

    async fn create(&self, kind: EntityKind, payload: Map<String, Value>) -> Result<Value, ApiError>;

    async fn update(&self, kind: EntityKind, id: i64, payload: Map<String, Value>) -> Result<Value, ApiError>;

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError>;

    /// Activities attached to a parent record.
    async fn activities_for(&self, parent: ParentType, id: i64, page: Page) -> Result<Vec<Value>, ApiError>;

    /// Records of kind `target` linked to `kind`/`id`. Copper answers with `{id, type}` references.
    async fn related(&self, kind: EntityKind, id: i64, target: EntityKind) -> Result<Vec<Value>, ApiError>;
}

#[async_trait]
impl CrmBackend for CopperClient {
    async fn list(&self, kind: EntityKind, page: Page) -> Result<Vec<Value>, ApiError> {
        let resp = self.get(kind.endpoint(), &page.query()).await?;
        into_list(resp)
    }

    async fn search(&self, kind: EntityKind, mut query: Map<String, Value>, page: Page) -> Result<Vec<Value>, ApiError> {
        page.merge_into(&mut query);
        let resp = self.post(&format!("{}/search", kind.endpoint()), &Value::Object(query)).await?;
        into_list(resp)
    }

    async fn get(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError> {
        CopperClient::get(self, &format!("{}/{}", kind.endpoint(), id), &[]).await
    }

    async fn create(&self, kind: EntityKind, payload: Map<String, Value>) -> Result<Value, ApiError> {
        self.post(kind.endpoint(), &Value::Object(payload)).await
    }

    async fn update(&self, kind: EntityKind, id: i64, payload: Map<String, Value>) -> Result<Value, ApiError> {
        self.put(&format!("{}/{}", kind.endpoint(), id), &Value::Object(payload)).await
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError> {
        CopperClient::delete(self, &format!("{}/{}", kind.endpoint(), id)).await
    }

    async fn activities_for(&self, parent: ParentType, id: i64, page: Page) -> Result<Vec<Value>, ApiError> {
        let mut body = Map::new();
        body.insert("parent".into(), json!({ "type": parent.as_str(), "id": id }));
        page.merge_into(&mut body);
        let resp = self.post(&format!("{}/search", EntityKind::Activity.endpoint()), &Value::Object(body)).await?;
        into_list(resp)
    }

    async fn related(&self, kind: EntityKind, id: i64, target: EntityKind) -> Result<Vec<Value>, ApiError> {
        let path = format!("{}/{}/related/{}", kind.endpoint(), id, target.endpoint());
        let resp = CopperClient::get(self, &path, &[]).await?;
        into_list(resp)
    }
}

fn into_list(resp: Value) -> Result<Vec<Value>, ApiError> {
    match resp {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::Decode(format!("expected a JSON array, got {}", type_name(&other)))),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
