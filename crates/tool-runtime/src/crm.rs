//! CRUD tools over Copper entity kinds.
//!
//! Every tool speaks MCP envelopes on both sides: write payloads go through
//! the reverse transformer (and its schema checks) before any HTTP call, and
//! Copper responses go through the forward transformer before being returned.

use async_trait::async_trait;
use copper_core::transform::stringify_id;
use copper_core::{from_mcp_as, to_mcp, EntityKind, WriteMode};
use serde_json::{json, Value};
use tracing::debug;

use crate::args;
use crate::registry::{RegistryError, ToolRegistry};
use crate::tool::{Tool, ToolContext, ToolDefinition, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Search,
        Operation::List,
        Operation::Get,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];
}

/// One operation on one entity kind, e.g. `update_opportunity`.
pub struct EntityTool {
    kind: EntityKind,
    op: Operation,
}

impl EntityTool {
    pub fn new(kind: EntityKind, op: Operation) -> Self {
        Self { kind, op }
    }

    pub fn name(&self) -> String {
        match self.op {
            Operation::Search => format!("search_{}", self.kind.endpoint()),
            Operation::List => format!("list_{}", self.kind.endpoint()),
            Operation::Get => format!("get_{}", self.kind),
            Operation::Create => format!("create_{}", self.kind),
            Operation::Update => format!("update_{}", self.kind),
            Operation::Delete => format!("delete_{}", self.kind),
        }
    }

    /// `person_id`, falling back to a bare `id`.
    fn id_key(&self) -> String {
        format!("{}_id", self.kind)
    }

    fn id(&self, args: &Value) -> Result<i64, ToolError> {
        let key = self.id_key();
        Ok(args::id(args, &[key.as_str(), "id"])?)
    }

    fn description(&self) -> String {
        let label = self.kind.as_str();
        match self.op {
            Operation::Search => format!("Search {} in Copper. `query` is a name or a Copper search object.", self.kind.endpoint()),
            Operation::List => format!("List {} in Copper, one page at a time.", self.kind.endpoint()),
            Operation::Get => format!("Fetch a single {} by Copper id.", label),
            Operation::Create => format!("Create a {} from an MCP envelope.", label),
            Operation::Update => format!("Update a {}; only fields present in the envelope are changed.", label),
            Operation::Delete => format!("Delete a {} by Copper id.", label),
        }
    }

    fn input_schema(&self) -> Value {
        let id_key = self.id_key();
        let id_schema = json!({ "type": ["integer", "string"], "description": format!("Copper {} id", self.kind) });
        let page = json!({
            "page_size": { "type": "integer", "minimum": 1, "maximum": 200 },
            "page_number": { "type": "integer", "minimum": 1 }
        });
        let data = json!({
            "type": "object",
            "description": "MCP envelope with attributes, relationships and meta"
        });

        match self.op {
            Operation::Search => {
                let mut props = page;
                props["query"] = json!({ "type": ["string", "object"] });
                json!({ "type": "object", "properties": props })
            }
            Operation::List => json!({ "type": "object", "properties": page }),
            Operation::Get | Operation::Delete => json!({
                "type": "object",
                "properties": { id_key.clone(): id_schema },
                "required": [id_key]
            }),
            Operation::Create => json!({
                "type": "object",
                "properties": { "data": data },
                "required": ["data"]
            }),
            Operation::Update => json!({
                "type": "object",
                "properties": { id_key.clone(): id_schema, "data": data },
                "required": [id_key, "data"]
            }),
        }
    }
}

#[async_trait]
impl Tool for EntityTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let kind = self.kind;
        let backend = &ctx.backend;

        match self.op {
            Operation::Search => {
                let query = args::query(&args)?;
                let page = args::page(&args)?;
                debug!(entity = %kind, page = page.number, "searching");
                let records = backend.search(kind, query, page).await?;
                envelopes(kind, records)
            }
            Operation::List => {
                let page = args::page(&args)?;
                let records = backend.list(kind, page).await?;
                envelopes(kind, records)
            }
            Operation::Get => {
                let id = self.id(&args)?;
                let record = backend.get(kind, id).await?;
                envelope(kind, record)
            }
            Operation::Create => {
                let env = args::envelope(&args, kind)?;
                let payload = from_mcp_as(kind, &env, WriteMode::Create)?;
                let record = backend.create(kind, payload).await?;
                envelope(kind, record)
            }
            Operation::Update => {
                let id = self.id(&args)?;
                let env = args::envelope(&args, kind)?;
                let payload = from_mcp_as(kind, &env, WriteMode::Update)?;
                let record = backend.update(kind, id, payload).await?;
                envelope(kind, record)
            }
            Operation::Delete => {
                let id = self.id(&args)?;
                backend.delete(kind, id).await?;
                Ok(json!({
                    "id": stringify_id(id),
                    "type": kind.as_str(),
                    "deleted": true,
                    "message": format!("{} {} deleted successfully", kind.label(), id),
                }))
            }
        }
    }
}

/// Activities hanging off any parent record.
pub struct EntityActivitiesTool;

#[async_trait]
impl Tool for EntityActivitiesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_entity_activities".to_string(),
            description: "List activities logged against a person, company, opportunity or task.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": {
                        "type": "string",
                        "enum": ["person", "company", "opportunity", "task", "lead", "project"]
                    },
                    "entity_id": { "type": ["integer", "string"] },
                    "page_size": { "type": "integer", "minimum": 1, "maximum": 200 },
                    "page_number": { "type": "integer", "minimum": 1 }
                },
                "required": ["entity_type", "entity_id"]
            }),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let parent = args::parent_type(&args, "entity_type")?;
        let id = args::id(&args, &["entity_id"])?;
        let page = args::page(&args)?;
        debug!(parent = %parent, id, "listing activities");
        let records = ctx.backend.activities_for(parent, id, page).await?;
        envelopes(EntityKind::Activity, records)
    }
}

/// Records linked to a person, company or opportunity.
///
/// Copper answers with bare `{id, type}` references; each one is fetched so
/// the result is a list of full envelopes of the related kind.
pub struct EntityRelatedTool;

const RELATED_SOURCES: [EntityKind; 3] = [EntityKind::Person, EntityKind::Company, EntityKind::Opportunity];
const RELATED_TARGETS: [EntityKind; 4] = [
    EntityKind::Person,
    EntityKind::Company,
    EntityKind::Opportunity,
    EntityKind::Task,
];

#[async_trait]
impl Tool for EntityRelatedTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_related_records".to_string(),
            description: "List records of one kind linked to a person, company or opportunity.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": { "type": "string", "enum": ["person", "company", "opportunity"] },
                    "entity_id": { "type": ["integer", "string"] },
                    "related_type": { "type": "string", "enum": ["person", "company", "opportunity", "task"] }
                },
                "required": ["entity_type", "entity_id", "related_type"]
            }),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let kind = args::entity_kind(&args, "entity_type", &RELATED_SOURCES)?;
        let id = args::id(&args, &["entity_id"])?;
        let target = args::entity_kind(&args, "related_type", &RELATED_TARGETS)?;
        debug!(entity = %kind, id, related = %target, "listing related records");

        let refs = ctx.backend.related(kind, id, target).await?;
        let mut records = Vec::with_capacity(refs.len());
        for item in refs {
            records.push(match bare_reference(&item) {
                Some(related_id) => ctx.backend.get(target, related_id).await?,
                None => item,
            });
        }
        envelopes(target, records)
    }
}

/// The id of a `{id, type}` reference carrying no other fields.
fn bare_reference(item: &Value) -> Option<i64> {
    let obj = item.as_object()?;
    if obj.keys().any(|k| k != "id" && k != "type") {
        return None;
    }
    obj.get("id").and_then(Value::as_i64)
}

/// Register every CRM tool: six operations per entity kind, `get_entity_activities`
/// and `get_related_records`.
pub fn register_crm_tools(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    for kind in EntityKind::ALL {
        for op in Operation::ALL {
            registry.register(EntityTool::new(kind, op))?;
        }
    }
    registry.register(EntityActivitiesTool)?;
    registry.register(EntityRelatedTool)
}

fn envelope(kind: EntityKind, record: Value) -> Result<Value, ToolError> {
    let env = to_mcp(kind, record)?;
    Ok(json!(env))
}

fn envelopes(kind: EntityKind, records: Vec<Value>) -> Result<Value, ToolError> {
    let items = records
        .into_iter()
        .map(|r| to_mcp(kind, r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!(items))
}
