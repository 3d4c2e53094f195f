use std::collections::BTreeMap;
use std::sync::Arc;

use crate::tool::{Tool, ToolDefinition};

/// Tools keyed by name. Iteration order is alphabetical, so listings are stable.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: BTreeMap::new() }
    }

    /// Fails if a tool with the same name is already registered.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), RegistryError> {
        let name = tool.definition().name;
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        tracing::trace!(tool = %name, "registered");
        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Definitions sorted by tool name.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool `{0}` is already registered")]
    DuplicateName(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::{EntityTool, Operation};
    use copper_core::EntityKind;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(EntityTool::new(EntityKind::Person, Operation::Get)).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("get_person").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ToolRegistry::new();
        registry.register(EntityTool::new(EntityKind::Task, Operation::Delete)).unwrap();
        let err = registry.register(EntityTool::new(EntityKind::Task, Operation::Delete)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(ref name) if name == "delete_task"));
    }

    #[test]
    fn test_list_is_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(EntityTool::new(EntityKind::Person, Operation::Search)).unwrap();
        registry.register(EntityTool::new(EntityKind::Company, Operation::Get)).unwrap();

        let names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["get_company", "search_people"]);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["get_company", "search_people"]);
    }
}
