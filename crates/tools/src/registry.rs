//! Name-keyed tool registry, validated when it is built.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use gl_domain::error::{Error, Result};
use gl_domain::tool::ToolDefinition;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The uniform contract the orchestrator dispatches through.
#[async_trait::async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Execute `name` with `arguments`. Failures carry a human-readable
    /// message the caller may hand back to the model.
    async fn dispatch(&self, name: &str, arguments: &Map<String, Value>) -> Result<Value>;

    /// Schema advertised to the model.
    fn list_tools(&self) -> &[ToolDefinition];
}

/// A single tool implementation.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Immutable mapping from tool name to handler, plus the definitions in
/// registration order.
pub struct ToolRegistry {
    defs: Vec<ToolDefinition>,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// A registry with no tools.
    pub fn empty() -> Self {
        Self {
            defs: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[async_trait::async_trait]
impl ToolDispatcher for ToolRegistry {
    async fn dispatch(&self, name: &str, arguments: &Map<String, Value>) -> Result<Value> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        handler.call(arguments).await
    }

    fn list_tools(&self) -> &[ToolDefinition] {
        &self.defs
    }
}

/// Collects definitions and handlers; [`build`](Self::build) checks the
/// advertised schema against the handlers.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    entries: Vec<(ToolDefinition, Arc<dyn ToolHandler>)>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, def: ToolDefinition, handler: Arc<dyn ToolHandler>) -> Self {
        self.entries.push((def, handler));
        self
    }

    /// Validate and freeze the registry.
    ///
    /// Rejects empty or duplicate names and argument schemas that are not
    /// JSON-Schema objects. The `type` keyword is matched case-insensitively
    /// so Gemini-style `"OBJECT"` declarations are accepted.
    pub fn build(self) -> Result<ToolRegistry> {
        let mut defs = Vec::with_capacity(self.entries.len());
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();

        for (def, handler) in self.entries {
            let name = def.name.trim();
            if name.is_empty() {
                return Err(Error::Config("tool with empty name".into()));
            }
            if name != def.name {
                return Err(Error::Config(format!(
                    "tool name '{}' has surrounding whitespace",
                    def.name
                )));
            }
            if handlers.contains_key(name) {
                return Err(Error::Config(format!("duplicate tool '{name}'")));
            }
            let schema_type = def.parameters.get("type").and_then(|t| t.as_str());
            let object_typed = schema_type.map_or(true, |t| t.eq_ignore_ascii_case("object"));
            if !def.parameters.is_object() || !object_typed {
                return Err(Error::Config(format!(
                    "tool '{name}': parameters must be an object schema"
                )));
            }
            handlers.insert(def.name.clone(), handler);
            defs.push(def);
        }

        Ok(ToolRegistry { defs, handlers })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait::async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, arguments: &Map<String, Value>) -> Result<Value> {
            Ok(Value::Object(arguments.clone()))
        }
    }

    fn def(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.into(),
            description: String::new(),
            parameters: json!({"type": "object", "properties": {}}),
        }
    }

    #[tokio::test]
    async fn dispatches_by_name() {
        let registry = ToolRegistry::builder()
            .register(def("echo"), Arc::new(Echo))
            .build()
            .unwrap();
        let args = json!({"a": 1}).as_object().cloned().unwrap();
        let out = registry.dispatch("echo", &args).await.unwrap();
        assert_eq!(out, json!({"a": 1}));
        assert_eq!(registry.list_tools().len(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let registry = ToolRegistry::empty();
        let err = registry.dispatch("missing", &Map::new()).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTool(ref n) if n == "missing"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = ToolRegistry::builder()
            .register(def("echo"), Arc::new(Echo))
            .register(def("echo"), Arc::new(Echo))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = ToolRegistry::builder()
            .register(def("  "), Arc::new(Echo))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn upper_case_object_schema_is_accepted() {
        let mut gemini_style = def("generate_image");
        gemini_style.parameters = json!({
            "type": "OBJECT",
            "properties": {"prompt": {"type": "STRING"}}
        });
        let registry = ToolRegistry::builder()
            .register(def("search_web"), Arc::new(Echo))
            .register(gemini_style, Arc::new(Echo))
            .build()
            .unwrap();
        let names: Vec<_> = registry.list_tools().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["search_web", "generate_image"]);
    }

    #[test]
    fn non_object_schema_is_rejected() {
        let mut bad = def("echo");
        bad.parameters = json!({"type": "string"});
        assert!(ToolRegistry::builder()
            .register(bad, Arc::new(Echo))
            .build()
            .is_err());

        let mut not_a_map = def("echo");
        not_a_map.parameters = json!("object");
        assert!(ToolRegistry::builder()
            .register(not_a_map, Arc::new(Echo))
            .build()
            .is_err());
    }

    #[test]
    fn registration_order_is_kept() {
        let registry = ToolRegistry::builder()
            .register(def("b"), Arc::new(Echo))
            .register(def("a"), Arc::new(Echo))
            .build()
            .unwrap();
        let names: Vec<_> = registry.list_tools().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
