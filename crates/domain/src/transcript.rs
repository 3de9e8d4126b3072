//! Transcript model shared by the orchestrator and the model adapter.
//!
//! A transcript is an ordered list of [`Turn`]s. Each turn carries an
//! ordered list of [`Part`]s; the adapter translates these to and from the
//! provider's wire format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A structured tool-invocation request emitted by the model.
///
/// Any fields the model supplied besides `name` and `args` are kept in
/// `extra` so the request can be echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default, rename = "args")]
    pub arguments: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            extra: Map::new(),
        }
    }
}

/// One element of a turn. Order within a turn is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    ToolInvocationRequest(ToolInvocation),
    ToolInvocationResult {
        name: String,
        response: Map<String, Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

// ── Convenience constructors ───────────────────────────────────────

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A model turn holding exactly one tool-invocation request.
    pub fn tool_request(call: ToolInvocation) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::ToolInvocationRequest(call)],
        }
    }

    /// A user-role turn carrying a tool's output back to the model as
    /// `{ "result": <value> }`.
    pub fn tool_result(name: impl Into<String>, result: Value) -> Self {
        let mut response = Map::new();
        response.insert("result".into(), result);
        Self {
            role: Role::User,
            parts: vec![Part::ToolInvocationResult {
                name: name.into(),
                response,
            }],
        }
    }

    /// Concatenated text of all `Text` parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_result_wraps_value_under_result_key() {
        let turn = Turn::tool_result("get_user_stats", json!({"followers": 3}));
        assert_eq!(turn.role, Role::User);
        match &turn.parts[0] {
            Part::ToolInvocationResult { name, response } => {
                assert_eq!(name, "get_user_stats");
                assert_eq!(response["result"]["followers"], 3);
            }
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[test]
    fn invocation_keeps_unknown_fields() {
        let call: ToolInvocation = serde_json::from_value(json!({
            "name": "search_web",
            "args": {"query": "avax"},
            "id": "fc-1"
        }))
        .unwrap();
        assert_eq!(call.arguments["query"], "avax");
        assert_eq!(call.extra["id"], "fc-1");

        let back = serde_json::to_value(&call).unwrap();
        assert_eq!(back, json!({"name": "search_web", "args": {"query": "avax"}, "id": "fc-1"}));
    }

    #[test]
    fn text_joins_only_text_parts() {
        let turn = Turn {
            role: Role::Model,
            parts: vec![
                Part::Text("a".into()),
                Part::ToolInvocationRequest(ToolInvocation::new("x", Map::new())),
                Part::Text("b".into()),
            ],
        };
        assert_eq!(turn.text(), "ab");
    }
}
