//! User-context block appended to the persona prompt.

use serde::Deserialize;
use serde_json::{Number, Value};

/// Read-only snapshot of the caller's profile as sent by the client.
///
/// Fields are kept as raw JSON so a wrongly-typed attribute is skipped
/// instead of failing the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub handle: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub followers: Option<Value>,
    #[serde(default)]
    pub followings: Option<Value>,
    #[serde(default)]
    pub threads: Option<Value>,
}

impl ProfileSnapshot {
    fn text(field: &Option<Value>) -> Option<&str> {
        field.as_ref()?.as_str().filter(|s| !s.is_empty())
    }

    fn number(field: &Option<Value>) -> Option<String> {
        match field.as_ref()? {
            Value::Number(n) => Some(number_text(n)),
            _ => None,
        }
    }
}

/// Render a JSON number the way a person would write it: `120.0` is `120`.
pub fn number_text(n: &Number) -> String {
    if n.is_f64() {
        // f64 Display drops a zero fraction and never uses an exponent.
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    } else {
        n.to_string()
    }
}

/// Text of a loosely-typed scalar field, coerced like a form value.
///
/// Strings pass through, numbers and `true` are rendered; `null`, `false`,
/// `0`, empty strings and structured values count as absent.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_text(n)),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Resolve the caller handle: explicit `handle` first, then the profile's,
/// trimmed and without leading `@`s.
pub fn resolve_handle(explicit: Option<&str>, profile: Option<&ProfileSnapshot>) -> String {
    let raw = explicit
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| profile.and_then(|p| p.handle.as_ref()).and_then(scalar_text))
        .unwrap_or_default();
    raw.trim().trim_start_matches('@').to_string()
}

/// Render the labelled facts about the current user.
///
/// Returns an empty string when there is neither a handle nor a profile.
pub fn build_user_context(handle: &str, profile: Option<&ProfileSnapshot>) -> String {
    if handle.is_empty() && profile.is_none() {
        return String::new();
    }

    let mut facts = vec![format!(
        "Current user: @{}.",
        if handle.is_empty() { "unknown" } else { handle }
    )];

    if let Some(p) = profile {
        if let Some(name) = ProfileSnapshot::text(&p.name) {
            facts.push(format!("Name: {name}."));
        }
        if let Some(bio) = ProfileSnapshot::text(&p.description) {
            facts.push(format!("Bio: {bio}."));
        }
        if let Some(n) = ProfileSnapshot::number(&p.followers) {
            facts.push(format!("Followers: {n}."));
        }
        if let Some(n) = ProfileSnapshot::number(&p.followings) {
            facts.push(format!("Following: {n}."));
        }
        if let Some(n) = ProfileSnapshot::number(&p.threads) {
            facts.push(format!("Threads: {n}."));
        }
    }

    facts.join(" ")
}

/// Persona prompt plus the context block, separated by a blank line.
pub fn compose_system_prompt(persona: &str, user_context: &str) -> String {
    if user_context.is_empty() {
        persona.to_string()
    } else {
        format!("{persona}\n\n{user_context}")
    }
}
