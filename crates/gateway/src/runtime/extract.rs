//! Split a model candidate into answer text and a tool-invocation request.

use gl_domain::transcript::{Part, ToolInvocation};

/// All text parts concatenated, then trimmed.
pub fn extract_text(parts: &[Part]) -> String {
    let joined: String = parts
        .iter()
        .filter_map(|p| match p {
            Part::Text(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    joined.trim().to_string()
}

/// The first tool-invocation request, if any.
pub fn extract_tool_call(parts: &[Part]) -> Option<&ToolInvocation> {
    parts.iter().find_map(|p| match p {
        Part::ToolInvocationRequest(call) => Some(call),
        _ => None,
    })
}
