//! Core runtime: turns one chat request into a seeded transcript and runs
//! the bounded model ⇄ tool loop over it.
//!
//! Entry points: [`prepare_chat`] builds the system prompt and transcript,
//! [`orchestrator::ChatOrchestrator::run`] drives the loop.

pub mod context;
pub mod extract;
pub mod history;
pub mod image;
pub mod orchestrator;
pub mod persona;

use serde_json::Value;

use gl_domain::transcript::Turn;

use self::context::{build_user_context, compose_system_prompt, resolve_handle, ProfileSnapshot};
use self::history::sanitize_history;

/// A normalized chat request, ready for the loop.
#[derive(Debug, Clone)]
pub struct PreparedChat {
    pub handle: String,
    pub system_prompt: String,
    pub transcript: Vec<Turn>,
}

/// Untrusted parts of a chat request. `message` is already trimmed and
/// non-empty.
pub struct ChatInput<'a> {
    pub message: &'a str,
    pub handle: Option<&'a str>,
    pub profile: Option<&'a ProfileSnapshot>,
    pub history: Option<&'a Value>,
}

/// Build the system prompt and seed transcript for one request.
///
/// `persona` is the rendered persona prompt. The transcript is the
/// sanitized history followed by the user's message.
pub fn prepare_chat(persona: &str, input: ChatInput<'_>) -> PreparedChat {
    let handle = resolve_handle(input.handle, input.profile);
    let user_context = build_user_context(&handle, input.profile);
    let system_prompt = compose_system_prompt(persona, &user_context);

    let mut transcript = sanitize_history(input.history);
    transcript.push(Turn::user(input.message));

    PreparedChat {
        handle,
        system_prompt,
        transcript,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_domain::transcript::Role;
    use serde_json::json;

    #[test]
    fn message_follows_sanitized_history() {
        let history = json!([
            { "role": "user", "content": "earlier" },
            { "role": "assistant", "content": "reply" },
            { "role": "user", "content": "" }
        ]);
        let prepared = prepare_chat(
            "persona",
            ChatInput {
                message: "hello",
                handle: None,
                profile: None,
                history: Some(&history),
            },
        );
        assert_eq!(prepared.transcript.len(), 3);
        assert_eq!(prepared.transcript[1].role, Role::Model);
        assert_eq!(prepared.transcript[2], Turn::user("hello"));
        assert_eq!(prepared.system_prompt, "persona");
        assert_eq!(prepared.handle, "");
    }

    #[test]
    fn handle_and_profile_extend_the_system_prompt() {
        let profile: ProfileSnapshot =
            serde_json::from_value(json!({ "handle": "@bob", "followers": 5 })).unwrap();
        let prepared = prepare_chat(
            "persona",
            ChatInput {
                message: "hi",
                handle: None,
                profile: Some(&profile),
                history: None,
            },
        );
        assert_eq!(prepared.handle, "bob");
        assert_eq!(
            prepared.system_prompt,
            "persona\n\nCurrent user: @bob. Followers: 5."
        );
        assert_eq!(prepared.transcript, vec![Turn::user("hi")]);
    }
}
