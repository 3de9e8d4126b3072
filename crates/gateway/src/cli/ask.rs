//! `gladius ask`: one-shot run of the chat loop.
//!
//! Boots the same state as the server, runs a single message through the
//! loop and prints the answer. Useful for scripting and quick checks.

use std::sync::Arc;

use anyhow::Context;

use gl_domain::config::Config;

use crate::bootstrap;
use crate::runtime::{prepare_chat, ChatInput};

pub async fn run(
    config: Arc<Config>,
    message: String,
    handle: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let message = message.trim();
    if message.is_empty() {
        anyhow::bail!("Missing message.");
    }

    let state = bootstrap::build_app_state(config).await?;
    let Some(orchestrator) = state.orchestrator() else {
        anyhow::bail!("Missing {}.", state.credential_name());
    };

    let prepared = prepare_chat(
        &state.persona.render_today(),
        ChatInput {
            message,
            handle: handle.as_deref(),
            profile: None,
            history: None,
        },
    );

    let outcome = orchestrator
        .run(prepared.system_prompt, prepared.transcript)
        .await
        .context("chat loop failed")?;

    if json_output {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "reply": outcome.reply,
            "exit": outcome.exit,
            "model_calls": outcome.model_calls,
        }))
        .map_err(|e| anyhow::anyhow!("serializing reply: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let reply = &outcome.reply;
    if !reply.answer.is_empty() {
        println!("{}", reply.answer);
    }
    if let Some(url) = &reply.image_url {
        println!("image: {url}");
    } else if reply.image_data_url.is_some() {
        println!("image: <inline data url>");
    }
    if let Some(caption) = &reply.image_caption {
        println!("caption: {caption}");
    }
    if let Some(err) = &reply.image_upload_error {
        eprintln!("upload error: {err}");
    }
    Ok(())
}
