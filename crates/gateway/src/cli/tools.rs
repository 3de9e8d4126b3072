//! `gladius tools`: print the catalog the model would be offered.

use std::sync::Arc;

use gl_domain::config::Config;

use crate::bootstrap;

pub async fn run(config: Arc<Config>, json_output: bool) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config).await?;
    let tools = state.tools.list_tools();

    if json_output {
        let json = serde_json::to_string_pretty(&serde_json::json!({ "tools": tools }))
            .map_err(|e| anyhow::anyhow!("serializing tools: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if tools.is_empty() {
        println!("No tools available.");
        return Ok(());
    }
    for tool in tools {
        if tool.description.is_empty() {
            println!("{}", tool.name);
        } else {
            println!("{:<24} {}", tool.name, tool.description);
        }
    }
    Ok(())
}
