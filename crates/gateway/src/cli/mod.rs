pub mod ask;
pub mod config;
pub mod tools;

use clap::{Parser, Subcommand};

use gl_domain::config::Config;

/// Gladius: a tool-using chat gateway over a generative-language model.
#[derive(Debug, Parser)]
#[command(name = "gladius", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the tool catalog advertised to the model.
    Tools {
        /// Output the catalog as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Send a single message through the chat loop and print the answer.
    Ask {
        /// The message to send.
        message: String,
        /// Caller handle used for the user-context block.
        #[arg(long)]
        handle: Option<String>,
        /// Output the full reply as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `GLADIUS_CONFIG` (or
/// `config.toml` by default). A missing file yields the defaults.
///
/// Returns the parsed [`Config`] and the path that was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("GLADIUS_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(config_path: &str) -> anyhow::Result<Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}
