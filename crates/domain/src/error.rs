/// Shared error type used across all Gladius crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// The model endpoint answered with a non-success status.
    #[error("model unavailable (HTTP {status})")]
    ModelUnavailable { status: u16, body: String },

    /// A tool ran and failed. Displays as the bare message so it can be
    /// handed back to the model as the tool's result.
    #[error("{message}")]
    Tool { tool: String, message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
