use gl_domain::error::Result;
use gl_domain::tool::ToolDefinition;
use gl_domain::transcript::{Part, Turn};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One generation request: everything the model conditions on.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Full system prompt (persona plus user-context block).
    pub system_instruction: String,
    /// The conversation so far.
    pub transcript: Vec<Turn>,
    /// Tool definitions the model may invoke.
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature. `None` lets the provider choose.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response. `None` lets the provider choose.
    pub max_output_tokens: Option<u32>,
}

/// Why the model stopped. Only `Safety` changes orchestrator behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FinishReason {
    #[default]
    Normal,
    Safety,
    Other(String),
}

impl FinishReason {
    /// Map a wire-level finish reason (`STOP`, `SAFETY`, ...).
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "STOP" => FinishReason::Normal,
            "SAFETY" => FinishReason::Safety,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// The model's single proposed continuation of the transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub parts: Vec<Part>,
    pub finish_reason: FinishReason,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core client trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A generative-language endpoint.
///
/// Each call issues exactly one upstream request. A non-success response
/// surfaces as [`gl_domain::error::Error::ModelUnavailable`] carrying the
/// upstream status and body; there is no retry at this layer.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate one continuation and return the first candidate.
    async fn generate(&self, req: &GenerateRequest) -> Result<Candidate>;

    /// The model name requests are sent to.
    fn model_name(&self) -> &str;
}
