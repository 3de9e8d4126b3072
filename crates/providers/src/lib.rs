pub mod google;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use google::GoogleProvider;
pub use traits::{Candidate, FinishReason, GenerateRequest, ModelClient};
