//! Tool dispatch for Gladius.
//!
//! The orchestrator only sees [`ToolDispatcher`]: a name-keyed dispatch
//! entry point plus the advertised schema. [`ToolRegistry`] is the concrete
//! dispatcher, mapping each advertised tool to a [`ToolHandler`]; the
//! handlers shipped here forward calls to an external tool service
//! ([`remote`]).

pub mod registry;
pub mod remote;

pub use registry::{ToolDispatcher, ToolHandler, ToolRegistry, ToolRegistryBuilder};
pub use remote::RemoteToolService;
