//! Shared types for the Gladius crates: transcript model, tool schema,
//! configuration, the common error type and string helpers.

pub mod config;
pub mod error;
pub mod text;
pub mod tool;
pub mod transcript;
