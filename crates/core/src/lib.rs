//! # minion core
//!
//! Domain types, traits, and error definitions shared by the minion tools.
//! This crate has no HTTP or runtime dependencies; it defines the model
//! that the provider, agent and CLI crates implement against.
//!
//! ## Design Philosophy
//!
//! The remote model endpoint is a trait here. Implementations live in
//! `minion-providers`, and tests substitute scripted doubles.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, OrchestrationError, ProviderError, Result};
pub use message::{Message, Role, Thread, ThreadId};
pub use provider::{CompletionRequest, CompletionResponse, Provider, Usage};
pub use tool::{SearchContextSize, ToolSpec};
