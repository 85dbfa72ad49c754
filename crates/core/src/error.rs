//! Error types for the minion domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all minion operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Orchestration errors ---
    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Terminal I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether retrying the same request can never succeed in this process.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::Provider(ProviderError::AuthenticationFailed(_))
        )
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(", retry after {secs}s"),
        None => String::new(),
    }
}

/// A delegated capability did not produce what a later step needs.
///
/// This is the only error class the orchestrator recovers from: it becomes
/// an inability-to-proceed reply instead of aborting the turn.
#[derive(Debug, Clone, Error)]
pub enum OrchestrationError {
    #[error("cannot run {capability}: {reason}")]
    MissingDependency { capability: String, reason: String },

    #[error("capability not registered: {0}")]
    UnknownCapability(String),
}
