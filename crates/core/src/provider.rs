//! Provider trait: the abstraction over hosted LLM endpoints.
//!
//! A Provider knows how to send instructions plus input to a hosted model and
//! get generated text back together with token usage.
//!
//! Implementations: the "responses" API and the "chat completions" API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;
use crate::tool::ToolSpec;

/// One completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model or deployment to use (e.g., "gpt-4.1-mini", "gpt4_1_nano")
    pub model: String,

    /// System prompt / instruction template
    pub instructions: String,

    /// Input messages, oldest first. The last one is the current user turn.
    pub input: Vec<Message>,

    /// Server-side tools the provider may run before answering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,

    /// Temperature (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl CompletionRequest {
    /// A request with a single user input.
    pub fn new(
        model: impl Into<String>,
        instructions: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            input: vec![Message::user(input)],
            tools: Vec::new(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text, with any structured content already flattened
    pub output_text: String,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage of one remote call.
///
/// `total_tokens == input_tokens + output_tokens` always holds: the only
/// constructor computes the total, widened so the sum cannot overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UsageRepr")]
pub struct Usage {
    input_tokens: u32,
    output_tokens: u32,
    total_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: u64::from(input_tokens) + u64::from(output_tokens),
        }
    }

    /// Build from provider counters, recomputing a total that disagrees.
    pub fn from_reported(input_tokens: u32, output_tokens: u32, reported_total: u64) -> Self {
        let usage = Self::new(input_tokens, output_tokens);
        if usage.total_tokens != reported_total {
            tracing::debug!(
                input_tokens,
                output_tokens,
                reported_total,
                "Provider total_tokens disagrees with input + output; recomputed"
            );
        }
        usage
    }

    pub fn input_tokens(&self) -> u32 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u32 {
        self.output_tokens
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }
}

/// Sums the calls of one orchestrated turn.
impl std::ops::Add for Usage {
    type Output = Usage;

    fn add(self, other: Usage) -> Usage {
        Usage::new(
            self.input_tokens.saturating_add(other.input_tokens),
            self.output_tokens.saturating_add(other.output_tokens),
        )
    }
}

#[derive(Deserialize)]
struct UsageRepr {
    input_tokens: u32,
    output_tokens: u32,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl From<UsageRepr> for Usage {
    fn from(repr: UsageRepr) -> Self {
        match repr.total_tokens {
            Some(total) => Usage::from_reported(repr.input_tokens, repr.output_tokens, total),
            None => Usage::new(repr.input_tokens, repr.output_tokens),
        }
    }
}

/// The core Provider trait.
///
/// Every endpoint dialect implements this trait. Agents call `complete()`
/// without knowing which dialect or deployment is behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "azure").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
