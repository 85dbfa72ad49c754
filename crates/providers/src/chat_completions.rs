//! Chat-completions provider implementation.
//!
//! Works with: OpenAI, Azure OpenAI deployments, Ollama, vLLM and any
//! endpoint exposing an OpenAI-compatible `/chat/completions` route.
//!
//! The instruction template is sent as a leading system message. Server-side
//! tools have no representation in this dialect.

use async_trait::async_trait;
use minion_config::Endpoint;
use minion_core::error::ProviderError;
use minion_core::message::Role;
use minion_core::provider::{CompletionRequest, CompletionResponse, Provider, Usage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::http::HttpEndpoint;

/// An OpenAI-compatible chat-completions provider.
pub struct ChatCompletionsProvider {
    name: String,
    http: HttpEndpoint,
}

impl ChatCompletionsProvider {
    /// Create a provider for an already-resolved endpoint.
    pub fn new(
        endpoint: &Endpoint,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            name: endpoint.name.clone(),
            http: HttpEndpoint::new(endpoint, api_key, timeout)?,
        })
    }

    /// Convert instructions plus input to the chat message list.
    fn to_api_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
        let system = (!request.instructions.trim().is_empty()).then(|| ApiMessage {
            role: "system".into(),
            content: Some(request.instructions.clone()),
        });

        system
            .into_iter()
            .chain(request.input.iter().map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                },
                content: Some(m.content.clone()),
            }))
            .collect()
    }

    fn into_completion(api: ApiResponse) -> Result<CompletionResponse, ProviderError> {
        let choice = api
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let usage = api.usage.map(|u| {
            Usage::from_reported(u.prompt_tokens, u.completion_tokens, u.total_tokens)
        });

        Ok(CompletionResponse {
            output_text: choice.message.content.unwrap_or_default(),
            usage,
            model: api.model,
        })
    }
}

#[async_trait]
impl Provider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        if !request.tools.is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "server-side tools ({}) need the responses API; set MINION_API_STYLE=responses",
                request
                    .tools
                    .iter()
                    .map(|t| t.kind())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request),
            "stream": false,
        });

        if let Some(t) = request.temperature {
            body["temperature"] = serde_json::json!(t);
        }

        if let Some(max_tokens) = request.max_output_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let api: ApiResponse = self.http.post_json("chat/completions", &body).await?;
        Self::into_completion(api)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        self.http.probe("models").await
    }
}

// --- Chat completions API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u64,
}
