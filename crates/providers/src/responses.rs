//! "Responses" API provider.
//!
//! Speaks `POST {base}/responses` as exposed by OpenAI and by Azure OpenAI
//! v1 deployments. Server-side tools (web search) are forwarded as-is and
//! run by the provider before it answers; only the final text comes back.

use async_trait::async_trait;
use minion_config::Endpoint;
use minion_core::error::ProviderError;
use minion_core::message::Role;
use minion_core::provider::{CompletionRequest, CompletionResponse, Provider, Usage};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::http::HttpEndpoint;

/// A provider for the responses dialect.
pub struct ResponsesProvider {
    name: String,
    http: HttpEndpoint,
}

impl ResponsesProvider {
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

    /// Build the JSON request body.
    ///
    /// A lone user message goes out as a plain string; anything longer is
    /// sent as a role/content list.
    fn to_body(request: &CompletionRequest) -> serde_json::Value {
        let input = match request.input.as_slice() {
            [only] if only.role == Role::User => serde_json::json!(only.content),
            messages => serde_json::Value::Array(
                messages
                    .iter()
                    .map(|m| serde_json::json!({"role": m.role.as_str(), "content": m.content}))
                    .collect(),
            ),
        };

        let mut body = serde_json::json!({
            "model": request.model,
            "instructions": request.instructions,
            "input": input,
        });

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(request.tools);
        }
        if let Some(t) = request.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        if let Some(max) = request.max_output_tokens {
            body["max_output_tokens"] = serde_json::json!(max);
        }

        body
    }

    fn into_completion(api: ApiResponse) -> Result<CompletionResponse, ProviderError> {
        if let Some(err) = api.error {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: err.message,
            });
        }

        let output_text = match api.output_text {
            Some(text) if !text.is_empty() => text,
            _ => api
                .output
                .iter()
                .flat_map(|item| item.content.iter())
                .filter(|part| part.kind == "output_text")
                .filter_map(|part| part.text.as_deref())
                .collect::<String>(),
        };

        let usage = api
            .usage
            .map(|u| Usage::from_reported(u.input_tokens, u.output_tokens, u.total_tokens));

        Ok(CompletionResponse {
            output_text,
            usage,
            model: api.model,
        })
    }
}

#[async_trait]
impl Provider for ResponsesProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let body = Self::to_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            tools = request.tools.len(),
            "Sending responses request"
        );

        let api: ApiResponse = self.http.post_json("responses", &body).await?;
        Self::into_completion(api)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        self.http.probe("models").await
    }
}

// --- Responses API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    /// Convenience field some deployments fill in
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ApiOutputItem>,
    #[serde(default)]
    usage: Option<ApiUsage>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiOutputItem {
    /// Tool steps (e.g. "web_search_call") carry no content
    #[serde(default)]
    content: Vec<ApiContentPart>,
}

#[derive(Debug, Deserialize)]
struct ApiContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
