//! Shared HTTP plumbing for the endpoint dialects.
//!
//! Owns the reqwest client, authentication headers, the optional
//! `api-version` query parameter and the status → `ProviderError` mapping.

use minion_config::{AuthScheme, Endpoint};
use minion_core::error::ProviderError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub(crate) struct HttpEndpoint {
    base_url: String,
    api_version: Option<String>,
    api_key: String,
    auth: AuthScheme,
    client: reqwest::Client,
}

impl HttpEndpoint {
    pub(crate) fn new(
        endpoint: &Endpoint,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_version: endpoint.api_version.clone(),
            api_key: api_key.into(),
            auth: endpoint.auth,
            client,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut builder = self.client.request(method, url);

        builder = match self.auth {
            AuthScheme::Bearer => builder.header("Authorization", format!("Bearer {}", self.api_key)),
            AuthScheme::ApiKeyHeader => builder.header("api-key", &self.api_key),
        };

        if let Some(version) = &self.api_version {
            builder = builder.query(&[("api-version", version)]);
        }

        builder
    }

    /// POST a JSON body and decode a JSON response.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            return Err(status_error(status, retry_after, error_body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!(path, bytes = text.len(), "Received provider response");

        serde_json::from_str(&text).map_err(|e| ProviderError::ApiError {
            status_code: status,
            message: format!("Failed to parse response: {e}"),
        })
    }

    /// GET `path` and report whether the endpoint answered with success.
    pub(crate) async fn probe(&self, path: &str) -> Result<bool, ProviderError> {
        let response = self
            .request(reqwest::Method::GET, path)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        match response.status().as_u16() {
            401 | 403 => Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            )),
            _ => Ok(response.status().is_success()),
        }
    }
}

/// Map a non-success status to the provider error taxonomy.
pub(crate) fn status_error(status: u16, retry_after_secs: Option<u64>, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited { retry_after_secs },
        401 | 403 => ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        _ => {
            debug!(status, body = %body, "Provider returned error");
            ProviderError::ApiError {
                status_code: status,
                message: body,
            }
        }
    }
}
