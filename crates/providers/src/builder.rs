//! Provider builder: selects the wire dialect from configuration.

use std::sync::Arc;
use std::time::Duration;

use minion_config::{ApiStyle, AppConfig};
use minion_core::error::ProviderError;
use minion_core::provider::Provider;
use tracing::info;

use crate::chat_completions::ChatCompletionsProvider;
use crate::responses::ResponsesProvider;

/// Build the provider described by a validated configuration.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("no API key configured".into()))?;
    let endpoint = config.endpoint();
    let timeout = Duration::from_secs(config.request_timeout_secs);

    info!(
        provider = %endpoint.name,
        base_url = %endpoint.base_url,
        style = ?config.api_style,
        "Building provider"
    );

    let provider: Arc<dyn Provider> = match config.api_style {
        ApiStyle::Responses => Arc::new(ResponsesProvider::new(&endpoint, api_key, timeout)?),
        ApiStyle::Chat => Arc::new(ChatCompletionsProvider::new(&endpoint, api_key, timeout)?),
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(style: ApiStyle) -> AppConfig {
        AppConfig {
            api_key: Some("sk-test".into()),
            model_deployment: Some("gpt-4o".into()),
            resource: Some("contoso".into()),
            api_style: style,
            ..AppConfig::default()
        }
    }

    #[test]
    fn builds_responses_provider_by_default() {
        let provider = build_from_config(&config(ApiStyle::Responses)).unwrap();
        assert_eq!(provider.name(), "azure");
    }

    #[test]
    fn builds_chat_provider() {
        let provider = build_from_config(&config(ApiStyle::Chat)).unwrap();
        assert_eq!(provider.name(), "azure");
    }

    #[test]
    fn missing_key_is_rejected() {
        let cfg = AppConfig {
            api_key: None,
            ..config(ApiStyle::Responses)
        };
        assert!(matches!(
            build_from_config(&cfg),
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
