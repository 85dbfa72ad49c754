//! Configuration loading, validation, and management for minion.
//!
//! Loads configuration from `~/.minion/config.toml` (optional) with
//! environment variable overrides. Required values are checked by
//! [`AppConfig::validate`] before any network call is made.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variables, highest priority first within each group.
pub mod env {
    pub const API_KEY: &[&str] = &[
        "MINION_API_KEY",
        "OPENAI_API_KEY",
        "AZ_OPENAI_API_KEY",
        "AZURE_OPENAI_API_KEY",
    ];
    pub const API_BASE: &[&str] = &["MINION_API_BASE", "AZURE_OPENAI_ENDPOINT"];
    pub const RESOURCE: &[&str] = &["MINION_RESOURCE", "AZ_OPENAI_RESOURCE"];
    pub const MODEL_DEPLOYMENT: &[&str] = &[
        "MINION_MODEL_DEPLOYMENT",
        "AZURE_OPENAI_CHAT_DEPLOYMENT_NAME",
    ];
    pub const API_VERSION: &str = "MINION_API_VERSION";
    pub const API_STYLE: &str = "MINION_API_STYLE";
    pub const ROUTING: &str = "MINION_ROUTING";
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const AZURE_DEFAULT_API_VERSION: &str = "preview";

/// The root configuration structure.
///
/// Maps directly to `~/.minion/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Full endpoint base URL (e.g. "https://api.openai.com/v1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Azure resource name; expands to `https://{resource}.openai.azure.com/openai/v1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// `api-version` query parameter (Azure defaults to "preview")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Model or deployment name used by every agent without an override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_deployment: Option<String>,

    /// Which wire dialect to speak
    #[serde(default)]
    pub api_style: ApiStyle,

    /// How the recipe orchestrator classifies user intent
    #[serde(default)]
    pub routing: RoutingMode,

    /// Sampling temperature (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// HTTP client timeout per request
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Per-agent overrides keyed by agent name (e.g. "RecipeExtractor")
    #[serde(default)]
    pub agents: HashMap<String, AgentOverride>,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            resource: None,
            api_version: None,
            model_deployment: None,
            api_style: ApiStyle::default(),
            routing: RoutingMode::default(),
            temperature: None,
            request_timeout_secs: default_timeout_secs(),
            agents: HashMap::new(),
        }
    }
}

/// Wire dialect of the remote endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStyle {
    /// `POST /responses`
    #[default]
    Responses,
    /// `POST /chat/completions`
    Chat,
}

impl std::str::FromStr for ApiStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "responses" => Ok(Self::Responses),
            "chat" | "chat_completions" => Ok(Self::Chat),
            other => Err(ConfigError::ValidationError(format!(
                "unknown api style '{other}' (expected 'responses' or 'chat')"
            ))),
        }
    }
}

/// Intent classification strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Deterministic keyword and URL rules
    #[default]
    Rules,
    /// Ask the model for a label, falling back to the rules
    Model,
}

impl std::str::FromStr for RoutingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" => Ok(Self::Rules),
            "model" => Ok(Self::Model),
            other => Err(ConfigError::ValidationError(format!(
                "unknown routing mode '{other}' (expected 'rules' or 'model')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// How requests authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `api-key: <key>` (Azure)
    ApiKeyHeader,
}

/// The effective endpoint derived from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Provider label used in logs ("openai", "azure", "custom")
    pub name: String,
    pub base_url: String,
    pub api_version: Option<String>,
    pub auth: AuthScheme,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_base", &self.api_base)
            .field("resource", &self.resource)
            .field("api_version", &self.api_version)
            .field("model_deployment", &self.model_deployment)
            .field("api_style", &self.api_style)
            .field("routing", &self.routing)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("agents", &self.agents)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `path` (or the default path) and apply
    /// environment overrides from the process environment.
    ///
    /// The result is not validated; call [`AppConfig::validate`] once all
    /// overrides (e.g. CLI flags) have been applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Overlay environment variables. Set variables win over file values;
    /// empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| lookup(k))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        if let Some(key) = first(env::API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(base) = first(env::API_BASE) {
            self.api_base = Some(base);
        }
        if let Some(resource) = first(env::RESOURCE) {
            self.resource = Some(resource);
        }
        if let Some(model) = first(env::MODEL_DEPLOYMENT) {
            self.model_deployment = Some(model);
        }
        if let Some(version) = first(&[env::API_VERSION]) {
            self.api_version = Some(version);
        }
        if let Some(style) = first(&[env::API_STYLE]) {
            self.api_style = style.parse()?;
        }
        if let Some(routing) = first(&[env::ROUTING]) {
            self.routing = routing.parse()?;
        }
        Ok(())
    }

    /// Check that everything needed for a network call is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(ConfigError::MissingVariable {
                name: env::API_KEY[0],
                what: "API key",
            });
        }

        if self
            .model_deployment
            .as_deref()
            .is_none_or(|m| m.trim().is_empty())
        {
            return Err(ConfigError::MissingVariable {
                name: env::MODEL_DEPLOYMENT[0],
                what: "model deployment",
            });
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if let Some(base) = &self.api_base {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(ConfigError::ValidationError(format!(
                    "api_base must be an http(s) URL, got '{base}'"
                )));
            }
        }

        Ok(())
    }

    /// The endpoint requests should go to.
    ///
    /// An explicit `api_base` wins over `resource`; with neither set the
    /// public OpenAI endpoint is used.
    pub fn endpoint(&self) -> Endpoint {
        if let Some(base) = &self.api_base {
            let base_url = base.trim_end_matches('/').to_string();
            let is_azure = base_url.contains(".openai.azure.com");
            return Endpoint {
                name: if is_azure { "azure" } else { "custom" }.into(),
                api_version: self.api_version.clone().or_else(|| {
                    is_azure.then(|| AZURE_DEFAULT_API_VERSION.to_string())
                }),
                auth: if is_azure {
                    AuthScheme::ApiKeyHeader
                } else {
                    AuthScheme::Bearer
                },
                base_url,
            };
        }

        if let Some(resource) = &self.resource {
            return Endpoint {
                name: "azure".into(),
                base_url: format!("https://{resource}.openai.azure.com/openai/v1"),
                api_version: Some(
                    self.api_version
                        .clone()
                        .unwrap_or_else(|| AZURE_DEFAULT_API_VERSION.into()),
                ),
                auth: AuthScheme::ApiKeyHeader,
            };
        }

        Endpoint {
            name: "openai".into(),
            base_url: OPENAI_BASE_URL.into(),
            api_version: self.api_version.clone(),
            auth: AuthScheme::Bearer,
        }
    }

    /// The model for a named agent: its override, else the shared deployment.
    pub fn model_for(&self, agent_name: &str) -> String {
        self.agents
            .get(agent_name)
            .and_then(|a| a.model.clone())
            .or_else(|| self.model_deployment.clone())
            .unwrap_or_default()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".minion")
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Missing {what}: set {name} (or add it to ~/.minion/config.toml)")]
    MissingVariable {
        name: &'static str,
        what: &'static str,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for minion_core::Error {
    fn from(err: ConfigError) -> Self {
        minion_core::Error::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn complete_config() -> AppConfig {
        AppConfig {
            api_key: Some("sk-test".into()),
            model_deployment: Some("gpt-4.1-mini".into()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let config = AppConfig {
            api_key: None,
            ..complete_config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable { name: "MINION_API_KEY", .. }
        ));
    }

    #[test]
    fn missing_model_deployment_fails_fast() {
        let config = AppConfig {
            model_deployment: Some("   ".into()),
            ..complete_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MINION_MODEL_DEPLOYMENT"));
    }

    #[test]
    fn complete_config_is_valid() {
        assert!(complete_config().validate().is_ok());
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: Some(5.0),
            ..complete_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_fallbacks_are_used_in_order() {
        let mut config = AppConfig::default();
        config
            .apply_env(env_of(&[
                ("AZ_OPENAI_API_KEY", "az-key"),
                ("OPENAI_API_KEY", "oa-key"),
                ("AZ_OPENAI_RESOURCE", "myres"),
                ("AZURE_OPENAI_CHAT_DEPLOYMENT_NAME", "gpt4_1_nano"),
            ]))
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("oa-key"));
        assert_eq!(config.resource.as_deref(), Some("myres"));
        assert_eq!(config.model_deployment.as_deref(), Some("gpt4_1_nano"));
    }

    #[test]
    fn empty_env_values_count_as_unset() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config
            .apply_env(env_of(&[("MINION_API_KEY", "  ")]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn env_parses_style_and_routing() {
        let mut config = AppConfig::default();
        config
            .apply_env(env_of(&[("MINION_API_STYLE", "chat"), ("MINION_ROUTING", "Model")]))
            .unwrap();
        assert_eq!(config.api_style, ApiStyle::Chat);
        assert_eq!(config.routing, RoutingMode::Model);

        let mut bad = AppConfig::default();
        assert!(bad.apply_env(env_of(&[("MINION_API_STYLE", "grpc")])).is_err());
    }

    #[test]
    fn resource_expands_to_azure_endpoint() {
        let config = AppConfig {
            resource: Some("contoso".into()),
            ..complete_config()
        };
        let endpoint = config.endpoint();
        assert_eq!(endpoint.base_url, "https://contoso.openai.azure.com/openai/v1");
        assert_eq!(endpoint.api_version.as_deref(), Some("preview"));
        assert_eq!(endpoint.auth, AuthScheme::ApiKeyHeader);
        assert_eq!(endpoint.name, "azure");
    }

    #[test]
    fn api_base_wins_over_resource() {
        let config = AppConfig {
            api_base: Some("http://localhost:8080/v1/".into()),
            resource: Some("contoso".into()),
            ..complete_config()
        };
        let endpoint = config.endpoint();
        assert_eq!(endpoint.base_url, "http://localhost:8080/v1");
        assert_eq!(endpoint.auth, AuthScheme::Bearer);
        assert!(endpoint.api_version.is_none());
    }

    #[test]
    fn default_endpoint_is_openai() {
        let endpoint = complete_config().endpoint();
        assert_eq!(endpoint.base_url, "https://api.openai.com/v1");
        assert_eq!(endpoint.name, "openai");
    }

    #[test]
    fn agent_override_selects_model() {
        let mut config = complete_config();
        config.agents.insert(
            "RecipeExtractor".into(),
            AgentOverride {
                model: Some("gpt4_1_nano".into()),
            },
        );
        assert_eq!(config.model_for("RecipeExtractor"), "gpt4_1_nano");
        assert_eq!(config.model_for("Orchestrator"), "gpt-4.1-mini");
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.api_style, ApiStyle::Responses);
    }

    #[test]
    fn config_file_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model_deployment = "gpt-4o"
resource = "contoso"
api_style = "chat"
routing = "model"

[agents.ShoppingListGenerator]
model = "gpt4_1_nano"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model_deployment.as_deref(), Some("gpt-4o"));
        assert_eq!(config.api_style, ApiStyle::Chat);
        assert_eq!(config.routing, RoutingMode::Model);
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.model_for("ShoppingListGenerator"), "gpt4_1_nano");
    }

    #[test]
    fn malformed_config_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_style = [not toml").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let debug = format!("{:?}", complete_config());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn config_error_converts_to_domain_error() {
        let err: minion_core::Error = ConfigError::ValidationError("bad".into()).into();
        assert!(matches!(err, minion_core::Error::Config { .. }));
    }
}
