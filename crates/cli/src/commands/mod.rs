//! Subcommand implementations.

pub mod ask;
pub mod doctor;
pub mod news;
pub mod recipe;

use std::path::PathBuf;

use minion_config::{AppConfig, ConfigError};

/// Flags shared by every subcommand.
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub model: Option<String>,
}

impl GlobalOpts {
    /// File and environment, then the `--model` flag on top. Not validated.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(model) = &self.model {
            config.model_deployment = Some(model.clone());
        }
        Ok(config)
    }

    /// Like [`GlobalOpts::load_config`], but fails on missing required values.
    pub fn validated_config(&self) -> Result<AppConfig, ConfigError> {
        let config = self.load_config()?;
        config.validate()?;
        Ok(config)
    }
}
