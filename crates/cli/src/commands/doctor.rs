//! `minion doctor`: show the effective configuration without its secrets.

use std::io::Write;

use minion_agent::catalog;
use minion_config::{AppConfig, AuthScheme, ConfigError, env};
use minion_core::error::ProviderError;
use minion_core::provider::Provider;

use super::GlobalOpts;

/// The first variable in `names` that is set and non-empty.
fn source(names: &[&'static str]) -> Option<&'static str> {
    names
        .iter()
        .copied()
        .find(|name| std::env::var(name).is_ok_and(|v| !v.trim().is_empty()))
}

fn report<W: Write>(
    out: &mut W,
    label: &str,
    present: bool,
    names: &[&'static str],
) -> std::io::Result<bool> {
    match (present, source(names)) {
        (true, Some(var)) => writeln!(out, "  ✅ {label} (from {var})")?,
        (true, None) => writeln!(out, "  ✅ {label} (from config file or flag)")?,
        (false, _) => writeln!(out, "  ❌ {label} missing: set {}", names.join(" or "))?,
    }
    Ok(present)
}

/// Print the configuration checks and return how many issues were found.
fn check_config<W: Write>(
    out: &mut W,
    loaded: &Result<AppConfig, ConfigError>,
) -> std::io::Result<usize> {
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            writeln!(out, "  ❌ Configuration invalid: {e}")?;
            return Ok(1);
        }
    };

    let mut issues = 0;
    if !report(out, "API key", config.api_key.is_some(), env::API_KEY)? {
        issues += 1;
    }
    if !report(
        out,
        "Model deployment",
        config.model_deployment.is_some(),
        env::MODEL_DEPLOYMENT,
    )? {
        issues += 1;
    }

    let endpoint = config.endpoint();
    let auth = match endpoint.auth {
        AuthScheme::Bearer => "Authorization: Bearer",
        AuthScheme::ApiKeyHeader => "api-key header",
    };
    writeln!(out)?;
    writeln!(out, "  Endpoint:     {} ({})", endpoint.base_url, endpoint.name)?;
    if let Some(version) = &endpoint.api_version {
        writeln!(out, "  API version:  {version}")?;
    }
    writeln!(out, "  Auth:         {auth}")?;
    writeln!(out, "  API style:    {:?}", config.api_style)?;
    writeln!(out, "  Routing:      {:?}", config.routing)?;
    writeln!(out, "  Timeout:      {}s", config.request_timeout_secs)?;

    writeln!(out)?;
    writeln!(out, "  Agent models:")?;
    for name in [
        catalog::TRAVEL_AGENT,
        catalog::NEWS_AGGREGATOR,
        catalog::RECIPE_EXTRACTOR,
        catalog::INGREDIENT_NORMALIZER,
        catalog::SHOPPING_LIST_GENERATOR,
        catalog::ORCHESTRATOR,
    ] {
        let model = config.model_for(name);
        let shown = if model.is_empty() { "(none)" } else { model.as_str() };
        writeln!(out, "    {name:<22} {shown}")?;
    }

    if let Err(e) = config.validate() {
        writeln!(out, "\n  ❌ {e}")?;
        issues += 1;
    }

    Ok(issues)
}

pub async fn run(opts: &GlobalOpts, ping: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = std::io::stdout();
    writeln!(out, "🩺 minion doctor")?;
    writeln!(out, "================\n")?;

    let config_path = opts
        .config
        .clone()
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    if config_path.exists() {
        writeln!(out, "  ✅ Config file {}", config_path.display())?;
    } else {
        writeln!(out, "  ➖ No config file at {} (environment only)", config_path.display())?;
    }

    let loaded = opts.load_config();
    let mut issues = check_config(&mut out, &loaded)?;

    if let (true, 0, Ok(config)) = (ping, issues, &loaded) {
        writeln!(out)?;
        let provider = minion_providers::build_from_config(config)?;
        match provider.health_check().await {
            Ok(true) => writeln!(out, "  ✅ Endpoint reachable")?,
            Ok(false) => {
                writeln!(out, "  ⚠️  Endpoint answered with an unexpected status")?;
                issues += 1;
            }
            Err(ProviderError::AuthenticationFailed(msg)) => {
                writeln!(out, "  ❌ Endpoint rejected the API key: {msg}")?;
                issues += 1;
            }
            Err(e) => {
                writeln!(out, "  ❌ Endpoint check failed: {e}")?;
                issues += 1;
            }
        }
    }

    writeln!(out)?;
    if issues == 0 {
        writeln!(out, "  🎉 All checks passed!")?;
        Ok(())
    } else {
        writeln!(out, "  ⚠️  {issues} issue(s) found. See above for details.")?;
        Err(format!("doctor found {issues} issue(s)").into())
    }
}
