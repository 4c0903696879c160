mod types;

pub use types::*;

use crate::ladder::Ladder;
use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./ladderd.toml",
        "~/.config/ladderd/config.toml",
        "/etc/ladderd/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.dispatch.concurrent == 0 {
        anyhow::bail!("dispatch.concurrent must be greater than 0");
    }

    if !config.dispatch.work_dir.exists() {
        tracing::warn!("Work directory does not exist: {:?}", config.dispatch.work_dir);
    }

    let policy = &config.policy;
    if !policy.min_aspect_ratio.is_finite() || !policy.max_aspect_ratio.is_finite() {
        anyhow::bail!("Aspect ratio bounds must be finite numbers");
    }
    if policy.min_aspect_ratio > policy.max_aspect_ratio {
        anyhow::bail!(
            "min_aspect_ratio ({}) is greater than max_aspect_ratio ({})",
            policy.min_aspect_ratio,
            policy.max_aspect_ratio
        );
    }

    Ladder::from_config(&config.ladder).context("Invalid ladder configuration")?;

    if let Some(url) = &config.callback.url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("Callback URL must start with http:// or https://: {}", url);
        }
    }

    Ok(())
}
