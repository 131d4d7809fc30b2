//! Application configuration for anyload.
//!
//! User config lives at `~/.anyload/anyload.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnyloadError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "anyload.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".anyload";

// ---------------------------------------------------------------------------
// Config structs (matching anyload.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// What to do when a remote reference cannot be resolved.
///
/// Degrade-to-literal is the default; fail-hard is available for callers
/// that prefer a loud error naming the address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Broken references resolve to the original literal string.
    #[default]
    DegradeToLiteral,
    /// Broken references reject the whole load with a `Remote` error.
    Fail,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_redirect_limit")]
    pub redirect_limit: usize,

    /// Failure policy for unresolvable references.
    #[serde(default)]
    pub policy: FetchPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            redirect_limit: default_redirect_limit(),
            policy: FetchPolicy::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_redirect_limit() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.anyload/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AnyloadError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.anyload/anyload.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AnyloadError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| AnyloadError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AnyloadError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AnyloadError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AnyloadError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("timeout_secs"));
        assert!(toml_str.contains("degrade-to-literal"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 30);
        assert_eq!(parsed.fetch.policy, FetchPolicy::DegradeToLiteral);
    }

    #[test]
    fn fail_policy_parses() {
        let toml_str = r#"
[fetch]
timeout_secs = 5
policy = "fail"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.policy, FetchPolicy::Fail);
        assert_eq!(config.fetch.redirect_limit, 5);
    }
}
