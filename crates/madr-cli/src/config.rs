//! Configuration file support for the madr CLI
//!
//! Loads settings from `_madr.toml` configuration file.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "_madr.toml";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Output configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
    /// Parsing configuration
    #[serde(skip_serializing_if = "ParseConfig::is_empty")]
    pub parse: ParseConfig,
}

/// Output configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" (structured record) or "md" (canonical MADR Markdown).
    /// Defaults to "json" for Markdown input and "md" for JSON input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.format.is_none()
    }
}

/// Parsing configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ParseConfig {
    /// How to cut the explanation out of the "Chosen option" line:
    /// "first" (split at the first ", because") or "legacy" (split at every
    /// ", because" and rejoin with commas) (default: "first")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_split: Option<String>,
    /// Require option headings to equal a considered option after
    /// normalization instead of allowing prefix matches (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_titles: Option<bool>,
    /// Treat recoverable parse warnings as errors (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ParseConfig {
    fn is_empty(&self) -> bool {
        self.explanation_split.is_none() && self.exact_titles.is_none() && self.strict.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_madr.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Create a sample configuration with the defaults spelled out
    pub fn sample() -> Self {
        Config {
            output: OutputConfig { format: None },
            parse: ParseConfig {
                explanation_split: Some("first".to_string()),
                exact_titles: Some(false),
                strict: Some(false),
            },
        }
    }
}
