//!
//! Configuration structures and loading logic for mdfence.
//!
//! Configuration is a single optional TOML file. Every knob has a default, so
//! running without a config file is the common case.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".mdfence.toml";

/// Represents the complete configuration loaded from .mdfence.toml
#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Global configuration options
    pub global: GlobalConfig,

    /// External formatter tool options
    pub tools: ToolsConfig,
}

/// Global configuration options
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Directory scanned for Markdown files when no paths are given
    pub root: String,

    /// Respect .gitignore files when scanning directories
    pub respect_gitignore: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            root: "files".to_string(),
            respect_gitignore: true,
        }
    }
}

/// External formatter tool options
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolsConfig {
    /// Command used to format JavaScript fence bodies (argv; reads stdin,
    /// writes stdout)
    pub javascript: Vec<String>,

    /// Timeout in milliseconds for one formatter invocation (0 = no timeout)
    pub timeout: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            javascript: vec![
                "prettier".to_string(),
                "--stdin-filepath".to_string(),
                "fence.js".to_string(),
            ],
            timeout: 30_000,
        }
    }
}

/// Errors that can occur while loading or creating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Configuration file already exists
    #[error("Configuration file already exists at {path}")]
    FileExists { path: String },
}

/// Load configuration.
///
/// With an explicit path, the file must exist and parse. Without one, the
/// default config file is used if present; otherwise the built-in defaults
/// apply.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => read_config(path),
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                read_config(DEFAULT_CONFIG_FILE)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn read_config(path: &str) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        source: e,
        path: path.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Create a default configuration file at the specified path
pub fn create_default_config(path: &str) -> Result<(), ConfigError> {
    if Path::new(path).exists() {
        return Err(ConfigError::FileExists {
            path: path.to_string(),
        });
    }

    let content = r#"# mdfence configuration

[global]
# Directory scanned for Markdown files when no paths are given
root = "files"
# Respect .gitignore files when scanning directories
respect-gitignore = true

[tools]
# Command used to format JavaScript fence bodies (reads stdin, writes stdout)
javascript = ["prettier", "--stdin-filepath", "fence.js"]
# Timeout in milliseconds for one formatter invocation
timeout = 30000
"#;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError {
        source: e,
        path: path.to_string(),
    })
}
