//! Bootstrap configuration loaded from a TOML file
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Compiled defaults (this module)
//!
//! Levels 1 and 2 are resolved by the binary; this module owns the file
//! format and the defaults. A missing config file is not an error: the
//! service logs a warning and starts with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default agify-compatible age provider
pub const DEFAULT_AGE_API: &str = "https://api.agify.io/";
/// Default genderize-compatible gender provider
pub const DEFAULT_GENDER_API: &str = "https://api.genderize.io/";
/// Default nationalize-compatible nationality provider
pub const DEFAULT_NATIONALITY_API: &str = "https://api.nationalize.io/";

/// Bootstrap configuration
///
/// Cannot change while the service runs; restart to pick up edits.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface to bind the HTTP listener to
    pub bind: String,

    /// HTTP server port
    pub port: u16,

    /// Path to SQLite database file (relative or absolute)
    pub database_path: PathBuf,

    /// Seconds in-flight requests get to finish after a shutdown signal
    pub shutdown_grace_secs: u64,

    /// Name lookup providers used for enrichment
    pub providers: ProvidersConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Base URLs of the three lookup providers
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub age_url: String,
    pub gender_url: String,
    pub nationality_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            database_path: PathBuf::from("enrich.db"),
            shutdown_grace_secs: 5,
            providers: ProvidersConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            age_url: DEFAULT_AGE_API.to_string(),
            gender_url: DEFAULT_GENDER_API.to_string(),
            nationality_url: DEFAULT_NATIONALITY_API.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from `path`, falling back to defaults
    ///
    /// `None` or a missing/unreadable file yields defaults with a warning.
    /// A file that exists but does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("No config file given, using compiled defaults");
            return Ok(Self::default());
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Config file {} not readable ({}), using compiled defaults",
                    path.display(),
                    e
                );
                return Ok(Self::default());
            }
        };

        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded config file {}", path.display());
        Ok(config)
    }
}
