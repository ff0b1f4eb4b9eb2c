//! enrich-server runtime configuration
//!
//! Command-line arguments and environment variables (via clap) override
//! values from the TOML file, which override compiled defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use enrich_common::config::TomlConfig;
use enrich_common::{Error, Result};

use crate::enrichment::ProviderEndpoints;

/// Command-line arguments for enrich-server
#[derive(Parser, Debug, Default)]
#[command(name = "enrich-server")]
#[command(about = "Person records enriched with inferred age, gender and nationality")]
#[command(version)]
pub struct Args {
    /// TOML config file
    #[arg(short, long, env = "ENRICH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind to
    #[arg(long, env = "ENRICH_BIND")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ENRICH_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "ENRICH_DATABASE")]
    pub database: Option<PathBuf>,

    /// Age lookup provider base URL
    #[arg(long, env = "ENRICH_AGE_API")]
    pub age_api: Option<String>,

    /// Gender lookup provider base URL
    #[arg(long, env = "ENRICH_GENDER_API")]
    pub gender_api: Option<String>,

    /// Nationality lookup provider base URL
    #[arg(long, env = "ENRICH_NATIONALITY_API")]
    pub nationality_api: Option<String>,

    /// Seconds in-flight requests get to finish on shutdown
    #[arg(long, env = "ENRICH_SHUTDOWN_GRACE_SECS")]
    pub shutdown_grace_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ENRICH_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub providers: ProviderEndpoints,
    pub shutdown_grace: Duration,
    pub log_level: String,
}

impl Settings {
    /// Load the TOML file named by `args` (if any) and apply overrides
    pub fn load(args: Args) -> Result<Self> {
        let file = TomlConfig::load(args.config.as_deref())?;
        Self::resolve(args, file)
    }

    /// Merge arguments over file values
    pub fn resolve(args: Args, file: TomlConfig) -> Result<Self> {
        let bind = args.bind.unwrap_or(file.bind);
        let port = args.port.unwrap_or(file.port);
        let bind_addr = format!("{}:{}", bind, port)
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Invalid bind address {}:{}: {}", bind, port, e)))?;

        let providers = ProviderEndpoints {
            age_url: args.age_api.unwrap_or(file.providers.age_url),
            gender_url: args.gender_api.unwrap_or(file.providers.gender_url),
            nationality_url: args.nationality_api.unwrap_or(file.providers.nationality_url),
        };

        Ok(Self {
            bind_addr,
            database_path: args.database.unwrap_or(file.database_path),
            providers,
            shutdown_grace: Duration::from_secs(
                args.shutdown_grace_secs.unwrap_or(file.shutdown_grace_secs),
            ),
            log_level: args.log_level.unwrap_or(file.logging.level),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_without_overrides() {
        let settings = Settings::resolve(Args::default(), TomlConfig::default()).unwrap();

        assert_eq!(settings.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(settings.database_path, PathBuf::from("enrich.db"));
        assert_eq!(settings.shutdown_grace, Duration::from_secs(5));
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.providers.age_url, "https://api.agify.io/");
    }

    #[test]
    fn test_arguments_override_file() {
        let file = TomlConfig::from_toml_str(
            r#"
            port = 9000
            database_path = "from-file.db"

            [providers]
            age_url = "http://file/age"
            gender_url = "http://file/gender"
            "#,
        )
        .unwrap();

        let args = Args {
            port: Some(9100),
            gender_api: Some("http://cli/gender".to_string()),
            ..Args::default()
        };

        let settings = Settings::resolve(args, file).unwrap();
        assert_eq!(settings.bind_addr.port(), 9100);
        assert_eq!(settings.database_path, PathBuf::from("from-file.db"));
        assert_eq!(settings.providers.age_url, "http://file/age");
        assert_eq!(settings.providers.gender_url, "http://cli/gender");
    }

    #[test]
    fn test_invalid_bind_is_config_error() {
        let args = Args {
            bind: Some("not an address".to_string()),
            ..Args::default()
        };
        let result = Settings::resolve(args, TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_parse_command_line() {
        let args = Args::try_parse_from([
            "enrich-server",
            "--port",
            "7000",
            "--database",
            "/tmp/people.db",
            "--shutdown-grace-secs",
            "2",
        ])
        .unwrap();

        assert_eq!(args.port, Some(7000));
        assert_eq!(args.database, Some(PathBuf::from("/tmp/people.db")));
        assert_eq!(args.shutdown_grace_secs, Some(2));
    }

    #[test]
    #[serial]
    fn test_environment_fills_unset_arguments() {
        std::env::set_var("ENRICH_PORT", "7100");
        std::env::set_var("ENRICH_AGE_API", "http://env/age");

        let args = Args::try_parse_from(["enrich-server", "--port", "7200"]).unwrap();

        std::env::remove_var("ENRICH_PORT");
        std::env::remove_var("ENRICH_AGE_API");

        // Command line beats environment
        assert_eq!(args.port, Some(7200));
        assert_eq!(args.age_api.as_deref(), Some("http://env/age"));
    }
}
