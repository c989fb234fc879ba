//! Layered configuration.
//!
//! Sources, lowest priority first: built-in defaults, the TOML file
//! (`cupcake.toml` unless overridden), `CUPCAKE_*` environment variables, and
//! finally command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::ReconnectBackoff;
use crate::logging::LogConfig;

pub const DEFAULT_CONFIG_FILE: &str = "cupcake.toml";
const ENV_PREFIX: &str = "CUPCAKE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Cupcake server; WebSocket URLs are derived from it.
    pub server_url: String,
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
    pub request_timeout_secs: u64,
    pub log_json: bool,
    pub verbose: bool,
    /// Where logs go while the TUI owns the terminal.
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            reconnect_initial_ms: 10_000,
            reconnect_max_ms: 30_000,
            request_timeout_secs: 30,
            log_json: false,
            verbose: false,
            log_file: PathBuf::from("cupcake.log"),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config_file` (or the default file), the
    /// environment, and `overrides`, which is any serializable set of flags.
    pub fn new<T: Serialize>(config_file: Option<&Path>, overrides: Option<&T>) -> Result<Self> {
        let file = config_file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX));

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let config: AppConfig = figment
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", file.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.server_url()?;
        if self.reconnect_initial_ms == 0 {
            anyhow::bail!("reconnect_initial_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn server_url(&self) -> Result<Url> {
        Url::parse(&self.server_url)
            .with_context(|| format!("Invalid server_url: {}", self.server_url))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff(&self) -> ReconnectBackoff {
        ReconnectBackoff::new(
            Duration::from_millis(self.reconnect_initial_ms),
            Duration::from_millis(self.reconnect_max_ms),
        )
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            json: self.log_json,
            verbose: self.verbose,
            file: None,
        }
    }

    /// Render as TOML, in the format accepted by the config file.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Serialize)]
    struct Flags {
        #[serde(skip_serializing_if = "Option::is_none")]
        server_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        verbose: Option<bool>,
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            AppConfig::new(Some(&dir.path().join("absent.toml")), None::<&Flags>).unwrap();
        assert_eq!(config.reconnect_initial_ms, 10_000);
        assert_eq!(config.reconnect_max_ms, 30_000);
        assert_eq!(config.backoff().peek(), Duration::from_secs(10));
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config("server_url = \"https://nas.local\"\nreconnect_max_ms = 60000\n");
        let config = AppConfig::new(Some(file.path()), None::<&Flags>).unwrap();
        assert_eq!(config.server_url, "https://nas.local");
        assert_eq!(config.reconnect_max_ms, 60_000);
        assert_eq!(config.reconnect_initial_ms, 10_000);
    }

    #[test]
    fn flags_override_file_and_unset_flags_do_not() {
        let file = write_config("server_url = \"https://nas.local\"\nverbose = true\n");
        let flags = Flags {
            server_url: Some("http://10.0.0.2:8080".into()),
            verbose: None,
        };
        let config = AppConfig::new(Some(file.path()), Some(&flags)).unwrap();
        assert_eq!(config.server_url, "http://10.0.0.2:8080");
        assert!(config.verbose);
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let file = write_config("server_url = \"not a url\"\n");
        assert!(AppConfig::new(Some(file.path()), None::<&Flags>).is_err());
    }

    #[test]
    fn toml_output_round_trips_through_loader() {
        let config = AppConfig {
            server_url: "http://backup:9000".into(),
            ..AppConfig::default()
        };
        let file = write_config(&config.to_toml().unwrap());
        assert_eq!(AppConfig::new(Some(file.path()), None::<&Flags>).unwrap(), config);
    }
}
