//! Application configuration
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional `config.toml` in the working directory
//! 3. environment variables prefixed with `MBTA_ROUTES`, using `__` between
//!    path segments (e.g. `MBTA_ROUTES__SERVER__PORT=8080`)
//! 4. `MBTA_API_KEY`, which fills `mbta.api_key`

use integration_mbta::MbtaConfig;
use serde::{Deserialize, Serialize};

/// Environment variable holding the MBTA API key
pub const API_KEY_ENV: &str = "MBTA_API_KEY";

/// Prefix for all other environment overrides
pub const ENV_PREFIX: &str = "MBTA_ROUTES";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// MBTA API client settings
    #[serde(default)]
    pub mbta: MbtaConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log format: "json" for structured JSON logs, "text" for human-readable
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Graceful shutdown timeout in seconds
    #[serde(default)]
    pub shutdown_timeout_secs: Option<u64>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_format: default_log_format(),
            shutdown_timeout_secs: Some(30),
        }
    }
}

impl ServerConfig {
    /// Socket address string to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from `config.toml`, the environment and `MBTA_API_KEY`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config", std::env::var(API_KEY_ENV).ok())
    }

    /// Load configuration from the given file (extension optional) and API key
    ///
    /// A missing file is not an error. An empty `api_key` is ignored so that
    /// a key from the file or `MBTA_ROUTES__MBTA__API_KEY` still applies.
    pub fn load_from(file: &str, api_key: Option<String>) -> Result<Self, config::ConfigError> {
        let api_key = api_key.filter(|key| !key.trim().is_empty());

        let config = config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.log_format", default_log_format())?
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("mbta.api_key", api_key)?
            .build()?;

        config.try_deserialize()
    }

    /// Validate the configuration before starting the server
    pub fn validate(&self) -> Result<(), String> {
        if !self.mbta.has_api_key() {
            return Err(format!("{API_KEY_ENV} is not set"));
        }

        self.mbta.validate().map_err(|e| format!("mbta: {e}"))?;

        if self.server.host.trim().is_empty() {
            return Err("server.host must not be empty".to_string());
        }

        if !matches!(
            self.server.log_format.to_ascii_lowercase().as_str(),
            "text" | "json"
        ) {
            return Err(format!(
                "server.log_format must be \"text\" or \"json\", got \"{}\"",
                self.server.log_format
            ));
        }

        Ok(())
    }
}
