//! MBTA client configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Configuration for the MBTA v3 API client
#[derive(Clone, Serialize, Deserialize)]
pub struct MbtaConfig {
    /// Base URL for the MBTA v3 API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent with every request (sensitive - uses SecretString)
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: SecretString,

    /// Default deadline for a whole client operation, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page size hint sent as `page[limit]` on list endpoints
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl std::fmt::Debug for MbtaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MbtaConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &if self.has_api_key() {
                    "[REDACTED]"
                } else {
                    "<unset>"
                },
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api-v3.mbta.com".to_string()
}

fn default_api_key() -> SecretString {
    SecretString::from(String::new())
}

const fn default_timeout_secs() -> u64 {
    10
}

// Larger than anything the server will honour, so list calls normally fit in one page.
const fn default_page_limit() -> u32 {
    9_999_999
}

impl Default for MbtaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
            page_limit: default_page_limit(),
        }
    }
}

impl MbtaConfig {
    /// Create a configuration with the given API key and defaults otherwise
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            ..Default::default()
        }
    }

    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_key: SecretString::from("API_KEY".to_string()),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Whether a non-empty API key is configured
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    /// Validate the configuration
    ///
    /// The API key is not checked here; whether it is mandatory is up to the
    /// process embedding the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("base_url is not a valid URL: {}", self.base_url));
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.page_limit == 0 {
            return Err("page_limit must be greater than 0".to_string());
        }

        Ok(())
    }
}
