//! Configuration types for the Titan client
//!
//! This module defines all configuration structures used throughout the crate.
//! Loading them (environment, files) is left to the embedding binary.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitanConfig {
    /// Appliance URL and OAuth1 key material
    pub credential: OAuthCredential,

    /// Per-session request settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging settings (consumed by the binary that installs the subscriber)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TitanConfig {
    /// Create a configuration for the given credential with default settings
    pub fn new(credential: OAuthCredential) -> Self {
        Self {
            credential,
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate the configuration
    ///
    /// Credential fields are not checked: empty values are
    /// passed through and surface as 401/403 from the appliance.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.session.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// OAuth1 credential for one appliance
///
/// Field names on the wire follow the JSON layout used by existing
/// deployments (`API_URL`, `CONSUMER_KEY`, ...).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredential {
    /// Appliance base URL, e.g. `https://titan.example.net`
    #[serde(rename = "API_URL")]
    pub base_url: String,

    /// OAuth1 consumer key
    #[serde(rename = "CONSUMER_KEY")]
    pub consumer_key: String,

    /// OAuth1 consumer secret
    /// ⚠️ NEVER log this value
    #[serde(rename = "CONSUMER_SECRET")]
    pub consumer_secret: String,

    /// OAuth1 token key
    #[serde(rename = "TOKEN_KEY")]
    pub token_key: String,

    /// OAuth1 token secret
    /// ⚠️ NEVER log this value
    #[serde(rename = "TOKEN_SECRET")]
    pub token_secret: String,
}

impl OAuthCredential {
    /// Create a new credential
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token_key: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token_key: token_key.into(),
            token_secret: token_secret.into(),
        }
    }
}

// Custom Debug implementation that hides both secrets
impl std::fmt::Debug for OAuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredential")
            .field("base_url", &self.base_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<REDACTED>")
            .field("token_key", &self.token_key)
            .field("token_secret", &"<REDACTED>")
            .finish()
    }
}

/// Request settings shared by every call made through one context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Deadline for a single request, in seconds
    ///
    /// Set to 0 to rely on the transport default.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How many accounts may be fetched at the same time during aggregation
    ///
    /// Results are merged in account order whatever the value; 1 keeps the
    /// aggregation strictly sequential.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

impl SessionConfig {
    /// Validate the session settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.fetch_concurrency == 0 {
            return Err(crate::Error::config("fetch_concurrency must be > 0"));
        }
        Ok(())
    }

    /// Request deadline, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_fetch_concurrency() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output encoding
    #[serde(default)]
    pub encoding: LogEncoding,

    /// Include source file and line in each event
    #[serde(default)]
    pub include_caller: bool,
}

impl LoggingConfig {
    /// Validate the logging settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(crate::Error::config(format!(
                "log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            encoding: LogEncoding::default(),
            include_caller: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEncoding {
    /// Human readable, one event per line
    #[default]
    Console,
    /// One JSON object per event
    Json,
}
