// src/config.rs
//! Configuration for storage access and manifest generation
//!
//! Configuration comes from an optional TOML file and the process
//! environment, with the environment taking precedence.
//!
//! # Example (TOML)
//!
//! ```toml
//! storage_url = "https://project.supabase.co"
//! service_key = "service-role-key"
//! source_bucket = "epubs"
//! output_bucket = "readium-manifests"
//! timeout_secs = 30
//! href_mode = "relative"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the storage base URL
pub const STORAGE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable holding the storage service key
pub const SERVICE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Environment variable overriding the bucket source archives are read from
pub const SOURCE_BUCKET_ENV: &str = "QUIRE_SOURCE_BUCKET";

/// Environment variable overriding the bucket the distribution is written to
pub const OUTPUT_BUCKET_ENV: &str = "QUIRE_OUTPUT_BUCKET";

/// How references inside the synthesized manifest are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HrefMode {
    /// Relative to the manifest's own location
    #[default]
    Relative,
    /// Absolute URLs taken from the resource map
    Absolute,
}

impl fmt::Display for HrefMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HrefMode::Relative => write!(f, "relative"),
            HrefMode::Absolute => write!(f, "absolute"),
        }
    }
}

impl std::str::FromStr for HrefMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "relative" => Ok(HrefMode::Relative),
            "absolute" => Ok(HrefMode::Absolute),
            other => Err(Error::ConfigError(format!("Unknown href mode: {other}"))),
        }
    }
}

/// Storage and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the object storage service
    #[serde(default)]
    pub storage_url: String,

    /// Service key used for both the `apikey` and bearer headers
    #[serde(default)]
    pub service_key: String,

    /// Bucket holding the source EPUB archives (default: epubs)
    #[serde(default = "default_source_bucket")]
    pub source_bucket: String,

    /// Bucket receiving the materialized publication (default: readium-manifests)
    #[serde(default = "default_output_bucket")]
    pub output_bucket: String,

    /// User-Agent sent with storage requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP client timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Reference style for the synthesized manifest (default: relative)
    #[serde(default)]
    pub href_mode: HrefMode,
}

fn default_source_bucket() -> String {
    "epubs".to_string()
}

fn default_output_bucket() -> String {
    "readium-manifests".to_string()
}

fn default_user_agent() -> String {
    format!("quire/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_url: String::new(),
            service_key: String::new(),
            source_bucket: default_source_bucket(),
            output_bucket: default_output_bucket(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            href_mode: HrefMode::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Build configuration from the process environment only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(lookup);
        config
    }

    /// Overlay non-empty variables from `lookup` onto this configuration
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = non_empty(STORAGE_URL_ENV) {
            self.storage_url = url;
        }
        if let Some(key) = non_empty(SERVICE_KEY_ENV) {
            self.service_key = key;
        }
        if let Some(bucket) = non_empty(SOURCE_BUCKET_ENV) {
            self.source_bucket = bucket;
        }
        if let Some(bucket) = non_empty(OUTPUT_BUCKET_ENV) {
            self.output_bucket = bucket;
        }
    }

    /// Check that remote storage can be reached with this configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage_url.is_empty() {
            return Err(Error::ConfigError(format!(
                "{STORAGE_URL_ENV} environment variable is not set"
            )));
        }
        if self.service_key.is_empty() {
            return Err(Error::ConfigError(format!(
                "{SERVICE_KEY_ENV} environment variable is not set"
            )));
        }
        if self.source_bucket.is_empty() || self.output_bucket.is_empty() {
            return Err(Error::ConfigError("Bucket names must not be empty".to_string()));
        }
        Ok(())
    }

    /// Storage URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.storage_url.trim_end_matches('/')
    }

    /// HTTP client timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
