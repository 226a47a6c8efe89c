//! Configuration for ipwatch
//!
//! The configuration is a flat TOML file read once at startup. The resulting
//! [`Config`] is immutable and passed explicitly to every component that
//! needs it.
//!
//! ```toml
//! zone-id = "023e105f4ecef8ad9ca31a8372d0c353"
//! dns-record-id = "372e67954025e0ba6aaa6d586b9e0b59"
//! cloudflare-email = "ops@example.com"
//! cloudflare-api-key = "..."
//! domain-name = "home.example.com"
//! ttl = 1
//! type = "A"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default Cloudflare TTL (1 means "automatic")
const DEFAULT_TTL: u32 = 1;

/// Default polling interval: 30 minutes
const DEFAULT_INTERVAL_SECS: u64 = 30 * 60;

/// Longest accepted polling interval: one week
const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default plain-text IP echo service
pub const DEFAULT_LOOKUP_URL: &str = "https://api.ipify.org";

/// Default location of the last-known IP file
const DEFAULT_STATE_FILE: &str = "./last-ip.txt";

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// How credentials are presented to the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <cloudflare-api-key>` (API token)
    #[default]
    Bearer,
    /// `X-Auth-Email` + `X-Auth-Key` (legacy global API key)
    GlobalKey,
}

/// Immutable process configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Cloudflare zone identifier
    #[serde(default)]
    pub zone_id: String,

    /// Identifier of the tracked DNS record
    #[serde(default)]
    pub dns_record_id: String,

    /// Account email, sent with [`AuthScheme::GlobalKey`]
    #[serde(default)]
    pub cloudflare_email: String,

    /// API token or global API key
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub cloudflare_api_key: String,

    /// Fully qualified record name
    #[serde(default)]
    pub domain_name: String,

    /// Record TTL in seconds (1 = automatic)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Record type
    #[serde(rename = "type", default = "default_record_type")]
    pub record_type: String,

    /// Whether the record is proxied through Cloudflare
    #[serde(default)]
    pub proxied: bool,

    #[serde(default)]
    pub auth_scheme: AuthScheme,

    /// Seconds between checks after the initial one
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// File holding the last IP pushed to the provider
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Plain-text IP echo service
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_record_type() -> String {
    "A".to_string()
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

fn default_lookup_url() -> String {
    DEFAULT_LOOKUP_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zone_id: String::new(),
            dns_record_id: String::new(),
            cloudflare_email: String::new(),
            cloudflare_api_key: String::new(),
            domain_name: String::new(),
            ttl: default_ttl(),
            record_type: default_record_type(),
            proxied: false,
            auth_scheme: AuthScheme::default(),
            interval_secs: default_interval_secs(),
            state_file: default_state_file(),
            lookup_url: default_lookup_url(),
            log_level: default_log_level(),
        }
    }
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("zone_id", &self.zone_id)
            .field("dns_record_id", &self.dns_record_id)
            .field("cloudflare_email", &self.cloudflare_email)
            .field("cloudflare_api_key", &"<REDACTED>")
            .field("domain_name", &self.domain_name)
            .field("ttl", &self.ttl)
            .field("record_type", &self.record_type)
            .field("proxied", &self.proxied)
            .field("auth_scheme", &self.auth_scheme)
            .field("interval_secs", &self.interval_secs)
            .field("state_file", &self.state_file)
            .field("lookup_url", &self.lookup_url)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate the configuration file at `path`
    ///
    /// A missing file is replaced by a default one and reported as an
    /// error so the operator fills in the credentials before the next run.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            Self::write_default(path)?;
            return Err(Error::config(format!(
                "no config found, created {} with default values; \
                update it before running again",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Write a default configuration file, creating parent directories
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| Error::config(format!("Failed to serialize default config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write default config {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::warn!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    /// Validate the configuration
    ///
    /// Every string key must be non-empty; `ttl` is exempt.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("zone-id", &self.zone_id),
            ("dns-record-id", &self.dns_record_id),
            ("cloudflare-email", &self.cloudflare_email),
            ("cloudflare-api-key", &self.cloudflare_api_key),
            ("domain-name", &self.domain_name),
            ("type", &self.record_type),
            ("lookup-url", &self.lookup_url),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!("value for key {:?} is empty", key)));
            }
        }

        if self.state_file.as_os_str().is_empty() {
            return Err(Error::config("value for key \"state-file\" is empty"));
        }

        if self.interval_secs == 0 {
            return Err(Error::config("interval-secs must be > 0"));
        }

        if self.interval_secs > MAX_INTERVAL_SECS {
            return Err(Error::config(format!(
                "interval-secs {} is too large (max {})",
                self.interval_secs, MAX_INTERVAL_SECS
            )));
        }

        if !self.lookup_url.starts_with("https://") && !self.lookup_url.starts_with("http://") {
            return Err(Error::config(format!(
                "lookup-url must use HTTP or HTTPS scheme. Got: {}",
                self.lookup_url
            )));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log-level '{}' is not valid. Valid levels: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Polling interval as a [`Duration`]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
