// # DNS Provider Trait
//
// Defines the interface for pushing a new "A" record value to a provider.
//
// ## Implementations
//
// - Cloudflare: `ipwatch-cloudflare` crate

use async_trait::async_trait;
use serde::Serialize;
use std::net::Ipv4Addr;

use crate::config::Config;

/// Record update request sent to the provider
///
/// Built once per update from the configuration and the new IP, then
/// dropped. Serializes to `{name, ttl, type, content, proxied}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordUpdate {
    /// Record name (e.g. "home.example.com")
    pub name: String,
    /// Time-to-live in seconds (1 = automatic)
    pub ttl: u32,
    /// Record type, normally "A"
    #[serde(rename = "type")]
    pub record_type: String,
    /// New record value
    pub content: Ipv4Addr,
    /// Whether the record is proxied by the provider
    pub proxied: bool,
}

impl RecordUpdate {
    /// Build the update for `ip` from the configured record settings
    pub fn from_config(config: &Config, ip: Ipv4Addr) -> Self {
        Self {
            name: config.domain_name.clone(),
            ttl: config.ttl,
            record_type: config.record_type.clone(),
            content: ip,
            proxied: config.proxied,
        }
    }
}

/// Provider acknowledgement of a successful update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateConfirmation {
    /// Provider-specific `result` payload
    pub result: serde_json::Value,
}

/// Trait for DNS provider implementations
///
/// One call performs one update request. Providers do not retry, do not
/// touch the state store and do not decide whether an update is needed;
/// all of that is owned by the [`Poller`](crate::Poller).
///
/// # Errors
///
/// - [`Error::Provider`](crate::Error::Provider): non-2xx status, or the
///   provider reported `success: false`
/// - [`Error::Network`](crate::Error::Network): the request could not be sent
///   or the response could not be read
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Submit the new record value
    async fn update_record(
        &self,
        update: &RecordUpdate,
    ) -> Result<UpdateConfirmation, crate::Error>;

    /// Provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
