// # Cloudflare DNS Provider
//
// Pushes a new value for one pre-identified DNS record through the
// Cloudflare API v4.
//
// One PUT per call. The provider never looks the record up, never retries
// and never touches the state store; the poller owns all of that.
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ipwatch_core::config::{AuthScheme, Config};
use ipwatch_core::traits::{DnsProvider, RecordUpdate, UpdateConfirmation};
use ipwatch_core::{Error, Result};
use serde::Deserialize;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const PROVIDER: &str = "cloudflare";

/// Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct CloudflareResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareError>,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CloudflareError {
    code: i64,
    message: String,
}

fn describe_errors(errors: &[CloudflareError]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cloudflare DNS provider bound to a single record
pub struct CloudflareProvider {
    zone_id: String,
    record_id: String,

    /// Sent as `X-Auth-Email` with [`AuthScheme::GlobalKey`]
    email: String,

    /// API token or global key
    /// ⚠️ NEVER log this value
    api_key: String,

    auth_scheme: AuthScheme,

    base_url: String,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("email", &self.email)
            .field("api_key", &"<REDACTED>")
            .field("auth_scheme", &self.auth_scheme)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider from the zone, record and credential settings
    ///
    /// # Errors
    ///
    /// `Error::Config` if the zone id, record id or API key is empty, or if
    /// the global-key scheme is selected without an email.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.cloudflare_api_key.trim().is_empty() {
            return Err(Error::config("Cloudflare API key is required"));
        }
        if config.zone_id.trim().is_empty() || config.dns_record_id.trim().is_empty() {
            return Err(Error::config(
                "Cloudflare zone-id and dns-record-id are required",
            ));
        }
        if config.auth_scheme == AuthScheme::GlobalKey && config.cloudflare_email.trim().is_empty() {
            return Err(Error::config(
                "cloudflare-email is required with auth-scheme = \"global-key\"",
            ));
        }

        Ok(Self {
            zone_id: config.zone_id.clone(),
            record_id: config.dns_record_id.clone(),
            email: config.cloudflare_email.clone(),
            api_key: config.cloudflare_api_key.clone(),
            auth_scheme: config.auth_scheme,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client: reqwest::Client::new(),
        })
    }

    /// Point the provider at another API base (e.g. a local mock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Endpoint of the tracked record
    fn record_url(&self) -> String {
        format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, self.zone_id, self.record_id
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_scheme {
            AuthScheme::Bearer => request.bearer_auth(&self.api_key),
            AuthScheme::GlobalKey => request
                .header("X-Auth-Email", &self.email)
                .header("X-Auth-Key", &self.api_key),
        }
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Update the tracked record
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "name": "home.example.com",
    ///   "ttl": 1,
    ///   "type": "A",
    ///   "content": "1.2.3.4",
    ///   "proxied": false
    /// }
    /// ```
    async fn update_record(&self, update: &RecordUpdate) -> Result<UpdateConfirmation> {
        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} ({})",
            update.name,
            update.content,
            update.record_type
        );

        let request = self
            .client
            .put(self.record_url())
            .header("Content-Type", "application/json")
            .json(update);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::network(format!("Cloudflare request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read Cloudflare response: {}", e)))?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => Error::provider(
                    PROVIDER,
                    format!(
                        "Authentication failed: invalid API key or insufficient permissions. Status: {} - {}",
                        status, body
                    ),
                ),
                404 => Error::provider(
                    PROVIDER,
                    format!(
                        "DNS record {} not found in zone {}. Status: {}",
                        self.record_id, self.zone_id, status
                    ),
                ),
                429 => Error::provider(
                    PROVIDER,
                    format!("Rate limit exceeded. Status: {}", status),
                ),
                _ => Error::provider(
                    PROVIDER,
                    format!("Failed to update record: {} - {}", status, body),
                ),
            });
        }

        let parsed: CloudflareResponse = serde_json::from_str(&body)
            .map_err(|e| Error::network(format!("Failed to parse Cloudflare response: {}", e)))?;

        if !parsed.success {
            return Err(Error::provider(
                PROVIDER,
                format!(
                    "Cloudflare reported failure: {} (result: {})",
                    describe_errors(&parsed.errors),
                    parsed.result
                ),
            ));
        }

        tracing::info!(
            "DNS record updated successfully: {} -> {}",
            update.name,
            update.content
        );

        Ok(UpdateConfirmation {
            result: parsed.result,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
