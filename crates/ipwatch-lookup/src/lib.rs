// # HTTP IP Lookup
//
// Fetches the caller's public IPv4 address from a plain-text echo service
// such as api.ipify.org. The response body is the address as UTF-8 text.
//
// One GET per call. No caching, no polling, no retry: the poller decides
// when to ask again.

use async_trait::async_trait;
use ipwatch_core::traits::IpLookup;
use ipwatch_core::{Error, Result};
use std::net::Ipv4Addr;

pub use ipwatch_core::config::DEFAULT_LOOKUP_URL;

/// HTTP-based public IP lookup
#[derive(Debug, Clone)]
pub struct HttpIpLookup {
    /// URL returning the caller's IP as plain text
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpLookup {
    /// Create a lookup against `url` (e.g. "https://api.ipify.org")
    ///
    /// Uses the client's default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// URL this lookup queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpIpLookup {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_URL)
    }
}

/// Parse an echo service body into an IPv4 address
fn parse_body(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();

    if text.is_empty() {
        return Err(Error::network("IP lookup returned an empty response"));
    }

    text.parse()
        .map_err(|_| Error::network(format!("IP lookup returned an invalid IPv4 address: {:?}", text)))
}

#[async_trait]
impl IpLookup for HttpIpLookup {
    async fn current(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("IP lookup request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "IP lookup returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read IP lookup response: {}", e)))?;

        let ip = parse_body(&body)?;
        tracing::debug!("Public IP from {}: {}", self.url, ip);
        Ok(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn lookup_answering(template: ResponseTemplate) -> (MockServer, HttpIpLookup) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(template)
            .mount(&server)
            .await;

        let lookup = HttpIpLookup::new(format!("{}/", server.uri()));
        (server, lookup)
    }

    #[test]
    fn test_parse_body_trims_whitespace() {
        assert_eq!(parse_body(" 5.6.7.8\n").unwrap(), Ipv4Addr::new(5, 6, 7, 8));
    }

    #[test]
    fn test_parse_body_rejects_ipv6() {
        assert!(matches!(parse_body("2001:db8::1"), Err(Error::Network(_))));
    }

    #[test]
    fn test_default_url() {
        assert_eq!(HttpIpLookup::default().url(), "https://api.ipify.org");
    }

    #[tokio::test]
    async fn test_current_returns_ip() {
        let (_server, lookup) =
            lookup_answering(ResponseTemplate::new(200).set_body_string("203.0.113.7")).await;

        assert_eq!(lookup.current().await.unwrap(), Ipv4Addr::new(203, 0, 113, 7));
    }

    #[tokio::test]
    async fn test_empty_body_is_network_error() {
        let (_server, lookup) =
            lookup_answering(ResponseTemplate::new(200).set_body_string("  \n")).await;

        let err = lookup.current().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "{:?}", err);
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_garbage_body_is_network_error() {
        let (_server, lookup) =
            lookup_answering(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

        assert!(matches!(lookup.current().await, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let (_server, lookup) = lookup_answering(ResponseTemplate::new(503)).await;

        let err = lookup.current().await.unwrap_err();
        assert!(err.to_string().contains("503"), "{}", err);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let server = MockServer::start().await;
        let url = format!("{}/", server.uri());
        drop(server);

        let lookup = HttpIpLookup::new(url);
        assert!(matches!(lookup.current().await, Err(Error::Network(_))));
    }
}
