// # IP Lookup Trait
//
// Defines the interface for discovering the caller's public IPv4 address.
//
// ## Implementations
//
// - HTTP echo service: `ipwatch-lookup` crate
//
// ## Usage
//
// ```rust,ignore
// use ipwatch_core::IpLookup;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let lookup = /* IpLookup implementation */;
//     let ip = lookup.current().await?;
//     println!("public IP: {}", ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for public IP lookup implementations
///
/// A lookup performs exactly one query per call. It does not cache, poll or
/// retry; scheduling belongs to the [`Poller`](crate::Poller).
///
/// # Errors
///
/// Implementations must return [`Error::Network`](crate::Error::Network) when
/// the query fails or when the answer is empty or not an IPv4 address. An
/// empty answer is never reported as success.
#[async_trait]
pub trait IpLookup: Send + Sync {
    /// Fetch the current public IPv4 address
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;
}
