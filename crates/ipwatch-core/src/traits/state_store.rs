// # State Store Trait
//
// Defines the interface for persisting the last IP pushed to the provider.
//
// ## Purpose
//
// The store lets the poller skip provider calls when the public IP has not
// moved, including across restarts. It holds a single value; no history.
//
// ## Implementations
//
// - File-based: plain-text file, see `state::file`
// - In-memory: for tests and embedding, see `state::memory`

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for state store implementations
///
/// # Invariant
///
/// `save` is only called after the provider confirmed the update, so the
/// stored value always reflects the record's last confirmed content.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the last known IP
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ip))`: A value was persisted
    /// - `Ok(None)`: Nothing persisted yet (not an error)
    /// - `Err(Error::Persistence)`: The store exists but could not be read
    async fn last_ip(&self) -> Result<Option<Ipv4Addr>, crate::Error>;

    /// Replace the last known IP
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Durably written
    /// - `Err(Error::Persistence)`: The write failed
    async fn save(&self, ip: Ipv4Addr) -> Result<(), crate::Error>;
}
