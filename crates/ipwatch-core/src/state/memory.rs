// # Memory State Store
//
// In-memory implementation of StateStore.
//
// State is lost on restart, so the first check after a restart always
// pushes an update. Useful for tests and for embedding the poller where the
// caller owns persistence.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::StateStore;

/// In-memory state store
///
/// Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<Ipv4Addr>>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `ip`
    pub fn with_ip(ip: Ipv4Addr) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(ip))),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn last_ip(&self) -> Result<Option<Ipv4Addr>, Error> {
        Ok(*self.inner.read().await)
    }

    async fn save(&self, ip: Ipv4Addr) -> Result<(), Error> {
        *self.inner.write().await = Some(ip);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStateStore::new();
        assert_eq!(store.last_ip().await.unwrap(), None);

        let ip = Ipv4Addr::new(1, 2, 3, 4);
        store.save(ip).await.unwrap();
        assert_eq!(store.last_ip().await.unwrap(), Some(ip));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStateStore::with_ip(Ipv4Addr::new(1, 2, 3, 4));
        let other = store.clone();

        other.save(Ipv4Addr::new(5, 6, 7, 8)).await.unwrap();
        assert_eq!(store.last_ip().await.unwrap(), Some(Ipv4Addr::new(5, 6, 7, 8)));
    }
}
