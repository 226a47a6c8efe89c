//! Polling control loop
//!
//! The Poller is responsible for:
//! - Running one check on startup and one per polling interval
//! - Detecting a change of the public IP against the persisted value
//! - Pushing the new value to the DNS provider
//! - Persisting the value only after the provider confirmed it
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────┐
//!   interval ─────▶│    Poller    │◀───── shutdown
//!                  └──────────────┘
//!                         │
//!      ┌──────────────────┼──────────────────┐
//!      ▼                  ▼                  ▼
//! ┌──────────┐     ┌─────────────┐    ┌─────────────┐
//! │ IpLookup │     │ StateStore  │    │ DnsProvider │
//! │ (fetch)  │     │ (load/save) │    │  (update)   │
//! └──────────┘     └─────────────┘    └─────────────┘
//! ```
//!
//! ## Check Flow
//!
//! 1. Load the last known IP (missing reads as none)
//! 2. Fetch the current public IP
//! 3. If equal, done; no provider call
//! 4. Otherwise call `DnsProvider::update_record()` once
//! 5. On success, save the new IP
//!
//! Any failure ends the loop with the error. No retry, no backoff.

use std::future::Future;
use std::net::Ipv4Addr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::traits::{DnsProvider, IpLookup, RecordUpdate, StateStore, UpdateConfirmation};

/// Capacity of the event channel returned by [`Poller::new`]
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Result of comparing the current public IP with the persisted one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDetection {
    /// IP reported by the lookup service
    pub current: Ipv4Addr,
    /// IP last pushed to the provider, if any
    pub previous: Option<Ipv4Addr>,
}

impl ChangeDetection {
    /// Whether the provider needs to be updated
    pub fn changed(&self) -> bool {
        self.previous != Some(self.current)
    }
}

/// Result of one successful check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The public IP matched the persisted one; nothing was sent
    Unchanged {
        ip: Ipv4Addr,
    },
    /// The provider accepted the new IP and it was persisted
    Updated {
        previous_ip: Option<Ipv4Addr>,
        new_ip: Ipv4Addr,
    },
}

/// Events emitted by the Poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerEvent {
    /// Loop entered the running state
    Started {
        interval: Duration,
    },

    /// Check found no change
    Unchanged {
        ip: Ipv4Addr,
        checked_at: DateTime<Utc>,
    },

    /// Provider confirmed the update and the IP was persisted
    UpdateSucceeded {
        previous_ip: Option<Ipv4Addr>,
        new_ip: Ipv4Addr,
        updated_at: DateTime<Utc>,
    },

    /// Provider rejected the update or the new IP could not be persisted
    UpdateFailed {
        new_ip: Ipv4Addr,
        error: String,
    },

    /// Check failed; the loop is stopping
    CheckFailed {
        error: String,
    },

    /// Loop terminated on request
    Stopped {
        reason: String,
    },
}

/// Dynamic DNS polling loop
///
/// ## Lifecycle
///
/// 1. Create with [`Poller::new()`]
/// 2. Drive with [`Poller::run_until()`], passing the shutdown future
/// 3. Returns `Ok(())` on shutdown, `Err` on the first failed check
///
/// ## Threading
///
/// Single logical thread of control: checks never overlap, and the state
/// store is only touched from within a check.
pub struct Poller {
    lookup: Box<dyn IpLookup>,
    provider: Box<dyn DnsProvider>,
    state_store: Box<dyn StateStore>,
    config: Config,
    event_tx: mpsc::Sender<PollerEvent>,
}

impl Poller {
    /// Create a new poller
    ///
    /// # Returns
    ///
    /// A tuple of (poller, event_receiver). Dropping the receiver is fine;
    /// events are then discarded.
    pub fn new(
        lookup: Box<dyn IpLookup>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
        config: Config,
    ) -> Result<(Self, mpsc::Receiver<PollerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let poller = Self {
            lookup,
            provider,
            state_store,
            config,
            event_tx: tx,
        };

        Ok((poller, rx))
    }

    /// Configuration this poller was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until `shutdown` resolves or a check fails
    ///
    /// Performs one check immediately, then waits for either the next
    /// interval tick or `shutdown`. Exactly one of the two is handled per
    /// iteration; shutdown wins when both are ready.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let period = self.config.interval();
        self.emit_event(PollerEvent::Started { interval: period });
        info!(
            "Tracking {} (check every {:?})",
            self.config.domain_name, period
        );

        self.check_or_stop().await?;

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(ticker);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(PollerEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    return Ok(());
                }

                Some(_) = ticks.next() => {
                    self.check_or_stop().await?;
                }
            }
        }
    }

    async fn check_or_stop(&self) -> Result<CheckOutcome> {
        match self.check_once().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Check failed, stopping: {}", e);
                self.emit_event(PollerEvent::CheckFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Run a single detect-then-update cycle
    pub async fn check_once(&self) -> Result<CheckOutcome> {
        let detection = self.detect_change().await?;

        if !detection.changed() {
            info!("No update was required ({})", detection.current);
            self.emit_event(PollerEvent::Unchanged {
                ip: detection.current,
                checked_at: Utc::now(),
            });
            return Ok(CheckOutcome::Unchanged {
                ip: detection.current,
            });
        }

        info!(
            "Public IP changed: {} -> {}",
            detection
                .previous
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "<none>".to_string()),
            detection.current
        );

        self.push_update(detection.current).await?;

        self.emit_event(PollerEvent::UpdateSucceeded {
            previous_ip: detection.previous,
            new_ip: detection.current,
            updated_at: Utc::now(),
        });

        Ok(CheckOutcome::Updated {
            previous_ip: detection.previous,
            new_ip: detection.current,
        })
    }

    /// Compare the current public IP with the persisted one
    ///
    /// # Errors
    ///
    /// - `Error::Persistence`: the state could not be read
    /// - `Error::Network`: the lookup failed or returned nothing usable
    pub async fn detect_change(&self) -> Result<ChangeDetection> {
        let previous = self.state_store.last_ip().await?;
        let current = self.lookup.current().await?;

        debug!("Current IP {}, persisted {:?}", current, previous);
        Ok(ChangeDetection { current, previous })
    }

    /// Push `new_ip` to the provider, then persist it
    ///
    /// The state store is written only after the provider confirmed the
    /// update. A failed write is returned, never swallowed.
    pub async fn push_update(&self, new_ip: Ipv4Addr) -> Result<UpdateConfirmation> {
        match self.submit_and_persist(new_ip).await {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                warn!("Update to {} failed: {}", new_ip, e);
                self.emit_event(PollerEvent::UpdateFailed {
                    new_ip,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn submit_and_persist(&self, new_ip: Ipv4Addr) -> Result<UpdateConfirmation> {
        let update = RecordUpdate::from_config(&self.config, new_ip);

        let confirmation = self.provider.update_record(&update).await?;
        info!(
            "{} confirmed {} -> {}",
            self.provider.provider_name(),
            update.name,
            new_ip
        );
        debug!("Provider result: {}", confirmation.result);

        self.state_store.save(new_ip).await?;
        Ok(confirmation)
    }

    /// Emit a poller event without blocking the loop
    fn emit_event(&self, event: PollerEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_detection_without_previous_is_a_change() {
        let detection = ChangeDetection {
            current: Ipv4Addr::new(9, 9, 9, 9),
            previous: None,
        };
        assert!(detection.changed());
    }

    #[test]
    fn change_detection_same_ip_is_not_a_change() {
        let ip = Ipv4Addr::new(1, 2, 3, 4);
        let detection = ChangeDetection {
            current: ip,
            previous: Some(ip),
        };
        assert!(!detection.changed());
    }
}
