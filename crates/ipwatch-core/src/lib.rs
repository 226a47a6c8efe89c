// # ipwatch-core
//
// Core library for the ipwatch dynamic DNS updater.
//
// ## Architecture Overview
//
// One DNS record is kept in sync with the caller's public IPv4 address:
// - **IpLookup**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for pushing a new record value to a provider API
// - **StateStore**: Trait for persisting the last IP pushed to the provider
// - **Poller**: Control loop that checks on startup, then once per interval
//
// The poller owns all sequencing. Implementations of the traits perform a
// single operation per call and report failures; they never retry.

pub mod config;
pub mod error;
pub mod poller;
pub mod state;
pub mod traits;

pub use config::{AuthScheme, Config};
pub use error::{Error, Result};
pub use poller::{ChangeDetection, CheckOutcome, Poller, PollerEvent};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{DnsProvider, IpLookup, RecordUpdate, StateStore};
