//! Core traits for ipwatch
//!
//! - [`IpLookup`]: Discover the current public IPv4 address
//! - [`DnsProvider`]: Push a new record value to a DNS provider
//! - [`StateStore`]: Persist the last IP pushed to the provider

pub mod dns_provider;
pub mod ip_lookup;
pub mod state_store;

pub use dns_provider::{DnsProvider, RecordUpdate, UpdateConfirmation};
pub use ip_lookup::IpLookup;
pub use state_store::StateStore;
