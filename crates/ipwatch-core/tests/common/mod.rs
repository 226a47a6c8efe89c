//! Test doubles and common utilities for poller contract tests
//!
//! Each double keeps its counters behind an `Arc` so a clone can be boxed
//! into the poller while the test keeps its own handle for assertions.

#![allow(dead_code)]

use ipwatch_core::error::{Error, Result};
use ipwatch_core::traits::{DnsProvider, IpLookup, RecordUpdate, StateStore, UpdateConfirmation};
use ipwatch_core::{Config, MemoryStateStore};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An IpLookup that answers from a script
///
/// `Some(ip)` answers with `ip`, `None` fails like an empty response.
/// The last answer repeats once the script is exhausted.
#[derive(Clone)]
pub struct ScriptedIpLookup {
    answers: Arc<Mutex<VecDeque<Option<Ipv4Addr>>>>,
    last: Arc<Mutex<Option<Ipv4Addr>>>,
    call_count: Arc<AtomicUsize>,
    slow_call: Option<(usize, Duration)>,
}

impl ScriptedIpLookup {
    pub fn new(answers: Vec<Option<Ipv4Addr>>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into())),
            last: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
            slow_call: None,
        }
    }

    /// Make the `call`-th lookup (1-based) take `delay` before answering
    pub fn with_slow_call(mut self, call: usize, delay: Duration) -> Self {
        self.slow_call = Some((call, delay));
        self
    }

    /// Always answer with `ip`
    pub fn fixed(ip: Ipv4Addr) -> Self {
        Self::new(vec![Some(ip)])
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpLookup for ScriptedIpLookup {
    async fn current(&self) -> Result<Ipv4Addr> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((slow, delay)) = self.slow_call
            && slow == call
        {
            tokio::time::sleep(delay).await;
        }

        let answer = match self.answers.lock().unwrap().pop_front() {
            Some(answer) => {
                *self.last.lock().unwrap() = answer;
                answer
            }
            None => *self.last.lock().unwrap(),
        };

        answer.ok_or_else(|| Error::network("IP lookup returned an empty response"))
    }
}

/// How the mock provider answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderBehavior {
    /// `success: true`
    Accept,
    /// HTTP status error
    RejectStatus(u16),
    /// 200 with `success: false`
    ReportFailure,
}

/// A mock DnsProvider that records every update it receives
#[derive(Clone)]
pub struct MockDnsProvider {
    behavior: ProviderBehavior,
    updates: Arc<Mutex<Vec<RecordUpdate>>>,
}

impl MockDnsProvider {
    pub fn new(behavior: ProviderBehavior) -> Self {
        Self {
            behavior,
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn accepting() -> Self {
        Self::new(ProviderBehavior::Accept)
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Get the updates that were submitted
    pub fn updates(&self) -> Vec<RecordUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(&self, update: &RecordUpdate) -> Result<UpdateConfirmation> {
        self.updates.lock().unwrap().push(update.clone());

        match self.behavior {
            ProviderBehavior::Accept => Ok(UpdateConfirmation {
                result: serde_json::json!({ "content": update.content.to_string() }),
            }),
            ProviderBehavior::RejectStatus(status) => {
                Err(Error::provider("mock", format!("status {}", status)))
            }
            ProviderBehavior::ReportFailure => {
                Err(Error::provider("mock", "request was not successful"))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A StateStore over memory that counts writes and can refuse them
#[derive(Clone)]
pub struct MockStateStore {
    inner: MemoryStateStore,
    save_call_count: Arc<AtomicUsize>,
    fail_saves: bool,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStateStore::new(),
            save_call_count: Arc::new(AtomicUsize::new(0)),
            fail_saves: false,
        }
    }

    pub fn with_ip(ip: Ipv4Addr) -> Self {
        Self {
            inner: MemoryStateStore::with_ip(ip),
            ..Self::new()
        }
    }

    /// Make every save() fail with a persistence error
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Get the number of times save() was called
    pub fn save_call_count(&self) -> usize {
        self.save_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateStore for MockStateStore {
    async fn last_ip(&self) -> Result<Option<Ipv4Addr>> {
        self.inner.last_ip().await
    }

    async fn save(&self, ip: Ipv4Addr) -> Result<()> {
        self.save_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(Error::persistence("disk full"));
        }
        self.inner.save(ip).await
    }
}

/// Helper to create a valid Config for testing
pub fn test_config() -> Config {
    Config {
        zone_id: "zone-123".to_string(),
        dns_record_id: "record-456".to_string(),
        cloudflare_email: "ops@example.com".to_string(),
        cloudflare_api_key: "test-key".to_string(),
        domain_name: "home.example.com".to_string(),
        interval_secs: 60,
        ..Config::default()
    }
}

pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}
