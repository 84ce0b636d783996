//! Test doubles for the three collaborator traits, mirroring the shape of
//! the real implementations closely enough to exercise the reconciler's
//! contract without any network I/O.

use async_trait::async_trait;
use gslb_core::config::RecordType;
use gslb_core::state::Event;
use gslb_core::traits::{DnsGateway, Notifier, Probe, ProbeOutcome, Record};
use gslb_core::Result;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory `DnsGateway` double. One instance models one `(name, type)`
/// pair's authoritative record set.
pub struct MockGateway {
    records: Mutex<Vec<Record>>,
    next_id: AtomicU64,
    zone_id: String,
    pub list_calls: AtomicU64,
    pub create_calls: AtomicU64,
    pub delete_calls: AtomicU64,
    fail_list: Mutex<bool>,
}

impl MockGateway {
    pub fn new(zone_id: &str, initial_contents: &[&str]) -> Self {
        let records = initial_contents
            .iter()
            .enumerate()
            .map(|(i, content)| Record { id: format!("rec-{i}"), content: content.to_string(), proxied: false, ttl: 1 })
            .collect();
        Self {
            records: Mutex::new(records),
            next_id: AtomicU64::new(initial_contents.len() as u64),
            zone_id: zone_id.to_string(),
            list_calls: AtomicU64::new(0),
            create_calls: AtomicU64::new(0),
            delete_calls: AtomicU64::new(0),
            fail_list: Mutex::new(false),
        }
    }

    pub fn set_list_fails(&self, fails: bool) {
        *self.fail_list.lock().unwrap() = fails;
    }

    pub fn current_contents(&self) -> HashSet<String> {
        self.records.lock().unwrap().iter().map(|r| r.content.clone()).collect()
    }
}

#[async_trait]
impl DnsGateway for MockGateway {
    async fn list(&self, _name: &str, _record_type: RecordType) -> Result<Vec<Record>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list.lock().unwrap() {
            return Err(gslb_core::Error::gateway("simulated list failure"));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn create(&self, _name: &str, _record_type: RecordType, content: &str, proxied: bool) -> Result<Record> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = Record { id, content: content.to_string(), proxied, ttl: 1 };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn delete(&self, record_id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().retain(|r| r.id != record_id);
        Ok(())
    }

    fn zone_id(&self) -> &str {
        &self.zone_id
    }
}

/// `Probe` double driven by a scriptable target->health map, mutable
/// between ticks so a single test can simulate health changing over time.
pub struct ScriptedProbe {
    results: Mutex<HashMap<String, bool>>,
    timeout: Duration,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self { results: Mutex::new(HashMap::new()), timeout: Duration::from_secs(1) }
    }

    pub fn set_healthy(&self, target: &str, healthy: bool) {
        self.results.lock().unwrap().insert(target.to_string(), healthy);
    }
}

impl Default for ScriptedProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn check(&self, target: &str) -> ProbeOutcome {
        let healthy = self.results.lock().unwrap().get(target).copied().unwrap_or(false);
        if healthy {
            ProbeOutcome::Ok
        } else {
            ProbeOutcome::fail(gslb_core::traits::ProbeFailureKind::Other, "scripted unhealthy")
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// `Notifier` double recording every event it is asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Event>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &Event) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
