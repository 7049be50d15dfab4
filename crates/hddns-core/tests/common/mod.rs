//! Test doubles and common utilities for reconciler contract tests
//!
//! The fake provider keeps a mutable in-memory record set so tests can
//! assert on the converged state, and every double can share a
//! chronological call log for ordering assertions.

use async_trait::async_trait;
use hddns_core::Error;
use hddns_core::config::ReconcilerConfig;
use hddns_core::error::Result;
use hddns_core::traits::{AddressSource, DnsProvider, Sleeper};
use hddns_core::types::{NewRecord, Record, RecordKind, Zone};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared chronological log of collaborator calls
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

/// In-memory DNS provider double backed by a mutable record set
///
/// Clones share all state, so a clone can be handed to the reconciler
/// while the test keeps the original for assertions.
#[derive(Clone)]
pub struct FakeDnsProvider {
    zones: Arc<Mutex<Vec<Zone>>>,
    records: Arc<Mutex<Vec<Record>>>,
    next_id: Arc<AtomicUsize>,
    created: Arc<Mutex<Vec<NewRecord>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    list_record_calls: Arc<AtomicUsize>,
    fail_creates: Arc<AtomicBool>,
    log: CallLog,
}

impl FakeDnsProvider {
    pub fn new(zone: Zone) -> Self {
        Self::with_log(zone, CallLog::new())
    }

    pub fn with_log(zone: Zone, log: CallLog) -> Self {
        Self {
            zones: Arc::new(Mutex::new(vec![zone])),
            records: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(100)),
            created: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            list_record_calls: Arc::new(AtomicUsize::new(0)),
            fail_creates: Arc::new(AtomicBool::new(false)),
            log,
        }
    }

    /// Seed an existing record, as if it predated the reconciler
    pub fn seed_record(&self, record: Record) {
        self.records.lock().unwrap().push(record);
    }

    /// All creates will fail with a provider error
    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewRecord> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn list_record_calls(&self) -> usize {
        self.list_record_calls.load(Ordering::SeqCst)
    }

    /// Total mutations performed (creates + deletes)
    pub fn mutation_count(&self) -> usize {
        self.created.lock().unwrap().len() + self.deleted.lock().unwrap().len()
    }
}

#[async_trait]
impl DnsProvider for FakeDnsProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.log.push("list_zones");
        Ok(self.zones.lock().unwrap().clone())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        self.log.push(format!("list_records:{zone_id}"));
        self.list_record_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.zone_id == zone_id)
            .cloned()
            .collect())
    }

    async fn create_record(&self, record: &NewRecord) -> Result<Record> {
        self.log
            .push(format!("create:{}:{}", record.kind, record.value));

        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(Error::provider(500, "create failed"));
        }

        self.created.lock().unwrap().push(record.clone());

        let id = format!("r{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let stored = Record {
            id,
            kind: record.kind,
            name: record.name.clone(),
            value: record.value.clone(),
            zone_id: record.zone_id.clone(),
            ttl: record.ttl,
        };
        self.records.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        self.log.push(format!("delete:{record_id}"));
        self.deleted.lock().unwrap().push(record_id.to_string());
        self.records.lock().unwrap().retain(|r| r.id != record_id);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Address source double returning fixed addresses per family
#[derive(Clone)]
pub struct StaticAddressSource {
    v4: Option<IpAddr>,
    v6: Option<IpAddr>,
    observed: Arc<Mutex<Vec<RecordKind>>>,
    log: CallLog,
}

impl StaticAddressSource {
    pub fn new(v4: Option<IpAddr>, v6: Option<IpAddr>) -> Self {
        Self::with_log(v4, v6, CallLog::new())
    }

    pub fn with_log(v4: Option<IpAddr>, v6: Option<IpAddr>, log: CallLog) -> Self {
        Self {
            v4,
            v6,
            observed: Arc::new(Mutex::new(Vec::new())),
            log,
        }
    }

    /// Kinds observed, in call order
    pub fn observed(&self) -> Vec<RecordKind> {
        self.observed.lock().unwrap().clone()
    }
}

#[async_trait]
impl AddressSource for StaticAddressSource {
    async fn observe(&self, kind: RecordKind) -> Result<IpAddr> {
        self.log.push(format!("observe:{kind}"));
        self.observed.lock().unwrap().push(kind);

        let address = match kind {
            RecordKind::A => self.v4,
            RecordKind::Aaaa => self.v6,
        };
        address.ok_or_else(|| Error::address_resolution(1, format!("no {kind} address configured")))
    }
}

/// Sleeper that records durations and returns immediately, or blocks
/// forever after recording (so a run loop makes exactly one pass and then
/// waits for the shutdown signal)
#[derive(Clone)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
    block: bool,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self {
            sleeps: Arc::new(Mutex::new(Vec::new())),
            block: false,
        }
    }

    /// A sleeper whose sleeps never complete
    pub fn blocking() -> Self {
        Self {
            sleeps: Arc::new(Mutex::new(Vec::new())),
            block: true,
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        if self.block {
            std::future::pending::<()>().await;
        }
    }
}

/// Zone used by most tests
pub fn test_zone() -> Zone {
    Zone {
        id: "zone-1".to_string(),
        name: "example.com".to_string(),
    }
}

/// Minimal reconciler configuration for "example.com" / "host1"
pub fn test_config() -> ReconcilerConfig {
    ReconcilerConfig::new("example.com", "host1")
}

/// An existing record in the test zone
pub fn seeded_record(id: &str, kind: RecordKind, value: &str) -> Record {
    Record {
        id: id.to_string(),
        kind,
        name: "host1".to_string(),
        value: value.to_string(),
        zone_id: "zone-1".to_string(),
        ttl: 300,
    }
}
