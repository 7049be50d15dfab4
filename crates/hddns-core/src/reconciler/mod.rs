//! Core reconciliation loop
//!
//! The Reconciler is responsible for:
//! - Observing the host's public address per enabled family via AddressSource
//! - Fetching the zone's current records via DnsProvider
//! - Applying the minimal mutation (none / delete-then-create) to converge
//! - Sleeping the repeat interval and starting over
//!
//! ## Control Flow
//!
//! ```text
//! find_zone ──▶ loop {
//!     for kind in [A, AAAA] (enabled, in order) {
//!         observe address ──▶ list records ──▶ first (kind, name) match
//!             none      ▶ create
//!             converged ▶ nothing
//!             stale     ▶ delete, then create
//!     }
//!     sleep repeat interval
//! }
//! ```
//!
//! The provider's record set is the only state: nothing is cached between
//! iterations, and a second pass with an unchanged address performs no
//! mutation. Any error (discovery exhaustion, a provider failure, an
//! address of the wrong family) aborts the iteration and terminates the
//! loop; there is no per-kind isolation.

use crate::config::ReconcilerConfig;
use crate::error::{Error, Result};
use crate::traits::{AddressSource, DnsProvider, Sleeper};
use crate::types::{NewRecord, RecordKind, Zone};
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Decision taken for one record kind during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No matching record existed; one was created
    Created {
        /// Record kind
        kind: RecordKind,
        /// Address the record was created with
        value: IpAddr,
    },
    /// The existing record already held the observed address
    Unchanged {
        /// Record kind
        kind: RecordKind,
        /// The converged address
        value: IpAddr,
    },
    /// A stale record was deleted and recreated with the observed address
    Replaced {
        /// Record kind
        kind: RecordKind,
        /// Value the stale record held
        previous: String,
        /// Address the new record was created with
        value: IpAddr,
    },
}

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerEvent {
    /// Reconciliation loop started
    Started {
        /// Resolved zone name
        zone: String,
        /// Kinds that will be reconciled each iteration
        kinds: Vec<RecordKind>,
    },

    /// A record was created
    RecordCreated {
        kind: RecordKind,
        name: String,
        value: String,
    },

    /// An existing record already held the observed address
    RecordUnchanged {
        kind: RecordKind,
        name: String,
        value: String,
    },

    /// A stale record was replaced
    RecordReplaced {
        kind: RecordKind,
        name: String,
        previous: String,
        value: String,
    },

    /// Reconciliation loop stopped
    Stopped {
        /// Why the loop ended
        reason: String,
    },
}

/// Core reconciler
///
/// Compares desired state (the freshly observed address) against actual
/// state (the provider's records) and converges them, one address family
/// at a time, on a fixed schedule.
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Start with [`Reconciler::run()`], or drive single passes with
///    [`Reconciler::run_once()`]
/// 3. The loop ends on shutdown signal or the first fatal error
pub struct Reconciler {
    /// DNS provider for record CRUD
    provider: Box<dyn DnsProvider>,

    /// Address discovery for both families
    source: Box<dyn AddressSource>,

    /// Sleep capability for the repeat interval
    sleeper: Box<dyn Sleeper>,

    /// Zone name to resolve against the provider
    zone_name: String,

    /// Record name to manage
    hostname: String,

    /// TTL applied to created records
    ttl: u32,

    /// Enabled kinds, in reconciliation order
    kinds: Vec<RecordKind>,

    /// Delay between iterations
    repeat_interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ReconcilerEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields
    /// reconciler events
    pub fn new(
        provider: Box<dyn DnsProvider>,
        source: Box<dyn AddressSource>,
        sleeper: Box<dyn Sleeper>,
        config: ReconcilerConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcilerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = Self {
            provider,
            source,
            sleeper,
            kinds: config.kinds(),
            repeat_interval: config.repeat_interval(),
            zone_name: config.zone,
            hostname: config.hostname,
            ttl: config.ttl,
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// Resolve the configured zone name against the provider
    ///
    /// An unknown zone is a configuration error: nothing can be reconciled
    /// without it, so the caller should treat this as fatal at startup.
    pub async fn find_zone(&self) -> Result<Zone> {
        let zones = self.provider.list_zones().await?;
        zones
            .into_iter()
            .find(|zone| zone.name == self.zone_name)
            .ok_or_else(|| Error::config(format!("zone not found: {}", self.zone_name)))
    }

    /// Run the reconciliation loop until shutdown or a fatal error
    ///
    /// Resolves the zone once, then alternates passes and repeat-interval
    /// sleeps. Terminates on SIGINT/ctrl-c (clean) or on the first error
    /// from a pass (fatal, propagated to the caller).
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the loop with a controlled shutdown signal
    ///
    /// **TESTING ONLY**: contract tests need deterministic shutdown.
    /// Production code should use [`Reconciler::run()`], which stops on OS
    /// signals instead.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        let zone = self.find_zone().await?;
        info!(zone = %zone.name, zone_id = %zone.id, "resolved DNS zone");

        self.emit_event(ReconcilerEvent::Started {
            zone: zone.name.clone(),
            kinds: self.kinds.clone(),
        });

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for the provided shutdown signal
            loop {
                self.run_once(&zone).await?;

                tokio::select! {
                    _ = self.sleeper.sleep(self.repeat_interval) => {}
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit_event(ReconcilerEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        return Ok(());
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT
            loop {
                self.run_once(&zone).await?;

                tokio::select! {
                    _ = self.sleeper.sleep(self.repeat_interval) => {}
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        self.emit_event(ReconcilerEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Run a single reconciliation pass over all enabled kinds
    ///
    /// Kinds are processed strictly sequentially, IPv4 before IPv6. The
    /// first failure aborts the pass: a later kind is never reconciled
    /// after an earlier one errors.
    pub async fn run_once(&self, zone: &Zone) -> Result<Vec<ReconcileOutcome>> {
        let mut outcomes = Vec::with_capacity(self.kinds.len());
        for &kind in &self.kinds {
            outcomes.push(self.reconcile_kind(zone, kind).await?);
        }
        Ok(outcomes)
    }

    /// Converge one record kind onto the freshly observed address
    async fn reconcile_kind(&self, zone: &Zone, kind: RecordKind) -> Result<ReconcileOutcome> {
        let address = self.source.observe(kind).await?;
        debug!(%kind, %address, "observed public address");

        if !kind.matches(address) {
            return Err(Error::AddressMismatch {
                kind,
                value: address.to_string(),
            });
        }

        let records = self.provider.list_records(&zone.id).await?;
        // First match in provider order wins; existing duplicates are left alone.
        let existing = records
            .into_iter()
            .find(|record| record.kind == kind && record.name == self.hostname);

        match existing {
            Some(record) if record.address() == Some(address) => {
                debug!(%kind, name = %self.hostname, %address, "record already converged");
                self.emit_event(ReconcilerEvent::RecordUnchanged {
                    kind,
                    name: self.hostname.clone(),
                    value: address.to_string(),
                });
                Ok(ReconcileOutcome::Unchanged {
                    kind,
                    value: address,
                })
            }
            Some(record) => {
                info!(
                    %kind,
                    name = %self.hostname,
                    previous = %record.value,
                    new = %address,
                    "replacing stale record"
                );
                // Not atomic: the record is absent between delete and
                // create, and a crash here leaves it absent until the
                // next successful pass.
                self.provider.delete_record(&record.id).await?;
                self.provider
                    .create_record(&self.desired_record(zone, kind, address))
                    .await?;
                self.emit_event(ReconcilerEvent::RecordReplaced {
                    kind,
                    name: self.hostname.clone(),
                    previous: record.value.clone(),
                    value: address.to_string(),
                });
                Ok(ReconcileOutcome::Replaced {
                    kind,
                    previous: record.value,
                    value: address,
                })
            }
            None => {
                info!(%kind, name = %self.hostname, %address, "creating record");
                self.provider
                    .create_record(&self.desired_record(zone, kind, address))
                    .await?;
                self.emit_event(ReconcilerEvent::RecordCreated {
                    kind,
                    name: self.hostname.clone(),
                    value: address.to_string(),
                });
                Ok(ReconcileOutcome::Created {
                    kind,
                    value: address,
                })
            }
        }
    }

    fn desired_record(&self, zone: &Zone, kind: RecordKind, address: IpAddr) -> NewRecord {
        NewRecord {
            kind,
            name: self.hostname.clone(),
            value: address.to_string(),
            zone_id: zone.id.clone(),
            ttl: self.ttl,
        }
    }

    fn emit_event(&self, event: ReconcilerEvent) {
        // A full channel means the consumer is slower than event
        // generation; drop rather than block the loop.
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_compare_by_value() {
        let outcome = ReconcileOutcome::Created {
            kind: RecordKind::A,
            value: "1.2.3.4".parse().unwrap(),
        };
        assert_eq!(outcome.clone(), outcome);
    }
}
