//! Configuration types for the reconciler
//!
//! Configuration is resolved once at startup (by the daemon or an embedding
//! application) into immutable values that are passed explicitly into the
//! reconciler and its collaborators. Nothing here mutates after startup.

use crate::types::RecordKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reconciler configuration: which records to manage and how often
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// DNS zone name to reconcile (e.g. "example.com")
    pub zone: String,

    /// Record name to manage, relative to the zone (e.g. "host1")
    pub hostname: String,

    /// Time-to-live in seconds, applied to created records
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Seconds between reconciliation iterations
    #[serde(default = "default_repeat_secs")]
    pub repeat_secs: u64,

    /// Skip IPv4 (A record) reconciliation
    #[serde(default)]
    pub disable_v4: bool,

    /// Skip IPv6 (AAAA record) reconciliation
    #[serde(default)]
    pub disable_v6: bool,

    /// Capacity of the reconciler's event channel; full channels drop
    /// events with a warning
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ReconcilerConfig {
    /// Create a configuration with defaults for everything but zone and hostname
    pub fn new(zone: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            hostname: hostname.into(),
            ttl: default_ttl(),
            repeat_secs: default_repeat_secs(),
            disable_v4: false,
            disable_v6: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone.is_empty() {
            return Err(crate::Error::config("DNS zone must be provided"));
        }
        if self.hostname.is_empty() {
            return Err(crate::Error::config("hostname must be provided"));
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("ttl must be a positive number of seconds"));
        }
        if self.repeat_secs == 0 {
            return Err(crate::Error::config("repeat interval must be > 0 seconds"));
        }
        if self.disable_v4 && self.disable_v6 {
            return Err(crate::Error::config(
                "both address families are disabled, nothing to reconcile",
            ));
        }
        Ok(())
    }

    /// Enabled record kinds, in reconciliation order (A before AAAA)
    pub fn kinds(&self) -> Vec<RecordKind> {
        RecordKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                RecordKind::A => !self.disable_v4,
                RecordKind::Aaaa => !self.disable_v6,
            })
            .collect()
    }

    /// Delay between reconciliation iterations
    pub fn repeat_interval(&self) -> Duration {
        Duration::from_secs(self.repeat_secs)
    }
}

/// Address discovery configuration, per family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Endpoint returning the host's public IPv4 address as plain text
    #[serde(default = "default_v4_endpoint")]
    pub v4_endpoint: String,

    /// Endpoint returning the host's public IPv6 address as plain text
    #[serde(default = "default_v6_endpoint")]
    pub v6_endpoint: String,

    /// Total attempts before discovery is considered failed
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Seconds to wait between attempts
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl DiscoveryConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.v4_endpoint.is_empty() || self.v6_endpoint.is_empty() {
            return Err(crate::Error::config("discovery endpoints cannot be empty"));
        }
        if self.retry_attempts == 0 {
            return Err(crate::Error::config("retry attempts must be >= 1"));
        }
        Ok(())
    }

    /// Delay between discovery attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            v4_endpoint: default_v4_endpoint(),
            v6_endpoint: default_v6_endpoint(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

/// DNS provider API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API token
    pub token: String,

    /// Provider API base URL; overridable for testing
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl ProviderConfig {
    /// Create a configuration for the default API endpoint
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: default_api_base(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.token.is_empty() {
            return Err(crate::Error::config("API token must be provided"));
        }
        Ok(())
    }
}

fn default_ttl() -> u32 {
    300
}

fn default_repeat_secs() -> u64 {
    3600
}

fn default_event_channel_capacity() -> usize {
    100
}

fn default_v4_endpoint() -> String {
    "https://v4.ident.me/".to_string()
}

fn default_v6_endpoint() -> String {
    "https://v6.ident.me/".to_string()
}

fn default_retry_attempts() -> u32 {
    12
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_api_base() -> String {
    "https://dns.hetzner.com/api/v1".to_string()
}
