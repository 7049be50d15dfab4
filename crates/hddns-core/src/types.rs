//! Domain types shared between the reconciler and its collaborators
//!
//! `Zone` and `Record` mirror the provider's JSON representation exactly;
//! both are transient and re-fetched at the start of every operation that
//! needs them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// DNS record kind managed by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordKind {
    /// All kinds, in reconciliation order: IPv4 before IPv6.
    pub const ALL: [RecordKind; 2] = [RecordKind::A, RecordKind::Aaaa];

    /// Whether `addr` belongs to this record kind's address family
    pub fn matches(self, addr: IpAddr) -> bool {
        match self {
            RecordKind::A => addr.is_ipv4(),
            RecordKind::Aaaa => addr.is_ipv6(),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::A => f.write_str("A"),
            RecordKind::Aaaa => f.write_str("AAAA"),
        }
    }
}

/// A DNS zone managed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Opaque identifier assigned by the provider
    pub id: String,
    /// Zone name (e.g. "example.com")
    pub name: String,
}

/// A DNS resource record as held by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identifier assigned by the provider
    pub id: String,
    /// Record kind
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Record name, relative to the zone (e.g. "host1")
    pub name: String,
    /// Record value, verbatim as the provider stores it
    pub value: String,
    /// Identifier of the zone this record belongs to
    pub zone_id: String,
    /// Time-to-live in seconds; the provider omits it for zone-default TTLs
    #[serde(default)]
    pub ttl: u32,
}

impl Record {
    /// The stored value parsed as an IP literal, if it is one.
    ///
    /// Comparing parsed addresses rather than strings means an IPv6 record
    /// stored in expanded form still matches its canonical observation.
    pub fn address(&self) -> Option<IpAddr> {
        self.value.trim().parse().ok()
    }
}

/// Payload for creating a record; the provider assigns the identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Record kind
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Record name, relative to the zone
    pub name: String,
    /// Record value
    pub value: String,
    /// Identifier of the zone to create the record in
    pub zone_id: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}
