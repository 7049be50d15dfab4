// # Address Source Trait
//
// Defines the interface for discovering the host's current public address.
//
// ## Implementations
//
// - HTTP-based (ident.me style endpoints): `hddns-source-http` crate
//
// Discovery is the one place in the system with a retry budget:
// implementations retry transient failures internally (per their
// configured attempts/delay) and surface exhaustion as
// `Error::AddressResolution`. Nothing is cached between calls; the
// reconciler observes a fresh address every iteration.

use crate::types::RecordKind;
use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for address discovery implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Observe the host's current public address for the given record kind
    ///
    /// The returned address is guaranteed to be a syntactically valid IP
    /// literal; text that does not parse is treated as a failed attempt,
    /// never passed through to the provider.
    async fn observe(&self, kind: RecordKind) -> Result<IpAddr, crate::Error>;
}
