// # DNS Provider Trait
//
// Defines the interface for the provider's record CRUD API.
//
// ## Implementations
//
// - Hetzner DNS: `hddns-provider-hetzner` crate
//
// ## Responsibility boundaries
//
// Each method translates to exactly one authenticated HTTP call.
// Implementations must not retry, back off, or cache: any non-success
// response becomes `Error::Provider` and is surfaced to the caller as
// fatal. The only retry policy in the system belongs to address
// discovery (`AddressSource`), never to provider calls.

use crate::types::{NewRecord, Record, Zone};
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List all zones visible to the configured token
    async fn list_zones(&self) -> Result<Vec<Zone>, crate::Error>;

    /// List all records in a zone, in the provider's returned order
    ///
    /// The reconciler treats the first record matching a (kind, name)
    /// pair as canonical, so order must be passed through untouched.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>, crate::Error>;

    /// Create a record; the provider assigns the identifier
    async fn create_record(&self, record: &NewRecord) -> Result<Record, crate::Error>;

    /// Delete a record by its provider-assigned identifier
    async fn delete_record(&self, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
