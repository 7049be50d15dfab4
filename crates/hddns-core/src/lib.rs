// # hddns-core
//
// Core library for the Hetzner dynamic DNS reconciler.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping a host's DNS
// records in sync with its public addresses:
// - **AddressSource**: Trait for discovering the host's current public address
// - **DnsProvider**: Trait for the provider's record CRUD API
// - **Sleeper**: Injected sleep capability, so tests run without real time
// - **Reconciler**: Compares observed addresses against provider records and
//   applies the minimal change to converge them
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Provider as Source of Truth**: Records are fetched fresh every pass,
//    nothing is cached or persisted locally
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Explicit Failure**: Provider errors are fatal and never retried;
//    only address discovery carries a retry budget

pub mod config;
pub mod error;
pub mod reconciler;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use config::{DiscoveryConfig, ProviderConfig, ReconcilerConfig};
pub use error::{Error, Result};
pub use reconciler::{ReconcileOutcome, Reconciler, ReconcilerEvent};
pub use traits::{AddressSource, DnsProvider, Sleeper, TokioSleeper};
pub use types::{NewRecord, Record, RecordKind, Zone};
