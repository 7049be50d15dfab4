//! Capability traits consumed by the reconciler
//!
//! - [`DnsProvider`]: the provider's record CRUD API
//! - [`AddressSource`]: public address discovery
//! - [`Sleeper`]: injected sleep, so tests drive iterations without real time

pub mod address_source;
pub mod dns_provider;
pub mod sleeper;

pub use address_source::AddressSource;
pub use dns_provider::DnsProvider;
pub use sleeper::{Sleeper, TokioSleeper};
