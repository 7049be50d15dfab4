//! Error types for the reconciler
//!
//! Every variant here is terminal for the process: the daemon maps any error
//! escaping the run loop to a non-zero exit code. Only address discovery
//! retries internally, and it surfaces exhaustion as `AddressResolution`.

use crate::types::RecordKind;
use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Address discovery exhausted its retry budget
    #[error("address resolution failed after {attempts} attempts: {message}")]
    AddressResolution {
        /// Total attempts made before giving up
        attempts: u32,
        /// Description of the last failure
        message: String,
    },

    /// The DNS provider returned a non-success response
    #[error("provider returned HTTP {status}: {body}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// An observed address does not belong to the requested record kind
    #[error("observed address {value} is not a valid {kind} record value")]
    AddressMismatch {
        /// Record kind being reconciled
        kind: RecordKind,
        /// The offending address
        value: String,
    },

    /// Configuration errors (missing settings, unknown zone)
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an address resolution error
    pub fn address_resolution(attempts: u32, message: impl Into<String>) -> Self {
        Self::AddressResolution {
            attempts,
            message: message.into(),
        }
    }

    /// Create a provider error from an HTTP status and body
    pub fn provider(status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_carries_status_and_body() {
        let err = Error::provider(422, "invalid record");
        assert_eq!(
            err.to_string(),
            "provider returned HTTP 422: invalid record"
        );
    }

    #[test]
    fn mismatch_names_the_kind() {
        let err = Error::AddressMismatch {
            kind: RecordKind::A,
            value: "2001:db8::1".to_string(),
        };
        assert!(err.to_string().contains("valid A record"));
    }
}
