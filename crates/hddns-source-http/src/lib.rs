// # HTTP Address Source
//
// This crate discovers the host's public address by querying external
// plain-text endpoints (ident.me style), one per address family.
//
// ## Retry policy
//
// Address discovery is the only layer in the system with a retry budget.
// A failed attempt (transport error, non-success status, or a body that
// is not an IP literal of the requested family) is retried after the
// configured delay, up to the configured total attempts. N attempts make
// N-1 sleeps; exhaustion surfaces as `Error::AddressResolution` carrying
// the attempt count and the last failure.
//
// The response body is parsed as an IP literal before use: garbage from
// an upstream endpoint is never handed to the provider.
//
// ## Testability
//
// The HTTP transport sits behind a small internal trait and the retry
// delay goes through the injected `Sleeper`, so the policy is unit
// tested without a server or real time.

use async_trait::async_trait;
use hddns_core::config::DiscoveryConfig;
use hddns_core::traits::{AddressSource, Sleeper, TokioSleeper};
use hddns_core::types::RecordKind;
use hddns_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP timeout for discovery requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport seam between the retry policy and reqwest
#[async_trait]
trait Fetch: Send + Sync {
    /// GET `url` and return the response body as text
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

struct ReqwestFetch {
    client: reqwest::Client,
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{url} returned HTTP {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::http(format!("failed to read body from {url}: {e}")))
    }
}

/// HTTP-based address source
pub struct HttpAddressSource {
    /// Endpoint returning the public IPv4 address
    v4_endpoint: String,

    /// Endpoint returning the public IPv6 address
    v6_endpoint: String,

    /// Total attempts per observation
    attempts: u32,

    /// Delay between attempts
    delay: Duration,

    /// HTTP transport
    fetch: Box<dyn Fetch>,

    /// Sleep capability for the retry delay
    sleeper: Box<dyn Sleeper>,
}

impl HttpAddressSource {
    /// Create a source from resolved discovery configuration
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::assemble(
            config,
            Box::new(ReqwestFetch { client }),
            Box::new(TokioSleeper),
        ))
    }

    fn assemble(config: &DiscoveryConfig, fetch: Box<dyn Fetch>, sleeper: Box<dyn Sleeper>) -> Self {
        Self {
            v4_endpoint: config.v4_endpoint.clone(),
            v6_endpoint: config.v6_endpoint.clone(),
            attempts: config.retry_attempts,
            delay: config.retry_delay(),
            fetch,
            sleeper,
        }
    }

    fn endpoint(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::A => &self.v4_endpoint,
            RecordKind::Aaaa => &self.v6_endpoint,
        }
    }

    /// One discovery attempt: fetch, trim, parse, check the family
    async fn attempt(&self, kind: RecordKind) -> Result<IpAddr> {
        let endpoint = self.endpoint(kind);
        let body = self.fetch.fetch_text(endpoint).await?;
        let text = body.trim();

        let address: IpAddr = text.parse().map_err(|_| {
            Error::http(format!("{endpoint} returned {text:?}, not an IP address"))
        })?;

        if !kind.matches(address) {
            return Err(Error::AddressMismatch {
                kind,
                value: address.to_string(),
            });
        }

        Ok(address)
    }
}

#[async_trait]
impl AddressSource for HttpAddressSource {
    async fn observe(&self, kind: RecordKind) -> Result<IpAddr> {
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            match self.attempt(kind).await {
                Ok(address) => {
                    debug!(%kind, %address, attempt, "observed public address");
                    return Ok(address);
                }
                Err(e) => {
                    warn!(
                        %kind,
                        attempt,
                        attempts = self.attempts,
                        error = %e,
                        "address discovery attempt failed"
                    );
                    last_error = Some(e);

                    if attempt < self.attempts {
                        self.sleeper.sleep(self.delay).await;
                    }
                }
            }
        }

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Err(Error::address_resolution(self.attempts, message))
    }
}
