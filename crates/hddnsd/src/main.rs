// # hddnsd - Hetzner DDNS Daemon
//
// Thin integration layer: reads configuration from environment variables,
// wires up the Hetzner provider and the HTTP address source, and runs the
// reconciliation loop until a signal or a fatal error.
//
// All reconciliation logic lives in hddns-core; nothing here retries or
// decides anything about DNS.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `HDDNS_TOKEN`: Hetzner API token (required)
// - `HDDNS_ZONE`: DNS zone name to reconcile (required)
// - `HDDNS_HOSTNAME`: record name to manage (falls back to `HOSTNAME`)
// - `HDDNS_TTL`: TTL in seconds for created records (default 300)
// - `HDDNS_V4_ENDPOINT`: IPv4 discovery endpoint (default https://v4.ident.me/)
// - `HDDNS_V6_ENDPOINT`: IPv6 discovery endpoint (default https://v6.ident.me/)
// - `HDDNS_RETRY_ATTEMPTS`: discovery attempts before giving up (default 12)
// - `HDDNS_RETRY_DELAY_SECS`: delay between discovery attempts (default 5)
// - `HDDNS_DISABLE_V4` / `HDDNS_DISABLE_V6`: skip an address family
// - `HDDNS_REPEAT_SECS`: seconds between reconciliation passes (default 3600)
// - `HDDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export HDDNS_TOKEN=your_token
// export HDDNS_ZONE=example.com
// export HDDNS_HOSTNAME=host1
//
// hddnsd
// ```

use anyhow::{Context, Result};
use hddns_core::config::{DiscoveryConfig, ProviderConfig, ReconcilerConfig};
use hddns_core::{Reconciler, ReconcilerEvent, TokioSleeper};
use hddns_provider_hetzner::HetznerProvider;
use hddns_source_http::HttpAddressSource;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (fatal reconciliation failure)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration, resolved once from the environment
struct Config {
    provider: ProviderConfig,
    discovery: DiscoveryConfig,
    reconciler: ReconcilerConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let token = env::var("HDDNS_TOKEN").context("HDDNS_TOKEN is required")?;
        let zone = env::var("HDDNS_ZONE").context("HDDNS_ZONE is required")?;
        let hostname = env::var("HDDNS_HOSTNAME")
            .or_else(|_| env::var("HOSTNAME"))
            .context("HDDNS_HOSTNAME is required (HOSTNAME fallback not set)")?;

        let mut reconciler = ReconcilerConfig::new(zone, hostname);
        if let Some(ttl) = parse_env("HDDNS_TTL")? {
            reconciler.ttl = ttl;
        }
        if let Some(repeat) = parse_env("HDDNS_REPEAT_SECS")? {
            reconciler.repeat_secs = repeat;
        }
        reconciler.disable_v4 = env_flag("HDDNS_DISABLE_V4");
        reconciler.disable_v6 = env_flag("HDDNS_DISABLE_V6");

        let mut discovery = DiscoveryConfig::default();
        if let Ok(endpoint) = env::var("HDDNS_V4_ENDPOINT") {
            discovery.v4_endpoint = endpoint;
        }
        if let Ok(endpoint) = env::var("HDDNS_V6_ENDPOINT") {
            discovery.v6_endpoint = endpoint;
        }
        if let Some(attempts) = parse_env("HDDNS_RETRY_ATTEMPTS")? {
            discovery.retry_attempts = attempts;
        }
        if let Some(delay) = parse_env("HDDNS_RETRY_DELAY_SECS")? {
            discovery.retry_delay_secs = delay;
        }

        Ok(Self {
            provider: ProviderConfig::new(token),
            discovery,
            reconciler,
            log_level: env::var("HDDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.provider
            .validate()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        self.discovery
            .validate()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        self.reconciler
            .validate()
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        validate_record_name(&self.reconciler.hostname)?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "HDDNS_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        }

        Ok(())
    }
}

/// Parse an optional numeric environment variable, failing on malformed values
fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => {
            let parsed = value
                .parse()
                .with_context(|| format!("{name} has invalid value {value:?}"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

/// A flag variable counts as set for "1", "true" or "yes" (case-insensitive)
fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Validate a record name: "@" for the zone apex, otherwise DNS labels
/// per RFC 1035
fn validate_record_name(name: &str) -> Result<()> {
    if name == "@" {
        return Ok(());
    }

    if name.len() > 253 {
        anyhow::bail!("record name too long: {} chars (max 253)", name.len());
    }

    for label in name.split('.') {
        if label.is_empty() {
            anyhow::bail!("record name has empty label: '{}'", name);
        }
        if label.len() > 63 {
            anyhow::bail!("record name label too long: '{}' (max 63 chars)", label);
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            anyhow::bail!(
                "record name label contains invalid characters: '{}'. Valid: alphanumeric and hyphen only",
                label
            );
        }
        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!("record name label cannot start or end with hyphen: '{}'", label);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return DaemonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e:#}");
        return DaemonExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DaemonExitCode::ConfigError.into();
    }

    info!("starting hddnsd");

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return DaemonExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => {
                info!("clean shutdown");
                DaemonExitCode::CleanShutdown
            }
            Err(e) => {
                error!("fatal: {e:#}");
                DaemonExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Wire up the collaborators and run the reconciliation loop
async fn run_daemon(config: Config) -> Result<()> {
    info!(
        zone = %config.reconciler.zone,
        hostname = %config.reconciler.hostname,
        ttl = config.reconciler.ttl,
        repeat_secs = config.reconciler.repeat_secs,
        "configuration loaded"
    );

    let provider = HetznerProvider::from_config(&config.provider)?;
    let source = HttpAddressSource::new(&config.discovery)?;

    let (reconciler, mut event_rx) = Reconciler::new(
        Box::new(provider),
        Box::new(source),
        Box::new(TokioSleeper),
        config.reconciler,
    )?;

    // Surface reconciler events in the log
    let event_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                ReconcilerEvent::Started { zone, kinds } => {
                    info!(%zone, ?kinds, "reconciliation started");
                }
                ReconcilerEvent::RecordCreated { kind, name, value } => {
                    info!(%kind, %name, %value, "record created");
                }
                ReconcilerEvent::RecordUnchanged { kind, name, value } => {
                    info!(%kind, %name, %value, "record up to date");
                }
                ReconcilerEvent::RecordReplaced {
                    kind,
                    name,
                    previous,
                    value,
                } => {
                    info!(%kind, %name, %previous, %value, "record replaced");
                }
                ReconcilerEvent::Stopped { reason } => {
                    info!(%reason, "reconciliation stopped");
                }
            }
        }
    });

    let result = reconciler.run().await;
    event_task.abort();
    result.map_err(Into::into)
}
