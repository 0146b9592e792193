// # dyndnsd - name.com dynamic DNS daemon
//
// Thin integration layer. All reconciliation logic lives in dyndns-core;
// this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Builds the IP sources, the name.com provider and the engine
// 4. Runs the update timer until a shutdown signal arrives
//
// ## Configuration
//
// ### Record
// - `DDNS_DOMAIN`: Base domain at the registrar (required)
// - `DDNS_HOST`: Host label of the record (default: machine host name)
//
// ### Registrar
// - `DDNS_USERNAME`: name.com username (required)
// - `DDNS_API_TOKEN`: name.com API token (required)
// - `DDNS_ENDPOINT`: API host (default: api.name.com)
//
// ### Engine
// - `DDNS_TTL`: Record TTL in seconds (default: 300)
// - `DDNS_INTERVAL_MS`: Update interval in milliseconds (default: 600000)
//
// ### Address Discovery
// - `DDNS_IPV4_URL`: IPv4 detection endpoint (default: https://api.ipify.org)
// - `DDNS_IPV6_URL`: IPv6 detection endpoint (default: https://api6.ipify.org)
//
// ### Logging
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DDNS_DOMAIN=example.com
// export DDNS_HOST=home
// export DDNS_USERNAME=alice
// export DDNS_API_TOKEN=your_token
//
// dyndnsd
// ```

mod shutdown;

use anyhow::{Context, Result};
use dyndns_core::{DdnsConfig, DdnsEngine, EngineConfig, IpSourceConfig, ProviderConfig};
use dyndns_ip_http::HttpIpSource;
use dyndns_provider_namecom::NameComProvider;
use std::process::ExitCode;
use std::str::FromStr;
use tokio::sync::oneshot;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration
#[derive(Debug)]
struct Config {
    ddns: DdnsConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`
    ///
    /// Empty values count as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        let host = match get("DDNS_HOST") {
            Some(host) => host,
            None => local_host_name()?,
        };

        let mut provider = ProviderConfig::new(require("DDNS_USERNAME")?, require("DDNS_API_TOKEN")?);
        if let Some(endpoint) = get("DDNS_ENDPOINT") {
            provider = provider.with_endpoint(endpoint);
        }

        let mut ddns = DdnsConfig::new(require("DDNS_DOMAIN")?, host, provider);

        let defaults = IpSourceConfig::default();
        ddns.ip_sources = IpSourceConfig {
            ipv4_url: get("DDNS_IPV4_URL").unwrap_or(defaults.ipv4_url),
            ipv6_url: get("DDNS_IPV6_URL").unwrap_or(defaults.ipv6_url),
        };

        let defaults = EngineConfig::default();
        ddns.engine = EngineConfig {
            ttl_secs: parse_or("DDNS_TTL", get("DDNS_TTL"), defaults.ttl_secs)?,
            interval_ms: parse_or("DDNS_INTERVAL_MS", get("DDNS_INTERVAL_MS"), defaults.interval_ms)?,
        };

        let log_level = match get("DDNS_LOG_LEVEL") {
            Some(level) => parse_log_level(&level)?,
            None => Level::INFO,
        };

        Ok(Self { ddns, log_level })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.ddns.validate()?;
        Ok(())
    }
}

/// Parse a numeric variable, falling back to `default` when unset
fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a positive integer, got {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn local_host_name() -> Result<String> {
    let name = hostname::get().context("DDNS_HOST is unset and the host name is unavailable")?;
    name.into_string()
        .map_err(|_| anyhow::anyhow!("DDNS_HOST is unset and the host name is not valid UTF-8"))
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd daemon");
    info!(
        "Configuration loaded: {}.{} via {}",
        config.ddns.host, config.ddns.domain, config.ddns.provider.endpoint
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config.ddns).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the engine and run it until shutdown
async fn run_daemon(config: DdnsConfig) -> Result<()> {
    let (ipv4_source, ipv6_source) = HttpIpSource::pair_from_config(&config.ip_sources)
        .context("Failed to create IP sources")?;
    let provider =
        NameComProvider::from_config(&config.provider).context("Failed to create provider")?;

    let engine = DdnsEngine::new(
        Box::new(ipv4_source),
        Box::new(ipv6_source),
        Box::new(provider),
        &config.engine,
    )
    .context("Failed to create engine")?;

    let signals = shutdown::Signals::install().context("Failed to install signal handlers")?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let listener = tokio::spawn(signals.listen(shutdown_tx));

    engine
        .run_with_shutdown(
            &config.host,
            &config.domain,
            config.engine.interval(),
            shutdown_rx,
        )
        .await;

    listener.abort();
    info!("Shutting down daemon");
    Ok(())
}
