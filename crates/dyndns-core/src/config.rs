//! Configuration types for the updater
//!
//! This module defines all configuration structures used throughout the
//! workspace. The daemon fills them from the environment; library users can
//! build them directly or deserialize them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default registrar API host
pub const DEFAULT_ENDPOINT: &str = "api.name.com";

/// Default IPv4-only detection endpoint
pub const DEFAULT_IPV4_URL: &str = "https://api.ipify.org";

/// Default IPv6-only detection endpoint
pub const DEFAULT_IPV6_URL: &str = "https://api6.ipify.org";

/// Main updater configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Base domain managed at the registrar (e.g., "example.com")
    pub domain: String,

    /// Host label of the managed record (e.g., "home")
    pub host: String,

    /// Registrar provider configuration
    pub provider: ProviderConfig,

    /// Address discovery configuration
    #[serde(default)]
    pub ip_sources: IpSourceConfig,

    /// Engine and scheduling settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration with default sources and engine settings
    pub fn new(
        domain: impl Into<String>,
        host: impl Into<String>,
        provider: ProviderConfig,
    ) -> Self {
        Self {
            domain: domain.into(),
            host: host.into(),
            provider,
            ip_sources: IpSourceConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.is_empty() {
            return Err(crate::Error::config("Domain cannot be empty"));
        }
        if self.host.is_empty() {
            return Err(crate::Error::config("Host cannot be empty"));
        }

        self.provider.validate()?;
        self.ip_sources.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// Registrar provider configuration
///
/// The Debug implementation intentionally does NOT expose the API token.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registrar username
    pub username: String,

    /// Registrar API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Registrar API host
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl ProviderConfig {
    /// Create a provider configuration against the default endpoint
    pub fn new(username: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_token: api_token.into(),
            endpoint: default_endpoint(),
        }
    }

    /// Use a different registrar API host
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.username.is_empty() {
            return Err(crate::Error::config("Registrar username cannot be empty"));
        }
        if self.api_token.is_empty() {
            return Err(crate::Error::config("Registrar API token cannot be empty"));
        }
        if self.endpoint.is_empty() {
            return Err(crate::Error::config("Registrar endpoint cannot be empty"));
        }
        if self.endpoint.contains("://") || self.endpoint.contains('/') {
            return Err(crate::Error::config(format!(
                "Registrar endpoint must be a bare host name, got: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("username", &self.username)
            .field("api_token", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Address discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// Endpoint reachable only over IPv4
    #[serde(default = "default_ipv4_url")]
    pub ipv4_url: String,

    /// Endpoint reachable only over IPv6
    #[serde(default = "default_ipv6_url")]
    pub ipv6_url: String,
}

impl IpSourceConfig {
    /// Validate the discovery configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        for (name, url) in [("IPv4", &self.ipv4_url), ("IPv6", &self.ipv6_url)] {
            if url.is_empty() {
                return Err(crate::Error::config(format!(
                    "{} detection URL cannot be empty",
                    name
                )));
            }
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "{} detection URL must use HTTP or HTTPS scheme. Got: {}",
                    name, url
                )));
            }
        }
        Ok(())
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            ipv4_url: default_ipv4_url(),
            ipv6_url: default_ipv6_url(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// TTL in seconds applied to every record write
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u32,

    /// Interval between reconciliation cycles, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ttl_secs == 0 {
            return Err(crate::Error::config("TTL must be a positive number of seconds"));
        }
        if self.interval_ms == 0 {
            return Err(crate::Error::config(
                "Update interval must be a positive number of milliseconds",
            ));
        }
        Ok(())
    }

    /// Interval between reconciliation cycles
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_ipv4_url() -> String {
    DEFAULT_IPV4_URL.to_string()
}

fn default_ipv6_url() -> String {
    DEFAULT_IPV6_URL.to_string()
}

fn default_ttl_secs() -> u32 {
    300
}

fn default_interval_ms() -> u64 {
    600_000
}
