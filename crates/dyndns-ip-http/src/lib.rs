// # HTTP IP Source
//
// This crate discovers the machine's public addresses by asking external
// "what is my IP" services over HTTPS.
//
// ## Architecture
//
// One source per address family. Each source GETs a plain-text endpoint
// that answers with the bare address of the caller. The production
// constructors pair an endpoint that only resolves for one family
// (`api.ipify.org` has no AAAA record, `api6.ipify.org` has no A record)
// with a client bound to the unspecified local address of that family, so
// the answer always describes the right family.
//
// ## Failure Model
//
// Discovery never raises. Connection failures, non-200 statuses and bodies
// that are not an address of the expected family are logged and reported
// as "unavailable" (`None`).

use dyndns_core::config::{DEFAULT_IPV4_URL, DEFAULT_IPV6_URL, IpSourceConfig};
use dyndns_core::traits::{IpSource, IpVersion};
use dyndns_core::{Error, Result};

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// Default HTTP timeout for discovery requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based IP source for one address family
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// Address family this source discovers
    version: IpVersion,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source that talks to `url` over any transport
    ///
    /// # Parameters
    ///
    /// - `url`: Endpoint answering with a bare address (e.g., "https://api.ipify.org")
    /// - `version`: Family the answer must belong to
    pub fn new(url: impl Into<String>, version: IpVersion) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            version,
            client,
        })
    }

    /// Create a source whose connections can only use `version` transport
    pub fn bound(url: impl Into<String>, version: IpVersion) -> Result<Self> {
        let local_address = match version {
            IpVersion::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpVersion::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .local_address(local_address)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            version,
            client,
        })
    }

    /// IPv4 source against the default endpoint
    pub fn ipv4() -> Result<Self> {
        Self::bound(DEFAULT_IPV4_URL, IpVersion::V4)
    }

    /// IPv6 source against the default endpoint
    pub fn ipv6() -> Result<Self> {
        Self::bound(DEFAULT_IPV6_URL, IpVersion::V6)
    }

    /// Both family-bound sources from configuration
    pub fn pair_from_config(config: &IpSourceConfig) -> Result<(Self, Self)> {
        Ok((
            Self::bound(config.ipv4_url.as_str(), IpVersion::V4)?,
            Self::bound(config.ipv6_url.as_str(), IpVersion::V6)?,
        ))
    }

    /// Fetch the current address from the HTTP service
    async fn fetch_ip(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Request failed: {}", e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::transport(format!(
                "Unexpected status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        let address = body.trim();
        let ip: IpAddr = address
            .parse()
            .map_err(|_| Error::transport(format!("Invalid IP address: {:?}", address)))?;

        if !self.version.matches(&ip) {
            return Err(Error::transport(format!(
                "Expected {}, got: {}",
                self.version, ip
            )));
        }

        Ok(address.to_string())
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Option<String> {
        match self.fetch_ip().await {
            Ok(address) => {
                tracing::debug!("Discovered public {} address {}", self.version, address);
                Some(address)
            }
            Err(e) => {
                tracing::warn!(
                    "Public {} address unavailable from {}: {}",
                    self.version,
                    self.url,
                    e
                );
                None
            }
        }
    }

    fn version(&self) -> IpVersion {
        self.version
    }
}
