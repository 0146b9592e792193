//! HTTPS transport with redirect following
//!
//! reqwest's own redirect policy is switched off. The registrar is known to
//! answer some API calls with a 302, and the request has to be replayed
//! against the new location with the same method, credentials and body,
//! which reqwest would not do (it downgrades POST/PUT and strips auth on
//! host changes). Each response is fed to [`next_hop`], a pure decision
//! step, and the loop in [`RedirectingClient::send`] is bounded by a hop
//! counter.
//!
//! Redirect rules:
//! - Only status 302 is followed; every other status is returned as-is
//! - A `Location` starting with `/` is a path on the current host and port
//! - Anything else must be an absolute `https` URL
//! - More than [`MAX_REDIRECTS`] hops is an error

use dyndns_core::{Error, Result};
use reqwest::header::LOCATION;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Maximum number of redirects followed for one request
pub const MAX_REDIRECTS: usize = 20;

/// HTTP basic credentials
#[derive(Clone)]
pub struct BasicAuth {
    pub username: String,
    /// ⚠️ NEVER log this value
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Final response of a request, after redirects
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Resolve a `Location` header against the URL that produced it
pub fn resolve_redirect(current: &Url, location: &str) -> Result<Url> {
    if location.starts_with('/') {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (location, None),
        };

        let mut next = current.clone();
        next.set_path(path);
        next.set_query(query);
        next.set_fragment(None);
        return Ok(next);
    }

    let next = Url::parse(location)
        .map_err(|e| Error::transport(format!("Invalid redirect location {:?}: {}", location, e)))?;

    if next.scheme() != "https" {
        return Err(Error::InsecureRedirect(location.to_string()));
    }

    Ok(next)
}

/// Decide what to do with a response
///
/// # Returns
///
/// - `Ok(None)`: The response is final
/// - `Ok(Some(url))`: Replay the request against `url`
/// - `Err(Error)`: The redirect cannot be followed
pub fn next_hop(current: &Url, status: StatusCode, location: Option<&str>) -> Result<Option<Url>> {
    if status != StatusCode::FOUND {
        return Ok(None);
    }

    let location = location
        .ok_or_else(|| Error::transport(format!("302 from {} without Location header", current)))?;

    resolve_redirect(current, location).map(Some)
}

/// HTTP client that follows 302 redirects by replaying the full request
#[derive(Debug, Clone)]
pub struct RedirectingClient {
    client: reqwest::Client,
    max_redirects: usize,
}

impl RedirectingClient {
    /// Create a client with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_redirects: MAX_REDIRECTS,
        })
    }

    /// Send a request, following redirects
    ///
    /// Method, credentials and JSON body are sent unchanged on every hop.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        auth: Option<&BasicAuth>,
        body: Option<&Value>,
    ) -> Result<HttpResponse> {
        let mut url = url;

        for hop in 0..=self.max_redirects {
            tracing::debug!("{} {} (hop {})", method, url, hop);

            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(auth) = auth {
                request = request.basic_auth(&auth.username, Some(&auth.password));
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match next_hop(&url, status, location.as_deref())? {
                Some(next) => {
                    tracing::debug!("Following redirect {} -> {}", url, next);
                    url = next;
                }
                None => {
                    let body = response
                        .text()
                        .await
                        .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;
                    return Ok(HttpResponse { status, body });
                }
            }
        }

        Err(Error::TooManyRedirects(self.max_redirects))
    }
}
