//! Production and sandbox environments.
//!
//! Revolut serves its sandbox from the same paths as production, on hosts
//! prefixed with `sandbox-`: `b2b.revolut.com` becomes `sandbox-b2b.revolut.com`.
//! Clients are always configured with production URLs; the sandbox rewrite is
//! applied by the transport just before a request goes out.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use url::Url;

use crate::error::TransportError;

/// Host prefix of every sandbox endpoint.
pub const SANDBOX_HOST_PREFIX: &str = "sandbox-";

/// Target environment for outgoing requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    pub fn from_sandbox(sandbox: bool) -> Self {
        if sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, Environment::Sandbox)
    }

    /// Returns `url` as it should be requested in this environment.
    pub fn resolve(&self, url: Url) -> Result<Url, TransportError> {
        match self {
            Environment::Production => Ok(url),
            Environment::Sandbox => sandbox_url(url),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Sandbox => write!(f, "sandbox"),
        }
    }
}

/// Prefixes the host of an `https` URL with `sandbox-`.
///
/// Path, query and port are preserved. URLs with any other scheme are returned
/// untouched, which keeps plain-HTTP test servers reachable in sandbox mode.
///
/// ```
/// use revolut_core::environment::sandbox_url;
/// use url::Url;
///
/// let url = Url::parse("https://host.example.com/api/1.0/foo").unwrap();
/// let rewritten = sandbox_url(url).unwrap();
/// assert_eq!(rewritten.as_str(), "https://sandbox-host.example.com/api/1.0/foo");
/// ```
pub fn sandbox_url(mut url: Url) -> Result<Url, TransportError> {
    if url.scheme() != "https" {
        return Ok(url);
    }
    let Some(host) = url.host_str() else {
        return Ok(url);
    };
    let sandbox_host = format!("{SANDBOX_HOST_PREFIX}{host}");
    url.set_host(Some(&sandbox_host))
        .map_err(|source| TransportError::Url {
            context: "Failed to rewrite host for sandbox",
            source,
        })?;
    Ok(url)
}
