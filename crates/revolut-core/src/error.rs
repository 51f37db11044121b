//! Error taxonomy for the Revolut clients.
//!
//! Errors are layered the same way requests are:
//!
//! - [`SigningError`] - the private key could not be loaded or the client assertion could not be signed
//! - [`TransportError`] - the request never produced a response
//! - [`AuthError`] - obtaining or refreshing the access token failed
//! - [`Error`] - what a resource operation returns; wraps the above and adds
//!   unexpected-status and decode failures
//!
//! Remote error bodies are never parsed. An unexpected status carries the raw
//! response text verbatim in [`Error::Api`].

use http::StatusCode;
use std::path::PathBuf;
use std::sync::Arc;

/// Boxed error used by transports that are not backed by `reqwest`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The client assertion could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid RSA private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("Failed to read private key at {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to sign client assertion: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

/// A request could not be sent or its response could not be read.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid URL: {context}: {source}")]
    Url {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("Failed to read response body: {0}")]
    ResponseBodyRead(#[source] reqwest::Error),
    #[error("{0}")]
    Custom(#[source] BoxError),
}

/// Exchanging credentials for an access token failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("Token request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("Token request rejected with HTTP status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("Failed to decode token response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Access token expired on arrival (expires_in = {expires_in}s)")]
    ExpiredOnArrival { expires_in: u64 },
}

/// Errors returned by resource operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client identity is unusable. Only returned while building a client.
    #[error(transparent)]
    Signing(#[from] SigningError),
    /// No valid access token was available when the service was created.
    ///
    /// Every call on such a service returns a clone of the same `Arc`.
    #[error("Authentication failed: {0}")]
    Auth(Arc<AuthError>),
    #[error("Transport error: {context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: TransportError,
    },
    /// The API answered with a status the operation does not expect.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    Api {
        context: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to decode response: {context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        Error::Auth(Arc::new(value))
    }
}

impl Error {
    /// Status code of an [`Error::Api`] response, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
