//! JWT client assertions.
//!
//! Revolut authenticates the business client by a JWT signed with the private
//! key whose certificate was uploaded in the Business web app. The assertion
//! carries exactly three claims and no time bounds:
//!
//! ```json
//! { "iss": "<redirect domain>", "aud": "https://revolut.com", "sub": "<client id>" }
//! ```

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use revolut_core::SigningError;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::path::Path;

/// Audience every client assertion is addressed to.
pub const ASSERTION_AUDIENCE: &str = "https://revolut.com";

/// Claims of a client assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAssertionClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
}

/// The business client's identity: who it is and the key it signs with.
///
/// Immutable once built. The private key never leaves this struct.
#[derive(Clone)]
pub struct ClientIdentity {
    client_id: String,
    issuer: String,
    key: EncodingKey,
}

impl ClientIdentity {
    /// Builds an identity from an RSA private key in PEM form (PKCS#1 or PKCS#8).
    pub fn from_rsa_pem(
        client_id: impl Into<String>,
        issuer: impl Into<String>,
        pem: &[u8],
    ) -> Result<Self, SigningError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(SigningError::InvalidKey)?;
        Ok(Self {
            client_id: client_id.into(),
            issuer: issuer.into(),
            key,
        })
    }

    /// Reads the PEM key at `path`, then behaves like [`Self::from_rsa_pem`].
    pub fn from_pem_file(
        client_id: impl Into<String>,
        issuer: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, SigningError> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|source| SigningError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_rsa_pem(client_id, issuer, &pem)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Signs a fresh client assertion for this identity.
    pub fn client_assertion(&self) -> Result<String, SigningError> {
        sign_client_assertion(&self.issuer, &self.client_id, &self.key)
    }
}

impl Debug for ClientIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("client_id", &self.client_id)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Signs `{iss: issuer, aud: "https://revolut.com", sub: client_id}` with RS256.
pub fn sign_client_assertion(
    issuer: &str,
    client_id: &str,
    key: &EncodingKey,
) -> Result<String, SigningError> {
    let claims = ClientAssertionClaims {
        iss: issuer.to_string(),
        aud: ASSERTION_AUDIENCE.to_string(),
        sub: client_id.to_string(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, key).map_err(SigningError::Sign)
}
