//! The `/auth/token` endpoint.
//!
//! Both grants authenticate the client with a freshly signed JWT assertion
//! (see [`ClientIdentity::client_assertion`]) and are sent as a URL-encoded form.

use http::{Method, StatusCode};
use revolut_core::{AuthError, Body, RequestDescriptor, Transport, TransportError};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use url::Url;

use crate::auth::signer::ClientIdentity;

#[cfg(feature = "telemetry")]
use tracing::instrument;

pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Successful token response.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: u64,
    /// Only present when exchanging an authorisation code.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Debug for TokenResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Grant<'a> {
    AuthorizationCode(&'a str),
    RefreshToken(&'a str),
}

/// Client for the token endpoint.
#[derive(Clone, Debug)]
pub struct OAuthService {
    identity: ClientIdentity,
    transport: Arc<dyn Transport>,
    token_url: Url,
}

impl OAuthService {
    pub fn new(identity: ClientIdentity, transport: Arc<dyn Transport>, token_url: Url) -> Self {
        Self {
            identity,
            transport,
            token_url,
        }
    }

    /// Derives the token URL (`auth/token`) from the business API base URL.
    ///
    /// The segments are appended below the full base path, with or without a
    /// trailing slash, exactly like resource paths.
    pub fn for_base_url(
        identity: ClientIdentity,
        transport: Arc<dyn Transport>,
        base_url: &Url,
    ) -> Result<Self, TransportError> {
        let mut token_url = base_url.clone();
        token_url
            .path_segments_mut()
            .map_err(|_| TransportError::Url {
                context: "Failed to construct ./auth/token URL",
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .extend(["auth", "token"]);
        token_url.set_query(None);
        Ok(Self::new(identity, transport, token_url))
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Exchanges the one-time code from the consent redirect for the first
    /// access and refresh tokens.
    pub async fn exchange_authorisation_code(
        &self,
        code: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.request_token(Grant::AuthorizationCode(code)).await
    }

    /// Obtains a new access token. The refresh token itself stays valid.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.request_token(Grant::RefreshToken(refresh_token)).await
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "revolut.oauth.token", skip_all, err)
    )]
    async fn request_token(&self, grant: Grant<'_>) -> Result<TokenResponse, AuthError> {
        let assertion = self.identity.client_assertion()?;
        let mut form = match grant {
            Grant::AuthorizationCode(code) => vec![
                ("grant_type", "authorization_code".to_string()),
                ("code", code.to_string()),
            ],
            Grant::RefreshToken(token) => vec![
                ("grant_type", "refresh_token".to_string()),
                ("refresh_token", token.to_string()),
            ],
        };
        form.push(("client_id", self.identity.client_id().to_string()));
        form.push(("client_assertion_type", CLIENT_ASSERTION_TYPE.to_string()));
        form.push(("client_assertion", assertion));

        let request = RequestDescriptor {
            method: Method::POST,
            url: self.token_url.clone(),
            credential: None,
            body: Body::Form(form),
        };
        let response = self.transport.send(request).await?;
        if response.status != StatusCode::OK {
            return Err(AuthError::Rejected {
                status: response.status,
                body: response.text(),
            });
        }
        serde_json::from_slice(&response.body).map_err(AuthError::Decode)
    }
}
