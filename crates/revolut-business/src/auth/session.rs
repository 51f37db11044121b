//! Access token lifecycle.
//!
//! A [`TokenSession`] holds the long-lived refresh token and the current
//! short-lived access token. Callers ask for a token with
//! [`TokenSession::access_token`]; if the current one is missing, expired or
//! about to expire, the session refreshes it first.
//!
//! ```text
//!  Unretrieved ──refresh──▶ Fresh ──clock passes expires_at - leeway──▶ Expired
//!                             ▲                                           │
//!                             └──────────────────refresh──────────────────┘
//! ```
//!
//! A failed refresh leaves the session `Expired` with no token; the next call
//! tries again. The whole check-refresh-store sequence runs under one async
//! mutex, so concurrent callers never refresh twice for the same expiry.

use revolut_core::{AuthError, Clock, Credential, UnixTimestamp};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::auth::oauth::OAuthService;

#[cfg(feature = "telemetry")]
use tracing::instrument;

/// How long before its expiry a token stops being handed out.
pub const DEFAULT_REFRESH_LEEWAY: Duration = Duration::from_secs(30);

/// A bearer access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(<redacted>)")
    }
}

impl From<AccessToken> for Credential {
    fn from(token: AccessToken) -> Self {
        Credential::AccessToken(token.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No token has been requested yet.
    Unretrieved,
    /// The current token is usable.
    Fresh,
    /// The current token is expired, about to expire, invalidated or missing
    /// after a failed refresh.
    Expired,
}

#[derive(Clone)]
enum SessionState {
    Unretrieved,
    Active {
        token: AccessToken,
        expires_at: UnixTimestamp,
        leeway: Duration,
    },
    Expired,
}

pub struct TokenSession {
    oauth: OAuthService,
    refresh_token: String,
    clock: Arc<dyn Clock>,
    leeway: Duration,
    state: Mutex<SessionState>,
}

impl TokenSession {
    /// Creates a session that has not fetched a token yet.
    pub fn new(
        oauth: OAuthService,
        refresh_token: impl Into<String>,
        clock: Arc<dyn Clock>,
        leeway: Duration,
    ) -> Self {
        Self {
            oauth,
            refresh_token: refresh_token.into(),
            clock,
            leeway,
            state: Mutex::new(SessionState::Unretrieved),
        }
    }

    /// Returns a token that is valid right now, refreshing first if needed.
    ///
    /// At most one refresh is attempted per call. A returned token satisfies
    /// `now < expires_at` at the moment it is returned.
    pub async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let mut state = self.state.lock().await;
        if let SessionState::Active {
            token,
            expires_at,
            leeway,
        } = &*state
        {
            if self.is_fresh(*expires_at, *leeway) {
                return Ok(token.clone());
            }
        }
        let result = self.refresh().await;
        match result {
            Ok((token, expires_at, leeway)) => {
                *state = SessionState::Active {
                    token: token.clone(),
                    expires_at,
                    leeway,
                };
                Ok(token)
            }
            Err(err) => {
                *state = SessionState::Expired;
                Err(err)
            }
        }
    }

    pub async fn status(&self) -> SessionStatus {
        match &*self.state.lock().await {
            SessionState::Unretrieved => SessionStatus::Unretrieved,
            SessionState::Active {
                expires_at, leeway, ..
            } if self.is_fresh(*expires_at, *leeway) => {
                SessionStatus::Fresh
            }
            SessionState::Active { .. } | SessionState::Expired => SessionStatus::Expired,
        }
    }

    /// Expiry of the current token, if there is one.
    pub async fn expires_at(&self) -> Option<UnixTimestamp> {
        match &*self.state.lock().await {
            SessionState::Active { expires_at, .. } => Some(*expires_at),
            _ => None,
        }
    }

    /// Drops the current token so that the next call refreshes.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if !matches!(*state, SessionState::Unretrieved) {
            *state = SessionState::Expired;
        }
    }

    pub fn refresh_leeway(&self) -> Duration {
        self.leeway
    }

    fn is_fresh(&self, expires_at: UnixTimestamp, leeway: Duration) -> bool {
        self.clock.now() + leeway < expires_at
    }

    /// Fetches a new token. Expiry counts from when the request was started.
    ///
    /// The leeway applied to the token is capped at half its lifetime, so a
    /// token shorter than the configured leeway is still reused for a while.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "revolut.session.refresh", skip_all, err)
    )]
    async fn refresh(&self) -> Result<(AccessToken, UnixTimestamp, Duration), AuthError> {
        let started_at = self.clock.now();
        let response = self.oauth.refresh_access_token(&self.refresh_token).await?;
        let expires_at = started_at + response.expires_in;
        if self.clock.now() >= expires_at {
            return Err(AuthError::ExpiredOnArrival {
                expires_in: response.expires_in,
            });
        }
        let leeway = self.leeway.min(Duration::from_secs(response.expires_in) / 2);
        #[cfg(feature = "telemetry")]
        tracing::debug!(expires_at = %expires_at, ?leeway, "Access token refreshed");
        Ok((AccessToken(response.access_token), expires_at, leeway))
    }
}

impl Debug for TokenSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSession")
            .field("client_id", &self.oauth.identity().client_id())
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}
