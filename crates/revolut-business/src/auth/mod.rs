//! Authentication for the business API.
//!
//! - [`signer`] - the client identity and its signed JWT client assertion
//! - [`oauth`] - the token endpoint (authorisation code and refresh token grants)
//! - [`session`] - the access token lifecycle and proactive refresh

pub mod oauth;
pub mod session;
pub mod signer;

pub use oauth::{OAuthService, TokenResponse};
pub use session::{AccessToken, DEFAULT_REFRESH_LEEWAY, SessionStatus, TokenSession};
pub use signer::{ClientIdentity, sign_client_assertion};
