//! The business API client.
//!
//! ```no_run
//! use revolut_business::{Client, ClientIdentity};
//! use revolut_core::Environment;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = ClientIdentity::from_pem_file("client-id", "example.com", "privatecert.pem")?;
//! let client = Client::builder(identity, "oa_refresh_token")
//!     .with_environment(Environment::Sandbox)
//!     .build()
//!     .await?;
//! for account in client.accounts().await.list().await? {
//!     println!("{} {} {}", account.id, account.balance, account.currency);
//! }
//! # Ok(())
//! # }
//! ```

use revolut_core::{
    ApiContext, AuthError, Clock, Credential, Environment, EnvironmentTransport, Error,
    ReqwestTransport, SystemClock, Transport, TransportError,
};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::account::AccountService;
use crate::auth::{ClientIdentity, DEFAULT_REFRESH_LEEWAY, OAuthService, TokenSession};
use crate::counterparty::CounterpartyService;
use crate::exchange::ExchangeService;
use crate::payment::PaymentService;
use crate::payment_draft::PaymentDraftService;
use crate::transfer::TransferService;
use crate::webhook::WebhookService;

pub const DEFAULT_BASE_URL: &str = "https://b2b.revolut.com/api/1.0/";

/// Configures and builds a [`Client`].
pub struct ClientBuilder {
    identity: ClientIdentity,
    refresh_token: String,
    environment: Environment,
    base_url: Option<Url>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
    refresh_leeway: Duration,
    clock: Arc<dyn Clock>,
}

impl ClientBuilder {
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Overrides the production API base. The token endpoint is derived from it.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sends requests through `transport` instead of a [`ReqwestTransport`].
    ///
    /// The environment still applies: `transport` receives already rewritten
    /// sandbox URLs.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Timeout for each request made by the default transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// How long before expiry the access token is refreshed. Defaults to 30s.
    pub fn with_refresh_leeway(mut self, leeway: Duration) -> Self {
        self.refresh_leeway = leeway;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the client and exchanges the refresh token for the first access token.
    pub async fn build(self) -> Result<Client, Error> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).map_err(|source| Error::Transport {
                context: "Failed to parse base url",
                source: TransportError::Url {
                    context: "Failed to parse base url",
                    source,
                },
            })?,
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => Arc::new(EnvironmentTransport::new(transport, self.environment)),
            None => {
                let mut transport = ReqwestTransport::new(self.environment);
                if let Some(timeout) = self.timeout {
                    transport = transport.with_timeout(timeout);
                }
                Arc::new(transport)
            }
        };
        let oauth = OAuthService::for_base_url(self.identity, Arc::clone(&transport), &base_url)
            .map_err(|source| Error::Transport {
                context: "POST /auth/token",
                source,
            })?;
        let session = TokenSession::new(oauth, self.refresh_token, self.clock, self.refresh_leeway);
        session.access_token().await.map_err(|err| match err {
            AuthError::Signing(signing) => Error::Signing(signing),
            other => Error::from(other),
        })?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(environment = %self.environment, base_url = %base_url, "Business client ready");

        Ok(Client {
            transport,
            base_url,
            environment: self.environment,
            session: Arc::new(session),
        })
    }
}

impl Debug for ClientBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("identity", &self.identity)
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("refresh_leeway", &self.refresh_leeway)
            .finish_non_exhaustive()
    }
}

/// Client for the Revolut Business API.
///
/// Cloning shares the token session. Each service accessor checks the session
/// first and refreshes the access token if needed; the returned service holds
/// a snapshot of that token. If the refresh fails, the service is still
/// returned but every call on it fails with the same [`Error::Auth`] without
/// sending anything.
#[derive(Debug, Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: Url,
    environment: Environment,
    session: Arc<TokenSession>,
}

impl Client {
    pub fn builder(identity: ClientIdentity, refresh_token: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            identity,
            refresh_token: refresh_token.into(),
            environment: Environment::Production,
            base_url: None,
            transport: None,
            timeout: None,
            refresh_leeway: DEFAULT_REFRESH_LEEWAY,
            clock: Arc::new(SystemClock),
        }
    }

    /// Shorthand for [`Client::builder`] with only the environment set.
    pub async fn new(
        identity: ClientIdentity,
        refresh_token: impl Into<String>,
        environment: Environment,
    ) -> Result<Self, Error> {
        Self::builder(identity, refresh_token)
            .with_environment(environment)
            .build()
            .await
    }

    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub async fn accounts(&self) -> AccountService {
        AccountService::new(self.api_context().await)
    }

    pub async fn counterparties(&self) -> CounterpartyService {
        CounterpartyService::new(self.api_context().await)
    }

    pub async fn transfers(&self) -> TransferService {
        TransferService::new(self.api_context().await)
    }

    pub async fn payments(&self) -> PaymentService {
        PaymentService::new(self.api_context().await)
    }

    pub async fn payment_drafts(&self) -> PaymentDraftService {
        PaymentDraftService::new(self.api_context().await)
    }

    pub async fn exchange(&self) -> ExchangeService {
        ExchangeService::new(self.api_context().await)
    }

    pub async fn webhooks(&self) -> WebhookService {
        WebhookService::new(self.api_context().await)
    }

    async fn api_context(&self) -> ApiContext {
        let transport = Arc::clone(&self.transport);
        let base_url = self.base_url.clone();
        match self.session.access_token().await {
            Ok(token) => ApiContext::new(transport, base_url, Credential::from(token)),
            Err(err) => ApiContext::failed(transport, base_url, Arc::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStatus;
    use crate::auth::signer::tests::identity;
    use crate::testing::RecordingTransport;
    use http::StatusCode;
    use revolut_core::{ManualClock, RawResponse, RequestDescriptor};
    use std::sync::atomic::{AtomicBool, Ordering};

    const START: u64 = 1_700_000_000;

    fn accounts_api(_: &RequestDescriptor) -> RawResponse {
        RawResponse::new(StatusCode::OK, "[]")
    }

    async fn client(transport: Arc<RecordingTransport>, clock: &ManualClock) -> Client {
        Client::builder(identity(), "oa_refresh")
            .with_transport(transport)
            .with_clock(Arc::new(clock.clone()))
            .with_refresh_leeway(Duration::ZERO)
            .build()
            .await
            .unwrap()
    }

    fn bearer(request: &RequestDescriptor) -> Option<String> {
        request.credential.as_ref().map(Credential::authorization)
    }

    #[tokio::test]
    async fn test_build_performs_initial_exchange() {
        let clock = ManualClock::at(START);
        let transport = RecordingTransport::with_tokens(2400, accounts_api);
        let client = client(transport.clone(), &clock).await;
        assert_eq!(transport.token_requests(), 1);
        assert_eq!(client.session().status().await, SessionStatus::Fresh);
    }

    #[tokio::test]
    async fn test_build_fails_when_exchange_is_rejected() {
        let transport = RecordingTransport::new(|_| {
            Ok(RawResponse::new(StatusCode::UNAUTHORIZED, "invalid_client"))
        });
        let err = Client::builder(identity(), "oa_refresh")
            .with_transport(transport)
            .build()
            .await
            .unwrap_err();
        match err {
            Error::Auth(auth) => assert!(matches!(*auth, AuthError::Rejected { .. })),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_requests_never_use_expired_token() {
        let clock = ManualClock::at(START);
        let transport = RecordingTransport::with_tokens(60, accounts_api);
        let client = client(transport.clone(), &clock).await;

        client.accounts().await.list().await.unwrap();
        clock.advance(60);
        client.accounts().await.list().await.unwrap();
        clock.advance(30);
        client.accounts().await.list().await.unwrap();

        let api = transport.api_requests();
        assert_eq!(bearer(&api[0]).as_deref(), Some("Bearer token-1"));
        assert_eq!(bearer(&api[1]).as_deref(), Some("Bearer token-2"));
        assert_eq!(bearer(&api[2]).as_deref(), Some("Bearer token-2"));
        assert_eq!(transport.token_requests(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_captured_by_service() {
        let clock = ManualClock::at(START);
        let reject = Arc::new(AtomicBool::new(false));
        let reject_flag = Arc::clone(&reject);
        let transport = RecordingTransport::new(move |request| {
            if request.url.path().ends_with("/auth/token") {
                if reject_flag.load(Ordering::SeqCst) {
                    Ok(RawResponse::new(StatusCode::UNAUTHORIZED, "invalid_grant"))
                } else {
                    Ok(RawResponse::new(
                        StatusCode::OK,
                        crate::testing::token_json("token-1", 60),
                    ))
                }
            } else {
                Ok(RawResponse::new(StatusCode::OK, "[]"))
            }
        });
        let client = client(transport.clone(), &clock).await;

        reject.store(true, Ordering::SeqCst);
        clock.advance(120);
        let accounts = client.accounts().await;
        assert_eq!(client.session().status().await, SessionStatus::Expired);

        let first = accounts.list().await.unwrap_err();
        let second = accounts.get("acc-1").await.unwrap_err();
        let bank = accounts.bank_details("acc-1").await.unwrap_err();
        match (first, second, bank) {
            (Error::Auth(a), Error::Auth(b), Error::Auth(c)) => {
                assert!(Arc::ptr_eq(&a, &b));
                assert!(Arc::ptr_eq(&b, &c));
                assert!(matches!(*a, AuthError::Rejected { status, .. } if status == StatusCode::UNAUTHORIZED));
            }
            other => panic!("unexpected errors: {other:?}"),
        }
        assert!(transport.api_requests().is_empty());
        assert_eq!(transport.token_requests(), 2);
    }

    #[tokio::test]
    async fn test_every_accessor_checks_session() {
        let clock = ManualClock::at(START);
        let transport = RecordingTransport::with_tokens(60, accounts_api);
        let client = client(transport.clone(), &clock).await;

        clock.advance(61);
        let _ = client.counterparties().await;
        clock.advance(61);
        let _ = client.transfers().await;
        clock.advance(61);
        let _ = client.payments().await;
        clock.advance(61);
        let _ = client.payment_drafts().await;
        clock.advance(61);
        let _ = client.exchange().await;
        clock.advance(61);
        let _ = client.webhooks().await;
        assert_eq!(transport.token_requests(), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_accessors_refresh_once() {
        let clock = ManualClock::at(START);
        let transport = RecordingTransport::with_tokens(60, accounts_api);
        let client = client(transport.clone(), &clock).await;
        clock.advance(90);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.accounts().await.list().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(transport.token_requests(), 2);
        assert!(
            transport
                .api_requests()
                .iter()
                .all(|r| bearer(r).as_deref() == Some("Bearer token-2"))
        );
    }

    #[tokio::test]
    async fn test_default_base_url() {
        let clock = ManualClock::at(START);
        let transport = RecordingTransport::with_tokens(2400, accounts_api);
        let _client = client(transport.clone(), &clock).await;
        assert_eq!(
            transport.requests()[0].url.as_str(),
            "https://b2b.revolut.com/api/1.0/auth/token"
        );
    }

    #[tokio::test]
    async fn test_base_url_without_trailing_slash() {
        let clock = ManualClock::at(START);
        let transport = RecordingTransport::with_tokens(2400, accounts_api);
        let client = Client::builder(identity(), "oa_refresh")
            .with_base_url(Url::parse("https://b2b.revolut.com/api/1.0").unwrap())
            .with_transport(transport.clone())
            .with_clock(Arc::new(clock))
            .build()
            .await
            .unwrap();
        client.accounts().await.list().await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "https://b2b.revolut.com/api/1.0/auth/token"
        );
        assert_eq!(
            requests[1].url.as_str(),
            "https://b2b.revolut.com/api/1.0/accounts"
        );
    }

    #[tokio::test]
    async fn test_sandbox_applies_to_custom_transport() {
        let clock = ManualClock::at(START);
        let transport = RecordingTransport::with_tokens(2400, accounts_api);
        let client = Client::builder(identity(), "oa_refresh")
            .with_environment(Environment::Sandbox)
            .with_transport(transport.clone())
            .with_clock(Arc::new(clock))
            .build()
            .await
            .unwrap();
        client.accounts().await.list().await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "https://sandbox-b2b.revolut.com/api/1.0/auth/token"
        );
        assert_eq!(
            requests[1].url.as_str(),
            "https://sandbox-b2b.revolut.com/api/1.0/accounts"
        );
    }
}
