//! The merchant API client.

use revolut_core::{
    ApiContext, Credential, Environment, EnvironmentTransport, Error, ReqwestTransport, Transport,
    TransportError,
};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::order::OrderService;
use crate::webhook::WebhookService;

pub const DEFAULT_BASE_URL: &str = "https://merchant.revolut.com/api/1.0/";

pub struct ClientBuilder {
    api_key: String,
    environment: Environment,
    base_url: Option<Url>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sends requests through `transport`, which receives already rewritten
    /// sandbox URLs.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
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

        #[cfg(feature = "telemetry")]
        tracing::debug!(environment = %self.environment, base_url = %base_url, "Merchant client ready");

        Ok(Client {
            api: ApiContext::new(transport, base_url, Credential::ApiKey(self.api_key)),
            environment: self.environment,
        })
    }
}

impl Debug for ClientBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Client for the Revolut Merchant API.
///
/// Every request carries the secret API key as a bearer token. There is no
/// session to refresh, so services are handed out synchronously.
///
/// ```no_run
/// use revolut_core::Environment;
/// use revolut_merchant::Client;
///
/// # async fn run() -> Result<(), revolut_core::Error> {
/// let client = Client::new("sk_live_...", Environment::Production)?;
/// let order = client.orders().get("6516e61c-d279-a454-a837-bc52ce55ed49").await?;
/// println!("{:?} {}", order.state, order.order_amount.value);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    api: ApiContext,
    environment: Environment,
}

impl Client {
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            api_key: api_key.into(),
            environment: Environment::Production,
            base_url: None,
            transport: None,
            timeout: None,
        }
    }

    pub fn new(api_key: impl Into<String>, environment: Environment) -> Result<Self, Error> {
        Self::builder(api_key).with_environment(environment).build()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.api.clone())
    }

    pub fn webhooks(&self) -> WebhookService {
        WebhookService::new(self.api.clone())
    }
}
