//! The HTTP transport contract and its `reqwest` implementation.
//!
//! A [`Transport`] performs exactly one request described by a
//! [`RequestDescriptor`] and hands back the status and raw body. It does not
//! interpret status codes, decode payloads or retry; that is left to
//! [`ApiContext`](crate::api::ApiContext) and the OAuth service.
//!
//! The trait exists so that tests (and callers with unusual HTTP stacks) can
//! substitute their own implementation. [`ReqwestTransport`] is the one used in
//! production.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode, header};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::environment::Environment;
use crate::error::TransportError;

/// Authorization presented with a request. Both variants are sent as a bearer token.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// OAuth access token for the business API.
    AccessToken(String),
    /// Secret API key for the merchant API.
    ApiKey(String),
}

impl Credential {
    pub fn authorization(&self) -> String {
        let secret = match self {
            Credential::AccessToken(token) => token,
            Credential::ApiKey(key) => key,
        };
        format!("Bearer {secret}")
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::AccessToken(_) => write!(f, "AccessToken(<redacted>)"),
            Credential::ApiKey(_) => write!(f, "ApiKey(<redacted>)"),
        }
    }
}

/// Request payload. The content type follows from the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(&'static str, String)>),
}

impl Body {
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Body::Empty => None,
            Body::Json(_) => Some("application/json"),
            Body::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }

    /// Value of a form field, if this is a form body containing it.
    pub fn form_field(&self, name: &str) -> Option<&str> {
        match self {
            Body::Form(pairs) => pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }
}

/// Everything needed to perform one HTTP request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub credential: Option<Credential>,
    pub body: Body,
}

/// Status and undecoded body of a response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs a single HTTP request.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
///
/// In [`Environment::Sandbox`] every request URL goes through
/// [`sandbox_url`](crate::environment::sandbox_url) first.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    environment: Environment,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(environment: Environment) -> Self {
        Self::with_client(reqwest::Client::new(), environment)
    }

    pub fn with_client(client: reqwest::Client, environment: Environment) -> Self {
        Self {
            client,
            environment,
            timeout: None,
        }
    }

    /// Applies a timeout to every request sent through this transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let url = self.environment.resolve(request.url)?;
        let mut req = self.client.request(request.method, url);
        if let Some(credential) = &request.credential {
            req = req.header(header::AUTHORIZATION, credential.authorization());
        }
        req = match &request.body {
            Body::Empty => req,
            Body::Json(value) => req.json(value),
            Body::Form(pairs) => req.form(pairs),
        };
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let response = req.send().await.map_err(TransportError::Http)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(TransportError::ResponseBodyRead)?;
        Ok(RawResponse { status, body })
    }
}

/// Resolves request URLs against an [`Environment`] before handing them to
/// another transport.
///
/// The client builders wrap caller-supplied transports in this, so the sandbox
/// rewrite applies whatever HTTP stack is underneath. The inner transport must
/// not rewrite again.
#[derive(Clone, Debug)]
pub struct EnvironmentTransport {
    inner: Arc<dyn Transport>,
    environment: Environment,
}

impl EnvironmentTransport {
    pub fn new(inner: Arc<dyn Transport>, environment: Environment) -> Self {
        Self { inner, environment }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

#[async_trait]
impl Transport for EnvironmentTransport {
    async fn send(&self, mut request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        request.url = self.environment.resolve(request.url)?;
        self.inner.send(request).await
    }
}
