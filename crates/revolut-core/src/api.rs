//! The request/decode cycle shared by every resource operation.
//!
//! A resource service owns an [`ApiContext`] and describes each operation as a
//! [`Call`]: a method, the path below the API base, an optional query and body,
//! and the single status code that counts as success. [`ApiContext::send`] then
//! runs the call and maps every failure onto [`Error`]:
//!
//! - the context carries a captured auth failure → [`Error::Auth`], no request is made
//! - the transport fails → [`Error::Transport`]
//! - the status differs from the expected one → [`Error::Api`] with the raw body text
//! - the body does not decode → [`Error::Decode`]

use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use url::Url;

use crate::error::{AuthError, Error, TransportError};
use crate::transport::{Body, Credential, RawResponse, RequestDescriptor, Transport};

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

/// One API operation, relative to the service's base URL.
#[derive(Debug, Clone)]
pub struct Call {
    context: &'static str,
    method: Method,
    segments: Vec<String>,
    query: Vec<(&'static str, String)>,
    body: Body,
    expect: StatusCode,
}

impl Call {
    fn new(context: &'static str, method: Method, segments: &[&str], expect: StatusCode) -> Self {
        Self {
            context,
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: Body::Empty,
            expect,
        }
    }

    /// `GET`, expecting `200 OK`.
    ///
    /// `context` names the endpoint in errors and spans, e.g. `"GET /accounts"`.
    /// Each segment is percent-encoded on its own, so identifiers cannot escape
    /// their position in the path.
    pub fn get(context: &'static str, segments: &[&str]) -> Self {
        Self::new(context, Method::GET, segments, StatusCode::OK)
    }

    /// `POST`, expecting `200 OK`.
    pub fn post(context: &'static str, segments: &[&str]) -> Self {
        Self::new(context, Method::POST, segments, StatusCode::OK)
    }

    /// `DELETE`, expecting `204 No Content`.
    pub fn delete(context: &'static str, segments: &[&str]) -> Self {
        Self::new(context, Method::DELETE, segments, StatusCode::NO_CONTENT)
    }

    /// Overrides the status code that counts as success.
    pub fn expect(mut self, status: StatusCode) -> Self {
        self.expect = status;
        self
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Adds the query pair only when a non-empty value is present.
    pub fn query_opt(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value.map(Into::into) {
            Some(value) if !value.is_empty() => self.query(key, value),
            _ => self,
        }
    }

    /// Attaches `payload` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(payload).map_err(|e| Error::Transport {
            context: self.context,
            source: TransportError::Encode(e),
        })?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn context(&self) -> &'static str {
        self.context
    }
}

/// What a resource service needs to talk to the API.
///
/// Cloning is cheap: the transport is shared and the credential is a snapshot.
#[derive(Clone)]
pub struct ApiContext {
    transport: Arc<dyn Transport>,
    base_url: Url,
    credential: Result<Credential, Arc<AuthError>>,
}

impl ApiContext {
    pub fn new(transport: Arc<dyn Transport>, base_url: Url, credential: Credential) -> Self {
        Self {
            transport,
            base_url,
            credential: Ok(credential),
        }
    }

    /// A context whose every call fails with `error` without touching the network.
    pub fn failed(transport: Arc<dyn Transport>, base_url: Url, error: Arc<AuthError>) -> Self {
        Self {
            transport,
            base_url,
            credential: Err(error),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the absolute URL for `segments` below the base URL.
    pub fn url(
        &self,
        segments: &[String],
        query: &[(&'static str, String)],
    ) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Url {
                context: "Base URL cannot carry a path",
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Runs `call` and decodes the response body as `R`.
    pub async fn send<R: DeserializeOwned>(&self, call: Call) -> Result<R, Error> {
        let context = call.context;
        let response = self.exchange(call).await?;
        serde_json::from_slice::<R>(&response.body)
            .map_err(|source| Error::Decode { context, source })
    }

    /// Runs `call` and discards the response body.
    pub async fn send_empty(&self, call: Call) -> Result<(), Error> {
        self.exchange(call).await.map(|_| ())
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "revolut.api.call",
            skip_all,
            fields(endpoint = call.context, otel.status_code, error.message)
        )
    )]
    async fn exchange(&self, call: Call) -> Result<RawResponse, Error> {
        let result = self.exchange_inner(call).await;
        record_result_on_span(&result);
        result
    }

    async fn exchange_inner(&self, call: Call) -> Result<RawResponse, Error> {
        let credential = self
            .credential
            .as_ref()
            .map_err(|e| Error::Auth(Arc::clone(e)))?;
        let context = call.context;
        let url = self
            .url(&call.segments, &call.query)
            .map_err(|source| Error::Transport { context, source })?;
        let request = RequestDescriptor {
            method: call.method,
            url,
            credential: Some(credential.clone()),
            body: call.body,
        };
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| Error::Transport { context, source })?;
        if response.status != call.expect {
            return Err(Error::Api {
                context,
                status: response.status,
                body: response.text(),
            });
        }
        Ok(response)
    }
}

impl Debug for ApiContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.credential.is_ok())
            .finish()
    }
}

/// Records the outcome of a call on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
