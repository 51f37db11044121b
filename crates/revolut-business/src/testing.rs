//! Test doubles shared by the unit tests of this crate.

use async_trait::async_trait;
use http::StatusCode;
use revolut_core::{RawResponse, RequestDescriptor, Transport, TransportError};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Handler = Box<dyn Fn(&RequestDescriptor) -> Result<RawResponse, TransportError> + Send + Sync>;

/// Answers every request through a handler and keeps a copy of each request.
pub(crate) struct RecordingTransport {
    handler: Handler,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl RecordingTransport {
    pub(crate) fn new(
        handler: impl Fn(&RequestDescriptor) -> Result<RawResponse, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Replies `200 OK` with `body` to everything.
    pub(crate) fn ok(body: impl Into<String>) -> Arc<Self> {
        let body = body.into();
        Self::new(move |_| Ok(RawResponse::new(StatusCode::OK, body.clone())))
    }

    /// Issues `token-1`, `token-2`, ... from the token endpoint, each valid for
    /// `expires_in` seconds, and passes every other request to `api`.
    pub(crate) fn with_tokens(
        expires_in: u64,
        api: impl Fn(&RequestDescriptor) -> RawResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        let issued = AtomicUsize::new(0);
        Self::new(move |request| {
            if is_token_request(request) {
                let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
                let body = token_json(&format!("token-{n}"), expires_in);
                Ok(RawResponse::new(StatusCode::OK, body))
            } else {
                Ok(api(request))
            }
        })
    }

    pub(crate) fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn token_requests(&self) -> usize {
        self.requests().iter().filter(|r| is_token_request(r)).count()
    }

    pub(crate) fn api_requests(&self) -> Vec<RequestDescriptor> {
        self.requests()
            .into_iter()
            .filter(|r| !is_token_request(r))
            .collect()
    }
}

impl Debug for RecordingTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        // Let concurrent callers interleave.
        tokio::task::yield_now().await;
        (self.handler)(&request)
    }
}

fn is_token_request(request: &RequestDescriptor) -> bool {
    request.url.path().ends_with("/auth/token")
}

pub(crate) fn token_json(access_token: &str, expires_in: u64) -> String {
    serde_json::json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": expires_in,
    })
    .to_string()
}
