#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Shared plumbing for the Revolut API clients.
//!
//! This crate holds everything the business and merchant clients have in common:
//! how a request is described, how it is sent, which environment it targets, and
//! how failures are reported. It knows nothing about individual resources.
//!
//! # Modules
//!
//! - [`api`] - [`ApiContext`](api::ApiContext) and [`Call`](api::Call), the request/decode
//!   cycle every resource operation goes through
//! - [`config`] - [`LiteralOrEnv`](config::LiteralOrEnv) for configuration values that may
//!   reference environment variables
//! - [`environment`] - production vs sandbox selection and the sandbox host rewrite
//! - [`error`] - the error taxonomy shared by all clients
//! - [`timestamp`] - [`UnixTimestamp`](timestamp::UnixTimestamp) and the [`Clock`](timestamp::Clock) seam
//! - [`transport`] - the [`Transport`](transport::Transport) contract and its `reqwest` implementation
//!
//! # Feature Flags
//!
//! - `telemetry` - records spans around every API call via `tracing`

pub mod api;
pub mod config;
pub mod environment;
pub mod error;
pub mod timestamp;
pub mod transport;

pub use api::{ApiContext, Call};
pub use environment::Environment;
pub use error::{AuthError, Error, SigningError, TransportError};
pub use timestamp::{Clock, ManualClock, SystemClock, UnixTimestamp};
pub use transport::{
    Body, Credential, EnvironmentTransport, RawResponse, ReqwestTransport, RequestDescriptor,
    Transport,
};
