//! Typed async client for the [Revolut](https://www.revolut.com) Business and Merchant APIs.
//!
//! This crate bundles the workspace crates under one name and adds the pieces
//! used by the `revolut` command-line tool.
//!
//! # Modules
//!
//! - [`core`] - transport, environments, the API call pipeline and error types
//! - [`business`] - OAuth client assertion, token session and Business API services
//! - [`merchant`] - API-key client for merchant orders and webhooks
//! - [`config`] - JSON configuration file with environment-variable secrets
//! - [`telemetry`] - tracing subscriber setup and optional OTLP export
//!
//! # Example
//!
//! ```no_run
//! use revolut::business::{Client, ClientIdentity};
//! use revolut::core::Environment;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = ClientIdentity::from_pem_file("client-id", "example.com", "privatecert.pem")?;
//! let client = Client::new(identity, "oa_prod_refresh_token", Environment::Sandbox).await?;
//! for account in client.accounts().await.list().await? {
//!     println!("{} {} {}", account.id, account.balance, account.currency);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `telemetry` - spans in every crate and OTLP export from the command-line tool

pub mod config;
pub mod telemetry;

pub use revolut_business as business;
pub use revolut_core as core;
pub use revolut_merchant as merchant;
