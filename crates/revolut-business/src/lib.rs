#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client for the Revolut Business API.
//!
//! The business API is authenticated with OAuth access tokens. A token is
//! obtained by presenting a long-lived refresh token together with a JWT
//! client assertion signed by the private key registered for the API
//! certificate. Tokens live for about 40 minutes; [`Client`] refreshes them on
//! demand before handing out a service.
//!
//! # Modules
//!
//! - [`auth`] - client identity, the token endpoint and the token session
//! - [`client`] - [`Client`] and its builder
//! - [`account`], [`counterparty`], [`transfer`], [`payment`], [`payment_draft`],
//!   [`exchange`], [`webhook`] - one service per resource family
//!
//! # Feature Flags
//!
//! - `telemetry` - spans for token requests and API calls, refresh events

pub mod account;
pub mod auth;
pub mod client;
pub mod counterparty;
pub mod exchange;
pub mod payment;
pub mod payment_draft;
pub mod transfer;
pub mod webhook;

#[cfg(test)]
mod testing;

pub use auth::{AccessToken, ClientIdentity, SessionStatus, TokenSession};
pub use client::{Client, ClientBuilder};
