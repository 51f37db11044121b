#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client for the Revolut Merchant API.
//!
//! The merchant API accepts card payments through orders. It is authenticated
//! with the secret API key from the Merchant settings of the Business web app.

pub mod client;
pub mod order;
pub mod webhook;

pub use client::{Client, ClientBuilder};
