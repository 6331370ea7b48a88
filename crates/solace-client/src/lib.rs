//! # solace-client
//!
//! Chat client for the Solace `/ws` endpoint.
//!
//! [`ChatClient`] owns one socket at a time. When the server drops it, a
//! background task reconnects with linear backoff (`interval × attempt`) up
//! to a fixed number of attempts, resetting the count after each successful
//! reconnect. Every decoded server frame is handed to each registered
//! handler in registration order.

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod errors;

pub use client::{ChatClient, HandlerId};
pub use config::ClientConfig;
pub use errors::{ClientError, Result};
