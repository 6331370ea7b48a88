//! # solace-server
//!
//! Axum HTTP + `WebSocket` server for Solace.
//!
//! - REST handlers over the record store (`/api/...`)
//! - Chat relay: a single task owning the connection registry, fanning
//!   messages out to the members of a room
//! - Per-socket sessions with ping/pong liveness
//! - `/health`, `/metrics` and graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::SolaceServer;
