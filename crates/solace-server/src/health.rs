//! `/health` endpoint body.

use std::time::Instant;

use serde::Serialize;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server runs.
    pub status: &'static str,
    /// Seconds since start.
    pub uptime_secs: u64,
    /// Live chat connections.
    pub connections: usize,
    /// Rooms with at least one joined connection.
    pub rooms: usize,
}

/// Build a health response from the relay's live counters.
pub fn health_check(start_time: Instant, connections: usize, rooms: usize) -> HealthResponse {
    HealthResponse {
        status: "ok",
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
        rooms,
    }
}
