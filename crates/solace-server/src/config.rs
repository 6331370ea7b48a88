//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use solace_core::constants::{MAX_CONTENT_LENGTH, RECENT_HISTORY_LIMIT};
use solace_settings::SolaceSettings;
use tokio::sync::Semaphore;
use tracing::warn;

/// Runtime configuration for [`SolaceServer`](crate::SolaceServer).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum concurrent WebSocket connections; further upgrades get 503.
    pub max_connections: usize,
    /// Seconds between server pings.
    pub heartbeat_interval_secs: u64,
    /// Seconds without a pong before the socket is closed.
    pub heartbeat_timeout_secs: u64,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Per-connection outbound queue capacity.
    pub outbound_queue: usize,
    /// Messages replayed on join.
    pub history_limit: usize,
    /// Maximum chat message content length in bytes.
    pub max_content_length: usize,
}

impl ServerConfig {
    /// Ping interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Pong timeout as a [`Duration`].
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    /// Bring out-of-range limits back into range, warning for each.
    ///
    /// `max_connections` and `outbound_queue` are at least 1 and the pong
    /// timeout is never shorter than the ping interval.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let max_connections = self.max_connections.clamp(1, Semaphore::MAX_PERMITS);
        if max_connections != self.max_connections {
            warn!(
                key = "maxConnections",
                value = self.max_connections,
                using = max_connections,
                "invalid setting, clamping"
            );
            self.max_connections = max_connections;
        }
        if self.outbound_queue == 0 {
            warn!(key = "outboundQueue", value = 0_usize, using = 1_usize, "invalid setting, clamping");
            self.outbound_queue = 1;
        }
        if self.heartbeat_timeout_secs < self.heartbeat_interval_secs {
            warn!(
                key = "heartbeatTimeoutSecs",
                value = self.heartbeat_timeout_secs,
                using = self.heartbeat_interval_secs,
                "invalid setting, clamping"
            );
            self.heartbeat_timeout_secs = self.heartbeat_interval_secs;
        }
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_connections: 1024,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_message_size: 64 * 1024,
            outbound_queue: 256,
            history_limit: RECENT_HISTORY_LIMIT,
            max_content_length: MAX_CONTENT_LENGTH,
        }
    }
}

impl From<&SolaceSettings> for ServerConfig {
    fn from(settings: &SolaceSettings) -> Self {
        let server = &settings.server;
        Self {
            host: server.host.clone(),
            port: server.port,
            max_connections: server.max_connections,
            heartbeat_interval_secs: server.heartbeat_interval_secs,
            heartbeat_timeout_secs: server.heartbeat_timeout_secs,
            max_message_size: server.max_message_bytes,
            outbound_queue: server.outbound_queue,
            history_limit: settings.chat.history_limit,
            max_content_length: settings.chat.max_content_length,
        }
        .sanitized()
    }
}
