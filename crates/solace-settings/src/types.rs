//! Settings structure. Every section fills missing keys from its defaults.

use serde::{Deserialize, Serialize};
use solace_core::constants::{MAX_CONTENT_LENGTH, RECENT_HISTORY_LIMIT};
use solace_logging::LogFormat;

/// Root settings object, mirrored by `settings.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolaceSettings {
    /// Network and connection settings.
    pub server: ServerSettings,
    /// Chat relay limits.
    pub chat: ChatSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Network and connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port for HTTP and WebSocket.
    pub port: u16,
    /// Maximum simultaneous WebSocket connections.
    pub max_connections: usize,
    /// Seconds between server pings.
    pub heartbeat_interval_secs: u64,
    /// Seconds without a pong before a socket is closed.
    pub heartbeat_timeout_secs: u64,
    /// Largest accepted inbound WebSocket message, in bytes.
    pub max_message_bytes: usize,
    /// Per-connection outbound queue capacity.
    pub outbound_queue: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_connections: 1024,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_message_bytes: 64 * 1024,
            outbound_queue: 256,
        }
    }
}

/// Chat relay limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatSettings {
    /// Messages replayed on join.
    pub history_limit: usize,
    /// Maximum message content length in bytes.
    pub max_content_length: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            history_limit: RECENT_HISTORY_LIMIT,
            max_content_length: MAX_CONTENT_LENGTH,
        }
    }
}

/// Log output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `solace_server=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}
