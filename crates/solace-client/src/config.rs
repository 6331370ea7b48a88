//! Client configuration.

use std::time::Duration;

/// Reconnect attempts after a drop before giving up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Base reconnect delay; attempt `n` waits `n` times this.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// Where to connect and how to recover from drops.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// WebSocket URL, e.g. `ws://127.0.0.1:5000/ws`.
    pub url: String,
    /// Reconnect attempts after a drop.
    pub max_reconnect_attempts: u32,
    /// Base reconnect delay.
    pub reconnect_interval: Duration,
}

impl ClientConfig {
    /// Default policy for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }

    /// Delay before reconnect attempt `attempt` (1-based), or `None` once
    /// the attempts are used up.
    pub fn reconnect_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_reconnect_attempts {
            return None;
        }
        Some(self.reconnect_interval * attempt)
    }
}
