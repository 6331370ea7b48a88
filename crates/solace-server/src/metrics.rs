//! Prometheus recorder and metric names.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus recorder and return the handle `/metrics`
/// renders from.
///
/// # Panics
///
/// Panics if a global recorder is already installed. Call once at startup.
pub fn install_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// WebSocket connections accepted (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Upgrades refused because `max_connections` was reached (counter).
pub const WS_CONNECTIONS_REJECTED_TOTAL: &str = "ws_connections_rejected_total";
/// Open WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// WebSocket connection lifetime (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Chat messages persisted and fanned out (counter).
pub const CHAT_MESSAGES_RELAYED_TOTAL: &str = "chat_messages_relayed_total";
/// Inbound frames dropped as malformed or invalid (counter, label: reason).
pub const CHAT_FRAMES_REJECTED_TOTAL: &str = "chat_frames_rejected_total";
/// Outbound frames dropped on a full or closed queue (counter).
pub const CHAT_DELIVERY_DROPS_TOTAL: &str = "chat_delivery_drops_total";
