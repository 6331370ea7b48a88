//! One chat socket from upgrade to close.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::connection::ClientConnection;
use super::frame::{FrameError, decode_binary, decode_text};
use super::relay::RelayHandle;
use crate::config::ServerConfig;
use crate::metrics::{
    CHAT_FRAMES_REJECTED_TOTAL, WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE,
    WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL,
};

/// Run a chat session for an upgraded socket.
///
/// 1. Registers a fresh [`ClientConnection`] with the relay
/// 2. Forwards queued frames to the socket and pings every heartbeat interval
/// 3. Decodes inbound frames and hands them to the relay; bad frames are
///    logged and dropped, the socket stays open
/// 4. Unregisters on close, heartbeat timeout or server shutdown
#[instrument(skip_all, fields(connection_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    relay: RelayHandle,
    config: Arc<ServerConfig>,
    cancel: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(config.outbound_queue.max(1));
    let connection = Arc::new(ClientConnection::new(send_tx));
    let connection_id = connection.id.clone();
    let _ = tracing::Span::current().record("connection_id", connection_id.as_str());

    info!("client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    if !relay.connect(connection.clone()).await {
        warn!("chat relay stopped, closing socket");
        record_disconnect(&connection);
        return;
    }

    let ping_every = sanitize_interval(config.heartbeat_interval());
    let pong_timeout = config.heartbeat_timeout();
    let outbound_conn = connection.clone();
    let mut outbound = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(ping_every);
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                frame = send_rx.recv() => {
                    let Some(text) = frame else { break };
                    if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                        break;
                    }
                }
                _ = ping_interval.tick() => {
                    if !outbound_conn.check_alive()
                        && outbound_conn.last_pong_elapsed() > pong_timeout
                    {
                        warn!(timeout = ?pong_timeout, "client unresponsive, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = ws_tx.close().await;
    });

    loop {
        let msg = tokio::select! {
            msg = ws_rx.next() => msg,
            _ = &mut outbound => break,
            () = cancel.cancelled() => {
                debug!("server shutting down");
                break;
            }
        };
        let Some(Ok(msg)) = msg else { break };

        let decoded = match msg {
            Message::Text(text) => decode_text(text.as_str()),
            Message::Binary(data) => decode_binary(&data),
            Message::Close(_) => {
                debug!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {
                connection.mark_alive();
                continue;
            }
        };

        match decoded {
            Ok(frame) => {
                if !relay.frame(connection_id.clone(), frame).await {
                    warn!("chat relay stopped, closing socket");
                    break;
                }
            }
            Err(e) => reject(&e),
        }
    }

    info!(dropped_frames = connection.drop_count(), "client disconnected");
    record_disconnect(&connection);
    outbound.abort();
    let _ = relay.disconnect(connection_id).await;
}

fn record_disconnect(connection: &ClientConnection) {
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(connection.age().as_secs_f64());
}

fn reject(error: &FrameError) {
    warn!(error = %error, "dropping inbound frame");
    counter!(CHAT_FRAMES_REJECTED_TOTAL, "reason" => error.reason()).increment(1);
}

/// Ping interval floor; `0` would make `tokio::time::interval` panic.
pub(crate) fn sanitize_interval(interval: Duration) -> Duration {
    interval.max(Duration::from_millis(10))
}

#[cfg(test)]
mod tests {
    // Sessions need a real socket; see tests/integration.rs.
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn zero_interval_is_clamped() {
        assert_eq!(sanitize_interval(Duration::ZERO), Duration::from_millis(10));
        assert_eq!(
            sanitize_interval(Duration::from_secs(30)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn disconnect_balances_connect_metrics() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let (tx, _rx) = mpsc::channel(1);
        let connection = ClientConnection::new(tx);
        metrics::with_local_recorder(&recorder, || {
            counter!(WS_CONNECTIONS_TOTAL).increment(1);
            gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
            record_disconnect(&connection);
        });
        let output = handle.render();
        assert!(output.contains("ws_connections_total 1"));
        assert!(output.contains("ws_disconnections_total 1"));
        assert!(output.contains("ws_connections_active 0"));
    }
}
