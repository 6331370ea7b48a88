//! Client tests against a live relay and against scripted socket servers.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use solace_client::{ChatClient, ClientConfig, ClientError};
use solace_core::ServerFrame;
use solace_server::{ServerConfig, SolaceServer};
use solace_store::MemStorage;

const TIMEOUT: Duration = Duration::from_secs(5);

fn fast_config(url: String, attempts: u32) -> ClientConfig {
    ClientConfig {
        max_reconnect_attempts: attempts,
        reconnect_interval: Duration::from_millis(20),
        ..ClientConfig::new(url)
    }
}

async fn boot_relay() -> (String, Arc<SolaceServer>) {
    let server = Arc::new(SolaceServer::new(
        ServerConfig::default(),
        Arc::new(MemStorage::new()),
    ));
    let (addr, _handle) = server.listen().await.unwrap();
    (format!("ws://{addr}/ws"), server)
}

fn collect(client: &ChatClient) -> mpsc::UnboundedReceiver<ServerFrame> {
    let (tx, rx) = mpsc::unbounded_channel();
    let _ = client.add_handler(move |frame| {
        let _ = tx.send(frame.clone());
    });
    rx
}

async fn next_frame(rx: &mut mpsc::UnboundedReceiver<ServerFrame>) -> ServerFrame {
    timeout(TIMEOUT, rx.recv())
        .await
        .expect("timeout waiting for frame")
        .expect("handler dropped")
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    timeout(TIMEOUT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached");
}

/// Accept `count` sockets; drop each after the handshake except the last,
/// which answers every text frame with an empty history.
async fn flaky_server(count: usize) -> (String, mpsc::UnboundedReceiver<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (accepted_tx, accepted_rx) = mpsc::unbounded_channel();
    let _ = tokio::spawn(async move {
        for n in 1..=count {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            let _ = accepted_tx.send(n);
            if n < count {
                drop(ws);
                continue;
            }
            while let Some(Ok(msg)) = ws.next().await {
                if msg.is_text() {
                    let reply = json!({ "type": "recent-messages", "messages": [] });
                    if ws.send(Message::text(reply.to_string())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
    (format!("ws://{addr}/ws"), accepted_rx)
}

#[tokio::test]
async fn chat_round_trip_through_relay() {
    let (url, _server) = boot_relay().await;
    let alice = ChatClient::connect(ClientConfig::new(url.clone())).await.unwrap();
    let bob = ChatClient::connect(ClientConfig::new(url)).await.unwrap();
    let mut alice_rx = collect(&alice);
    let mut bob_rx = collect(&bob);

    alice.join_room("support").await.unwrap();
    assert_matches!(next_frame(&mut alice_rx).await, ServerFrame::RecentMessages { messages } if messages.is_empty());
    bob.join_room("support").await.unwrap();
    assert_matches!(next_frame(&mut bob_rx).await, ServerFrame::RecentMessages { .. });

    alice.send_message("support", "you are not alone").await.unwrap();
    for rx in [&mut alice_rx, &mut bob_rx] {
        assert_matches!(
            next_frame(rx).await,
            ServerFrame::NewMessage { message } if message.content == "you are not alone"
        );
    }
}

#[tokio::test]
async fn removed_handler_stops_receiving() {
    let (url, _server) = boot_relay().await;
    let client = ChatClient::connect(ClientConfig::new(url)).await.unwrap();
    let (tx, mut removed_rx) = mpsc::unbounded_channel();
    let removed = client.add_handler(move |frame| {
        let _ = tx.send(frame.clone());
    });
    let mut kept_rx = collect(&client);

    assert!(client.remove_handler(removed));
    assert!(!client.remove_handler(removed));

    client.join_room("r").await.unwrap();
    let _ = next_frame(&mut kept_rx).await;
    assert!(removed_rx.try_recv().is_err());
}

#[tokio::test]
async fn first_connect_failure_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = ChatClient::connect(ClientConfig::new(format!("ws://{addr}/ws"))).await;
    assert_matches!(result, Err(ClientError::Connect { .. }));
}

#[tokio::test]
async fn reconnects_after_server_drop() {
    let (url, mut accepted) = flaky_server(2).await;
    let client = ChatClient::connect(fast_config(url, 5)).await.unwrap();
    let mut rx = collect(&client);

    assert_eq!(timeout(TIMEOUT, accepted.recv()).await.unwrap(), Some(1));
    assert_eq!(timeout(TIMEOUT, accepted.recv()).await.unwrap(), Some(2));
    wait_until(|| client.is_connected()).await;

    client.join_room("r").await.unwrap();
    assert_matches!(next_frame(&mut rx).await, ServerFrame::RecentMessages { .. });
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let (logs, _guard) = solace_logging::capture_logs();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let ws = accept_async(tcp).await.unwrap();
        // Close the listener and the socket; every reconnect is refused.
        drop(listener);
        drop(ws);
    });

    let client = ChatClient::connect(fast_config(format!("ws://{addr}/ws"), 2))
        .await
        .unwrap();
    server.await.unwrap();

    wait_until(|| logs.has_message("giving up on reconnect")).await;
    assert!(!client.is_connected());
    assert_eq!(logs.events().iter().filter(|e| e.message == "reconnect failed").count(), 2);
    assert_matches!(
        client.send_message("r", "hello?").await,
        Err(ClientError::NotConnected)
    );
}

#[tokio::test]
async fn disconnect_suppresses_reconnect() {
    let (url, mut accepted) = flaky_server(2).await;
    let config = ClientConfig {
        reconnect_interval: Duration::from_millis(300),
        ..fast_config(url, 5)
    };
    let client = ChatClient::connect(config).await.unwrap();
    assert_eq!(timeout(TIMEOUT, accepted.recv()).await.unwrap(), Some(1));

    client.disconnect().await;
    assert!(!client.is_connected());
    assert_matches!(client.join_room("r").await, Err(ClientError::NotConnected));

    // The first socket was dropped server-side; no second attempt follows.
    assert!(
        timeout(Duration::from_millis(600), accepted.recv())
            .await
            .is_err()
    );
}
