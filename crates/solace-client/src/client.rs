//! The reconnecting chat client.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use solace_core::{ClientFrame, RoomId, ServerFrame};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::{ClientError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Handler = Arc<dyn Fn(&ServerFrame) + Send + Sync>;

/// Frames queued for the current socket.
const OUTBOUND_QUEUE: usize = 64;

/// Returned by [`ChatClient::add_handler`]; pass to
/// [`ChatClient::remove_handler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Shared {
    config: ClientConfig,
    handlers: RwLock<Vec<(HandlerId, Handler)>>,
    next_handler: AtomicU64,
    outbound: Mutex<Option<mpsc::Sender<Message>>>,
    cancel: CancellationToken,
}

impl Shared {
    /// Install a fresh outbound queue for a new socket.
    fn attach(&self) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
        *self.outbound.lock() = Some(tx);
        rx
    }

    fn dispatch(&self, text: &str) {
        let frame: ServerFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "undecodable server frame");
                return;
            }
        };
        // Snapshot so handlers may add or remove handlers.
        let handlers: Vec<Handler> = self
            .handlers
            .read()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(&frame);
        }
    }
}

/// A chat connection that survives server-side drops.
pub struct ChatClient {
    shared: Arc<Shared>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient").finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Open the first socket and start the background driver.
    ///
    /// Fails if the first handshake fails; later drops are retried per
    /// `config`.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let ws = open(&config.url).await?;
        info!(url = %config.url, "chat client connected");

        let shared = Arc::new(Shared {
            config,
            handlers: RwLock::new(Vec::new()),
            next_handler: AtomicU64::new(0),
            outbound: Mutex::new(None),
            cancel: CancellationToken::new(),
        });
        let rx = shared.attach();
        let driver = tokio::spawn(drive(Arc::clone(&shared), ws, rx));
        Ok(Self {
            shared,
            driver: Mutex::new(Some(driver)),
        })
    }

    /// Register a handler for every decoded server frame.
    pub fn add_handler<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&ServerFrame) + Send + Sync + 'static,
    {
        let id = HandlerId(self.shared.next_handler.fetch_add(1, Ordering::Relaxed));
        self.shared.handlers.write().push((id, Arc::new(handler)));
        id
    }

    /// Unregister a handler. Returns `false` if it was not registered.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let mut handlers = self.shared.handlers.write();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    /// Ask to join `room_id`; the server answers with its recent history.
    pub async fn join_room(&self, room_id: impl Into<RoomId>) -> Result<()> {
        self.send_frame(&ClientFrame::JoinRoom {
            room_id: room_id.into(),
        })
        .await
    }

    /// Post `content` to `room_id`.
    pub async fn send_message(
        &self,
        room_id: impl Into<RoomId>,
        content: impl Into<String>,
    ) -> Result<()> {
        self.send_frame(&ClientFrame::SendMessage {
            room_id: room_id.into(),
            content: content.into(),
        })
        .await
    }

    async fn send_frame(&self, frame: &ClientFrame) -> Result<()> {
        let text = serde_json::to_string(frame)?;
        if self.shared.cancel.is_cancelled() {
            return Err(ClientError::NotConnected);
        }
        let tx = self
            .shared
            .outbound
            .lock()
            .clone()
            .ok_or(ClientError::NotConnected)?;
        tx.send(Message::text(text))
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    /// Whether a socket is open right now.
    pub fn is_connected(&self) -> bool {
        !self.shared.cancel.is_cancelled()
            && self
                .shared
                .outbound
                .lock()
                .as_ref()
                .is_some_and(|tx| !tx.is_closed())
    }

    /// Close the socket and stop reconnecting.
    pub async fn disconnect(&self) {
        self.shared.cancel.cancel();
        let driver = self.driver.lock().take();
        if let Some(driver) = driver {
            let _ = driver.await;
        }
        info!(url = %self.shared.config.url, "chat client disconnected");
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

async fn open(url: &str) -> Result<WsStream> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|e| ClientError::Connect {
            url: url.to_owned(),
            source: Box::new(e),
        })?;
    Ok(ws)
}

/// Pump the current socket; on a drop, reconnect and continue.
async fn drive(shared: Arc<Shared>, mut ws: WsStream, mut rx: mpsc::Receiver<Message>) {
    loop {
        pump(&shared, ws, rx).await;
        *shared.outbound.lock() = None;
        if shared.cancel.is_cancelled() {
            break;
        }
        info!("chat socket closed");
        let Some(next) = reconnect(&shared).await else {
            break;
        };
        ws = next;
        rx = shared.attach();
    }
    debug!("chat client driver stopped");
}

async fn reconnect(shared: &Shared) -> Option<WsStream> {
    let max = shared.config.max_reconnect_attempts;
    let mut attempt = 0;
    loop {
        attempt += 1;
        let Some(delay) = shared.config.reconnect_delay(attempt) else {
            warn!(attempts = max, "giving up on reconnect");
            return None;
        };
        info!(attempt, max, ?delay, "attempting to reconnect");
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = shared.cancel.cancelled() => return None,
        }
        match open(&shared.config.url).await {
            Ok(ws) => {
                info!(attempt, "reconnected");
                return Some(ws);
            }
            Err(e) => warn!(attempt, error = %e, "reconnect failed"),
        }
    }
}

async fn pump(shared: &Shared, ws: WsStream, mut rx: mpsc::Receiver<Message>) {
    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                let Some(msg) = outgoing else { break };
                if let Err(e) = sink.send(msg).await {
                    debug!(error = %e, "send failed");
                    break;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => shared.dispatch(text.as_str()),
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => shared.dispatch(text),
                    Err(_) => warn!(len = data.len(), "non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "socket error");
                    break;
                }
            },
            () = shared.cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        }
    }
}
