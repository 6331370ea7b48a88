//! Per-socket connection state shared by the session and the relay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use solace_core::{AuthorId, ConnectionId, ServerFrame};
use tokio::sync::mpsc;
use tracing::warn;

/// A live chat socket.
///
/// The relay holds one `Arc` in its registry; the session holds another for
/// liveness bookkeeping. Frames reach the socket through a bounded queue
/// drained by the session's write task.
pub struct ClientConnection {
    /// Registry key.
    pub id: ConnectionId,
    /// Anonymous identity stamped on this socket's messages.
    pub author_id: AuthorId,
    tx: mpsc::Sender<Arc<String>>,
    connected_at: Instant,
    is_alive: AtomicBool,
    last_pong: Mutex<Instant>,
    dropped_frames: AtomicU64,
}

impl ClientConnection {
    /// Create a connection with fresh ids around an outbound queue.
    pub fn new(tx: mpsc::Sender<Arc<String>>) -> Self {
        Self::with_ids(ConnectionId::new(), AuthorId::new(), tx)
    }

    /// Create a connection with the given ids.
    pub fn with_ids(id: ConnectionId, author_id: AuthorId, tx: mpsc::Sender<Arc<String>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            author_id,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
            dropped_frames: AtomicU64::new(0),
        }
    }

    /// Queue an already-encoded frame. Returns `false` and counts a drop when
    /// the queue is full or closed.
    pub fn send(&self, frame: Arc<String>) -> bool {
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_frames.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Encode and queue a frame.
    pub fn send_frame(&self, frame: &ServerFrame) -> bool {
        match serde_json::to_string(frame) {
            Ok(json) => self.send(Arc::new(json)),
            Err(e) => {
                warn!(connection_id = %self.id, error = %e, "failed to encode frame");
                false
            }
        }
    }

    /// Frames dropped so far.
    pub fn drop_count(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Record a pong (or ping) from the peer.
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Read and clear the alive flag. `true` if the peer answered since the
    /// previous check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Time since the last pong, or since connect if none arrived.
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("author_id", &self.author_id)
            .finish_non_exhaustive()
    }
}
