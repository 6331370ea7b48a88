//! The chat relay.
//!
//! One task owns the [`ConnectionRegistry`] and processes [`RelayCommand`]s
//! one at a time, in arrival order. Sessions talk to it through a cloneable
//! [`RelayHandle`]. A command runs to completion, including its store call
//! and fan-out, before the next is taken, so every room sees messages in
//! the order the relay received them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use metrics::counter;
use solace_core::validation::require_non_empty;
use solace_core::{ClientFrame, ConnectionId, NewChatMessage, RoomId, ServerFrame};
use solace_store::Storage;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::connection::ClientConnection;
use super::frame::FrameError;
use super::registry::ConnectionRegistry;
use crate::config::ServerConfig;
use crate::metrics::{
    CHAT_DELIVERY_DROPS_TOTAL, CHAT_FRAMES_REJECTED_TOTAL, CHAT_MESSAGES_RELAYED_TOTAL,
};

/// Capacity of the command queue shared by all sessions.
const COMMAND_QUEUE: usize = 1024;

/// Work submitted to the relay by socket sessions.
#[derive(Debug)]
pub enum RelayCommand {
    /// A socket was accepted.
    Connect(Arc<ClientConnection>),
    /// A decoded frame arrived on a socket.
    Frame {
        /// Sending socket.
        connection_id: ConnectionId,
        /// The frame.
        frame: ClientFrame,
    },
    /// A socket closed.
    Disconnect(ConnectionId),
}

/// Counters published by the relay after every command.
#[derive(Default)]
struct RelayStats {
    connections: AtomicUsize,
    rooms: AtomicUsize,
}

/// Cloneable sender side of the relay.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayCommand>,
    stats: Arc<RelayStats>,
}

impl RelayHandle {
    /// Register a connection. `false` if the relay has stopped.
    pub async fn connect(&self, connection: Arc<ClientConnection>) -> bool {
        self.submit(RelayCommand::Connect(connection)).await
    }

    /// Forward a decoded frame. `false` if the relay has stopped.
    pub async fn frame(&self, connection_id: ConnectionId, frame: ClientFrame) -> bool {
        self.submit(RelayCommand::Frame {
            connection_id,
            frame,
        })
        .await
    }

    /// Unregister a connection. `false` if the relay has stopped.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> bool {
        self.submit(RelayCommand::Disconnect(connection_id)).await
    }

    async fn submit(&self, command: RelayCommand) -> bool {
        self.tx.send(command).await.is_ok()
    }

    /// Registered connections as of the last processed command.
    pub fn connection_count(&self) -> usize {
        self.stats.connections.load(Ordering::Relaxed)
    }

    /// Occupied rooms as of the last processed command.
    pub fn room_count(&self) -> usize {
        self.stats.rooms.load(Ordering::Relaxed)
    }
}

/// Receiver side of the relay; owns the registry.
pub struct ChatRelay {
    rx: mpsc::Receiver<RelayCommand>,
    storage: Arc<dyn Storage>,
    registry: ConnectionRegistry,
    history_limit: usize,
    max_content_length: usize,
    stats: Arc<RelayStats>,
}

impl ChatRelay {
    /// Create a relay and the handle used to reach it.
    pub fn new(storage: Arc<dyn Storage>, config: &ServerConfig) -> (Self, RelayHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let stats = Arc::new(RelayStats::default());
        let relay = Self {
            rx,
            storage,
            registry: ConnectionRegistry::new(),
            history_limit: config.history_limit,
            max_content_length: config.max_content_length,
            stats: Arc::clone(&stats),
        };
        (relay, RelayHandle { tx, stats })
    }

    /// Process commands until every handle is dropped or `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("chat relay started");
        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                () = cancel.cancelled() => break,
            }
        }
        info!(connections = self.registry.len(), "chat relay stopped");
    }

    async fn handle(&mut self, command: RelayCommand) {
        match command {
            RelayCommand::Connect(connection) => {
                let id = connection.id.clone();
                if self.registry.register(connection) {
                    debug!(connection_id = %id, "connection registered");
                } else {
                    warn!(connection_id = %id, "duplicate connection id, ignoring");
                }
            }
            RelayCommand::Frame {
                connection_id,
                frame,
            } => {
                let kind = frame.kind();
                let result = match frame {
                    ClientFrame::JoinRoom { room_id } => self.join(&connection_id, room_id).await,
                    ClientFrame::SendMessage { room_id, content } => {
                        self.send(&connection_id, room_id, content).await
                    }
                };
                if let Err(e) = result {
                    warn!(connection_id = %connection_id, kind, error = %e, "dropping chat frame");
                    counter!(CHAT_FRAMES_REJECTED_TOTAL, "reason" => e.reason()).increment(1);
                }
            }
            RelayCommand::Disconnect(connection_id) => {
                if let Some(connection) = self.registry.remove(&connection_id) {
                    debug!(
                        connection_id = %connection_id,
                        dropped_frames = connection.drop_count(),
                        age = ?connection.age(),
                        "connection unregistered"
                    );
                }
            }
        }
        self.stats
            .connections
            .store(self.registry.len(), Ordering::Relaxed);
        self.stats
            .rooms
            .store(self.registry.room_count(), Ordering::Relaxed);
    }

    /// Move the connection into `room_id` and replay the room's recent history
    /// to it.
    async fn join(&mut self, connection_id: &ConnectionId, room_id: RoomId) -> Result<(), FrameError> {
        require_non_empty(&room_id, "roomId")?;
        let Some(previous) = self.registry.join(connection_id, room_id.clone()) else {
            debug!(connection_id = %connection_id, "join from unregistered connection");
            return Ok(());
        };
        debug!(
            connection_id = %connection_id,
            room_id = %room_id,
            previous_room = ?previous,
            "joined room"
        );

        let messages = match self
            .storage
            .recent_chat_messages(&room_id, self.history_limit)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                error!(room_id = %room_id, error = %e, "failed to load room history");
                return Ok(());
            }
        };
        if let Some(connection) = self.registry.get(connection_id) {
            if !connection.send_frame(&ServerFrame::RecentMessages { messages }) {
                delivery_dropped(connection);
            }
        }
        Ok(())
    }

    /// Persist a message and fan it out to the room's current members.
    async fn send(
        &mut self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        content: String,
    ) -> Result<(), FrameError> {
        let Some(sender) = self.registry.get(connection_id) else {
            debug!(connection_id = %connection_id, "message from unregistered connection");
            return Ok(());
        };
        let new = NewChatMessage {
            room_id,
            content,
            author_id: sender.author_id.clone(),
        };
        new.validate(self.max_content_length)?;

        let message = match self.storage.create_chat_message(new).await {
            Ok(message) => message,
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "failed to persist chat message");
                return Ok(());
            }
        };
        counter!(CHAT_MESSAGES_RELAYED_TOTAL).increment(1);

        let room_id = message.room_id.clone();
        let json = match serde_json::to_string(&ServerFrame::NewMessage { message }) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                error!(room_id = %room_id, error = %e, "failed to encode chat message");
                return Ok(());
            }
        };
        let mut recipients = 0_usize;
        for member in self.registry.members(&room_id) {
            if member.send(Arc::clone(&json)) {
                recipients += 1;
            } else {
                delivery_dropped(member);
            }
        }
        debug!(room_id = %room_id, recipients, "message relayed");
        Ok(())
    }
}

fn delivery_dropped(connection: &ClientConnection) {
    warn!(
        connection_id = %connection.id,
        dropped_frames = connection.drop_count(),
        "outbound queue full or closed, dropping frame"
    );
    counter!(CHAT_DELIVERY_DROPS_TOTAL).increment(1);
}
