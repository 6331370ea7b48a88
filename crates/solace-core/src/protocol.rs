//! Chat WebSocket frames.
//!
//! Every frame is a JSON object tagged by `type`:
//!
//! | Direction | `type` | Payload |
//! |-----------|--------|---------|
//! | client → server | `join-room` | `roomId` |
//! | client → server | `send-message` | `roomId`, `content` |
//! | server → client | `recent-messages` | `messages` |
//! | server → client | `new-message` | `message` |

use serde::{Deserialize, Serialize};

use crate::ids::RoomId;
use crate::records::ChatMessage;

/// A frame sent by a chat client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// Make `room_id` the connection's current room and ask for its history.
    JoinRoom {
        /// Room to join.
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    /// Post a message to a room.
    SendMessage {
        /// Target room.
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// Message text.
        content: String,
    },
}

impl ClientFrame {
    /// Wire name of this frame's `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::SendMessage { .. } => "send-message",
        }
    }
}

/// A frame sent by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerFrame {
    /// History replayed after a join, oldest first.
    RecentMessages {
        /// The replayed messages.
        messages: Vec<ChatMessage>,
    },
    /// A message just posted to the connection's current room.
    NewMessage {
        /// The persisted message.
        message: ChatMessage,
    },
}
