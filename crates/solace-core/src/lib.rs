//! # solace-core
//!
//! Foundation types shared by every Solace crate.
//!
//! - **Branded IDs**: `TherapistId`, `BlogPostId`, `RoomId`, `AuthorId`, ... as
//!   newtypes so a room id can't be passed where a post id is expected
//! - **Records**: the five flat entities (therapist, blog post, comment,
//!   chat room, chat message) and their insert payloads
//! - **Protocol**: the tagged JSON frames of the chat WebSocket
//! - **Validation**: schema-level checks for inbound payloads
//! - **Constants**: protocol-wide limits such as the chat history window

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod ids;
pub mod protocol;
pub mod records;
pub mod validation;

pub use errors::ValidationError;
pub use ids::{AuthorId, BlogPostId, CommentId, ConnectionId, MessageId, RoomId, TherapistId};
pub use protocol::{ClientFrame, ServerFrame};
pub use records::{
    BlogComment, BlogPost, ChatMessage, ChatRoom, NewBlogComment, NewBlogPost, NewChatMessage,
    NewChatRoom, NewTherapist, Therapist,
};
