//! # solace-store
//!
//! Record storage behind the [`Storage`] trait.
//!
//! Handlers and the chat relay only see `Arc<dyn Storage>`, so a persistent
//! backend can replace [`MemStorage`] without touching them. `MemStorage`
//! keeps one owned table per entity; nothing survives a restart.

#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod seed;
mod table;

pub use error::{Result, StoreError};
pub use memory::MemStorage;

use async_trait::async_trait;
use solace_core::{
    BlogComment, BlogPost, ChatMessage, ChatRoom, NewBlogComment, NewBlogPost, NewChatMessage,
    NewChatRoom, NewTherapist, Therapist,
};

/// Record store used by REST handlers and the chat relay.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All therapists in insertion order.
    async fn therapists(&self) -> Result<Vec<Therapist>>;

    /// One therapist by id.
    async fn therapist(&self, id: &str) -> Result<Option<Therapist>>;

    /// Create a therapist, assigning its id.
    async fn create_therapist(&self, new: NewTherapist) -> Result<Therapist>;

    /// All blog posts, newest first.
    async fn blog_posts(&self) -> Result<Vec<BlogPost>>;

    /// One blog post by id.
    async fn blog_post(&self, id: &str) -> Result<Option<BlogPost>>;

    /// Create a blog post with zero likes and the current timestamp.
    async fn create_blog_post(&self, new: NewBlogPost) -> Result<BlogPost>;

    /// Increment a post's like counter by one. `None` if the post is unknown.
    async fn like_blog_post(&self, id: &str) -> Result<Option<BlogPost>>;

    /// Comments on a post, oldest first.
    async fn blog_comments(&self, post_id: &str) -> Result<Vec<BlogComment>>;

    /// Create a comment with the current timestamp.
    async fn create_blog_comment(&self, new: NewBlogComment) -> Result<BlogComment>;

    /// Active chat rooms in insertion order.
    async fn chat_rooms(&self) -> Result<Vec<ChatRoom>>;

    /// One chat room by id.
    async fn chat_room(&self, id: &str) -> Result<Option<ChatRoom>>;

    /// Create a chat room with a cosmetic active-user count.
    async fn create_chat_room(&self, new: NewChatRoom) -> Result<ChatRoom>;

    /// Every message in a room, in arrival order.
    async fn chat_messages(&self, room_id: &str) -> Result<Vec<ChatMessage>>;

    /// At most the last `limit` messages in a room, in arrival order.
    async fn recent_chat_messages(&self, room_id: &str, limit: usize) -> Result<Vec<ChatMessage>>;

    /// Append a message to its room's log.
    async fn create_chat_message(&self, new: NewChatMessage) -> Result<ChatMessage>;
}
