//! In-memory [`Storage`] backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rand::Rng;
use solace_core::constants::ACTIVE_USERS_RANGE;
use solace_core::{
    BlogComment, BlogPost, BlogPostId, ChatMessage, ChatRoom, CommentId, MessageId,
    NewBlogComment, NewBlogPost, NewChatMessage, NewChatRoom, NewTherapist, RoomId, Therapist,
    TherapistId,
};
use tracing::debug;

use crate::error::Result;
use crate::table::Table;
use crate::{Storage, seed};

/// Chat messages plus a per-room index of row positions in arrival order.
struct MessageLog {
    table: Table<MessageId, ChatMessage>,
    by_room: HashMap<RoomId, Vec<usize>>,
}

impl MessageLog {
    fn new() -> Self {
        Self {
            table: Table::new(),
            by_room: HashMap::new(),
        }
    }

    fn append(&mut self, message: ChatMessage) {
        let room_id = message.room_id.clone();
        let pos = self.table.insert(message.id.clone(), message);
        self.by_room.entry(room_id).or_default().push(pos);
    }

    /// Last `limit` messages of a room (all if `None`), oldest first.
    fn tail(&self, room_id: &str, limit: Option<usize>) -> Vec<ChatMessage> {
        let Some(positions) = self.by_room.get(room_id) else {
            return Vec::new();
        };
        let skip = limit.map_or(0, |n| positions.len().saturating_sub(n));
        positions[skip..]
            .iter()
            .filter_map(|&pos| self.table.at(pos).cloned())
            .collect()
    }
}

/// Process-local record store. Each entity lives in its own table behind its
/// own lock.
pub struct MemStorage {
    therapists: RwLock<Table<TherapistId, Therapist>>,
    blog_posts: RwLock<Table<BlogPostId, BlogPost>>,
    blog_comments: RwLock<Table<CommentId, BlogComment>>,
    chat_rooms: RwLock<Table<RoomId, ChatRoom>>,
    chat_messages: RwLock<MessageLog>,
}

impl MemStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            therapists: RwLock::new(Table::new()),
            blog_posts: RwLock::new(Table::new()),
            blog_comments: RwLock::new(Table::new()),
            chat_rooms: RwLock::new(Table::new()),
            chat_messages: RwLock::new(MessageLog::new()),
        }
    }

    /// Create a store pre-populated with the sample therapists and rooms.
    pub fn with_seed_data() -> Self {
        let store = Self::new();
        for therapist in seed::therapists() {
            let _ = store.insert_therapist(therapist);
        }
        for room in seed::chat_rooms() {
            let _ = store.insert_chat_room(room);
        }
        debug!(
            therapists = store.therapists.read().len(),
            rooms = store.chat_rooms.read().len(),
            "seeded in-memory store"
        );
        store
    }

    fn insert_therapist(&self, new: NewTherapist) -> Therapist {
        let therapist = Therapist::from_new(TherapistId::new(), new);
        let _ = self
            .therapists
            .write()
            .insert(therapist.id.clone(), therapist.clone());
        therapist
    }

    fn insert_chat_room(&self, new: NewChatRoom) -> ChatRoom {
        let room = ChatRoom {
            id: RoomId::new(),
            name: new.name,
            description: new.description,
            active_users: rand::rng().random_range(ACTIVE_USERS_RANGE),
            is_active: true,
        };
        let _ = self.chat_rooms.write().insert(room.id.clone(), room.clone());
        room
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn therapists(&self) -> Result<Vec<Therapist>> {
        Ok(self.therapists.read().iter().cloned().collect())
    }

    async fn therapist(&self, id: &str) -> Result<Option<Therapist>> {
        Ok(self.therapists.read().get(id).cloned())
    }

    async fn create_therapist(&self, new: NewTherapist) -> Result<Therapist> {
        Ok(self.insert_therapist(new))
    }

    async fn blog_posts(&self) -> Result<Vec<BlogPost>> {
        // Newest-inserted first, then a stable sort keeps that order for equal timestamps.
        let mut posts: Vec<BlogPost> = self.blog_posts.read().iter().rev().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn blog_post(&self, id: &str) -> Result<Option<BlogPost>> {
        Ok(self.blog_posts.read().get(id).cloned())
    }

    async fn create_blog_post(&self, new: NewBlogPost) -> Result<BlogPost> {
        let post = BlogPost {
            id: BlogPostId::new(),
            title: new.title,
            content: new.content,
            category: new.category,
            author_id: new.author_id,
            likes: 0,
            created_at: Utc::now(),
        };
        let _ = self.blog_posts.write().insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn like_blog_post(&self, id: &str) -> Result<Option<BlogPost>> {
        let mut posts = self.blog_posts.write();
        Ok(posts.get_mut(id).map(|post| {
            post.likes += 1;
            post.clone()
        }))
    }

    async fn blog_comments(&self, post_id: &str) -> Result<Vec<BlogComment>> {
        let mut comments: Vec<BlogComment> = self
            .blog_comments
            .read()
            .iter()
            .filter(|c| c.post_id.as_str() == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn create_blog_comment(&self, new: NewBlogComment) -> Result<BlogComment> {
        let comment = BlogComment {
            id: CommentId::new(),
            post_id: new.post_id,
            content: new.content,
            author_id: new.author_id,
            created_at: Utc::now(),
        };
        let _ = self
            .blog_comments
            .write()
            .insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    async fn chat_rooms(&self) -> Result<Vec<ChatRoom>> {
        Ok(self
            .chat_rooms
            .read()
            .iter()
            .filter(|room| room.is_active)
            .cloned()
            .collect())
    }

    async fn chat_room(&self, id: &str) -> Result<Option<ChatRoom>> {
        Ok(self.chat_rooms.read().get(id).cloned())
    }

    async fn create_chat_room(&self, new: NewChatRoom) -> Result<ChatRoom> {
        Ok(self.insert_chat_room(new))
    }

    async fn chat_messages(&self, room_id: &str) -> Result<Vec<ChatMessage>> {
        Ok(self.chat_messages.read().tail(room_id, None))
    }

    async fn recent_chat_messages(&self, room_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        Ok(self.chat_messages.read().tail(room_id, Some(limit)))
    }

    async fn create_chat_message(&self, new: NewChatMessage) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: MessageId::new(),
            room_id: new.room_id,
            content: new.content,
            author_id: new.author_id,
            created_at: Utc::now(),
        };
        self.chat_messages.write().append(message.clone());
        Ok(message)
    }
}
