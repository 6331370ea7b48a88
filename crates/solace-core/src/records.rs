//! Flat records and their insert payloads.
//!
//! Records are what the store hands out and what goes over the wire (camelCase
//! JSON). `New*` payloads carry the caller-supplied fields; the store assigns
//! identifiers, timestamps and counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::ids::{AuthorId, BlogPostId, CommentId, MessageId, RoomId, TherapistId};
use crate::validation::{require_non_empty, validate_max_length};

// ─────────────────────────────────────────────────────────────────────────────
// Therapists
// ─────────────────────────────────────────────────────────────────────────────

/// A therapist directory entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Therapist {
    /// Unique identifier.
    pub id: TherapistId,
    /// Display name.
    pub name: String,
    /// Primary specialty, e.g. "Anxiety & Depression Specialist".
    pub specialty: String,
    /// Highest degree.
    pub education: String,
    /// Free-form experience summary.
    pub experience: String,
    /// Free-form rating summary, e.g. "4.9 (127 reviews)".
    pub rating: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Longer biography.
    pub bio: Option<String>,
    /// Profile image URL.
    pub image_url: Option<String>,
}

/// Fields required to create a [`Therapist`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTherapist {
    /// Display name.
    pub name: String,
    /// Primary specialty.
    pub specialty: String,
    /// Highest degree.
    pub education: String,
    /// Experience summary.
    pub experience: String,
    /// Rating summary.
    pub rating: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Profile image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Therapist {
    /// Materialize a therapist from its insert payload.
    pub fn from_new(id: TherapistId, new: NewTherapist) -> Self {
        Self {
            id,
            name: new.name,
            specialty: new.specialty,
            education: new.education,
            experience: new.experience,
            rating: new.rating,
            email: new.email,
            phone: new.phone,
            bio: new.bio,
            image_url: new.image_url,
        }
    }

    /// Case-insensitive substring match against name or specialty.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.specialty.to_lowercase().contains(&term)
    }

    /// Case-insensitive substring match against specialty.
    pub fn matches_specialty(&self, specialty: &str) -> bool {
        self.specialty
            .to_lowercase()
            .contains(&specialty.to_lowercase())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blog posts and comments
// ─────────────────────────────────────────────────────────────────────────────

/// An anonymous community blog post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Unique identifier.
    pub id: BlogPostId,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Category label, e.g. "general" or "anxiety".
    pub category: String,
    /// Anonymous author identity.
    pub author_id: AuthorId,
    /// Like counter; only ever incremented.
    pub likes: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`BlogPost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBlogPost {
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Category label.
    pub category: String,
    /// Anonymous author identity.
    pub author_id: AuthorId,
}

/// A comment under a blog post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogComment {
    /// Unique identifier.
    pub id: CommentId,
    /// Post this comment belongs to (not checked for existence).
    pub post_id: BlogPostId,
    /// Body text.
    pub content: String,
    /// Anonymous author identity.
    pub author_id: AuthorId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`BlogComment`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBlogComment {
    /// Post being commented on.
    pub post_id: BlogPostId,
    /// Body text.
    pub content: String,
    /// Anonymous author identity.
    pub author_id: AuthorId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// A chat room.
///
/// `active_users` is a display-only figure assigned at creation and never
/// reconciled with live connections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    /// Unique identifier.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Cosmetic active-user count.
    pub active_users: u32,
    /// Whether the room is listed.
    pub is_active: bool,
}

/// Fields required to create a [`ChatRoom`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChatRoom {
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
}

impl NewChatRoom {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A persisted chat message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique identifier.
    pub id: MessageId,
    /// Room the message was sent to.
    pub room_id: RoomId,
    /// Message text.
    pub content: String,
    /// Sender's anonymous identity.
    pub author_id: AuthorId,
    /// Arrival time.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`ChatMessage`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewChatMessage {
    /// Target room.
    pub room_id: RoomId,
    /// Message text.
    pub content: String,
    /// Sender's anonymous identity.
    pub author_id: AuthorId,
}

impl NewChatMessage {
    /// Check the minimal message schema: non-empty room and content, content
    /// within `max_content_length` bytes.
    pub fn validate(&self, max_content_length: usize) -> Result<(), ValidationError> {
        require_non_empty(&self.room_id, "roomId")?;
        require_non_empty(&self.content, "content")?;
        validate_max_length(&self.content, "content", max_content_length)
    }
}
