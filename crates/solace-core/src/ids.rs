//! Branded ID newtypes for type safety.
//!
//! Every entity has a distinct ID type implemented as a newtype wrapper
//! around `String`. Foreign keys (a comment's post, a message's room) use the
//! same types but are never checked for existence.
//!
//! All IDs are UUID v7 (time-ordered) generated via [`uuid::Uuid::now_v7`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUID v7 string (time-ordered).
fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a therapist profile.
    TherapistId
}

branded_id! {
    /// Unique identifier for a community blog post.
    BlogPostId
}

branded_id! {
    /// Unique identifier for a comment on a blog post.
    CommentId
}

branded_id! {
    /// Unique identifier for a chat room.
    RoomId
}

branded_id! {
    /// Unique identifier for a chat message.
    MessageId
}

branded_id! {
    /// Anonymous identity attached to posts, comments and chat messages.
    ///
    /// Generated per request (REST) or per socket (chat); never backed by an
    /// account.
    AuthorId
}

branded_id! {
    /// Unique identifier for a live WebSocket connection.
    ConnectionId
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    #[test]
    fn new_ids_are_unique() {
        let a = RoomId::new();
        let b = RoomId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn new_id_is_uuid() {
        let id = TherapistId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn ids_from_arbitrary_strings() {
        let id = BlogPostId::from("not-a-uuid");
        assert_eq!(id.as_str(), "not-a-uuid");
        assert_eq!(String::from(id), "not-a-uuid");
    }

    #[test]
    fn serde_is_transparent() {
        let id = MessageId::from("m1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"m1\"");
        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_matches_inner() {
        let id = AuthorId::from("anon");
        assert_eq!(id.to_string(), "anon");
        assert_eq!(&*id, "anon");
    }

    #[test]
    fn ids_are_ordered_sets() {
        let set: BTreeSet<ConnectionId> = ["b", "a", "c"].into_iter().map(ConnectionId::from).collect();
        let order: Vec<&str> = set.iter().map(ConnectionId::as_str).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn lookup_by_str_through_borrow() {
        let mut map = HashMap::new();
        let _ = map.insert(RoomId::from("general"), 1);
        assert_eq!(map.get("general"), Some(&1));
    }

    #[test]
    fn default_generates_fresh_id() {
        let a = ConnectionId::default();
        let b = ConnectionId::default();
        assert_ne!(a, b);
    }
}
