//! Connection registry: an owned table of live sockets plus a room index.
//!
//! Owned exclusively by the relay task, so nothing here is synchronized.
//! Every connection is in at most one room. Members of a room iterate in
//! registration order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use solace_core::{ConnectionId, RoomId};

use super::connection::ClientConnection;

struct Entry {
    seq: u64,
    connection: Arc<ClientConnection>,
    room: Option<RoomId>,
}

/// Live connections and their current rooms.
#[derive(Default)]
pub struct ConnectionRegistry {
    next_seq: u64,
    entries: HashMap<ConnectionId, Entry>,
    rooms: HashMap<RoomId, BTreeMap<u64, ConnectionId>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection with no room. Returns `false` if its id is already
    /// registered.
    pub fn register(&mut self, connection: Arc<ClientConnection>) -> bool {
        if self.entries.contains_key(&connection.id) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let _ = self.entries.insert(
            connection.id.clone(),
            Entry {
                seq,
                connection,
                room: None,
            },
        );
        true
    }

    /// Remove a connection and its room membership.
    pub fn remove(&mut self, id: &str) -> Option<Arc<ClientConnection>> {
        let entry = self.entries.remove(id)?;
        if let Some(room) = &entry.room {
            self.leave_index(room, entry.seq);
        }
        Some(entry.connection)
    }

    /// Make `room` the connection's current room, leaving any previous one.
    ///
    /// Returns `None` if the connection is unknown, otherwise the room it
    /// left (if any).
    pub fn join(&mut self, id: &str, room: RoomId) -> Option<Option<RoomId>> {
        let entry = self.entries.get_mut(id)?;
        if entry.room.as_ref() == Some(&room) {
            return Some(None);
        }
        let seq = entry.seq;
        let previous = entry.room.replace(room.clone());
        let _ = self
            .rooms
            .entry(room)
            .or_default()
            .insert(seq, entry.connection.id.clone());
        if let Some(prev) = &previous {
            self.leave_index(prev, seq);
        }
        Some(previous)
    }

    fn leave_index(&mut self, room: &RoomId, seq: u64) {
        if let Some(members) = self.rooms.get_mut(room) {
            let _ = members.remove(&seq);
            if members.is_empty() {
                let _ = self.rooms.remove(room);
            }
        }
    }

    /// Look up a connection.
    pub fn get(&self, id: &str) -> Option<&Arc<ClientConnection>> {
        self.entries.get(id).map(|e| &e.connection)
    }

    /// Connections currently in `room`, in registration order.
    pub fn members<'a>(&'a self, room: &str) -> impl Iterator<Item = &'a Arc<ClientConnection>> {
        self.rooms
            .get(room)
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter_map(|id| self.get(id))
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn conn(id: &str) -> Arc<ClientConnection> {
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(ClientConnection::with_ids(
            ConnectionId::from(id),
            solace_core::AuthorId::new(),
            tx,
        ))
    }

    fn member_ids(registry: &ConnectionRegistry, room: &str) -> Vec<String> {
        registry
            .members(room)
            .map(|c| c.id.to_string())
            .collect()
    }

    #[test]
    fn register_and_remove() {
        let mut registry = ConnectionRegistry::new();
        assert!(registry.register(conn("a")));
        assert!(!registry.register(conn("a")));
        assert_eq!(registry.len(), 1);
        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn join_unknown_connection() {
        let mut registry = ConnectionRegistry::new();
        assert!(registry.join("ghost", RoomId::from("r")).is_none());
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn members_in_registration_order() {
        let mut registry = ConnectionRegistry::new();
        for id in ["z", "a", "m"] {
            let _ = registry.register(conn(id));
        }
        // Join order differs from registration order.
        for id in ["m", "z", "a"] {
            let _ = registry.join(id, RoomId::from("r"));
        }
        assert_eq!(member_ids(&registry, "r"), ["z", "a", "m"]);
    }

    #[test]
    fn switching_rooms_leaves_previous() {
        let mut registry = ConnectionRegistry::new();
        let _ = registry.register(conn("a"));
        assert_eq!(registry.join("a", RoomId::from("one")), Some(None));
        assert_eq!(
            registry.join("a", RoomId::from("two")),
            Some(Some(RoomId::from("one")))
        );
        assert!(member_ids(&registry, "one").is_empty());
        assert_eq!(member_ids(&registry, "two"), ["a"]);
        assert_eq!(registry.room_count(), 1);
    }

    #[test]
    fn rejoining_same_room_is_noop() {
        let mut registry = ConnectionRegistry::new();
        let _ = registry.register(conn("a"));
        let _ = registry.join("a", RoomId::from("r"));
        assert_eq!(registry.join("a", RoomId::from("r")), Some(None));
        assert_eq!(member_ids(&registry, "r"), ["a"]);
    }

    #[test]
    fn remove_clears_room_index() {
        let mut registry = ConnectionRegistry::new();
        let _ = registry.register(conn("a"));
        let _ = registry.register(conn("b"));
        let _ = registry.join("a", RoomId::from("r"));
        let _ = registry.join("b", RoomId::from("r"));

        let _ = registry.remove("a");
        assert_eq!(member_ids(&registry, "r"), ["b"]);
        let _ = registry.remove("b");
        assert_eq!(registry.room_count(), 0);
        assert!(member_ids(&registry, "r").is_empty());
    }

    #[test]
    fn unjoined_connection_has_no_room() {
        let mut registry = ConnectionRegistry::new();
        let _ = registry.register(conn("a"));
        assert_eq!(registry.room_count(), 0);
        assert!(registry.get("a").is_some());
    }
}
