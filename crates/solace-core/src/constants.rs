//! Protocol-wide limits.

/// Number of persisted messages replayed to a connection when it joins a room.
pub const RECENT_HISTORY_LIMIT: usize = 20;

/// Maximum chat message content length in bytes (8 KB).
pub const MAX_CONTENT_LENGTH: usize = 8_192;

/// Range (inclusive lower, exclusive upper) for the cosmetic active-user count
/// assigned to a newly created chat room.
pub const ACTIVE_USERS_RANGE: std::ops::Range<u32> = 5..25;
