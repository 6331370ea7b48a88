//! `/api/chat-rooms`

use axum::Json;
use axum::extract::{Path, State};
use solace_core::{ChatMessage, ChatRoom};

use super::error::ApiError;
use crate::server::AppState;

/// GET /api/chat-rooms
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ChatRoom>>, ApiError> {
    let rooms = state
        .storage
        .chat_rooms()
        .await
        .map_err(ApiError::internal("Failed to fetch chat rooms"))?;
    Ok(Json(rooms))
}

/// GET /api/chat-rooms/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChatRoom>, ApiError> {
    state
        .storage
        .chat_room(&id)
        .await
        .map_err(ApiError::internal("Failed to fetch chat room"))?
        .map(Json)
        .ok_or(ApiError::NotFound {
            message: "Chat room not found",
        })
}

/// GET /api/chat-rooms/{id}/messages
///
/// Full room history in arrival order. Unknown rooms yield an empty list.
pub async fn messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state
        .storage
        .chat_messages(&room_id)
        .await
        .map_err(ApiError::internal("Failed to fetch messages"))?;
    Ok(Json(messages))
}
