//! REST handlers under `/api`.

pub mod blog;
pub mod chat;
pub mod error;
pub mod therapists;

use axum::Router;
use axum::routing::{get, post};

pub use error::ApiError;

use crate::server::AppState;

/// All `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/therapists",
            get(therapists::list).post(therapists::create),
        )
        .route("/api/therapists/{id}", get(therapists::get_one))
        .route("/api/blog-posts", get(blog::list).post(blog::create))
        .route("/api/blog-posts/{id}", get(blog::get_one))
        .route("/api/blog-posts/{id}/like", post(blog::like))
        .route(
            "/api/blog-posts/{id}/comments",
            get(blog::comments).post(blog::create_comment),
        )
        .route("/api/chat-rooms", get(chat::list))
        .route("/api/chat-rooms/{id}", get(chat::get_one))
        .route("/api/chat-rooms/{id}/messages", get(chat::messages))
}
