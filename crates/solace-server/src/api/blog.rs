//! `/api/blog-posts` and comments.
//!
//! Authors are anonymous: every post and comment gets a freshly generated
//! [`AuthorId`]; nothing in the body can choose it.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use solace_core::{AuthorId, BlogComment, BlogPost, BlogPostId, NewBlogComment, NewBlogPost};

use super::error::ApiError;
use crate::server::AppState;

/// Body of `POST /api/blog-posts`.
#[derive(Debug, Deserialize)]
pub struct CreateBlogPost {
    title: String,
    content: String,
    category: String,
}

/// Body of `POST /api/blog-posts/{id}/comments`.
#[derive(Debug, Deserialize)]
pub struct CreateBlogComment {
    content: String,
}

/// GET /api/blog-posts
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let posts = state
        .storage
        .blog_posts()
        .await
        .map_err(ApiError::internal("Failed to fetch blog posts"))?;
    Ok(Json(posts))
}

/// GET /api/blog-posts/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    state
        .storage
        .blog_post(&id)
        .await
        .map_err(ApiError::internal("Failed to fetch blog post"))?
        .map(Json)
        .ok_or(ApiError::NotFound {
            message: "Blog post not found",
        })
}

/// POST /api/blog-posts
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateBlogPost>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let Json(body) = body.map_err(ApiError::invalid("Invalid blog post data"))?;
    let post = state
        .storage
        .create_blog_post(NewBlogPost {
            title: body.title,
            content: body.content,
            category: body.category,
            author_id: AuthorId::new(),
        })
        .await
        .map_err(ApiError::internal("Failed to create blog post"))?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// POST /api/blog-posts/{id}/like
pub async fn like(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    state
        .storage
        .like_blog_post(&id)
        .await
        .map_err(ApiError::internal("Failed to like post"))?
        .map(Json)
        .ok_or(ApiError::NotFound {
            message: "Blog post not found",
        })
}

/// GET /api/blog-posts/{id}/comments
pub async fn comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<BlogComment>>, ApiError> {
    let comments = state
        .storage
        .blog_comments(&post_id)
        .await
        .map_err(ApiError::internal("Failed to fetch comments"))?;
    Ok(Json(comments))
}

/// POST /api/blog-posts/{id}/comments
///
/// The post id is not checked; comments may reference any id.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    body: Result<Json<CreateBlogComment>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogComment>), ApiError> {
    let Json(body) = body.map_err(ApiError::invalid("Invalid comment data"))?;
    let comment = state
        .storage
        .create_blog_comment(NewBlogComment {
            post_id: BlogPostId::from(post_id),
            content: body.content,
            author_id: AuthorId::new(),
        })
        .await
        .map_err(ApiError::internal("Failed to create comment"))?;
    Ok((StatusCode::CREATED, Json(comment)))
}
