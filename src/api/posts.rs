// SPDX-License-Identifier: MPL-2.0

use crate::api::ApiError;
use crate::app::AppState;
use crate::auth::Session;
use crate::store::{CommentStore, NewComment, NewPost, NotificationStore, PostStore, StoreError};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub body: String,
    pub post_image: Option<String>,
    pub post_video: Option<String>,
    pub post_gif: Option<String>,
}

#[derive(Deserialize)]
pub struct ListPostsParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub body: String,
    pub comment_image: Option<String>,
    pub comment_video: Option<String>,
    pub comment_gif: Option<String>,
}

/// POST /api/posts: create a post owned by the session user
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreatePostRequest>,
) -> Result<Response, ApiError> {
    let session = Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    if request.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Post content required".to_string()));
    }

    let post = PostStore::new(&state.db).create(
        session.user_id,
        &NewPost {
            body: request.body,
            post_image: request.post_image,
            post_video: request.post_video,
            post_gif: request.post_gif,
        },
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Post created successfully",
            "data": post,
        })),
    )
        .into_response())
}

/// GET /api/posts[?userId=N]: newest-first, with authors and comments
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListPostsParams>,
) -> Result<Response, ApiError> {
    Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let user_id = match params.user_id.as_deref() {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::BadRequest("userId must be a number".to_string()))?,
        ),
        None => None,
    };

    let posts = PostStore::new(&state.db).list(user_id)?;
    Ok(Json(json!({ "status": "success", "posts": posts })).into_response())
}

/// GET /api/posts/{postId}: one post with author and comments
pub async fn get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
) -> Result<Response, ApiError> {
    Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let post_id: i64 = post_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Post Id required".to_string()))?;

    let post = PostStore::new(&state.db).get(post_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("Post not found".to_string()),
        other => other.into(),
    })?;

    Ok(Json(json!({ "status": "success", "post": post })).into_response())
}

/// POST /api/posts/{postId}/comments: comment and notify the post owner
pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Response, ApiError> {
    let session = Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let post_id: i64 = post_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Post Id required".to_string()))?;
    if request.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Comment content required".to_string()));
    }

    let posts = PostStore::new(&state.db);
    let owner_id = posts.owner_id(post_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("Post not found".to_string()),
        other => other.into(),
    })?;

    let comment = CommentStore::new(&state.db).create(
        session.user_id,
        post_id,
        &NewComment {
            body: request.body,
            comment_image: request.comment_image,
            comment_video: request.comment_video,
            comment_gif: request.comment_gif,
        },
    )?;

    // Self-comments do not notify
    if owner_id != session.user_id {
        let body = format!("{} commented on your post", session.username);
        if let Err(e) = NotificationStore::new(&state.db).notify(owner_id, &body) {
            warn!("failed to notify post owner {owner_id}: {e}");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Comment created successfully",
            "data": comment,
        })),
    )
        .into_response())
}
