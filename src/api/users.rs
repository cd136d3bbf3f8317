// SPDX-License-Identifier: MPL-2.0

use crate::api::ApiError;
use crate::app::AppState;
use crate::auth::Session;
use crate::store::{
    NotificationStore, ProfileUpdate, StoreError, SubscriptionStore, UserStore,
};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

#[derive(Deserialize)]
pub struct CheckUsernameParams {
    pub username: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
}

/// GET /api/users: all accounts
pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let users = UserStore::new(&state.db).list_all()?;
    Ok(Json(json!({
        "status": "success",
        "message": "Users retrieved successfully",
        "data": users,
    }))
    .into_response())
}

/// GET /api/users/{username}: profile plus follower count
pub async fn get_by_username(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    if username.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Username must be provided".to_string(),
        ));
    }

    let store = UserStore::new(&state.db);
    let mut user = store.find_by_username(&username).map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("User not found".to_string()),
        other => other.into(),
    })?;
    user.followers_count = Some(store.followers_count(user.id)?);

    Ok(Json(json!({
        "status": "success",
        "message": "User retrieved successfully",
        "data": user,
    }))
    .into_response())
}

/// GET /api/check-username?username=x: availability for the debounced form
pub async fn check_username(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CheckUsernameParams>,
) -> Result<Response, ApiError> {
    Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let username = params
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Username must be provided".to_string()))?;

    let taken = UserStore::new(&state.db).username_exists(username)?;
    Ok(Json(json!({ "status": "success", "isAvailable": !taken })).into_response())
}

/// PATCH /api/edit: update the session user's profile
pub async fn edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<EditProfileRequest>,
) -> Result<Response, ApiError> {
    let session = Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    // A changed username must be unallocated; the UNIQUE constraint backs
    // this check up under races
    if let Some(username) = request
        .username
        .as_deref()
        .filter(|u| *u != session.username.as_str())
    {
        if UserStore::new(&state.db).username_exists(username)? {
            return Err(ApiError::BadRequest("Username is already taken".to_string()));
        }
    }

    let user = UserStore::new(&state.db).update_profile(
        session.user_id,
        &ProfileUpdate {
            name: request.name,
            username: request.username,
            bio: request.bio,
            date_of_birth: request.date_of_birth,
            profile_image: request.profile_image,
            cover_image: request.cover_image,
        },
    )?;

    Ok(Json(json!({
        "status": "success",
        "message": "Profile updated successfully",
        "data": user,
    }))
    .into_response())
}

/// POST /api/users/{username}/follow: follow and notify the target
pub async fn follow(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let session = Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let store = UserStore::new(&state.db);
    let target = store.find_by_username(&username).map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("User not found".to_string()),
        other => other.into(),
    })?;
    if target.id == session.user_id {
        return Err(ApiError::BadRequest("Cannot follow yourself".to_string()));
    }

    let mut me = store.find_by_id(session.user_id)?;
    if !me.following_ids.contains(&target.id) {
        me.following_ids.push(target.id);
        store.set_following(me.id, &me.following_ids)?;

        let body = format!("{} started following you", session.username);
        if let Err(e) = NotificationStore::new(&state.db).notify(target.id, &body) {
            warn!("failed to notify followed user {}: {e}", target.id);
        }
    }

    let me = store.find_by_id(session.user_id)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Followed successfully",
        "data": me,
    }))
    .into_response())
}

/// DELETE /api/users/{username}/follow: unfollow
pub async fn unfollow(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let session = Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let store = UserStore::new(&state.db);
    let target = store.find_by_username(&username).map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("User not found".to_string()),
        other => other.into(),
    })?;

    let mut me = store.find_by_id(session.user_id)?;
    if me.following_ids.contains(&target.id) {
        me.following_ids.retain(|id| *id != target.id);
        store.set_following(me.id, &me.following_ids)?;
    }

    let me = store.find_by_id(session.user_id)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Unfollowed successfully",
        "data": me,
    }))
    .into_response())
}

/// GET /api/subscription: the session user's plan
pub async fn subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let plan = SubscriptionStore::new(&state.db).plan_for(session.user_id)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Subscription retrieved successfully",
        "data": { "plan": plan },
    }))
    .into_response())
}
