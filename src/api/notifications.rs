// SPDX-License-Identifier: MPL-2.0

use crate::api::ApiError;
use crate::app::AppState;
use crate::auth::Session;
use crate::store::NotificationStore;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// GET /api/notifications: the session user's notifications newest-first.
/// Viewing clears the user's notification flag; the rows stay.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let notifications = NotificationStore::new(&state.db).list_and_clear(session.user_id)?;
    Ok(Json(json!({
        "status": "success",
        "message": "Notifications fetched successfully",
        "data": notifications,
    }))
    .into_response())
}
