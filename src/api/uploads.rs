// SPDX-License-Identifier: MPL-2.0

use crate::api::ApiError;
use crate::app::AppState;
use crate::auth::Session;
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// POST /api/uploads: hand a multipart file to the CDN and return its
/// public URL
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let uploaded_url = state
            .media
            .upload(&file_name, content_type.as_deref(), bytes.to_vec())
            .await?;

        return Ok(Json(json!({
            "status": "success",
            "message": "Uploaded successfully",
            "uploadedUrl": uploaded_url,
        }))
        .into_response());
    }

    Err(ApiError::BadRequest("File is required".to_string()))
}
