// SPDX-License-Identifier: MPL-2.0

use crate::api::ApiError;
use crate::app::AppState;
use crate::auth::Session;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub query: Option<String>,
}

/// POST /api/chat: proxy one prompt to the text-generation collaborator
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    Session::from_headers(&headers, state.config.auth_secret.as_bytes())?;

    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query is required".to_string()))?;

    // Bound the prompt before it leaves the building
    let prompt: String = query
        .chars()
        .take(state.config.chat_max_prompt_chars)
        .collect();
    let text = state.textgen.generate(&prompt).await?;

    Ok(Json(json!({ "response": text })).into_response())
}
