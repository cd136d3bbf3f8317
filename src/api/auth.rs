// SPDX-License-Identifier: MPL-2.0

use crate::api::ApiError;
use crate::app::AppState;
use crate::auth::{
    AuthError, SessionClaims, clear_session_cookie, create_with_unique_username,
    encode_session_token, generate_base_username, hash_password, session_cookie, verify_password,
};
use crate::config::Config;
use crate::store::{Db, NewUser, StoreError, User, UserStore};
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header::SET_COOKIE};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedRequest {
    pub access_token: String,
}

/// POST /api/auth/register: create an account with credentials
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }

    let hashed = hash_password(&request.password, state.config.bcrypt_cost)?;
    let desired = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| generate_base_username(&request.name, &request.email));

    let user = create_with_unique_username(
        &state.db,
        &NewUser {
            name: request.name.trim().to_string(),
            username: desired,
            email: request.email.trim().to_string(),
            hashed_password: Some(hashed),
            profile_image: None,
            email_verified_at: None,
        },
        state.config.username_max_attempts,
    )?;

    session_response(
        &state.config,
        &user,
        StatusCode::CREATED,
        "User registered successfully",
    )
}

/// POST /api/auth/login: verify credentials and issue a session
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = match UserStore::new(&state.db).find_by_email(request.email.trim()) {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AuthError::InvalidCredentials.into()),
        Err(e) => return Err(e.into()),
    };
    let hashed = user
        .hashed_password
        .as_deref()
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&request.password, hashed)? {
        return Err(ApiError::InvalidCredentials);
    }

    session_response(&state.config, &user, StatusCode::OK, "Logged in successfully")
}

/// POST /api/auth/federated: resolve a provider access token; first login
/// creates the account with an auto-generated unique username
pub async fn federated(
    State(state): State<AppState>,
    Json(request): Json<FederatedRequest>,
) -> Result<Response, ApiError> {
    let profile = state.identity.fetch_profile(&request.access_token).await?;

    let user = match UserStore::new(&state.db).find_by_email(&profile.email) {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            let name = profile
                .name
                .clone()
                .unwrap_or_else(|| profile.email.clone());
            let base = generate_base_username(&name, &profile.email);
            create_with_unique_username(
                &state.db,
                &NewUser {
                    name,
                    username: base,
                    email: profile.email.clone(),
                    hashed_password: None,
                    profile_image: profile.picture.clone(),
                    email_verified_at: profile.email_verified.then(Db::now),
                },
                state.config.username_max_attempts,
            )?
        }
        Err(e) => return Err(e.into()),
    };

    session_response(&state.config, &user, StatusCode::OK, "Logged in successfully")
}

/// POST /api/auth/logout: drop the session cookie
pub async fn logout() -> Response {
    (
        StatusCode::OK,
        [(SET_COOKIE, clear_session_cookie())],
        Json(json!({ "status": "success", "message": "Logged out successfully" })),
    )
        .into_response()
}

/// Issue a signed session token for the user and wrap it in the envelope
/// plus a session cookie
fn session_response(
    config: &Config,
    user: &User,
    status: StatusCode,
    message: &str,
) -> Result<Response, ApiError> {
    let now = Utc::now().timestamp();
    let token = encode_session_token(
        &SessionClaims {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            issued_at: now,
            expires_at: now + config.session_ttl.as_secs() as i64,
        },
        config.auth_secret.as_bytes(),
    )?;

    Ok((
        status,
        [(SET_COOKIE, session_cookie(&token, config.session_ttl))],
        Json(json!({
            "status": "success",
            "message": message,
            "data": user,
            "token": token,
        })),
    )
        .into_response())
}
