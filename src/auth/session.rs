// SPDX-License-Identifier: MPL-2.0

use crate::auth::token::decode_session_token;
use crate::auth::AuthError;
use crate::config::SESSION_COOKIE;
use axum::http::HeaderMap;
use chrono::Utc;
use std::time::Duration;

/// Caller identity derived from a verified session token
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub username: String,
}

impl Session {
    /// Re-derive the caller from the request headers. Accepts the session
    /// cookie or an `Authorization: Bearer` header; anything else is
    /// unauthenticated.
    pub fn from_headers(headers: &HeaderMap, secret: &[u8]) -> Result<Session, AuthError> {
        let token = bearer_token(headers)
            .or_else(|| cookie_token(headers))
            .ok_or(AuthError::NotAuthenticated)?;
        let claims = decode_session_token(&token, secret, Utc::now().timestamp())?;
        Ok(Session {
            user_id: claims.user_id,
            email: claims.email,
            name: claims.name,
            username: claims.username,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// `Set-Cookie` value installing the session token
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    )
}

/// `Set-Cookie` value dropping the session
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
