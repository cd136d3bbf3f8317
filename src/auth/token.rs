// SPDX-License-Identifier: MPL-2.0

use crate::auth::AuthError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION_V1: &str = "v1";
const MAX_TOKEN_LEN: usize = 4096;

/// Identity carried by a session token. Ownership of created content is
/// always attributed from these claims, never from request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub username: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Encode claims as `v1.<payload>.<sig>` with an HMAC-SHA256 signature
/// over the base64url payload part
pub fn encode_session_token(claims: &SessionClaims, secret: &[u8]) -> Result<String, AuthError> {
    let payload_bytes =
        serde_json::to_vec(claims).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let payload_part = URL_SAFE_NO_PAD.encode(payload_bytes);
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    mac.update(payload_part.as_bytes());
    let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{TOKEN_VERSION_V1}.{payload_part}.{sig_part}"))
}

/// Verify and decode a session token. Rejects oversized tokens, unknown
/// versions, bad signatures, and anything expired at `now` (unix seconds).
pub fn decode_session_token(
    token: &str,
    secret: &[u8],
    now: i64,
) -> Result<SessionClaims, AuthError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(AuthError::InvalidToken("token exceeds max length".into()));
    }

    let mut parts = token.splitn(3, '.');
    let version = parts.next().unwrap_or_default();
    let payload_part = parts
        .next()
        .ok_or_else(|| AuthError::InvalidToken("missing payload".into()))?;
    let sig_part = parts
        .next()
        .ok_or_else(|| AuthError::InvalidToken("missing signature".into()))?;
    if version != TOKEN_VERSION_V1 {
        return Err(AuthError::InvalidToken(format!(
            "unsupported version {version}"
        )));
    }

    let sig = URL_SAFE_NO_PAD
        .decode(sig_part)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    mac.update(payload_part.as_bytes());
    mac.verify_slice(&sig)
        .map_err(|_| AuthError::InvalidToken("signature mismatch".into()))?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_part)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let claims: SessionClaims =
        serde_json::from_slice(&payload).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    if claims.expires_at <= now {
        return Err(AuthError::Expired);
    }
    Ok(claims)
}
