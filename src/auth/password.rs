// SPDX-License-Identifier: MPL-2.0

use crate::auth::AuthError;

/// Hash a password with bcrypt at the configured cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check a password against a stored bcrypt hash
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hashed).map_err(|e| AuthError::Hash(e.to_string()))
}
