// SPDX-License-Identifier: MPL-2.0

mod password;
mod session;
mod token;
mod username;

pub use password::{hash_password, verify_password};
pub use session::{Session, clear_session_cookie, session_cookie};
pub use token::{SessionClaims, decode_session_token, encode_session_token};
pub use username::{create_with_unique_username, generate_base_username};

use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    #[error("session expired")]
    Expired,
    #[error("unable to generate a unique username after {0} attempts")]
    UsernameExhausted(u32),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
