// SPDX-License-Identifier: MPL-2.0

use crate::auth::AuthError;
use crate::store::{Db, NewUser, StoreError, User, UserStore};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-z0-9]+").expect("valid regex"));

/// Derive a username stem from a display name, falling back to the email
/// local part, falling back to a fixed stem
pub fn generate_base_username(name: &str, email: &str) -> String {
    let from_name = slugify(name);
    if !from_name.is_empty() {
        return from_name;
    }
    let local_part = email.split('@').next().unwrap_or_default();
    let from_email = slugify(local_part);
    if !from_email.is_empty() {
        return from_email;
    }
    "user".to_string()
}

fn slugify(raw: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(&raw.to_lowercase(), "")
        .to_string()
}

/// Create the account under a globally unique username derived from
/// `new.username`. On collision a random 6-digit suffix is appended and the
/// check is repeated, up to `max_attempts` times; past that the allocation
/// fails. The username column is UNIQUE, so a concurrent registration that
/// slips between check and insert surfaces as `UsernameTaken` and is charged
/// against the same attempt budget.
pub fn create_with_unique_username(
    db: &Db,
    new: &NewUser,
    max_attempts: u32,
) -> Result<User, AuthError> {
    let users = UserStore::new(db);
    let base = new.username.clone();
    let mut candidate = base.clone();
    let mut attempts = 0;

    loop {
        if !users.username_exists(&candidate)? {
            let result = users.create(&NewUser {
                username: candidate.clone(),
                ..new.clone()
            });
            match result {
                Ok(user) => return Ok(user),
                // Lost the race to a concurrent registration; one more collision
                Err(StoreError::UsernameTaken) => {}
                Err(e) => return Err(e.into()),
            }
        }
        attempts += 1;
        if attempts > max_attempts {
            return Err(AuthError::UsernameExhausted(max_attempts));
        }
        candidate = format!("{base}{}", random_suffix());
    }
}

fn random_suffix() -> u32 {
    rand::thread_rng().gen_range(100_000..1_000_000)
}
