// SPDX-License-Identifier: MPL-2.0

use crate::store::types::{Plan, SubscriptionInfo, User};
use crate::store::{Db, StoreError};
use rusqlite::params;

/// Fields required to insert an account row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub hashed_password: Option<String>,
    pub profile_image: Option<String>,
    pub email_verified_at: Option<String>,
}

/// Partial profile update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
}

const USER_SELECT: &str = r#"
    SELECT
        u.id, u.name, u.username, u.email, u.hashed_password,
        u.bio, u.date_of_birth, u.email_verified_at,
        u.profile_image, u.cover_image, u.following_ids,
        u.has_notification, u.created_at, u.updated_at,
        s.plan
    FROM users u
    LEFT JOIN subscriptions s ON s.user_id = u.id
"#;

/// Store operations for accounts
pub struct UserStore<'a> {
    db: &'a Db,
}

impl<'a> UserStore<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Insert a new account. Unique-constraint violations surface as
    /// `UsernameTaken`/`EmailTaken` so callers can retry allocation.
    pub fn create(&self, new: &NewUser) -> Result<User, StoreError> {
        let conn = self.db.conn();
        let now = Db::now();

        conn.execute(
            r#"
            INSERT INTO users (
                name, username, email, hashed_password,
                profile_image, email_verified_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                new.name,
                new.username,
                new.email,
                new.hashed_password,
                new.profile_image,
                new.email_verified_at,
                now,
            ],
        )
        .map_err(map_unique_violation)?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.find_by_id(id)
    }

    /// Get account by id
    pub fn find_by_id(&self, id: i64) -> Result<User, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!("{USER_SELECT} WHERE u.id = ?"))?;
        stmt.query_row([id], row_to_user).map_err(not_found)
    }

    /// Get account by email
    pub fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!("{USER_SELECT} WHERE u.email = ?"))?;
        stmt.query_row([email], row_to_user).map_err(not_found)
    }

    /// Get account by username
    pub fn find_by_username(&self, username: &str) -> Result<User, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!("{USER_SELECT} WHERE u.username = ?"))?;
        stmt.query_row([username], row_to_user).map_err(not_found)
    }

    /// Check whether a username is already allocated
    pub fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT 1 FROM users WHERE username = ?")?;
        let exists = stmt.exists([username])?;
        Ok(exists)
    }

    /// All accounts, newest first
    pub fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "{USER_SELECT} ORDER BY u.created_at DESC, u.id DESC"
        ))?;
        let rows = stmt.query_map([], row_to_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    /// Apply a partial profile update and return the fresh row
    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<User, StoreError> {
        let conn = self.db.conn();
        let now = Db::now();

        let changed = conn
            .execute(
                r#"
                UPDATE users SET
                    name = COALESCE(?1, name),
                    username = COALESCE(?2, username),
                    bio = COALESCE(?3, bio),
                    date_of_birth = COALESCE(?4, date_of_birth),
                    profile_image = COALESCE(?5, profile_image),
                    cover_image = COALESCE(?6, cover_image),
                    updated_at = ?7
                WHERE id = ?8
                "#,
                params![
                    update.name,
                    update.username,
                    update.bio,
                    update.date_of_birth,
                    update.profile_image,
                    update.cover_image,
                    now,
                    id,
                ],
            )
            .map_err(map_unique_violation)?;

        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        drop(conn);
        self.find_by_id(id)
    }

    /// Replace the follow list
    pub fn set_following(&self, id: i64, following_ids: &[i64]) -> Result<(), StoreError> {
        let conn = self.db.conn();
        let json = serde_json::to_string(following_ids)?;
        let changed = conn.execute(
            "UPDATE users SET following_ids = ?1, updated_at = ?2 WHERE id = ?3",
            params![json, Db::now(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Number of accounts whose follow list contains the given id
    pub fn followers_count(&self, id: i64) -> Result<i64, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT following_ids FROM users")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut count = 0;
        for raw in rows {
            let ids: Vec<i64> = serde_json::from_str(&raw?).unwrap_or_default();
            if ids.contains(&id) {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Convert a joined database row to a User
pub(crate) fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let following_json: String = row.get(10)?;
    let following_ids: Vec<i64> = serde_json::from_str(&following_json).unwrap_or_default();
    let plan: Option<String> = row.get(14)?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        hashed_password: row.get(4)?,
        bio: row.get(5)?,
        date_of_birth: row.get(6)?,
        email_verified_at: row.get(7)?,
        profile_image: row.get(8)?,
        cover_image: row.get(9)?,
        following_ids,
        has_notification: row.get::<_, i64>(11)? != 0,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        subscription: plan.map(|p| SubscriptionInfo {
            plan: Plan::parse(&p),
        }),
        followers_count: None,
    })
}

fn not_found(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Database(other),
    }
}

fn map_unique_violation(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref err, Some(ref msg)) = e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("users.username") {
                return StoreError::UsernameTaken;
            }
            if msg.contains("users.email") {
                return StoreError::EmailTaken;
            }
        }
    }
    StoreError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(username: &str, email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            hashed_password: None,
            profile_image: None,
            email_verified_at: None,
        }
    }

    #[test]
    fn create_and_fetch_roundtrip() {
        let db = Db::open_in_memory().expect("open db");
        let store = UserStore::new(&db);

        let user = store
            .create(&test_user("ada", "ada@example.com"))
            .expect("create");
        assert_eq!(user.username, "ada");
        assert!(!user.has_notification);
        assert!(user.subscription.is_none());

        let by_email = store.find_by_email("ada@example.com").expect("by email");
        assert_eq!(by_email.id, user.id);
        assert!(store.username_exists("ada").expect("exists"));
        assert!(!store.username_exists("grace").expect("exists"));
    }

    #[test]
    fn duplicate_username_is_reported_as_taken() {
        let db = Db::open_in_memory().expect("open db");
        let store = UserStore::new(&db);

        store
            .create(&test_user("ada", "ada@example.com"))
            .expect("create");
        let err = store
            .create(&test_user("ada", "other@example.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken));

        let err = store
            .create(&test_user("ada2", "ada@example.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[test]
    fn followers_count_scans_follow_lists() {
        let db = Db::open_in_memory().expect("open db");
        let store = UserStore::new(&db);

        let a = store.create(&test_user("a", "a@example.com")).expect("a");
        let b = store.create(&test_user("b", "b@example.com")).expect("b");
        let c = store.create(&test_user("c", "c@example.com")).expect("c");

        store.set_following(b.id, &[a.id]).expect("b follows a");
        store.set_following(c.id, &[a.id, b.id]).expect("c follows");

        assert_eq!(store.followers_count(a.id).expect("count"), 2);
        assert_eq!(store.followers_count(b.id).expect("count"), 1);
        assert_eq!(store.followers_count(c.id).expect("count"), 0);
    }

    #[test]
    fn profile_update_keeps_unset_fields() {
        let db = Db::open_in_memory().expect("open db");
        let store = UserStore::new(&db);

        let user = store
            .create(&test_user("ada", "ada@example.com"))
            .expect("create");
        let updated = store
            .update_profile(
                user.id,
                &ProfileUpdate {
                    bio: Some("mathematician".to_string()),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(updated.bio.as_deref(), Some("mathematician"));
        assert_eq!(updated.username, "ada");
        assert_eq!(updated.name, "Test User");
    }
}
