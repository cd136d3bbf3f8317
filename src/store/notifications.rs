// SPDX-License-Identifier: MPL-2.0

use crate::store::types::{Notification, UserSummary};
use crate::store::{Db, StoreError};
use rusqlite::params;

/// Store operations for notifications
pub struct NotificationStore<'a> {
    db: &'a Db,
}

impl<'a> NotificationStore<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Insert a notification for the recipient and raise their flag,
    /// in one transaction
    pub fn notify(&self, recipient_id: i64, body: &str) -> Result<(), StoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;
        let now = Db::now();

        let changed = tx.execute(
            "UPDATE users SET has_notification = 1, updated_at = ?1 WHERE id = ?2",
            params![now, recipient_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        tx.execute(
            "INSERT INTO notifications (body, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![body, recipient_id, now],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Fetch the recipient's notifications newest-first and clear their flag.
    /// The read and the flag write share one transaction so concurrent
    /// readers never observe a half-applied state.
    pub fn list_and_clear(&self, recipient_id: i64) -> Result<Vec<Notification>, StoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let notifications = {
            let mut stmt = tx.prepare(
                r#"
                SELECT n.id, n.body, n.user_id, n.created_at,
                       u.id, u.username, u.name, u.profile_image
                FROM notifications n
                JOIN users u ON u.id = n.user_id
                WHERE n.user_id = ?
                ORDER BY n.created_at DESC, n.id DESC
                "#,
            )?;
            let rows = stmt.query_map([recipient_id], |row| {
                Ok(Notification {
                    id: row.get(0)?,
                    body: row.get(1)?,
                    user_id: row.get(2)?,
                    created_at: row.get(3)?,
                    user: UserSummary {
                        id: row.get(4)?,
                        username: row.get(5)?,
                        name: row.get(6)?,
                        profile_image: row.get(7)?,
                    },
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        tx.execute(
            "UPDATE users SET has_notification = 0, updated_at = ?1 WHERE id = ?2",
            params![Db::now(), recipient_id],
        )?;
        tx.commit()?;

        Ok(notifications)
    }
}
