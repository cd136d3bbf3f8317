// SPDX-License-Identifier: MPL-2.0

use crate::store::types::Plan;
use crate::store::{Db, StoreError};
use rusqlite::params;

/// Store operations for subscription plans. Plan transitions happen in the
/// billing collaborator; this side only reads and mirrors them.
pub struct SubscriptionStore<'a> {
    db: &'a Db,
}

impl<'a> SubscriptionStore<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Plan for a user; accounts without a row are on the free tier
    pub fn plan_for(&self, user_id: i64) -> Result<Plan, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT plan FROM subscriptions WHERE user_id = ?")?;
        let plan = stmt
            .query_row([user_id], |row| row.get::<_, String>(0))
            .map(|raw| Plan::parse(&raw));
        match plan {
            Ok(plan) => Ok(plan),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Plan::Free),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    /// Mirror a plan written by the billing collaborator (upserts)
    #[allow(dead_code)]
    pub fn set_plan(&self, user_id: i64, plan: Plan) -> Result<(), StoreError> {
        let conn = self.db.conn();
        let now = Db::now();
        conn.execute(
            r#"
            INSERT INTO subscriptions (user_id, plan, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                plan = excluded.plan,
                updated_at = excluded.updated_at
            "#,
            params![user_id, plan.as_str(), now],
        )?;
        Ok(())
    }
}
