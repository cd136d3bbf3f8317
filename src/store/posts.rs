// SPDX-License-Identifier: MPL-2.0

use crate::store::types::{Comment, Post};
use crate::store::{Db, StoreError};
use rusqlite::params;
use std::collections::HashMap;

/// Fields required to insert a post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub body: String,
    pub post_image: Option<String>,
    pub post_video: Option<String>,
    pub post_gif: Option<String>,
}

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.body, p.post_image, p.post_video, p.post_gif,
        p.user_id, p.created_at, p.updated_at,
        u.id, u.name, u.username, u.email, u.hashed_password,
        u.bio, u.date_of_birth, u.email_verified_at,
        u.profile_image, u.cover_image, u.following_ids,
        u.has_notification, u.created_at, u.updated_at,
        s.plan
    FROM posts p
    JOIN users u ON u.id = p.user_id
    LEFT JOIN subscriptions s ON s.user_id = u.id
"#;

/// Store operations for posts
pub struct PostStore<'a> {
    db: &'a Db,
}

impl<'a> PostStore<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Insert a post owned by the given user, returning the bare row
    pub fn create(&self, user_id: i64, new: &NewPost) -> Result<Post, StoreError> {
        let conn = self.db.conn();
        let now = Db::now();

        conn.execute(
            r#"
            INSERT INTO posts (body, post_image, post_video, post_gif, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                new.body,
                new.post_image,
                new.post_video,
                new.post_gif,
                user_id,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, body, post_image, post_video, post_gif, user_id, created_at, updated_at
            FROM posts WHERE id = ?
            "#,
        )?;
        let post = stmt.query_row([id], row_to_bare_post)?;
        Ok(post)
    }

    /// Owner of a post, for notification routing
    pub fn owner_id(&self, id: i64) -> Result<i64, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT user_id FROM posts WHERE id = ?")?;
        stmt.query_row([id], |row| row.get(0)).map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Database(other),
        })
    }

    /// List posts newest-first, each with its author and comments.
    /// With `user_id`, only that author's posts.
    pub fn list(&self, user_id: Option<i64>) -> Result<Vec<Post>, StoreError> {
        let conn = self.db.conn();

        let mut posts = match user_id {
            Some(uid) => {
                let mut stmt = conn
                    .prepare(&format!(
                        "{POST_SELECT} WHERE p.user_id = ? ORDER BY p.created_at DESC, p.id DESC"
                    ))?;
                let rows = stmt.query_map([uid], row_to_post_with_user)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "{POST_SELECT} ORDER BY p.created_at DESC, p.id DESC"
                ))?;
                let rows = stmt.query_map([], row_to_post_with_user)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        // Attach comments grouped per post
        let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, body, comment_image, comment_video, comment_gif,
                       user_id, post_id, created_at, updated_at
                FROM comments ORDER BY created_at DESC, id DESC
                "#,
            )?;
            let rows = stmt.query_map([], row_to_bare_comment)?;
            for row in rows {
                let comment = row?;
                by_post.entry(comment.post_id).or_default().push(comment);
            }
        }
        for post in &mut posts {
            post.comments = Some(by_post.remove(&post.id).unwrap_or_default());
        }

        Ok(posts)
    }

    /// Fetch one post with its author and its comments (each with author),
    /// comments newest-first
    pub fn get(&self, id: i64) -> Result<Post, StoreError> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare(&format!("{POST_SELECT} WHERE p.id = ?"))?;
        let mut post = stmt
            .query_row([id], row_to_post_with_user)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Database(other),
            })?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                c.id, c.body, c.comment_image, c.comment_video, c.comment_gif,
                c.user_id, c.post_id, c.created_at, c.updated_at,
                u.id, u.name, u.username, u.email, u.hashed_password,
                u.bio, u.date_of_birth, u.email_verified_at,
                u.profile_image, u.cover_image, u.following_ids,
                u.has_notification, u.created_at, u.updated_at,
                s.plan
            FROM comments c
            JOIN users u ON u.id = c.user_id
            LEFT JOIN subscriptions s ON s.user_id = u.id
            WHERE c.post_id = ?
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )?;
        let rows = stmt.query_map([id], row_to_comment_with_user)?;
        post.comments = Some(rows.collect::<Result<Vec<_>, _>>()?);

        Ok(post)
    }
}

fn row_to_bare_post(row: &rusqlite::Row) -> Result<Post, rusqlite::Error> {
    Ok(Post {
        id: row.get(0)?,
        body: row.get(1)?,
        post_image: row.get(2)?,
        post_video: row.get(3)?,
        post_gif: row.get(4)?,
        user_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        user: None,
        comments: None,
    })
}

fn row_to_post_with_user(row: &rusqlite::Row) -> Result<Post, rusqlite::Error> {
    let mut post = Post {
        id: row.get(0)?,
        body: row.get(1)?,
        post_image: row.get(2)?,
        post_video: row.get(3)?,
        post_gif: row.get(4)?,
        user_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        user: None,
        comments: None,
    };
    post.user = Some(user_at_offset(row, 8)?);
    Ok(post)
}

pub(crate) fn row_to_bare_comment(row: &rusqlite::Row) -> Result<Comment, rusqlite::Error> {
    Ok(Comment {
        id: row.get(0)?,
        body: row.get(1)?,
        comment_image: row.get(2)?,
        comment_video: row.get(3)?,
        comment_gif: row.get(4)?,
        user_id: row.get(5)?,
        post_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        user: None,
    })
}

fn row_to_comment_with_user(row: &rusqlite::Row) -> Result<Comment, rusqlite::Error> {
    let mut comment = row_to_bare_comment(row)?;
    comment.user = Some(user_at_offset(row, 9)?);
    Ok(comment)
}

/// Read the joined user columns starting at `offset`; layout mirrors
/// `users::row_to_user`
fn user_at_offset(
    row: &rusqlite::Row,
    offset: usize,
) -> Result<crate::store::types::User, rusqlite::Error> {
    use crate::store::types::{Plan, SubscriptionInfo, User};

    let following_json: String = row.get(offset + 10)?;
    let plan: Option<String> = row.get(offset + 14)?;
    Ok(User {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        username: row.get(offset + 2)?,
        email: row.get(offset + 3)?,
        hashed_password: row.get(offset + 4)?,
        bio: row.get(offset + 5)?,
        date_of_birth: row.get(offset + 6)?,
        email_verified_at: row.get(offset + 7)?,
        profile_image: row.get(offset + 8)?,
        cover_image: row.get(offset + 9)?,
        following_ids: serde_json::from_str(&following_json).unwrap_or_default(),
        has_notification: row.get::<_, i64>(offset + 11)? != 0,
        created_at: row.get(offset + 12)?,
        updated_at: row.get(offset + 13)?,
        subscription: plan.map(|p| SubscriptionInfo {
            plan: Plan::parse(&p),
        }),
        followers_count: None,
    })
}
