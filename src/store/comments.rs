// SPDX-License-Identifier: MPL-2.0

use crate::store::types::Comment;
use crate::store::{Db, StoreError};
use rusqlite::params;

/// Fields required to insert a comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    pub comment_image: Option<String>,
    pub comment_video: Option<String>,
    pub comment_gif: Option<String>,
}

/// Store operations for comments
pub struct CommentStore<'a> {
    db: &'a Db,
}

impl<'a> CommentStore<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Insert a comment on an existing post; `NotFound` when the post is gone
    pub fn create(
        &self,
        user_id: i64,
        post_id: i64,
        new: &NewComment,
    ) -> Result<Comment, StoreError> {
        let conn = self.db.conn();
        let now = Db::now();

        {
            let mut stmt = conn.prepare("SELECT 1 FROM posts WHERE id = ?")?;
            if !stmt.exists([post_id])? {
                return Err(StoreError::NotFound);
            }
        }

        conn.execute(
            r#"
            INSERT INTO comments (
                body, comment_image, comment_video, comment_gif,
                user_id, post_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                new.body,
                new.comment_image,
                new.comment_video,
                new.comment_gif,
                user_id,
                post_id,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, body, comment_image, comment_video, comment_gif,
                   user_id, post_id, created_at, updated_at
            FROM comments WHERE id = ?
            "#,
        )?;
        let comment = stmt.query_row([id], crate::store::posts::row_to_bare_comment)?;
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::posts::{NewPost, PostStore};
    use crate::store::users::{NewUser, UserStore};

    #[test]
    fn comment_on_missing_post_is_not_found() {
        let db = Db::open_in_memory().expect("open db");
        let user = UserStore::new(&db)
            .create(&NewUser {
                name: "Ada".to_string(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                hashed_password: None,
                profile_image: None,
                email_verified_at: None,
            })
            .expect("user");

        let err = CommentStore::new(&db)
            .create(
                user.id,
                999,
                &NewComment {
                    body: "hello".to_string(),
                    comment_image: None,
                    comment_video: None,
                    comment_gif: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn comment_is_stamped_with_author_and_post() {
        let db = Db::open_in_memory().expect("open db");
        let user = UserStore::new(&db)
            .create(&NewUser {
                name: "Ada".to_string(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                hashed_password: None,
                profile_image: None,
                email_verified_at: None,
            })
            .expect("user");
        let post = PostStore::new(&db)
            .create(
                user.id,
                &NewPost {
                    body: "hello".to_string(),
                    post_image: None,
                    post_video: None,
                    post_gif: None,
                },
            )
            .expect("post");

        let comment = CommentStore::new(&db)
            .create(
                user.id,
                post.id,
                &NewComment {
                    body: "first".to_string(),
                    comment_image: None,
                    comment_video: None,
                    comment_gif: None,
                },
            )
            .expect("comment");
        assert_eq!(comment.user_id, user.id);
        assert_eq!(comment.post_id, post.id);
    }
}
