// SPDX-License-Identifier: MPL-2.0

mod comments;
mod db;
mod notifications;
mod posts;
mod schema;
mod subscriptions;
mod types;
mod users;

pub use comments::{CommentStore, NewComment};
pub use db::Db;
pub use notifications::NotificationStore;
pub use posts::{NewPost, PostStore};
pub use subscriptions::SubscriptionStore;
pub use types::{Comment, Notification, Plan, Post, SubscriptionInfo, User, UserSummary};
pub use users::{NewUser, ProfileUpdate, UserStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found")]
    NotFound,
    #[error("username already taken")]
    UsernameTaken,
    #[error("email already registered")]
    EmailTaken,
    #[error("database path error: {0}")]
    Path(String),
}
