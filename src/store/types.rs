// SPDX-License-Identifier: MPL-2.0

use serde::Serialize;

/// Subscription plan, written by the billing collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
        }
    }

    /// Unknown values fall back to the free tier
    pub fn parse(raw: &str) -> Plan {
        match raw {
            "pro" => Plan::Pro,
            _ => Plan::Free,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionInfo {
    pub plan: Plan,
}

/// Account row. Serialized directly to clients, so the credential hash is
/// never part of the payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<String>,
    #[serde(rename = "emailVerified")]
    pub email_verified_at: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    pub following_ids: Vec<i64>,
    pub has_notification: bool,
    pub created_at: String,
    pub updated_at: String,
    pub subscription: Option<SubscriptionInfo>,
    /// Only computed for the profile-by-username endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<i64>,
}

/// Short profile embedded in notification payloads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub body: String,
    pub post_image: Option<String>,
    pub post_video: Option<String>,
    pub post_gif: Option<String>,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Author, present on list/fetch responses but not on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub comment_image: Option<String>,
    pub comment_video: Option<String>,
    pub comment_gif: Option<String>,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Author, only included when fetching a single post
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub created_at: String,
    pub user: UserSummary,
}
