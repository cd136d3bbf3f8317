// SPDX-License-Identifier: MPL-2.0

//! End-to-end tests against a server on an ephemeral port.

use perch::app::{AppState, build_router};
use perch::config::Config;
use perch::store::Db;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

fn test_config() -> Config {
    // Collaborator endpoints point at an unroutable port; none of these
    // tests should ever reach them
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        db_path: PathBuf::from("unused"),
        auth_secret: "integration-test-secret".to_string(),
        session_ttl: Duration::from_secs(3600),
        bcrypt_cost: 4,
        username_max_attempts: 5,
        chat_max_prompt_chars: 500,
        identity_userinfo_url: Url::parse("http://127.0.0.1:9/userinfo").expect("url"),
        media_upload_url: Url::parse("http://127.0.0.1:9/base/").expect("url"),
        media_cdn_base: Url::parse("http://127.0.0.1:9/cdn/").expect("url"),
        media_public_key: None,
        textgen_endpoint: Url::parse("http://127.0.0.1:9/v1beta/").expect("url"),
        textgen_model: "test-model".to_string(),
        textgen_api_key: None,
    }
}

async fn spawn_app() -> String {
    let db = Db::open_in_memory().expect("open db");
    let state = AppState::new(db, test_config());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("serve");
    });
    format!("http://{addr}")
}

/// Register an account and return `(user_id, username, bearer token)`
async fn register(
    client: &reqwest::Client,
    base: &str,
    name: &str,
    username: &str,
    email: &str,
) -> (i64, String, String) {
    let res = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({
            "name": name,
            "username": username,
            "email": email,
            "password": "hunter2hunter2",
        }))
        .send()
        .await
        .expect("register request");
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.expect("register body");
    assert_eq!(body["status"], "success");
    (
        body["data"]["id"].as_i64().expect("user id"),
        body["data"]["username"].as_str().expect("username").to_string(),
        body["token"].as_str().expect("token").to_string(),
    )
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected_and_write_nothing() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    for path in [
        "/api/posts",
        "/api/users",
        "/api/notifications",
        "/api/subscription",
        "/api/check-username?username=x",
    ] {
        let res = client
            .get(format!("{base}{path}"))
            .send()
            .await
            .expect("request");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "GET {path}");
        let body: Value = res.json().await.expect("body");
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Not authenticated");
    }

    let res = client
        .post(format!("{base}/api/posts"))
        .json(&json!({ "body": "sneaky" }))
        .send()
        .await
        .expect("request");
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Nothing was persisted by the rejected write
    let (_, _, token) = register(&client, &base, "Ada", "ada", "ada@example.com").await;
    let res = client
        .get(format!("{base}/api/posts"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list");
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["posts"].as_array().expect("posts").len(), 0);
}

#[tokio::test]
async fn post_creation_is_attributed_to_the_session_user() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, _, token) = register(&client, &base, "Ada", "ada", "ada@example.com").await;

    let res = client
        .post(format!("{base}/api/posts"))
        .bearer_auth(&token)
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .expect("create post");
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["userId"].as_i64(), Some(user_id));
    assert_eq!(body["data"]["body"], "hello");

    let res = client
        .get(format!("{base}/api/posts"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list");
    let body: Value = res.json().await.expect("body");
    let posts = body["posts"].as_array().expect("posts");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["user"]["username"], "ada");
    assert!(posts[0]["user"].get("hashedPassword").is_none());
}

#[tokio::test]
async fn empty_post_body_is_rejected_and_persists_nothing() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, _, token) = register(&client, &base, "Ada", "ada", "ada@example.com").await;

    let res = client
        .post(format!("{base}/api/posts"))
        .bearer_auth(&token)
        .json(&json!({ "body": "  " }))
        .send()
        .await
        .expect("create post");
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["message"], "Post content required");

    let res = client
        .get(format!("{base}/api/posts"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list");
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["posts"].as_array().expect("posts").len(), 0);
}

#[tokio::test]
async fn colliding_username_is_suffixed_and_availability_reflects_it() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, first, token) = register(&client, &base, "Ada", "ada", "first@example.com").await;
    assert_eq!(first, "ada");

    let (_, second, _) = register(&client, &base, "Ada", "ada", "second@example.com").await;
    assert_ne!(second, "ada");
    let suffix = second.strip_prefix("ada").expect("base kept");
    assert_eq!(suffix.len(), 6);
    assert!(suffix.chars().all(|c| c.is_ascii_digit()));

    let res = client
        .get(format!("{base}/api/check-username?username=ada"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("check");
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["isAvailable"], false);

    let res = client
        .get(format!("{base}/api/check-username?username=grace"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("check");
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["isAvailable"], true);
}

#[tokio::test]
async fn post_fetch_maps_bad_input_and_missing_rows() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, _, token) = register(&client, &base, "Ada", "ada", "ada@example.com").await;

    let res = client
        .get(format!("{base}/api/posts/not-a-number"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("fetch");
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{base}/api/posts/999"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("fetch");
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn comment_notifies_the_post_owner_and_reading_clears_the_flag() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, _, ada_token) = register(&client, &base, "Ada", "ada", "ada@example.com").await;
    let (_, _, grace_token) = register(&client, &base, "Grace", "grace", "grace@example.com").await;

    let res = client
        .post(format!("{base}/api/posts"))
        .bearer_auth(&ada_token)
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .expect("create post");
    let body: Value = res.json().await.expect("body");
    let post_id = body["data"]["id"].as_i64().expect("post id");

    let res = client
        .post(format!("{base}/api/posts/{post_id}/comments"))
        .bearer_auth(&grace_token)
        .json(&json!({ "body": "nice one" }))
        .send()
        .await
        .expect("comment");
    assert_eq!(res.status(), StatusCode::CREATED);

    // Owner's flag is up
    let res = client
        .get(format!("{base}/api/users/ada"))
        .bearer_auth(&ada_token)
        .send()
        .await
        .expect("profile");
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["data"]["hasNotification"], true);

    // Reading returns the rows and drops the flag
    let res = client
        .get(format!("{base}/api/notifications"))
        .bearer_auth(&ada_token)
        .send()
        .await
        .expect("notifications");
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.expect("body");
    let notifications = body["data"].as_array().expect("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["body"], "grace commented on your post");

    let res = client
        .get(format!("{base}/api/users/ada"))
        .bearer_auth(&ada_token)
        .send()
        .await
        .expect("profile");
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["data"]["hasNotification"], false);

    // The single-post view carries the comment with its author
    let res = client
        .get(format!("{base}/api/posts/{post_id}"))
        .bearer_auth(&ada_token)
        .send()
        .await
        .expect("fetch post");
    let body: Value = res.json().await.expect("body");
    let comments = body["post"]["comments"].as_array().expect("comments");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["user"]["username"], "grace");
}

#[tokio::test]
async fn follow_updates_lists_counts_and_notifications() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let (ada_id, _, ada_token) = register(&client, &base, "Ada", "ada", "ada@example.com").await;
    let (_, _, grace_token) = register(&client, &base, "Grace", "grace", "grace@example.com").await;

    let res = client
        .post(format!("{base}/api/users/ada/follow"))
        .bearer_auth(&grace_token)
        .send()
        .await
        .expect("follow");
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.expect("body");
    let following: Vec<i64> = body["data"]["followingIds"]
        .as_array()
        .expect("followingIds")
        .iter()
        .filter_map(Value::as_i64)
        .collect();
    assert!(following.contains(&ada_id));

    let res = client
        .get(format!("{base}/api/users/ada"))
        .bearer_auth(&grace_token)
        .send()
        .await
        .expect("profile");
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["data"]["followersCount"].as_i64(), Some(1));

    let res = client
        .get(format!("{base}/api/notifications"))
        .bearer_auth(&ada_token)
        .send()
        .await
        .expect("notifications");
    let body: Value = res.json().await.expect("body");
    let notifications = body["data"].as_array().expect("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["body"], "grace started following you");

    let res = client
        .delete(format!("{base}/api/users/ada/follow"))
        .bearer_auth(&grace_token)
        .send()
        .await
        .expect("unfollow");
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{base}/api/users/ada"))
        .bearer_auth(&grace_token)
        .send()
        .await
        .expect("profile");
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["data"]["followersCount"].as_i64(), Some(0));
}

#[tokio::test]
async fn profile_edit_rejects_taken_usernames() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    register(&client, &base, "Ada", "ada", "ada@example.com").await;
    let (_, _, grace_token) = register(&client, &base, "Grace", "grace", "grace@example.com").await;

    let res = client
        .patch(format!("{base}/api/edit"))
        .bearer_auth(&grace_token)
        .json(&json!({ "username": "ada" }))
        .send()
        .await
        .expect("edit");
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["message"], "Username is already taken");

    let res = client
        .patch(format!("{base}/api/edit"))
        .bearer_auth(&grace_token)
        .json(&json!({ "bio": "programmer", "name": "Grace Hopper" }))
        .send()
        .await
        .expect("edit");
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["data"]["bio"], "programmer");
    assert_eq!(body["data"]["name"], "Grace Hopper");
    assert_eq!(body["data"]["username"], "grace");
}

#[tokio::test]
async fn login_verifies_credentials_and_subscription_defaults_to_free() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    register(&client, &base, "Ada", "ada", "ada@example.com").await;

    let res = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": "ada@example.com", "password": "wrong" }))
        .send()
        .await
        .expect("login");
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": "ada@example.com", "password": "hunter2hunter2" }))
        .send()
        .await
        .expect("login");
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.expect("body");
    let token = body["token"].as_str().expect("token").to_string();

    let res = client
        .get(format!("{base}/api/subscription"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("subscription");
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.expect("body");
    assert_eq!(body["data"]["plan"], "free");
}
