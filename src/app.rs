// SPDX-License-Identifier: MPL-2.0

use crate::api;
use crate::clients::{IdentityClient, MediaClient, TextGenClient};
use crate::config::{APP_NAME, Config};
use crate::store::Db;
use axum::Router;
use axum::routing::{get, patch, post};
use std::sync::Arc;
use tracing::info;

/// Shared state handed to every route handler
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<Config>,
    pub identity: Arc<IdentityClient>,
    pub media: Arc<MediaClient>,
    pub textgen: Arc<TextGenClient>,
}

impl AppState {
    pub fn new(db: Db, config: Config) -> Self {
        let http = reqwest::Client::new();
        let identity = IdentityClient::new(http.clone(), config.identity_userinfo_url.clone());
        let media = MediaClient::new(
            http.clone(),
            config.media_upload_url.clone(),
            config.media_cdn_base.clone(),
            config.media_public_key.clone(),
        );
        let textgen = TextGenClient::new(
            http,
            config.textgen_endpoint.clone(),
            config.textgen_model.clone(),
            config.textgen_api_key.clone(),
        );
        Self {
            db,
            config: Arc::new(config),
            identity: Arc::new(identity),
            media: Arc::new(media),
            textgen: Arc::new(textgen),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/federated", post(api::auth::federated))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/check-username", get(api::users::check_username))
        .route("/api/posts", get(api::posts::list).post(api::posts::create))
        .route("/api/posts/{postId}", get(api::posts::get))
        .route(
            "/api/posts/{postId}/comments",
            post(api::posts::create_comment),
        )
        .route("/api/users", get(api::users::list))
        .route("/api/users/{username}", get(api::users::get_by_username))
        .route(
            "/api/users/{username}/follow",
            post(api::users::follow).delete(api::users::unfollow),
        )
        .route("/api/edit", patch(api::users::edit))
        .route("/api/notifications", get(api::notifications::list))
        .route("/api/subscription", get(api::users::subscription))
        .route("/api/chat", post(api::chat::generate))
        .route("/api/uploads", post(api::uploads::upload))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Bind the configured address and serve until SIGINT/SIGTERM
pub async fn serve(state: AppState) -> Result<(), String> {
    let bind_addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind failed on {bind_addr}: {e}"))?;
    info!("{APP_NAME} listening on {bind_addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
