// SPDX-License-Identifier: MPL-2.0

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const APP_NAME: &str = "perch";
pub const SESSION_COOKIE: &str = "perch_session";

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_DB_PATH: &str = "data/perch.db";
const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_USERNAME_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_CHAT_MAX_PROMPT_CHARS: usize = 500;
const DEFAULT_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const DEFAULT_UPLOAD_URL: &str = "https://upload.uploadcare.com/base/";
const DEFAULT_CDN_BASE: &str = "https://ucarecdn.com/";
const DEFAULT_TEXTGEN_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_TEXTGEN_MODEL: &str = "gemini-1.5-flash";

/// Runtime configuration, read once from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: PathBuf,
    /// Secret for signing session tokens; required
    pub auth_secret: String,
    pub session_ttl: Duration,
    pub bcrypt_cost: u32,
    pub username_max_attempts: u32,
    pub chat_max_prompt_chars: usize,
    pub identity_userinfo_url: Url,
    pub media_upload_url: Url,
    pub media_cdn_base: Url,
    pub media_public_key: Option<String>,
    pub textgen_endpoint: Url,
    pub textgen_model: String,
    pub textgen_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let auth_secret = env::var("PERCH_AUTH_SECRET")
            .map_err(|_| "PERCH_AUTH_SECRET is required".to_string())?;

        Ok(Self {
            bind_addr: env::var("PERCH_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
            db_path: PathBuf::from(
                env::var("PERCH_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            ),
            auth_secret,
            session_ttl: Duration::from_secs(env_u64(
                "PERCH_SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL_SECS,
            )),
            bcrypt_cost: env_u32("PERCH_BCRYPT_COST", bcrypt::DEFAULT_COST),
            username_max_attempts: env_u32(
                "PERCH_USERNAME_MAX_ATTEMPTS",
                DEFAULT_USERNAME_MAX_ATTEMPTS,
            ),
            chat_max_prompt_chars: env_usize(
                "PERCH_CHAT_MAX_PROMPT_CHARS",
                DEFAULT_CHAT_MAX_PROMPT_CHARS,
            ),
            identity_userinfo_url: env_url("PERCH_IDENTITY_USERINFO_URL", DEFAULT_USERINFO_URL)?,
            media_upload_url: env_url("PERCH_MEDIA_UPLOAD_URL", DEFAULT_UPLOAD_URL)?,
            media_cdn_base: env_url("PERCH_MEDIA_CDN_BASE", DEFAULT_CDN_BASE)?,
            media_public_key: env::var("PERCH_MEDIA_PUBLIC_KEY").ok(),
            textgen_endpoint: env_url("PERCH_TEXTGEN_ENDPOINT", DEFAULT_TEXTGEN_ENDPOINT)?,
            textgen_model: env::var("PERCH_TEXTGEN_MODEL")
                .unwrap_or_else(|_| DEFAULT_TEXTGEN_MODEL.to_string()),
            textgen_api_key: env::var("PERCH_TEXTGEN_API_KEY").ok(),
        })
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_url(name: &str, default: &str) -> Result<Url, String> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| format!("invalid {name}: {e}"))
}
