// SPDX-License-Identifier: MPL-2.0

mod identity;
mod media;
mod textgen;

pub use identity::{IdentityClient, ProviderProfile};
pub use media::MediaClient;
pub use textgen::TextGenClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}
