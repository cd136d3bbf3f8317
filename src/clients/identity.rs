// SPDX-License-Identifier: MPL-2.0

use crate::clients::ClientError;
use serde::Deserialize;
use url::Url;

/// Profile document returned by the identity provider for a verified
/// access token
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email_verified: bool,
}

#[derive(Deserialize)]
struct UserinfoDocument {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

/// Talks to the external identity provider's userinfo endpoint. Federated
/// logins hand us an access token; the provider tells us who it belongs to.
pub struct IdentityClient {
    http: reqwest::Client,
    userinfo_url: Url,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, userinfo_url: Url) -> Self {
        Self { http, userinfo_url }
    }

    /// Resolve an access token to the provider's profile document
    pub async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, ClientError> {
        let response = self
            .http
            .get(self.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                message: "identity provider rejected the access token".to_string(),
            });
        }

        let document: UserinfoDocument = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let email = document
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("userinfo is missing email".to_string()))?;

        Ok(ProviderProfile {
            email,
            name: document.name,
            picture: document.picture,
            email_verified: document.email_verified,
        })
    }
}
