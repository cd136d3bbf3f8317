// SPDX-License-Identifier: MPL-2.0

use crate::clients::ClientError;
use serde_json::{Value, json};
use url::Url;

/// Client for the external text-generation endpoint backing the chat panel
pub struct TextGenClient {
    http: reqwest::Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
}

impl TextGenClient {
    pub fn new(http: reqwest::Client, endpoint: Url, model: String, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            model,
            api_key,
        }
    }

    /// Send one prompt and return the generated text
    pub async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ClientError::NotConfigured("text generation"))?;

        let mut url = self
            .endpoint
            .join(&format!("models/{}:generateContent", self.model))
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut().append_pair("key", api_key);

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Surface the provider's own message when it sends one
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(Value::as_str)
                        .map(String::from)
                })
                .unwrap_or_else(|| "text generation request failed".to_string());
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        document
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                ClientError::InvalidResponse("unexpected response document".to_string())
            })
    }
}
