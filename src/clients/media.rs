// SPDX-License-Identifier: MPL-2.0

use crate::clients::ClientError;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

#[derive(Deserialize)]
struct UploadResponse {
    file: String,
}

/// Store-and-forward client for the CDN upload service. Files are posted to
/// the upload endpoint and come back as a public CDN URL.
pub struct MediaClient {
    http: reqwest::Client,
    upload_url: Url,
    cdn_base: Url,
    public_key: Option<String>,
}

impl MediaClient {
    pub fn new(
        http: reqwest::Client,
        upload_url: Url,
        cdn_base: Url,
        public_key: Option<String>,
    ) -> Self {
        Self {
            http,
            upload_url,
            cdn_base,
            public_key,
        }
    }

    /// Upload one file and return its public URL
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        let public_key = self
            .public_key
            .as_deref()
            .ok_or(ClientError::NotConfigured("media upload"))?;

        let mut part = Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(content_type) = content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        }
        let form = Form::new()
            .text("UPLOADCARE_PUB_KEY", public_key.to_string())
            .text("UPLOADCARE_STORE", "1")
            .part("file", part);

        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                message: "upload service rejected the file".to_string(),
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let url = self
            .cdn_base
            .join(&format!("{}/", body.file))
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(url.to_string())
    }
}
