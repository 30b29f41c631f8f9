//! Cloudinary upload API client for avatar images.
//!
//! Uploads are signed: the sorted upload parameters are joined as
//! `key=value&...`, the API secret is appended, and the SHA-256 hex digest is
//! sent as `signature`.

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use rolodex_core::UserId;

use crate::config::CloudinaryConfig;

/// Cloudinary API base URL.
const BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Folder avatars are stored under.
const AVATAR_FOLDER: &str = "rolodex/avatars";

/// Errors that can occur when interacting with the Cloudinary API.
#[derive(Debug, Error)]
pub enum CloudinaryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Cloudinary API client.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: SecretString,
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CloudinaryConfig) -> Result<Self, CloudinaryError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            upload_url: format!("{BASE_URL}/{}/image/upload", config.cloud_name),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Upload an avatar image and return its HTTPS URL.
    ///
    /// Each user has one public id, so a new upload replaces the previous image.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response has no URL.
    pub async fn upload_avatar(
        &self,
        user_id: UserId,
        bytes: Vec<u8>,
        file_name: String,
        content_type: &str,
    ) -> Result<String, CloudinaryError> {
        let timestamp = Utc::now().timestamp().to_string();
        let public_id = format!("{AVATAR_FOLDER}/user-{user_id}");

        let params = [
            ("overwrite", "true"),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign_params(&params, &self.api_secret);

        let file = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)?;

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value.to_string());
        }

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CloudinaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| CloudinaryError::Parse(e.to_string()))?;

        tracing::info!(user_id = %user_id, url = %upload.secure_url, "Avatar uploaded");
        Ok(upload.secure_url)
    }
}

/// Sign upload parameters for the Cloudinary API.
///
/// Parameters are sorted by key before joining.
fn sign_params(params: &[(&str, &str)], api_secret: &SecretString) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(key, _)| *key);

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}
