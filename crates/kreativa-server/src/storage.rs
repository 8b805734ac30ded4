//! Image uploads to Supabase Storage over its REST API.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Url};
use thiserror::Error;

pub const PROFILE_PHOTOS_BUCKET: &str = "profile-photos";
pub const HEADER_IMAGES_BUCKET: &str = "header-images";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("image data is not valid base64")]
    InvalidImage,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upload to {bucket} failed with status {status}")]
    Upload { bucket: String, status: u16 },
    #[error("invalid storage URL: {0}")]
    InvalidUrl(String),
}

/// Splits an optional `data:<mime>;base64,` prefix off `raw` and decodes the
/// payload. Images without a prefix are assumed to be JPEG.
fn decode_image(raw: &str) -> Result<(String, Vec<u8>), StorageError> {
    let raw = raw.trim();
    let (content_type, payload) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest.split_once(',').ok_or(StorageError::InvalidImage)?;
            let mime = meta.strip_suffix(";base64").ok_or(StorageError::InvalidImage)?;
            (mime.to_string(), payload)
        }
        None => ("image/jpeg".to_string(), raw),
    };
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| StorageError::InvalidImage)?;
    if bytes.is_empty() {
        return Err(StorageError::InvalidImage);
    }
    Ok((content_type, bytes))
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

pub struct StorageClient {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl StorageClient {
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidUrl`] if `base_url` does not parse, or
    /// [`StorageError::Http`] if the client cannot be built.
    pub fn new(base_url: &str, service_key: &str, timeout_secs: u64) -> Result<Self, StorageError> {
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| StorageError::InvalidUrl(format!("{base_url}: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            service_key: service_key.to_string(),
        })
    }

    fn object_url(&self, path: &str) -> Result<Url, StorageError> {
        self.base_url
            .join(path)
            .map_err(|e| StorageError::InvalidUrl(e.to_string()))
    }

    /// Uploads a base64 or data-URL image to `bucket` and returns its public
    /// URL. `stem` becomes part of the object name.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidImage`] if the payload does not decode.
    /// - [`StorageError::Upload`] on a non-2xx storage response.
    /// - [`StorageError::Http`] on network failure.
    pub async fn upload_image(
        &self,
        bucket: &str,
        stem: &str,
        image: &str,
    ) -> Result<String, StorageError> {
        let (content_type, bytes) = decode_image(image)?;
        let object = format!(
            "{}_{}_{stem}.{}",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            extension_for(&content_type)
        );

        let response = self
            .client
            .post(self.object_url(&format!("storage/v1/object/{bucket}/{object}"))?)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("content-type", content_type)
            .header("cache-control", "3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Upload {
                bucket: bucket.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(self
            .object_url(&format!("storage/v1/object/public/{bucket}/{object}"))?
            .to_string())
    }
}
