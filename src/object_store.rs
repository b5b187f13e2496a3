// ABOUTME: Object store access: presigned download/upload grants and best-effort deletes
// ABOUTME: Grant keys are always derived server-side; callers never supply an object key

use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::config::WasabiConfig;

/// Download grants are always one hour; only upload expiry is configurable.
const DOWNLOAD_URL_EXPIRY: Duration = Duration::from_secs(3600);
const DEFAULT_UPLOAD_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("invalid signing expiry: {0}")]
    Presign(#[from] aws_sdk_s3::presigning::PresigningConfigError),
    #[error("object store error: {0}")]
    Sdk(String),
}

/// An ephemeral signed credential for exactly one key and one operation.
#[derive(Debug)]
pub struct UploadGrant {
    pub key: String,
    pub url: String,
}

#[derive(Clone)]
pub struct ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    upload_expiry: Duration,
}

impl ObjectStore {
    pub fn new(config: &WasabiConfig, upload_expiry_secs: u64) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "securevault",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            upload_expiry: Duration::from_secs(upload_expiry_secs),
        }
    }

    /// Mint a fresh one-hour GET grant for a key. Computed per call, never
    /// cached or reused across requests.
    pub async fn download_url(&self, key: &str) -> Result<String, ObjectStoreError> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(DOWNLOAD_URL_EXPIRY)?)
            .await
            .map_err(|err| ObjectStoreError::Sdk(DisplayErrorContext(&err).to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// PUT grant for a new recording body. The key is derived here from the
    /// owner, camera, and capture instant, so the grant cannot point outside
    /// the caller's namespace.
    #[allow(dead_code)] // ingestion entry point, exercised by tests
    pub async fn recording_upload_grant(
        &self,
        owner: Uuid,
        camera_id: Uuid,
        recorded_at: DateTime<Utc>,
        content_type: Option<&str>,
    ) -> Result<UploadGrant, ObjectStoreError> {
        let key = recording_key(owner, camera_id, recorded_at);
        let url = self
            .upload_url(&key, content_type.unwrap_or(DEFAULT_UPLOAD_CONTENT_TYPE))
            .await?;
        Ok(UploadGrant { key, url })
    }

    /// PUT grant for the camera's single thumbnail slot, overwritten in place.
    #[allow(dead_code)] // ingestion entry point, exercised by tests
    pub async fn thumbnail_upload_grant(
        &self,
        owner: Uuid,
        camera_id: Uuid,
    ) -> Result<UploadGrant, ObjectStoreError> {
        let key = thumbnail_key(owner, camera_id);
        let url = self.upload_url(&key, "image/jpeg").await?;
        Ok(UploadGrant { key, url })
    }

    async fn upload_url(&self, key: &str, content_type: &str) -> Result<String, ObjectStoreError> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(PresigningConfig::expires_in(self.upload_expiry)?)
            .await
            .map_err(|err| ObjectStoreError::Sdk(DisplayErrorContext(&err).to_string()))?;

        Ok(presigned.uri().to_string())
    }

    pub async fn delete_object(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| ObjectStoreError::Sdk(DisplayErrorContext(&err).to_string()))?;

        Ok(())
    }
}

/// Deterministic object key for a recording body. UTC, zero-padded.
pub fn recording_key(owner: Uuid, camera_id: Uuid, recorded_at: DateTime<Utc>) -> String {
    format!(
        "recordings/{}/{}/{}.mp4",
        owner,
        camera_id,
        recorded_at.format("%Y/%m/%d/%H-%M-%S")
    )
}

/// Fixed single-slot thumbnail key, overwritten on every capture.
pub fn thumbnail_key(owner: Uuid, camera_id: Uuid) -> String {
    format!("thumbnails/{}/{}/latest.jpg", owner, camera_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WasabiConfig;
    use chrono::TimeZone;

    fn test_store() -> ObjectStore {
        ObjectStore::new(
            &WasabiConfig {
                endpoint: "https://s3.test.example".to_string(),
                region: "us-east-1".to_string(),
                access_key: "test-access".to_string(),
                secret_key: "test-secret".to_string(),
                bucket: "test-bucket".to_string(),
            },
            3600,
        )
    }

    #[test]
    fn recording_key_is_deterministic_and_zero_padded() {
        let owner = Uuid::parse_str("6a0f3f6e-1111-4a5b-9c3d-2f1e0d9c8b7a").unwrap();
        let camera = Uuid::parse_str("0b1c2d3e-2222-4f5a-8b9c-0d1e2f3a4b5c").unwrap();
        let instant = Utc.with_ymd_and_hms(2026, 3, 5, 7, 8, 9).unwrap();

        let key = recording_key(owner, camera, instant);
        assert_eq!(
            key,
            format!("recordings/{owner}/{camera}/2026/03/05/07-08-09.mp4")
        );
        // Same inputs reproduce the key byte-for-byte.
        assert_eq!(key, recording_key(owner, camera, instant));
    }

    #[test]
    fn thumbnail_key_is_a_fixed_slot() {
        let owner = Uuid::new_v4();
        let camera = Uuid::new_v4();
        assert_eq!(
            thumbnail_key(owner, camera),
            format!("thumbnails/{owner}/{camera}/latest.jpg")
        );
    }

    #[tokio::test]
    async fn download_url_is_scoped_to_the_key_and_expiry() {
        let store = test_store();
        let url = store
            .download_url("recordings/u/c/2026/03/05/07-08-09.mp4")
            .await
            .unwrap();

        assert!(url.contains("test-bucket/recordings/u/c/2026/03/05/07-08-09.mp4"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn upload_grants_derive_their_own_keys() {
        let store = test_store();
        let owner = Uuid::new_v4();
        let camera = Uuid::new_v4();
        let instant = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        let grant = store
            .recording_upload_grant(owner, camera, instant, None)
            .await
            .unwrap();
        assert_eq!(grant.key, recording_key(owner, camera, instant));
        assert!(grant.url.contains(&grant.key));
        assert!(grant.url.contains("X-Amz-Expires=3600"));

        let thumb = store.thumbnail_upload_grant(owner, camera).await.unwrap();
        assert_eq!(thumb.key, thumbnail_key(owner, camera));
        assert!(thumb.url.contains("latest.jpg"));
    }
}
