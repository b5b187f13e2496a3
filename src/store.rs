// ABOUTME: Metadata store client speaking PostgREST for users, cameras, and recordings
// ABOUTME: Every camera/recording request is built by scoped(), so reads AND writes carry the owner predicate

use reqwest::{
    Method, RequestBuilder, Response,
    header::{self, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SupabaseConfig;
use crate::types::{Camera, Recording, UserRecord};

const DEFAULT_PLAN_TIER: &str = "free";
const DEFAULT_STORAGE_QUOTA_GB: i64 = 25;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("metadata store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("row not found")]
    NotFound,
    #[error("metadata store error ({status}): {message}")]
    Postgrest { status: u16, message: String },
}

/// Filters for a recording listing. `limit` arrives already clamped by the
/// gateway; the store passes it through verbatim.
#[derive(Debug, Default)]
pub struct RecordingFilters {
    pub camera_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: u32,
}

#[derive(Clone)]
pub struct MetadataStore {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataStore {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&config.service_role_key)?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", config.service_role_key))?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
        })
    }

    /// The single place the ownership predicate is attached. Every camera and
    /// recording operation, mutations included, goes through here, so a
    /// request without `user_id = eq.<owner>` cannot be built by accident.
    fn scoped(&self, method: Method, table: &str, owner: Uuid) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, table))
            .query(&[("user_id", format!("eq.{}", owner))])
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, table))
    }

    // ───────────────────────────── Users ─────────────────────────────

    /// Fetch the caller's `users` row, inserting it with the default plan and
    /// quota on their first authenticated call.
    pub async fn ensure_user(&self, id: Uuid, email: &str) -> Result<UserRecord, StoreError> {
        let existing: Vec<UserRecord> = rows(
            self.table(Method::GET, "users")
                .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
                .send()
                .await?,
        )
        .await?;

        if let Some(user) = existing.into_iter().next() {
            return Ok(user);
        }

        let inserted: Vec<UserRecord> = rows(
            self.table(Method::POST, "users")
                .header("Prefer", "return=representation")
                .json(&json!({
                    "id": id,
                    "email": email,
                    "plan_tier": DEFAULT_PLAN_TIER,
                    "storage_quota_gb": DEFAULT_STORAGE_QUOTA_GB,
                }))
                .send()
                .await?,
        )
        .await?;

        single(inserted)
    }

    // ──────────────────────────── Cameras ────────────────────────────

    pub async fn list_cameras(&self, owner: Uuid) -> Result<Vec<Camera>, StoreError> {
        rows(
            self.scoped(Method::GET, "cameras", owner)
                .query(&[("select", "*"), ("order", "created_at.desc")])
                .send()
                .await?,
        )
        .await
    }

    pub async fn create_camera(
        &self,
        owner: Uuid,
        name: &str,
        location: Option<&str>,
        rtsp_url: Option<&str>,
        stream_path: &str,
    ) -> Result<Camera, StoreError> {
        let inserted: Vec<Camera> = rows(
            self.table(Method::POST, "cameras")
                .header("Prefer", "return=representation")
                .json(&json!({
                    "user_id": owner,
                    "name": name,
                    "location": location,
                    "rtsp_url": rtsp_url,
                    "stream_path": stream_path,
                    "status": "offline",
                }))
                .send()
                .await?,
        )
        .await?;

        single(inserted)
    }

    pub async fn get_camera(&self, owner: Uuid, id: Uuid) -> Result<Camera, StoreError> {
        let found: Vec<Camera> = rows(
            self.scoped(Method::GET, "cameras", owner)
                .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
                .send()
                .await?,
        )
        .await?;

        single(found)
    }

    /// The owner filter rides on the PATCH itself, not on a prior read: a row
    /// belonging to someone else matches zero rows and comes back NotFound.
    pub async fn update_camera(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &Map<String, Value>,
    ) -> Result<Camera, StoreError> {
        if changes.is_empty() {
            // Nothing to write; the row stays untouched.
            return self.get_camera(owner, id).await;
        }

        let updated: Vec<Camera> = rows(
            self.scoped(Method::PATCH, "cameras", owner)
                .query(&[("id", format!("eq.{}", id))])
                .header("Prefer", "return=representation")
                .json(changes)
                .send()
                .await?,
        )
        .await?;

        single(updated)
    }

    pub async fn delete_camera(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let deleted: Vec<Camera> = rows(
            self.scoped(Method::DELETE, "cameras", owner)
                .query(&[("id", format!("eq.{}", id))])
                .header("Prefer", "return=representation")
                .send()
                .await?,
        )
        .await?;

        single(deleted).map(|_| ())
    }

    // ─────────────────────────── Recordings ───────────────────────────

    pub async fn list_recordings(
        &self,
        owner: Uuid,
        filters: &RecordingFilters,
    ) -> Result<Vec<Recording>, StoreError> {
        let mut request = self
            .scoped(Method::GET, "recordings", owner)
            .query(&[
                ("select", "*,cameras!inner(name,location)"),
                ("order", "recorded_at.desc"),
            ])
            .query(&[("limit", filters.limit.to_string())]);

        if let Some(camera_id) = filters.camera_id {
            request = request.query(&[("camera_id", format!("eq.{}", camera_id))]);
        }
        if let Some(start) = &filters.start_date {
            request = request.query(&[("recorded_at", format!("gte.{}", start))]);
        }
        if let Some(end) = &filters.end_date {
            request = request.query(&[("recorded_at", format!("lte.{}", end))]);
        }

        rows(request.send().await?).await
    }

    pub async fn get_recording(&self, owner: Uuid, id: Uuid) -> Result<Recording, StoreError> {
        let found: Vec<Recording> = rows(
            self.scoped(Method::GET, "recordings", owner)
                .query(&[
                    ("id", format!("eq.{}", id)),
                    ("select", "*,cameras(name,location)".to_string()),
                ])
                .send()
                .await?,
        )
        .await?;

        single(found)
    }

    pub async fn delete_recording(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let deleted: Vec<Recording> = rows(
            self.scoped(Method::DELETE, "recordings", owner)
                .query(&[("id", format!("eq.{}", id))])
                .header("Prefer", "return=representation")
                .send()
                .await?,
        )
        .await?;

        single(deleted).map(|_| ())
    }
}

async fn rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or(body);
        return Err(StoreError::Postgrest {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

fn single<T>(found: Vec<T>) -> Result<T, StoreError> {
    found.into_iter().next().ok_or(StoreError::NotFound)
}
