// ABOUTME: Data model and API request/response types shared across handlers and the store
// ABOUTME: Partial camera updates use double-Option fields to tell "absent" from "null"

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// The authenticated caller, resolved fresh on every request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
}

/// Row in the `users` table, lazily provisioned on first authenticated call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
    pub plan_tier: String,
    pub storage_quota_gb: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Offline,
    Online,
    Connecting,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub rtsp_url: Option<String>,
    /// Namespace key for the streaming relay. Derived once at creation,
    /// immutable for the camera's lifetime.
    pub stream_path: String,
    pub status: CameraStatus,
    pub created_at: DateTime<Utc>,
}

/// Denormalized camera fields embedded into recording reads for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSummary {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: Uuid,
    pub user_id: Uuid,
    pub camera_id: Uuid,
    /// Object-store key of the media body.
    pub file_path: String,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cameras: Option<CameraSummary>,
}

// Request types

#[derive(Debug, Deserialize)]
pub struct CreateCameraRequest {
    // Optional here so a missing name maps to our 400, not a body rejection.
    pub name: Option<String>,
    pub location: Option<String>,
    pub rtsp_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCameraRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub rtsp_url: Option<Option<String>>,
    pub status: Option<CameraStatus>,
}

impl UpdateCameraRequest {
    /// Fields explicitly present in the request body, `null` values included.
    /// Absent fields never appear, so the store patch leaves them untouched.
    pub fn changes(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), json!(name));
        }
        if let Some(location) = &self.location {
            fields.insert("location".to_string(), json!(location));
        }
        if let Some(rtsp_url) = &self.rtsp_url {
            fields.insert("rtsp_url".to_string(), json!(rtsp_url));
        }
        if let Some(status) = &self.status {
            fields.insert("status".to_string(), json!(status));
        }
        fields
    }
}

/// Deserializes a present field into `Some(value)` where `value` may itself be
/// `None` for an explicit JSON `null`. Combined with `#[serde(default)]`, an
/// absent field stays `None` at the outer level.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct ListRecordingsQuery {
    pub camera_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

// Response types

#[derive(Debug, Serialize)]
pub struct StreamingUrls {
    pub rtsp: String,
    pub webrtc: String,
    pub hls: String,
}

#[derive(Debug, Serialize)]
pub struct CamerasResponse {
    pub cameras: Vec<Camera>,
}

#[derive(Debug, Serialize)]
pub struct CameraWithUrlsResponse {
    pub camera: Camera,
    pub streaming_urls: StreamingUrls,
}

#[derive(Debug, Serialize)]
pub struct CameraResponse {
    pub camera: Camera,
}

#[derive(Debug, Serialize)]
pub struct RecordingsResponse {
    pub recordings: Vec<Recording>,
}

#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub recording: Recording,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_absent_from_null() {
        let absent: UpdateCameraRequest = serde_json::from_str(r#"{"name":"Gate"}"#).unwrap();
        assert_eq!(absent.name.as_deref(), Some("Gate"));
        assert!(absent.location.is_none());

        let cleared: UpdateCameraRequest =
            serde_json::from_str(r#"{"location":null}"#).unwrap();
        assert_eq!(cleared.location, Some(None));

        let set: UpdateCameraRequest =
            serde_json::from_str(r#"{"location":"Garage"}"#).unwrap();
        assert_eq!(set.location, Some(Some("Garage".to_string())));
    }

    #[test]
    fn changes_contains_only_present_fields() {
        let req: UpdateCameraRequest =
            serde_json::from_str(r#"{"location":null,"status":"online"}"#).unwrap();
        let changes = req.changes();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes.get("location"), Some(&Value::Null));
        assert_eq!(changes.get("status"), Some(&json!("online")));
        assert!(!changes.contains_key("name"));
        assert!(!changes.contains_key("rtsp_url"));
    }

    #[test]
    fn empty_body_produces_no_changes() {
        let req: UpdateCameraRequest = serde_json::from_str("{}").unwrap();
        assert!(req.changes().is_empty());
    }
}
