// ABOUTME: Recording route handlers: list with filters, fetch with download grant, delete
// ABOUTME: Client-supplied limits are clamped here, before they can reach the store

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};
use uuid::Uuid;

use crate::auth_helpers::authenticate;
use crate::error::{AppError, Result};
use crate::store::RecordingFilters;
use crate::types::*;
use crate::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

/// Clamp a client-supplied page size to [1, MAX_LIMIT]. The raw value never
/// reaches the store.
fn clamp_limit(requested: Option<i64>) -> u32 {
    match requested {
        None => DEFAULT_LIMIT,
        Some(n) => n.clamp(1, i64::from(MAX_LIMIT)) as u32,
    }
}

pub async fn list_recordings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListRecordingsQuery>,
) -> Result<Json<RecordingsResponse>> {
    let principal = authenticate(&headers, &state).await?;

    let filters = RecordingFilters {
        camera_id: query.camera_id,
        start_date: query.start_date,
        end_date: query.end_date,
        limit: clamp_limit(query.limit),
    };

    let recordings = state
        .store
        .list_recordings(principal.id, &filters)
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))?;

    Ok(Json(RecordingsResponse { recordings }))
}

pub async fn get_recording(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<RecordingResponse>> {
    let principal = authenticate(&headers, &state).await?;

    let recording = state
        .store
        .get_recording(principal.id, id)
        .await
        .map_err(|err| AppError::from_store(err, "Recording"))?;

    // Minted fresh on every call; the ownership-scoped read above means a
    // grant can only ever be issued for a key the caller owns.
    let download_url = state.objects.download_url(&recording.file_path).await?;

    Ok(Json(RecordingResponse {
        recording,
        download_url,
    }))
}

pub async fn delete_recording(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    let principal = authenticate(&headers, &state).await?;

    let recording = state
        .store
        .get_recording(principal.id, id)
        .await
        .map_err(|err| AppError::from_store(err, "Recording"))?;

    // Blob first, best-effort: an absent or undeletable blob must not block
    // the metadata delete, whose outcome is what the caller sees.
    if let Err(err) = state.objects.delete_object(&recording.file_path).await {
        tracing::warn!(
            key = %recording.file_path,
            error = %err,
            "failed to delete recording object, continuing with metadata delete"
        );
    }

    state
        .store
        .delete_recording(principal.id, id)
        .await
        .map_err(|err| AppError::from_store(err, "Recording"))?;

    Ok(Json(MessageResponse {
        message: "Recording deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_when_absent() {
        assert_eq!(clamp_limit(None), 50);
    }

    #[test]
    fn limit_clamps_out_of_range_values() {
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(100_000)), 500);
        assert_eq!(clamp_limit(Some(i64::MAX)), 500);
    }

    #[test]
    fn limit_passes_in_range_values_through() {
        assert_eq!(clamp_limit(Some(1)), 1);
        assert_eq!(clamp_limit(Some(200)), 200);
        assert_eq!(clamp_limit(Some(500)), 500);
    }
}
