// ABOUTME: Camera route handlers: list, create, fetch, partial update, delete
// ABOUTME: Every store call is owner-scoped; not-owned rows are indistinguishable from missing ones

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth_helpers::authenticate;
use crate::error::{AppError, Result};
use crate::relay::derive_stream_path;
use crate::types::*;
use crate::AppState;

pub async fn list_cameras(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CamerasResponse>> {
    let principal = authenticate(&headers, &state).await?;

    let cameras = state
        .store
        .list_cameras(principal.id)
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))?;

    Ok(Json(CamerasResponse { cameras }))
}

pub async fn create_camera(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCameraRequest>,
) -> Result<(StatusCode, Json<CameraWithUrlsResponse>)> {
    let principal = authenticate(&headers, &state).await?;

    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation("Camera name is required".to_string()))?;

    // Derived once here; the relay namespaces the camera by this token for
    // its whole lifetime.
    let stream_path = derive_stream_path(principal.id, name, Utc::now());

    let camera = state
        .store
        .create_camera(
            principal.id,
            name,
            req.location.as_deref(),
            req.rtsp_url.as_deref(),
            &stream_path,
        )
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))?;

    let streaming_urls = state.relay.streaming_urls(&camera.stream_path);

    Ok((
        StatusCode::CREATED,
        Json(CameraWithUrlsResponse {
            camera,
            streaming_urls,
        }),
    ))
}

pub async fn get_camera(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<CameraWithUrlsResponse>> {
    let principal = authenticate(&headers, &state).await?;

    let camera = state
        .store
        .get_camera(principal.id, id)
        .await
        .map_err(|err| AppError::from_store(err, "Camera"))?;

    let streaming_urls = state.relay.streaming_urls(&camera.stream_path);

    Ok(Json(CameraWithUrlsResponse {
        camera,
        streaming_urls,
    }))
}

pub async fn update_camera(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCameraRequest>,
) -> Result<Json<CameraResponse>> {
    let principal = authenticate(&headers, &state).await?;

    let camera = state
        .store
        .update_camera(principal.id, id, &req.changes())
        .await
        .map_err(|err| AppError::from_store(err, "Camera"))?;

    Ok(Json(CameraResponse { camera }))
}

pub async fn delete_camera(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    let principal = authenticate(&headers, &state).await?;

    state
        .store
        .delete_camera(principal.id, id)
        .await
        .map_err(|err| AppError::from_store(err, "Camera"))?;

    Ok(Json(MessageResponse {
        message: "Camera deleted successfully".to_string(),
    }))
}
