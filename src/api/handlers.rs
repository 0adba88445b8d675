use std::num::NonZeroU32;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap},
    Json,
};
use utoipa::OpenApi;

use super::{
    dto::{DevicePayload, ErrorResponse, IngestResponse, ReadingDto, RecentParams},
    errors::AppError,
    AppState,
};
use crate::query::DEFAULT_RECENT_LIMIT;

const STORED_MESSAGE: &str = "Reading stored";

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Ingest one telemetry submission from a panel monitor.
///
/// `application/json` bodies use the device key vocabulary (`panel_voltage_v`,
/// `current_ma`, `light_pct`, `temp_c`, `device`, `ip`) and may contain bare
/// `nan` / `Infinity` literals for failed sensors. Any other body is read as
/// plain text and its last non-empty line is parsed as
/// `V: <n>V | I: <n>mA | L: <n>% | T: <n>C`.
#[utoipa::path(
    post,
    path = "/api/readings",
    request_body(
        content(
            (DevicePayload = "application/json"),
            (String = "text/plain"),
        ),
        description = "Device JSON payload or plain-text telemetry line",
    ),
    responses(
        (status = 200, description = "Reading stored", body = IngestResponse),
        (status = 400, description = "Empty or malformed submission", body = ErrorResponse),
        (status = 500, description = "Reading could not be persisted", body = ErrorResponse),
    ),
    tag = "readings"
)]
pub async fn ingest_reading(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestResponse>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let stored = state.pipeline.ingest(content_type, &body).await?;

    Ok(Json(IngestResponse {
        message: STORED_MESSAGE.to_owned(),
        data: stored.into(),
    }))
}

/// Fetch the most recent readings, newest first.
#[utoipa::path(
    get,
    path = "/api/readings",
    params(RecentParams),
    responses(
        (status = 200, description = "Most recent readings", body = Vec<ReadingDto>),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
pub async fn get_recent_readings(
    State(state): State<AppState>,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::bad_request(e.body_text()))?;
    let limit = match params.limit {
        None => DEFAULT_RECENT_LIMIT,
        Some(n) => NonZeroU32::new(n)
            .ok_or_else(|| AppError::bad_request("limit must be a positive integer"))?,
    };

    let rows = state.query.recent(limit).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(ingest_reading, get_recent_readings, health),
    components(schemas(DevicePayload, ReadingDto, IngestResponse, ErrorResponse)),
    tags(
        (name = "readings", description = "Solar panel telemetry"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Solar Telemetry API",
        version = "0.1.0",
        description = "Ingestion and query API for solar panel monitor readings"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
