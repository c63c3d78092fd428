// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP API:
// - `POST /upload?bg=transparent|white` — multipart `file`, answers PNG as base64
// - `GET /health`

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Query, State,
        multipart::MultipartRejection,
        rejection::QueryRejection,
    },
    http::StatusCode,
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use proofsheet_core::wire::{UploadQuery, UploadResponse};
use proofsheet_document::RasterConverter;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::ServerConfig;
use crate::error::ApiError;

pub struct AppState {
    pub config: ServerConfig,
    pub start_time: Instant,
}

pub fn router(config: ServerConfig) -> Router {
    let max_body_size = config.max_upload_bytes;
    let state = Arc::new(AppState {
        config,
        start_time: Instant::now(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

#[instrument(skip_all)]
async fn upload_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = state.config.max_upload_bytes;

    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e.status(), e.body_text(), limit)),
        };
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e.status(), e.body_text(), limit))?;
        upload = Some((file_name, data.to_vec()));
    }

    let (file_name, data) = upload.ok_or_else(|| ApiError::BadRequest("no file uploaded".into()))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".into()));
    }

    info!(%file_name, bytes = data.len(), bg = query.bg.query_value(), "Upload received");

    let converter = RasterConverter::new(state.config.conversion_options(query.bg));
    let converted = tokio::task::spawn_blocking(move || converter.convert(&data))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    info!(
        %file_name,
        via = ?converted.via,
        png_bytes = converted.png.len(),
        "Upload converted"
    );

    Ok(Json(UploadResponse::success(
        converted.via,
        STANDARD.encode(&converted.png),
    )))
}

fn multipart_error(status: StatusCode, detail: String, limit: usize) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::BadRequest(detail)
    }
}
