// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use proofsheet_core::ProofsheetError;
use proofsheet_core::wire::UploadResponse;
use thiserror::Error;
use tracing::warn;

/// Errors returned by the HTTP handlers. Every one renders as
/// `{"ok": false, "error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("upload is larger than the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Conversion(#[from] ProofsheetError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Conversion(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(%status, error = %self, "Request failed");
        (status, Json(UploadResponse::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(
            ApiError::BadRequest("no file".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PayloadTooLarge { limit: 1 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        let exhausted = ProofsheetError::ConversionFallbackExhausted {
            primary: "a".into(),
            fallback: "b".into(),
        };
        assert_eq!(
            ApiError::from(exhausted).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
