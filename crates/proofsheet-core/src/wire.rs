// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON payloads exchanged with the upload/convert endpoint.

use serde::{Deserialize, Serialize};

use crate::types::{Background, ConversionPath};

/// Query string of `POST /upload`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub bg: Background,
}

/// Response body of `POST /upload`.
///
/// Success carries `via` and `base64`; failure carries `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<ConversionPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn success(via: ConversionPath, base64: String) -> Self {
        Self {
            ok: true,
            via: Some(via),
            base64: Some(base64),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            via: None,
            base64: None,
            error: Some(error.into()),
        }
    }
}
