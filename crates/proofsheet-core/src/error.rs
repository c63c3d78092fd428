// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Proofsheet.

use thiserror::Error;

use crate::types::EntryId;

/// Top-level error type for all Proofsheet operations.
#[derive(Debug, Error)]
pub enum ProofsheetError {
    // -- Upload / conversion --
    #[error("upload failed: {0}")]
    Upload(String),

    #[error("conversion failed on both paths (primary: {primary}; fallback: {fallback})")]
    ConversionFallbackExhausted { primary: String, fallback: String },

    // -- Pipeline --
    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("no entries with an image to export")]
    EmptyDocument,

    #[error("an export is already in progress")]
    ExportInProgress,

    #[error("rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i32),

    #[error("background task failed: {0}")]
    Task(String),

    // -- Session --
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("entry index out of range: {0}")]
    IndexOutOfRange(usize),

    #[error("no crop in progress")]
    NoCropInProgress,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ProofsheetError>;
