// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable alert text for every error the user can run into.
//
// Nothing is retried automatically; `retriable` only tells the UI whether
// asking the user to try the same action again makes sense.

use crate::error::ProofsheetError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary condition; repeating the action may work.
    Transient,
    /// User must change something first (pick another file, wait).
    ActionRequired,
    /// Cannot be fixed by repeating the action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as the alert heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether repeating the same action may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    /// Heading and suggestion joined for a single-line alert.
    pub fn alert_text(&self) -> String {
        format!("{} {}", self.message, self.suggestion)
    }
}

/// Convert a `ProofsheetError` into alert text.
pub fn humanize_error(err: &ProofsheetError) -> HumanError {
    match err {
        // -- Upload / conversion --
        ProofsheetError::Upload(detail) => humanize_upload_error(detail),

        ProofsheetError::ConversionFallbackExhausted { .. } => HumanError {
            message: "We couldn't read that image file.".into(),
            suggestion: "Try exporting it as a JPEG or PNG first, then upload it again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Pipeline --
        ProofsheetError::Decode(_) => HumanError {
            message: "One of the images couldn't be loaded, so the PDF wasn't created.".into(),
            suggestion: "Crop that image again or replace it, then export again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ProofsheetError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ProofsheetError::PdfError(_) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: "Try exporting again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ProofsheetError::EmptyDocument => HumanError {
            message: "There's nothing to export yet.".into(),
            suggestion: "Add at least one image and crop it, then export again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ProofsheetError::ExportInProgress => HumanError {
            message: "The PDF is still being created.".into(),
            suggestion: "Please wait for the current export to finish.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ProofsheetError::InvalidRotation(degrees) => HumanError {
            message: "That rotation isn't supported.".into(),
            suggestion: format!(
                "Rotate in quarter turns (0, 90, 180 or 270 degrees), not {degrees}."
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        ProofsheetError::Task(_) => HumanError {
            message: "Something went wrong while processing the images.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Session --
        ProofsheetError::EntryNotFound(_) | ProofsheetError::IndexOutOfRange(_) => HumanError {
            message: "That page no longer exists.".into(),
            suggestion: "It may have been deleted. Refresh the list and try again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ProofsheetError::NoCropInProgress => HumanError {
            message: "No image is being cropped.".into(),
            suggestion: "Choose an image for the page first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Configuration / persistence --
        ProofsheetError::Config(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check proofsheet.toml for typos, or remove it to use the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ProofsheetError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have moved. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. Your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ProofsheetError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

/// Parse upload failure details into human-readable messages.
fn humanize_upload_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("413") || lower.contains("too large") {
        HumanError {
            message: "That file is too large to upload.".into(),
            suggestion: "Try a smaller or compressed version of the image.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("unreachable") || lower.contains("connect") {
        HumanError {
            message: "The image converter isn't reachable.".into(),
            suggestion: "Check your connection, then choose the file again.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("422") || lower.contains("unsupported") {
        HumanError {
            message: "We couldn't read that image file.".into(),
            suggestion: "Try exporting it as a JPEG or PNG first, then upload it again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The image upload failed.".into(),
            suggestion: format!("Choose the file again. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}
