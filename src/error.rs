//! Error types for the invoice-ai library.
//!
//! A single enum, [`InvoiceError`], covers every failure. Variants fall into
//! two classes that the HTTP layer maps to status codes:
//!
//! * **Client input** — the request itself is unusable (missing prompt,
//!   empty item list, malformed body). Mapped to `400 Bad Request`.
//!
//! * **Service** — the request was fine but a downstream step failed (model
//!   call, unparseable model output, PDF construction). Mapped to
//!   `500 Internal Server Error`; the message carries the underlying cause.
//!
//! Configuration errors are only produced at startup and never reach a
//! request handler.
//!
//! The `Display` text of each variant is exactly what clients see in the
//! `{"error": ...}` body.

use axum::http::StatusCode;
use thiserror::Error;

/// All errors returned by the invoice-ai library.
#[derive(Debug, Error)]
pub enum InvoiceError {
    // ── Request errors ────────────────────────────────────────────────────
    /// `/api/parse` was called without a prompt, or with an empty one.
    #[error("Prompt is required")]
    MissingPrompt,

    /// `/api/generate-pdf` was called without a non-empty `items` array.
    #[error("Items are required")]
    MissingItems,

    /// `docType` was present but not a string.
    #[error("docType must be a string")]
    InvalidDocType,

    /// The request body could not be read as JSON.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // ── Generation errors ─────────────────────────────────────────────────
    /// The text-generation backend failed (network, auth, quota, bad status).
    #[error("AI parsing failed: {message}")]
    GenerationFailed { message: String },

    /// The model answered, but no JSON array could be recovered from it.
    #[error("Couldn't parse JSON from AI response")]
    UnparseableOutput,

    // ── Rendering errors ──────────────────────────────────────────────────
    /// An item could not be turned into a table row.
    #[error("PDF generation failed: item {index}: {detail}")]
    InvalidItem { index: usize, detail: String },

    /// The PDF could not be assembled or serialised.
    #[error("PDF generation failed: {0}")]
    RenderFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// The named generation provider could not be constructed.
    #[error("Generation provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InvoiceError {
    /// `true` for errors caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InvoiceError::MissingPrompt
                | InvoiceError::MissingItems
                | InvoiceError::InvalidDocType
                | InvoiceError::InvalidBody(_)
        )
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<lopdf::Error> for InvoiceError {
    fn from(e: lopdf::Error) -> Self {
        InvoiceError::RenderFailed(e.to_string())
    }
}
