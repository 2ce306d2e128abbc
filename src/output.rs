//! Results returned by the library entry points.

use serde::Serialize;
use serde_json::Value;

/// Result of running extraction on one prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutput {
    /// Items as the model produced them, in order, unvalidated.
    pub items: Vec<Value>,
    /// Raw (trimmed) model text, kept for diagnostics.
    #[serde(skip)]
    pub raw_response: String,
}

/// A rendered PDF and what the renderer computed along the way.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    /// Download name, e.g. `credit_note.pdf`.
    pub filename: String,
    pub page_count: usize,
    pub total_amount: f64,
}
