//! Library entry points: extraction and rendering.
//!
//! The HTTP handlers are thin wrappers around these two functions, and
//! they can be called directly without running a server.
//!
//! ```text
//! extract_items:   text ──▶ prompts ──▶ generate ──▶ parse ──▶ [Value]
//! render_document: [Value] ──▶ item ──▶ layout ──▶ pdf ──▶ bytes
//! ```

use crate::config::ServiceConfig;
use crate::error::InvoiceError;
use crate::item::records_from_json;
use crate::output::{ExtractionOutput, RenderedDocument};
use crate::pipeline::generate::{GenerationRequest, TextGenerator};
use crate::pipeline::{layout, parse, pdf};
use crate::prompts::extraction_prompt;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract invoice items from a free-text description.
///
/// # Errors
/// - [`InvoiceError::MissingPrompt`] if `text` is empty; the generator is
///   not called.
/// - [`InvoiceError::GenerationFailed`] if the backend fails.
/// - [`InvoiceError::UnparseableOutput`] if no JSON array can be recovered.
pub async fn extract_items(
    generator: &dyn TextGenerator,
    text: &str,
    config: &ServiceConfig,
) -> Result<ExtractionOutput, InvoiceError> {
    if text.is_empty() {
        return Err(InvoiceError::MissingPrompt);
    }

    let start = Instant::now();
    let request = GenerationRequest::from_config(extraction_prompt(text), config);
    let raw = generator.generate(&request).await?;
    let raw = raw.trim().to_string();
    info!("Model response from {}: {}", generator.name(), raw);

    let items = parse::parse_items(&raw).inspect_err(|_| {
        warn!("Could not recover a JSON array from model output");
    })?;

    info!(
        "Parsed {} items in {}ms",
        items.len(),
        start.elapsed().as_millis()
    );

    Ok(ExtractionOutput {
        items,
        raw_response: raw,
    })
}

/// Render items to a PDF titled `doc_type`, dated today (server local time).
///
/// # Errors
/// - [`InvoiceError::MissingItems`] if `items` is empty.
/// - [`InvoiceError::InvalidItem`] if an item is not an object or has a
///   non-numeric quantity or unit price.
/// - [`InvoiceError::RenderFailed`] if the PDF cannot be written.
pub fn render_document(items: &[Value], doc_type: &str) -> Result<RenderedDocument, InvoiceError> {
    render_document_at(items, doc_type, Local::now())
}

/// [`render_document`] with an explicit timestamp.
pub fn render_document_at(
    items: &[Value],
    doc_type: &str,
    now: DateTime<Local>,
) -> Result<RenderedDocument, InvoiceError> {
    if items.is_empty() {
        return Err(InvoiceError::MissingItems);
    }

    let records = records_from_json(items)?;
    let layout = layout::layout_document(&records, doc_type, now.date_naive());
    let bytes = pdf::write_pdf(&layout, doc_type, now)?;

    debug!(
        "Rendered '{}': {} items, {} page(s), total {:.2}",
        doc_type,
        records.len(),
        layout.page_count(),
        layout.total_amount
    );

    Ok(RenderedDocument {
        bytes,
        filename: attachment_filename(doc_type),
        page_count: layout.page_count(),
        total_amount: layout.total_amount,
    })
}

/// Run [`render_document`] on the blocking thread pool.
///
/// PDF construction is CPU-bound; keeping it off the async workers stops a
/// large document from stalling other requests.
pub async fn render_document_blocking(
    items: Vec<Value>,
    doc_type: String,
) -> Result<RenderedDocument, InvoiceError> {
    tokio::task::spawn_blocking(move || render_document(&items, &doc_type))
        .await
        .map_err(|e| InvoiceError::Internal(format!("Render task panicked: {e}")))?
}

/// Download name for a document type: lower-cased, spaces → underscores.
pub fn attachment_filename(doc_type: &str) -> String {
    format!("{}.pdf", doc_type.to_lowercase().replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    impl Canned {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, InvoiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(request.prompt.contains("Extract invoice items"));
            self.reply
                .clone()
                .map_err(|message| InvoiceError::GenerationFailed { message })
        }
    }

    fn config() -> ServiceConfig {
        ServiceConfig::builder().api_key("k").build().unwrap()
    }

    #[tokio::test]
    async fn empty_text_never_reaches_generator() {
        let gen = Canned::ok("[]");
        let err = extract_items(&gen, "", &config()).await.unwrap_err();
        assert!(matches!(err, InvoiceError::MissingPrompt));
        assert_eq!(gen.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extracts_from_prose_wrapped_output() {
        let gen = Canned::ok(
            "  Here you go: [{\"reference\":\"\",\"name\":\"Pen\",\"quantity\":2,\"unit_price\":1.5}] Thanks\n",
        );
        let out = extract_items(&gen, "two pens", &config()).await.unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0]["name"], "Pen");
        assert!(out.raw_response.starts_with("Here you go"));
        assert_eq!(gen.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn generator_failure_is_propagated() {
        let gen = Canned {
            reply: Err("connection reset".into()),
            calls: AtomicUsize::new(0),
        };
        let err = extract_items(&gen, "x", &config()).await.unwrap_err();
        assert_eq!(err.to_string(), "AI parsing failed: connection reset");
    }

    #[tokio::test]
    async fn unparseable_output_is_an_error() {
        let gen = Canned::ok("Sorry, I can't help with that.");
        let err = extract_items(&gen, "x", &config()).await.unwrap_err();
        assert!(matches!(err, InvoiceError::UnparseableOutput));
    }

    #[test]
    fn render_reports_total_and_filename() {
        let items = vec![
            json!({"name": "Pen", "quantity": 2, "unit_price": 1.5}),
            json!({"name": "Book", "quantity": 1, "unit_price": 20}),
        ];
        let doc = render_document(&items, "Invoice").unwrap();
        assert_eq!(doc.total_amount, 23.0);
        assert_eq!(doc.page_count, 1);
        assert_eq!(doc.filename, "invoice.pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn render_rejects_empty_items() {
        let err = render_document(&[], "Invoice").unwrap_err();
        assert!(matches!(err, InvoiceError::MissingItems));
    }

    #[test]
    fn render_fails_lazily_on_bad_numbers() {
        let items = vec![json!({"name": "Pen", "quantity": "two", "unit_price": 1})];
        let err = render_document(&items, "Invoice").unwrap_err();
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn filename_normalisation() {
        assert_eq!(attachment_filename("Invoice"), "invoice.pdf");
        assert_eq!(attachment_filename("Credit Note"), "credit_note.pdf");
        assert_eq!(attachment_filename("Pro Forma  Quote"), "pro_forma__quote.pdf");
    }

    #[tokio::test]
    async fn blocking_render_matches_direct_render() {
        let items = vec![json!({"name": "Pen", "quantity": 3, "unit_price": 2})];
        let doc = render_document_blocking(items, "Quote".into()).await.unwrap();
        assert_eq!(doc.total_amount, 6.0);
        assert_eq!(doc.filename, "quote.pdf");
    }
}
