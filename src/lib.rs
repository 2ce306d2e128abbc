//! # invoice-ai
//!
//! Turn free-text invoice descriptions into structured line items with an
//! LLM, and render line items into a paginated PDF.
//!
//! ## Two independent operations
//!
//! ```text
//! POST /api/parse          "2 pens at 1.50, REF-9 desk 120"
//!  │
//!  ├─ 1. Prompt    wrap the text in fixed extraction instructions
//!  ├─ 2. Generate  Cohere `command` (or any edgequake-llm provider),
//!  │               500 tokens, temperature 0, stop at a blank line
//!  └─ 3. Parse     strict JSON, else the greedy `[ … ]` span
//!
//! POST /api/generate-pdf   [{reference, name, quantity, unit_price}, …]
//!  │
//!  ├─ 1. Items     JSON → typed rows (defaults, numeric checks)
//!  ├─ 2. Layout    title, date, header, rows, page breaks, total
//!  └─ 3. PDF       base-14 fonts, one content stream per page
//! ```
//!
//! Nothing is stored between requests; a caller typically extracts first,
//! reviews the items, then renders.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoice_ai::{extract_items, render_document, resolve_generator, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::builder()
//!         .api_key(std::env::var("COHERE_API_KEY")?)
//!         .build()?;
//!     let generator = resolve_generator(&config)?;
//!
//!     let extracted = extract_items(generator.as_ref(), "3 notebooks at 4.20", &config).await?;
//!     let doc = render_document(&extracted.items, "Invoice")?;
//!     std::fs::write(&doc.filename, &doc.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `invoice-ai` server binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod item;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::InvoiceError;
pub use item::ItemRecord;
pub use output::{ExtractionOutput, RenderedDocument};
pub use pipeline::generate::{
    resolve_generator, CohereGenerator, GenerationRequest, ProviderGenerator, TextGenerator,
};
pub use server::{router, serve, AppState};
pub use service::{attachment_filename, extract_items, render_document, render_document_at};
