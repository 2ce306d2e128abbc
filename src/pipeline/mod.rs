//! Pipeline stages for extraction and rendering.
//!
//! Each submodule implements one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! extraction:  prompt ──▶ generate ──▶ parse
//!                         (LLM I/O)    (JSON recovery)
//!
//! rendering:   items ──▶ layout ──▶ pdf
//!                        (positions) (lopdf bytes)
//! ```
//!
//! 1. [`generate`] — call the text-generation backend; the only stage with
//!    network I/O
//! 2. [`parse`]    — recover a JSON array from the raw model text
//! 3. [`layout`]   — place title, date, header, rows and total on pages
//! 4. [`fonts`]    — base-14 font names, WinAnsi encoding, glyph widths
//! 5. [`pdf`]      — serialise the layout as a PDF document

pub mod fonts;
pub mod generate;
pub mod layout;
pub mod parse;
pub mod pdf;
