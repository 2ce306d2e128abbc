//! Page layout: item records → positioned text runs, page by page.
//!
//! Layout is pure data so it can be tested without decoding a PDF. The
//! [`crate::pipeline::pdf`] stage only paints what this module decides.
//!
//! Coordinates are PDF points with the origin at the bottom-left of a US
//! Letter page. One pass over the items:
//!
//! ```text
//!  y = H-50   ┌──────────── <doc type> (centred, bold 24) ────────────┐
//!  y = H-80   │ Date: YYYY-MM-DD                                      │
//!  y = H-120  │ #  Reference  Name        Qty  Unit Price  Total      │
//!  y = H-145  │ 1  REF-1      Pen         2    $1.50       $3.00      │
//!             │ …  rows every 20pt; below y=100 → new page at H-50    │
//!             │                               TOTAL:      $23.00      │
//!             └───────────────────────────────────────────────────────┘
//! ```
//!
//! Continuation pages carry rows only: the column header is drawn once.

use crate::item::{format_money, ItemRecord};
use crate::pipeline::fonts::{text_width, Font};
use chrono::NaiveDate;
use tracing::debug;

/// US Letter width in points.
pub const PAGE_WIDTH: f32 = 612.0;
/// US Letter height in points.
pub const PAGE_HEIGHT: f32 = 792.0;

/// Left edge of each table column: index, reference, name, qty, unit price, total.
pub const COLUMN_X: [f32; 6] = [50.0, 80.0, 180.0, 350.0, 420.0, 500.0];
/// Column header labels, aligned with [`COLUMN_X`].
pub const HEADER_LABELS: [&str; 6] = ["#", "Reference", "Name", "Qty", "Unit Price", "Total"];

/// Vertical distance between consecutive rows.
pub const ROW_HEIGHT: f32 = 20.0;
/// A page break happens once the cursor drops below this.
pub const BOTTOM_MARGIN: f32 = 100.0;
/// Cursor position at the top of a continuation page.
pub const CONTINUATION_Y: f32 = PAGE_HEIGHT - 50.0;

const TITLE_Y: f32 = PAGE_HEIGHT - 50.0;
const TITLE_SIZE: f32 = 24.0;
const DATE_X: f32 = 50.0;
const DATE_Y: f32 = PAGE_HEIGHT - 80.0;
const DATE_SIZE: f32 = 12.0;
const HEADER_Y: f32 = PAGE_HEIGHT - 120.0;
const HEADER_SIZE: f32 = 12.0;
const FIRST_ROW_GAP: f32 = 25.0;
const ROW_SIZE: f32 = 10.0;
const TOTAL_GAP: f32 = 20.0;
const TOTAL_SIZE: f32 = 14.0;
const TOTAL_LABEL_X: f32 = 420.0;
const TOTAL_VALUE_X: f32 = 500.0;

/// A single piece of text at a fixed baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub font: Font,
    pub size: f32,
    pub text: String,
}

/// Everything drawn on one page, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub runs: Vec<TextRun>,
}

impl PageLayout {
    /// `true` if any run on this page has exactly this text.
    pub fn contains_text(&self, text: &str) -> bool {
        self.runs.iter().any(|r| r.text == text)
    }

    /// Runs whose left edge is at `x`, top to bottom.
    pub fn column(&self, x: f32) -> impl Iterator<Item = &TextRun> {
        self.runs.iter().filter(move |r| r.x == x)
    }
}

/// Where a table row ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPlacement {
    /// 0-based page index.
    pub page: usize,
    /// Baseline of the row.
    pub y: f32,
}

/// The complete, paginated document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
    /// One entry per input item, in input order.
    pub rows: Vec<RowPlacement>,
    /// Sum of all line totals.
    pub total_amount: f64,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Accumulates runs and tracks the current page.
struct Canvas {
    pages: Vec<PageLayout>,
}

impl Canvas {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
        }
    }

    fn current_page(&self) -> usize {
        self.pages.len() - 1
    }

    fn draw(&mut self, x: f32, y: f32, font: Font, size: f32, text: impl Into<String>) {
        let page = self.current_page();
        self.pages[page].runs.push(TextRun {
            x,
            y,
            font,
            size,
            text: text.into(),
        });
    }

    fn draw_centred(&mut self, centre_x: f32, y: f32, font: Font, size: f32, text: &str) {
        let x = centre_x - text_width(text, font, size) / 2.0;
        self.draw(x, y, font, size, text);
    }

    fn show_page(&mut self) {
        self.pages.push(PageLayout::default());
    }
}

/// Lay out the document for `items` under the title `doc_type`.
///
/// `date` is printed in the header; callers pass the server's local date.
pub fn layout_document(items: &[ItemRecord], doc_type: &str, date: NaiveDate) -> DocumentLayout {
    let mut canvas = Canvas::new();

    canvas.draw_centred(
        PAGE_WIDTH / 2.0,
        TITLE_Y,
        Font::HelveticaBold,
        TITLE_SIZE,
        doc_type,
    );
    canvas.draw(
        DATE_X,
        DATE_Y,
        Font::Helvetica,
        DATE_SIZE,
        format!("Date: {}", date.format("%Y-%m-%d")),
    );

    for (x, label) in COLUMN_X.iter().zip(HEADER_LABELS) {
        canvas.draw(*x, HEADER_Y, Font::HelveticaBold, HEADER_SIZE, label);
    }

    let mut y = HEADER_Y - FIRST_ROW_GAP;
    let mut total_amount = 0.0;
    let mut rows = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        let line_total = item.line_total();
        total_amount += line_total;

        let cells = [
            (idx + 1).to_string(),
            item.reference.clone(),
            item.name.clone(),
            item.quantity.to_string(),
            format_money(item.unit_price_value()),
            format_money(line_total),
        ];
        for (x, cell) in COLUMN_X.iter().zip(cells) {
            canvas.draw(*x, y, Font::Helvetica, ROW_SIZE, cell);
        }
        rows.push(RowPlacement {
            page: canvas.current_page(),
            y,
        });

        y -= ROW_HEIGHT;
        if y < BOTTOM_MARGIN {
            debug!("Row {} filled page {}; continuing", idx + 1, canvas.current_page() + 1);
            canvas.show_page();
            y = CONTINUATION_Y;
        }
    }

    let total_y = y - TOTAL_GAP;
    canvas.draw(TOTAL_LABEL_X, total_y, Font::HelveticaBold, TOTAL_SIZE, "TOTAL:");
    canvas.draw(
        TOTAL_VALUE_X,
        total_y,
        Font::HelveticaBold,
        TOTAL_SIZE,
        format_money(total_amount),
    );

    DocumentLayout {
        pages: canvas.pages,
        rows,
        total_amount,
    }
}

/// How many rows fit on the first page before a break.
///
/// Rows start 25pt under the header and step by [`ROW_HEIGHT`]; the break
/// fires once the next baseline would sit below [`BOTTOM_MARGIN`].
pub fn rows_on_first_page() -> usize {
    let first = HEADER_Y - FIRST_ROW_GAP;
    ((first - BOTTOM_MARGIN) / ROW_HEIGHT).floor() as usize + 1
}

/// How many rows fit on a continuation page.
pub fn rows_per_continuation_page() -> usize {
    ((CONTINUATION_Y - BOTTOM_MARGIN) / ROW_HEIGHT).floor() as usize + 1
}
