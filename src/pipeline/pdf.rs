//! PDF serialisation: paint a [`DocumentLayout`] with `lopdf`.
//!
//! Object graph:
//!
//! ```text
//! Catalog ─▶ Pages ─┬─▶ Page 1 ─▶ Contents
//!                   ├─▶ Page 2 ─▶ Contents
//!                   └─ Resources: /Font { F1 Helvetica, F2 Helvetica-Bold }
//! Info: Title, Producer, CreationDate
//! ```
//!
//! Each text run is its own `BT … ET` block with an absolute `Td`, so the
//! content stream mirrors the layout one-to-one.

use crate::error::InvoiceError;
use crate::pipeline::fonts::{encode_win_ansi, Font};
use crate::pipeline::layout::{DocumentLayout, PageLayout, PAGE_HEIGHT, PAGE_WIDTH};
use chrono::{DateTime, Local};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

const PRODUCER: &str = concat!("invoice-ai ", env!("CARGO_PKG_VERSION"));

/// Serialise `layout` to PDF bytes.
///
/// `title` goes into the document information dictionary.
pub fn write_pdf(
    layout: &DocumentLayout,
    title: &str,
    created: DateTime<Local>,
) -> Result<Vec<u8>, InvoiceError> {
    if layout.pages.is_empty() {
        return Err(InvoiceError::RenderFailed("layout has no pages".into()));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(page)?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = info_dictionary(&mut doc, title, created);
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| InvoiceError::RenderFailed(format!("could not write PDF: {e}")))?;
    debug!("Wrote {} page(s), {} bytes", page_count, buf.len());
    Ok(buf)
}

fn page_content(page: &PageLayout) -> Result<Vec<u8>, InvoiceError> {
    let mut operations = Vec::with_capacity(page.runs.len() * 5);
    for run in &page.runs {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(run.font.resource_name().as_bytes().to_vec()),
                Object::Real(run.size),
            ],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Real(run.x), Object::Real(run.y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&run.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Ok(Content { operations }.encode()?)
}

fn info_dictionary(doc: &mut Document, title: &str, created: DateTime<Local>) -> ObjectId {
    doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(title)),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemRecord;
    use crate::pipeline::layout::{layout_document, rows_on_first_page};
    use chrono::{NaiveDate, TimeZone};
    use serde_json::Number;

    /// Decode every `Tj` operand, page by page.
    fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).expect("valid PDF");
        doc.get_pages()
            .values()
            .map(|&id| {
                let content = doc.get_page_content(id).expect("page content");
                Content::decode(&content)
                    .expect("decodable content")
                    .operations
                    .into_iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(bytes, _)) => {
                            Some(String::from_utf8_lossy(bytes).into_owned())
                        }
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    fn records(n: usize) -> Vec<ItemRecord> {
        (0..n)
            .map(|i| ItemRecord {
                reference: format!("REF-{i}"),
                name: format!("Item {i}"),
                quantity: Number::from(1),
                unit_price: Number::from(2),
            })
            .collect()
    }

    fn render(n: usize) -> Vec<u8> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let layout = layout_document(&records(n), "Invoice", date);
        write_pdf(&layout, "Invoice", Local::now()).unwrap()
    }

    #[test]
    fn writes_a_pdf_header() {
        let bytes = render(2);
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn single_page_contains_every_run() {
        let pages = page_texts(&render(2));
        assert_eq!(pages.len(), 1);
        let texts = &pages[0];
        assert_eq!(texts[0], "Invoice");
        assert!(texts.contains(&"Date: 2024-01-02".to_string()));
        assert!(texts.contains(&"Item 1".to_string()));
        assert!(texts.contains(&"$4.00".to_string()));
    }

    #[test]
    fn overflow_produces_more_pages_with_header_once() {
        let pages = page_texts(&render(rows_on_first_page() + 3));
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains(&"Unit Price".to_string()));
        assert!(!pages[1].contains(&"Unit Price".to_string()));
        assert!(pages[1].contains(&"TOTAL:".to_string()));
    }

    #[test]
    fn info_dictionary_carries_title_and_pdf_date() {
        let created = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let layout = layout_document(&records(1), "Quote", date);
        let bytes = write_pdf(&layout, "Quote", created).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();

        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Quote");
        let stamp = info.get(b"CreationDate").unwrap().as_str().unwrap();
        assert!(stamp.starts_with(b"D:20240102030405"), "got: {stamp:?}");
        let offset = &stamp[b"D:20240102030405".len()..];
        assert_eq!(offset.len(), 7, "got: {stamp:?}");
        assert!(offset[0] == b'+' || offset[0] == b'-');
        assert_eq!(offset[3], b'\'');
        assert_eq!(offset[6], b'\'');
    }

    #[test]
    fn empty_layout_is_rejected() {
        let layout = DocumentLayout {
            pages: vec![],
            rows: vec![],
            total_amount: 0.0,
        };
        let err = write_pdf(&layout, "Invoice", Local::now()).unwrap_err();
        assert!(matches!(err, InvoiceError::RenderFailed(_)));
    }
}
