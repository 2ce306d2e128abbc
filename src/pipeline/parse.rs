//! Recover a JSON item array from raw model output.
//!
//! Even at temperature 0 the model sometimes wraps the array in prose
//! ("Here are the items: [...] Let me know..."). Two passes, in order:
//!
//! 1. strict parse of the whole (trimmed) text;
//! 2. strict parse of the greedy `[` … `]` span, which runs from the first
//!    `[` to the last `]` and may cross newlines.
//!
//! Anything else is [`InvoiceError::UnparseableOutput`]. Elements are not
//! inspected here; the renderer validates fields when it needs them.

use crate::error::InvoiceError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static RE_BRACKETED_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Parse model output into a list of JSON values.
pub fn parse_items(raw: &str) -> Result<Vec<Value>, InvoiceError> {
    let text = raw.trim();

    if let Some(items) = parse_array(text) {
        return Ok(items);
    }

    let span = RE_BRACKETED_ARRAY
        .find(text)
        .ok_or(InvoiceError::UnparseableOutput)?;
    debug!(
        "Strict parse failed; retrying on bracketed span at {}..{}",
        span.start(),
        span.end()
    );

    parse_array(span.as_str()).ok_or(InvoiceError::UnparseableOutput)
}

fn parse_array(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_array() {
        let items = parse_items(r#"[{"name":"Pen","quantity":2,"unit_price":1.5}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Pen");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let items = parse_items("\n  [ ]  \n").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn prose_around_array() {
        let raw = "Here you go: [{\"reference\":\"\",\"name\":\"Pen\",\"quantity\":2,\"unit_price\":1.5}] Thanks";
        let items = parse_items(raw).unwrap();
        assert_eq!(
            items,
            vec![json!({"reference": "", "name": "Pen", "quantity": 2, "unit_price": 1.5})]
        );
    }

    #[test]
    fn bracketed_span_may_cross_lines() {
        let raw = "Items:\n[\n  {\"name\": \"A\", \"quantity\": 1, \"unit_price\": 2},\n  {\"name\": \"B\", \"quantity\": 3, \"unit_price\": 4}\n]\nDone.";
        let items = parse_items(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["name"], "B");
    }

    #[test]
    fn object_wrapping_an_array_falls_back_to_the_array() {
        let items = parse_items(r#"{"items": [{"name": "Pen"}]}"#).unwrap();
        assert_eq!(items, vec![json!({"name": "Pen"})]);
    }

    #[test]
    fn order_is_preserved() {
        let items = parse_items(r#"[{"name":"c"},{"name":"a"},{"name":"b"}]"#).unwrap();
        let names: Vec<_> = items.iter().map(|i| i["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn no_brackets_is_unparseable() {
        let err = parse_items("I could not find any items.").unwrap_err();
        assert!(matches!(err, InvoiceError::UnparseableOutput));
    }

    #[test]
    fn greedy_span_that_is_not_json_is_unparseable() {
        // First `[` to last `]` covers both arrays plus the prose between them.
        let err = parse_items("A: [1] and B: [2]").unwrap_err();
        assert!(matches!(err, InvoiceError::UnparseableOutput));
    }

    #[test]
    fn truncated_array_is_unparseable() {
        let err = parse_items(r#"[{"name": "Pen", "quantity": 2"#).unwrap_err();
        assert!(matches!(err, InvoiceError::UnparseableOutput));
    }

    #[test]
    fn elements_are_not_validated() {
        let items = parse_items(r#"[1, "two", {"quantity": "three"}]"#).unwrap();
        assert_eq!(items.len(), 3);
    }
}
