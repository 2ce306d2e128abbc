//! Instruction prompt for invoice item extraction.
//!
//! The model sees a single completion prompt: fixed instructions, the
//! caller's text, a rule about reference numbers and a two-item example of
//! the expected JSON array. Keeping it here lets tests inspect it without a
//! model and keeps prompt edits away from the parsing logic.

/// Instruction template. `{text}` is replaced with the caller's description.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"
Extract invoice items from the following text and return a JSON array.
Each item should have: reference (if available), name, quantity, unit_price.

Text: {text}

Important: If a reference number is provided in the text (like 'Ref#123' or 'REF-456'), use that exact reference number.
If no reference is provided, leave the reference field empty.

Return only valid JSON array like:
[
  {"reference": "REF123", "name": "Product Name", "quantity": 2, "unit_price": 10.50},
  {"reference": "", "name": "Another Product", "quantity": 1, "unit_price": 25.00}
]
"#;

/// Build the extraction prompt for a free-text invoice description.
///
/// Deterministic: the same input always yields the same prompt.
pub fn extraction_prompt(text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replacen("{text}", text, 1)
}
