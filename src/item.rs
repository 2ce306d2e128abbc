//! Invoice line items.
//!
//! Items arrive as loosely-typed JSON: straight from the model via the
//! client, possibly edited by hand. Nothing is validated at extraction time.
//! [`ItemRecord::from_json`] is the single place where a JSON value becomes a
//! typed row, applying the renderer's defaults and rejecting values that
//! cannot be multiplied.

use crate::error::InvoiceError;
use serde_json::{Number, Value};

/// Placeholder shown when an item has no `reference` key.
pub const MISSING_REFERENCE: &str = "N/A";

/// One invoice line, ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    /// Reference as it will be printed (`"N/A"` when absent, may be empty).
    pub reference: String,
    pub name: String,
    /// Kept as a JSON number so `2` prints as `2` and `2.5` as `2.5`.
    pub quantity: Number,
    pub unit_price: Number,
}

impl ItemRecord {
    /// Build a record from a JSON value at 1-based position `index`.
    ///
    /// Defaults: `reference` → `"N/A"`, `name` → `""`, `quantity` → 0,
    /// `unit_price` → 0. A `null` field counts as absent. Non-string
    /// `reference`/`name` values are printed as JSON.
    ///
    /// # Errors
    /// [`InvoiceError::InvalidItem`] when the value is not an object or when
    /// `quantity`/`unit_price` is present but not a number.
    pub fn from_json(index: usize, value: &Value) -> Result<Self, InvoiceError> {
        let obj = value.as_object().ok_or_else(|| InvoiceError::InvalidItem {
            index,
            detail: format!("expected an object, got {}", kind(value)),
        })?;

        let field = |key: &str| obj.get(key).filter(|v| !v.is_null());

        Ok(Self {
            reference: field("reference")
                .map(display_text)
                .unwrap_or_else(|| MISSING_REFERENCE.to_string()),
            name: field("name").map(display_text).unwrap_or_default(),
            quantity: numeric(index, "quantity", field("quantity"))?,
            unit_price: numeric(index, "unit_price", field("unit_price"))?,
        })
    }

    pub fn quantity_value(&self) -> f64 {
        self.quantity.as_f64().unwrap_or(0.0)
    }

    pub fn unit_price_value(&self) -> f64 {
        self.unit_price.as_f64().unwrap_or(0.0)
    }

    /// `quantity * unit_price`.
    pub fn line_total(&self) -> f64 {
        self.quantity_value() * self.unit_price_value()
    }
}

/// Convert every element of an item array, stopping at the first bad one.
pub fn records_from_json(items: &[Value]) -> Result<Vec<ItemRecord>, InvoiceError> {
    items
        .iter()
        .enumerate()
        .map(|(i, v)| ItemRecord::from_json(i + 1, v))
        .collect()
}

/// Format an amount the way every money column prints it: `$12.30`.
pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn numeric(index: usize, key: &str, value: Option<&Value>) -> Result<Number, InvoiceError> {
    match value {
        None => Ok(Number::from(0)),
        Some(Value::Number(n)) => Ok(n.clone()),
        Some(other) => Err(InvoiceError::InvalidItem {
            index,
            detail: format!("{key} must be a number, got {}", kind(other)),
        }),
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_item() {
        let r = ItemRecord::from_json(
            1,
            &json!({"reference": "REF-456", "name": "Pen", "quantity": 2, "unit_price": 1.5}),
        )
        .unwrap();
        assert_eq!(r.reference, "REF-456");
        assert_eq!(r.name, "Pen");
        assert_eq!(r.quantity.to_string(), "2");
        assert_eq!(r.line_total(), 3.0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let r = ItemRecord::from_json(1, &json!({})).unwrap();
        assert_eq!(r.reference, MISSING_REFERENCE);
        assert_eq!(r.name, "");
        assert_eq!(r.line_total(), 0.0);
    }

    #[test]
    fn empty_reference_is_kept_empty() {
        let r = ItemRecord::from_json(1, &json!({"reference": "", "name": "x"})).unwrap();
        assert_eq!(r.reference, "");
    }

    #[test]
    fn null_reference_counts_as_absent() {
        let r = ItemRecord::from_json(1, &json!({"reference": null})).unwrap();
        assert_eq!(r.reference, "N/A");
    }

    #[test]
    fn numeric_reference_is_printed() {
        let r = ItemRecord::from_json(1, &json!({"reference": 123})).unwrap();
        assert_eq!(r.reference, "123");
    }

    #[test]
    fn decimal_quantity_keeps_its_form() {
        let r = ItemRecord::from_json(1, &json!({"quantity": 2.5, "unit_price": 4})).unwrap();
        assert_eq!(r.quantity.to_string(), "2.5");
        assert_eq!(r.line_total(), 10.0);
    }

    #[test]
    fn string_price_is_rejected_with_position() {
        let err = ItemRecord::from_json(4, &json!({"name": "Pen", "unit_price": "1.50"})).unwrap_err();
        match err {
            InvoiceError::InvalidItem { index, detail } => {
                assert_eq!(index, 4);
                assert!(detail.contains("unit_price"), "got: {detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_item_is_rejected() {
        let err = ItemRecord::from_json(1, &json!("Pen")).unwrap_err();
        assert!(err.to_string().contains("expected an object"));
    }

    #[test]
    fn records_from_json_numbers_from_one() {
        let err = records_from_json(&[json!({}), json!(7)]).unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidItem { index: 2, .. }));
    }

    #[test]
    fn money_format() {
        assert_eq!(format_money(23.0), "$23.00");
        assert_eq!(format_money(0.1 + 0.2), "$0.30");
        assert_eq!(format_money(-1.5), "$-1.50");
    }
}
