//! Inventory record types
//!
//! - `Record`: one persisted inventory line
//! - `PartialRecord`: a typed subset of fields, used for inserts and updates
//! - `GridEdit`: the raw cell values the grid reports for one row
//! - `GridRow`: one displayed row, possibly not yet persisted

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name given to inserted rows that arrive without one.
pub const DEFAULT_NAME: &str = "New";

/// One inventory line as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned identity, never reused
    pub id: i64,
    pub name: String,
    pub qty: i64,
    pub price: f64,
    pub note: Option<String>,
}

/// A record with every field independently present or absent.
///
/// `note` is tri-state: `None` leaves the column untouched, `Some(None)`
/// clears it and `Some(Some(text))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_qty(mut self, qty: i64) -> Self {
        self.qty = Some(qty);
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = Some(note);
        self
    }
}

/// Raw cell values reported by the grid for one row.
///
/// Numeric cells arrive as whatever the user typed (a JSON number or a
/// string), so `qty` and `price` stay untyped until coercion. A key that is
/// present with a `null` value is kept as `Some(Value::Null)` / `Some(None)`
/// to tell it apart from a key that is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridEdit {
    #[serde(default, deserialize_with = "present_nullable", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub qty: Option<Value>,
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "present_nullable", skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
}

fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn present_nullable<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl GridEdit {
    /// Coerce the cells of an edited row into an update partial.
    ///
    /// Every present field must be valid: a `null` cell other than the note,
    /// an empty name or a non-numeric value is rejected.
    pub fn to_update(&self) -> Result<PartialRecord> {
        let name = match &self.name {
            None => None,
            Some(Some(name)) if !name.trim().is_empty() => Some(name.clone()),
            Some(_) => return Err(Error::invalid_field("name", "must not be empty")),
        };

        Ok(PartialRecord {
            name,
            qty: self.qty.as_ref().map(coerce_qty).transpose()?,
            price: self.price.as_ref().map(coerce_price).transpose()?,
            note: self.note.clone(),
        })
    }

    /// Coerce the cells of an added row into an insert partial.
    ///
    /// Blank cells fall back to the column defaults; anything else must
    /// still coerce.
    pub fn to_insert(&self) -> Result<PartialRecord> {
        let name = self.name.clone().flatten().filter(|name| !name.trim().is_empty());
        let qty = self
            .qty
            .as_ref()
            .filter(|v| !is_blank(v))
            .map(coerce_qty)
            .transpose()?;
        let price = self
            .price
            .as_ref()
            .filter(|v| !is_blank(v))
            .map(coerce_price)
            .transpose()?;
        let note = self.note.clone().flatten().map(Some);

        Ok(PartialRecord { name, qty, price, note })
    }

    /// Lenient view used for previews: values that do not coerce count as missing.
    pub(crate) fn lenient_qty(&self) -> Option<i64> {
        self.qty.as_ref().and_then(|v| coerce_qty(v).ok())
    }

    pub(crate) fn lenient_price(&self) -> Option<f64> {
        self.price.as_ref().and_then(|v| coerce_price(v).ok())
    }
}

/// A cleared cell: `null` or whitespace-only text
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Coerce a grid cell into a quantity.
///
/// Integers pass through, reals and numeric text are truncated toward zero.
pub fn coerce_qty(value: &Value) -> Result<i64> {
    let qty = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => truncate(n.as_f64())?,
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => i,
                Err(_) => truncate(s.parse::<f64>().ok())?,
            }
        }
        other => return Err(Error::invalid_field("qty", format!("not a number: {}", other))),
    };

    if qty < 0 {
        return Err(Error::invalid_field("qty", format!("must not be negative: {}", qty)));
    }
    Ok(qty)
}

fn truncate(value: Option<f64>) -> Result<i64> {
    match value {
        Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
        Some(f) => Err(Error::invalid_field("qty", format!("out of range: {}", f))),
        None => Err(Error::invalid_field("qty", "not a number")),
    }
}

/// Coerce a grid cell into a price.
pub fn coerce_price(value: &Value) -> Result<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match price {
        Some(p) if p.is_finite() && p >= 0.0 => Ok(p),
        Some(p) => Err(Error::invalid_field("price", format!("must be a non-negative number: {}", p))),
        None => Err(Error::invalid_field("price", format!("not a number: {}", value))),
    }
}

/// One row as the grid displays it, including rows not yet persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridRow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub qty: Option<i64>,
    pub price: Option<f64>,
    pub note: Option<String>,
}

impl From<&Record> for GridRow {
    fn from(record: &Record) -> Self {
        Self {
            id: Some(record.id),
            name: Some(record.name.clone()),
            qty: Some(record.qty),
            price: Some(record.price),
            note: record.note.clone(),
        }
    }
}

impl GridRow {
    /// Overlay the cells of an edit; cells that do not coerce become missing.
    pub fn overlay(&mut self, edit: &GridEdit) {
        if let Some(name) = &edit.name {
            self.name = name.clone();
        }
        if edit.qty.is_some() {
            self.qty = edit.lenient_qty();
        }
        if edit.price.is_some() {
            self.price = edit.lenient_price();
        }
        if let Some(note) = &edit.note {
            self.note = note.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_qty_coercion() {
        assert_eq!(coerce_qty(&json!(12)).unwrap(), 12);
        assert_eq!(coerce_qty(&json!(12.9)).unwrap(), 12);
        assert_eq!(coerce_qty(&json!(" 7 ")).unwrap(), 7);
        assert_eq!(coerce_qty(&json!("3.5")).unwrap(), 3);
        assert!(coerce_qty(&json!("twelve")).is_err());
        assert!(coerce_qty(&json!(null)).is_err());
        assert!(coerce_qty(&json!(true)).is_err());
        assert!(coerce_qty(&json!(-1)).is_err());
    }

    #[test]
    fn test_price_coercion() {
        assert_eq!(coerce_price(&json!(2)).unwrap(), 2.0);
        assert_eq!(coerce_price(&json!("0.8")).unwrap(), 0.8);
        assert!(coerce_price(&json!("cheap")).is_err());
        assert!(coerce_price(&json!(-0.5)).is_err());
        assert!(coerce_price(&json!(null)).is_err());
    }

    #[test]
    fn test_grid_edit_distinguishes_null_from_absent() {
        let edit: GridEdit = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(edit.note, Some(None));
        assert_eq!(edit.qty, None);

        let edit: GridEdit = serde_json::from_str(r#"{"qty": null}"#).unwrap();
        assert_eq!(edit.qty, Some(Value::Null));
    }

    #[test]
    fn test_update_rejects_null_and_empty_name() {
        let edit: GridEdit = serde_json::from_str(r#"{"qty": null}"#).unwrap();
        assert!(edit.to_update().is_err());

        let edit: GridEdit = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert!(edit.to_update().is_err());

        let edit: GridEdit = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(edit.name, Some(None));
        assert!(matches!(edit.to_update(), Err(Error::InvalidField { field: "name", .. })));

        let edit: GridEdit = serde_json::from_str(r#"{"qty": "12", "note": null}"#).unwrap();
        let partial = edit.to_update().unwrap();
        assert_eq!(partial.qty, Some(12));
        assert_eq!(partial.note, Some(None));
        assert!(partial.name.is_none());
    }

    #[test]
    fn test_insert_defaults_blank_cells() {
        let edit: GridEdit =
            serde_json::from_str(r#"{"name": "", "qty": " ", "price": 2.5, "note": null}"#).unwrap();
        let partial = edit.to_insert().unwrap();
        assert_eq!(partial.name, None);
        assert_eq!(partial.qty, None);
        assert_eq!(partial.price, Some(2.5));
        assert_eq!(partial.note, None);

        let edit: GridEdit = serde_json::from_str(r#"{"name": null, "qty": null}"#).unwrap();
        assert_eq!(edit.to_insert().unwrap(), PartialRecord::default());
    }

    #[test]
    fn test_qty_accepts_largest_integers() {
        assert_eq!(coerce_qty(&json!(i64::MAX)).unwrap(), i64::MAX);
        assert_eq!(coerce_qty(&json!(5e18)).unwrap(), 5_000_000_000_000_000_000);
        assert!(coerce_qty(&json!(1e19)).is_err());
    }
}
