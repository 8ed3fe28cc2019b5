//! Loosely-typed JSON documents attached to products and orders.
//!
//! Products carry a per-product attribute schema (`details`), and orders carry the
//! buyer's answers to it (`selected_details`). Both live in JSONB columns, so every
//! read goes through a decoder here instead of trusting the stored shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DetailFieldKind {
    Text,
    Select,
    Checkbox,
}

/// One buyer-facing attribute a product asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetailField {
    #[serde(rename = "type")]
    pub kind: DetailFieldKind,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Strictly decode a submitted detail-field list. A blank document is an empty list.
pub fn decode_detail_fields(raw: &str) -> Result<Vec<DetailField>, DecodeError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_array() {
        return Err(DecodeError::Shape {
            expected: "array",
            found: kind_of(&value),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// Read a stored detail-field column; anything that is not a list reads as empty and
/// malformed entries are skipped.
pub fn detail_fields_from_json(value: &Value) -> Vec<DetailField> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Read a stored image-list column; anything that is not a list of strings reads as empty.
pub fn images_from_json(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Strictly decode a submitted "existing images" list.
pub fn decode_image_list(raw: &str) -> Result<Vec<String>, DecodeError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// An order's answers to its product's detail fields.
pub type SelectedDetails = Map<String, Value>;

/// Accept only JSON objects as selected details; `null` means "none".
pub fn decode_selected_details(value: Value) -> Result<SelectedDetails, DecodeError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(DecodeError::Shape {
            expected: "object",
            found: kind_of(&other),
        }),
    }
}

/// Read a stored selected-details column; non-objects read as empty.
pub fn selected_details_from_json(value: Value) -> SelectedDetails {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
