//! Polars `AnyValue` conversions.

use polars::prelude::AnyValue;

use flowml_model::CellValue;

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: &AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Int8(v) => Some(f64::from(*v)),
        AnyValue::Int16(v) => Some(f64::from(*v)),
        AnyValue::Int32(v) => Some(f64::from(*v)),
        AnyValue::Int64(v) => Some(*v as f64),
        AnyValue::UInt8(v) => Some(f64::from(*v)),
        AnyValue::UInt16(v) => Some(f64::from(*v)),
        AnyValue::UInt32(v) => Some(f64::from(*v)),
        AnyValue::UInt64(v) => Some(*v as f64),
        AnyValue::Float32(v) => Some(f64::from(*v)),
        AnyValue::Float64(v) => Some(*v),
        _ => None,
    }
}

/// Converts a frame value to a batch cell.
///
/// Numbers stay numeric, strings are trimmed (empty becomes `Missing`), nulls
/// are `Missing`, and anything else is kept as its display text.
pub fn any_to_cell(value: AnyValue<'_>) -> CellValue {
    if let Some(number) = any_to_f64(&value) {
        return CellValue::Number(number);
    }
    match value {
        AnyValue::Null => CellValue::Missing,
        AnyValue::String(s) => CellValue::from_raw(s),
        AnyValue::StringOwned(s) => CellValue::from_raw(s.as_str()),
        AnyValue::Boolean(b) => CellValue::Number(if b { 1.0 } else { 0.0 }),
        other => CellValue::from_raw(&other.to_string()),
    }
}
