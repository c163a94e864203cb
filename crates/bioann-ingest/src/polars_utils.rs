//! Polars AnyValue utility functions.
//!
//! This module provides helper functions for working with Polars `AnyValue` types,
//! including string conversions and column extraction.

use polars::prelude::{AnyValue, DataFrame};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, properly formats numeric types.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to String, returning None if the result is empty.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Read every cell of a column as an optional string.
///
/// Null and blank cells become `None`. Returns `None` when the column does
/// not exist.
pub fn column_strings(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    let column = df.column(name).ok()?;
    let values = (0..df.height())
        .map(|idx| any_to_string_non_empty(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect();
    Some(values)
}
