//! Ready-made decoders for driver scalar types
//!
//! Each decoder is a [`ColumnDecoder`] built from a value extractor and an
//! error-message formatter; bind one to a column with `for_column`, or let
//! [`from_columns!`](crate::from_columns) bind it to a field name.

use crate::core::deserializer::{ColumnDecoder, NamedDeserializer, PositionalDeserializer};
use crate::core::result::DecodeResult;
use crate::core::value::{SqlRow, SqlValue};
use chrono::{DateTime, Utc};

/// Decode an integer column (`int2`/`int4`/`int8`) as `i64`
pub fn integer() -> ColumnDecoder<i64> {
    ColumnDecoder::from_definition(
        |value| match value {
            SqlValue::Int(v) => Some(*v as i64),
            SqlValue::Long(v) => Some(*v),
            _ => None,
        },
        |value| format!("'{}' is not an integer", value),
    )
}

/// Decode any numeric column as `f64`
pub fn number() -> ColumnDecoder<f64> {
    ColumnDecoder::from_definition(
        |value| match value {
            SqlValue::Int(v) => Some(*v as f64),
            SqlValue::Long(v) => Some(*v as f64),
            SqlValue::Double(v) => Some(*v),
            _ => None,
        },
        |value| format!("'{}' is not a number", value),
    )
}

/// Decode a text column
pub fn string() -> ColumnDecoder<String> {
    ColumnDecoder::from_definition(
        |value| match value {
            SqlValue::String(s) => Some(s.clone()),
            _ => None,
        },
        |value| format!("'{}' is not a string", value),
    )
}

/// Decode a boolean column
pub fn boolean() -> ColumnDecoder<bool> {
    ColumnDecoder::from_definition(
        |value| match value {
            SqlValue::Bool(v) => Some(*v),
            _ => None,
        },
        |value| format!("'{}' is not a boolean", value),
    )
}

/// Decode a timestamp column
pub fn timestamp() -> ColumnDecoder<DateTime<Utc>> {
    ColumnDecoder::from_definition(
        |value| match value {
            SqlValue::Timestamp(v) => Some(*v),
            _ => None,
        },
        |value| format!("'{}' is not a timestamp", value),
    )
}

/// Decode a `json`/`jsonb` column
pub fn json() -> ColumnDecoder<serde_json::Value> {
    ColumnDecoder::from_definition(
        |value| match value {
            SqlValue::Json(v) => Some(v.clone()),
            _ => None,
        },
        |value| format!("'{}' is not a json value", value),
    )
}

/// Decode SQL NULL; mostly useful through `or_null`
pub fn null() -> ColumnDecoder<()> {
    ColumnDecoder::from_definition(
        |value| value.is_null().then_some(()),
        |value| format!("'{}' is not null", value),
    )
}

/// Decode a `numeric` column (carried as a string by the driver) as `f64`,
/// failing when the value cannot round-trip through `f64` without losing
/// precision: the parsed value is formatted back, zero-padded to the
/// original length, and must reproduce the original string exactly.
/// An integer-valued decimal like `12.00000` round-trips (the dropped
/// decimal point is restored before padding).
pub fn decimal() -> ColumnDecoder<f64> {
    string().transform(|s| {
        let lossy = || {
            DecodeResult::failure(format!(
                "Value '{}' is not convertible without loss to a number",
                s
            ))
        };
        let parsed: f64 = match s.parse() {
            Ok(v) => v,
            Err(_) => return lossy(),
        };
        let mut rendered = format!("{}", parsed);
        if s.contains('.') && !rendered.contains('.') {
            rendered.push('.');
        }
        let padded = format!("{:0<width$}", rendered, width = s.len());
        if padded == s {
            DecodeResult::Success(parsed)
        } else {
            lossy()
        }
    })
}

/// Decode an array column by decoding every element with `element`.
///
/// Each element is decoded against a synthetic single-column row labeled by
/// its index, so nested failures read `Column '2': ...`; all failures are
/// prefixed with a message naming the array column.
pub fn array<T: 'static>(element: ColumnDecoder<T>) -> ColumnDecoder<Vec<T>> {
    ColumnDecoder::new(move |col| {
        let col_name = col.to_string();
        let element = element.clone();
        NamedDeserializer::new(move |row| {
            let items = match row.value_of(&col_name) {
                None => DecodeResult::failure(format!(
                    "No column named '{}' exists in the list of cols '{}'",
                    col_name,
                    row.columns().join(", ")
                )),
                Some(SqlValue::Array(values)) => {
                    let mut acc = DecodeResult::Success(Vec::with_capacity(values.len()));
                    for (i, value) in values.iter().enumerate() {
                        let label = i.to_string();
                        let synthetic =
                            SqlRow::new(vec![label.clone()], vec![value.clone()]);
                        let item = element.for_column(&label).decode(&synthetic);
                        acc = acc.zip_with(item, |mut decoded, v| {
                            decoded.push(v);
                            decoded
                        });
                    }
                    acc
                }
                Some(other) => DecodeResult::failure(format!(
                    "Column '{}': '{}' is not an array",
                    col_name, other
                )),
            };
            match items {
                DecodeResult::Success(decoded) => DecodeResult::Success(decoded),
                DecodeResult::Failure(mut messages) => {
                    let mut all =
                        vec![format!("Items in array of col '{}' are not valid", col_name)];
                    all.append(&mut messages);
                    DecodeResult::Failure(all)
                }
            }
        })
    })
}

/// Positional counterparts of the column decoders, addressed by index
pub mod positional {
    use super::*;

    /// Decode an integer at a position as `i64`
    pub fn integer() -> PositionalDeserializer<i64> {
        PositionalDeserializer::from_definition(
            |value| match value {
                SqlValue::Int(v) => Some(*v as i64),
                SqlValue::Long(v) => Some(*v),
                _ => None,
            },
            |value| format!("'{}' is not an integer", value),
        )
    }

    /// Decode any numeric value at a position as `f64`
    pub fn number() -> PositionalDeserializer<f64> {
        PositionalDeserializer::from_definition(
            |value| match value {
                SqlValue::Int(v) => Some(*v as f64),
                SqlValue::Long(v) => Some(*v as f64),
                SqlValue::Double(v) => Some(*v),
                _ => None,
            },
            |value| format!("'{}' is not a number", value),
        )
    }

    /// Decode a string at a position
    pub fn string() -> PositionalDeserializer<String> {
        PositionalDeserializer::from_definition(
            |value| match value {
                SqlValue::String(s) => Some(s.clone()),
                _ => None,
            },
            |value| format!("'{}' is not a string", value),
        )
    }

    /// Decode a boolean at a position
    pub fn boolean() -> PositionalDeserializer<bool> {
        PositionalDeserializer::from_definition(
            |value| match value {
                SqlValue::Bool(v) => Some(*v),
                _ => None,
            },
            |value| format!("'{}' is not a boolean", value),
        )
    }
}
