//! Driver value and row types
//!
//! This module defines the scalar values that can be sent to and received
//! from the driver, and the row shape returned by queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar value supported by the driver, used both as a query parameter
/// and as a decoded column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit floating point
    Double(f64),
    /// String value
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Timestamp with time zone
    Timestamp(DateTime<Utc>),
    /// JSON document
    Json(serde_json::Value),
    /// Array of scalar values
    Array(Vec<SqlValue>),
}

impl SqlValue {
    /// Check if the value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Long(_) => "long",
            SqlValue::Double(_) => "double",
            SqlValue::String(_) => "string",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::Json(_) => "json",
            SqlValue::Array(_) => "array",
        }
    }
}

/// Display form used inside decode failure messages
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "null"),
            SqlValue::Bool(v) => write!(f, "{}", v),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Long(v) => write!(f, "{}", v),
            SqlValue::Double(v) => write!(f, "{}", v),
            SqlValue::String(s) => write!(f, "{}", s),
            SqlValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            SqlValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            SqlValue::Json(v) => write!(f, "{}", v),
            SqlValue::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Long(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Double(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        SqlValue::Json(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => SqlValue::Null,
        }
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for SqlValue {
    fn from(v: Vec<T>) -> Self {
        SqlValue::Array(v.into_iter().map(Into::into).collect())
    }
}

/// A row returned by the driver: ordered column names plus ordered values.
///
/// Column order is part of the driver contract, so one representation serves
/// both positional decoding (by index) and named decoding (by column name).
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl SqlRow {
    /// Create a row from parallel column and value lists
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Create a positional row; column names are synthesized from indices
    pub fn from_values(values: Vec<SqlValue>) -> Self {
        let columns = (0..values.len()).map(|i| i.to_string()).collect();
        Self { columns, values }
    }

    /// Create a row from (column, value) pairs
    pub fn from_pairs<S, I>(pairs: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, SqlValue)>,
    {
        let (columns, values): (Vec<String>, Vec<SqlValue>) =
            pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self { columns, values }
    }

    /// Number of columns in the row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a position, if the row is wide enough
    pub fn value_at(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    /// Value of a named column, if present
    pub fn value_of(&self, col: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == col)
            .and_then(|idx| self.values.get(idx))
    }

    /// Column names, in driver order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values, in driver order
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}
