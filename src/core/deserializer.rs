//! Deserializer combinator algebra
//!
//! Two parallel flavors decode the untyped rows returned by the driver:
//! positional deserializers address values by index and track how many
//! positions they consume, named deserializers address values by column
//! name. Both are immutable, shareable values built by composition, and
//! both accumulate failures through [`DecodeResult`] so a multi-column
//! decode reports every bad column at once.

use crate::core::result::DecodeResult;
use crate::core::value::{SqlRow, SqlValue};
use std::sync::Arc;

type PositionalFn<T> = dyn Fn(&SqlRow, usize) -> DecodeResult<T> + Send + Sync;
type NamedFn<T> = dyn Fn(&SqlRow) -> DecodeResult<T> + Send + Sync;
type ColumnFn<T> = dyn Fn(&str) -> NamedDeserializer<T> + Send + Sync;

/// Decodes a row addressed as an ordered value list, starting at an index.
///
/// `width` is the number of positions the deserializer consumes; `zip`
/// offsets the right-hand deserializer by the left one's width.
pub struct PositionalDeserializer<T> {
    width: usize,
    decode_fn: Arc<PositionalFn<T>>,
}

impl<T> Clone for PositionalDeserializer<T> {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            decode_fn: Arc::clone(&self.decode_fn),
        }
    }
}

impl<T: 'static> PositionalDeserializer<T> {
    /// Build a deserializer from its width and decode function
    pub fn new(
        width: usize,
        decode_fn: impl Fn(&SqlRow, usize) -> DecodeResult<T> + Send + Sync + 'static,
    ) -> Self {
        debug_assert!(width >= 1);
        Self {
            width,
            decode_fn: Arc::new(decode_fn),
        }
    }

    /// Build a single-position deserializer from a value extractor and an
    /// error-message formatter. The extractor is the one place runtime type
    /// checking happens; everything above composes total functions.
    pub fn from_definition(
        extract: impl Fn(&SqlValue) -> Option<T> + Send + Sync + 'static,
        message: impl Fn(&SqlValue) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::new(1, move |row, idx| match row.value_at(idx) {
            None => DecodeResult::failure(format!(
                "There must be at least {} values in a row",
                idx + 1
            )),
            Some(value) => match extract(value) {
                Some(decoded) => DecodeResult::Success(decoded),
                None => DecodeResult::failure(format!("Column '{}': {}", idx, message(value))),
            },
        })
    }

    /// Number of positions this deserializer consumes
    pub fn width(&self) -> usize {
        self.width
    }

    /// Decode a row from its first position
    pub fn decode(&self, row: &SqlRow) -> DecodeResult<T> {
        (self.decode_fn)(row, 0)
    }

    /// Decode a row starting at the given position
    pub fn decode_at(&self, row: &SqlRow, idx: usize) -> DecodeResult<T> {
        (self.decode_fn)(row, idx)
    }

    /// Transform the decoded value, preserving width
    pub fn map<U: 'static>(
        self,
        f: impl Fn(T) -> U + Send + Sync + 'static,
    ) -> PositionalDeserializer<U> {
        let inner = self.decode_fn;
        PositionalDeserializer::new(self.width, move |row, idx| inner(row, idx).map(&f))
    }

    /// Chain into a failable transform; its failure messages replace the
    /// success value
    pub fn transform<U: 'static>(
        self,
        f: impl Fn(T) -> DecodeResult<U> + Send + Sync + 'static,
    ) -> PositionalDeserializer<U> {
        let inner = self.decode_fn;
        PositionalDeserializer::new(self.width, move |row, idx| inner(row, idx).and_then(&f))
    }

    /// Try `self`; on failure, retry `other` at the same starting position.
    /// If both fail, the failure messages of both sides are kept.
    pub fn or(self, other: PositionalDeserializer<T>) -> PositionalDeserializer<T> {
        let left = self.decode_fn;
        let right = other.decode_fn;
        PositionalDeserializer::new(self.width, move |row, idx| match left(row, idx) {
            DecodeResult::Success(value) => DecodeResult::Success(value),
            DecodeResult::Failure(mut left_messages) => match right(row, idx) {
                DecodeResult::Success(value) => DecodeResult::Success(value),
                DecodeResult::Failure(right_messages) => {
                    left_messages.extend(right_messages);
                    DecodeResult::Failure(left_messages)
                }
            },
        })
    }

    /// Succeed with `None` when the addressed value is SQL NULL
    pub fn or_null(self) -> PositionalDeserializer<Option<T>> {
        let width = self.width;
        self.map(Some).or(PositionalDeserializer::new(
            width,
            |row, idx| match row.value_at(idx) {
                Some(SqlValue::Null) => DecodeResult::Success(None),
                Some(other) => {
                    DecodeResult::failure(format!("Column '{}': '{}' is not null", idx, other))
                }
                None => DecodeResult::failure(format!(
                    "There must be at least {} values in a row",
                    idx + 1
                )),
            },
        ))
    }

    /// Decode two adjacent value groups; the right deserializer starts
    /// after the positions consumed by the left one
    pub fn zip<U: 'static>(
        self,
        other: PositionalDeserializer<U>,
    ) -> PositionalDeserializer<(T, U)> {
        let left_width = self.width;
        let left = self.decode_fn;
        let right = other.decode_fn;
        PositionalDeserializer::new(left_width + other.width, move |row, idx| {
            left(row, idx).zip(right(row, idx + left_width))
        })
    }

    /// Like [`zip`](Self::zip), combining the two values with `f`
    pub fn zip_with<U: 'static, V: 'static>(
        self,
        other: PositionalDeserializer<U>,
        f: impl Fn(T, U) -> V + Send + Sync + 'static,
    ) -> PositionalDeserializer<V> {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// Decode an ordered tuple of same-typed values, each deserializer
    /// consuming its own width; all failures are accumulated
    pub fn sequence(
        deserializers: Vec<PositionalDeserializer<T>>,
    ) -> PositionalDeserializer<Vec<T>> {
        let total_width: usize = deserializers.iter().map(|d| d.width).sum();
        PositionalDeserializer::new(total_width.max(1), move |row, start| {
            let mut acc = DecodeResult::Success(Vec::with_capacity(deserializers.len()));
            let mut idx = start;
            for deserializer in &deserializers {
                let item = (deserializer.decode_fn)(row, idx);
                idx += deserializer.width;
                acc = acc.zip_with(item, |mut values, value| {
                    values.push(value);
                    values
                });
            }
            acc
        })
    }
}

/// Decodes a row addressed by column names. Carries no width.
pub struct NamedDeserializer<T> {
    decode_fn: Arc<NamedFn<T>>,
}

impl<T> Clone for NamedDeserializer<T> {
    fn clone(&self) -> Self {
        Self {
            decode_fn: Arc::clone(&self.decode_fn),
        }
    }
}

impl<T: 'static> NamedDeserializer<T> {
    /// Build a deserializer from its decode function
    pub fn new(decode_fn: impl Fn(&SqlRow) -> DecodeResult<T> + Send + Sync + 'static) -> Self {
        Self {
            decode_fn: Arc::new(decode_fn),
        }
    }

    /// A deserializer that always succeeds with the given value
    pub fn of(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        NamedDeserializer::new(move |_| DecodeResult::Success(value.clone()))
    }

    /// Decode a row
    pub fn decode(&self, row: &SqlRow) -> DecodeResult<T> {
        (self.decode_fn)(row)
    }

    /// Transform the decoded value
    pub fn map<U: 'static>(
        self,
        f: impl Fn(T) -> U + Send + Sync + 'static,
    ) -> NamedDeserializer<U> {
        let inner = self.decode_fn;
        NamedDeserializer::new(move |row| inner(row).map(&f))
    }

    /// Chain into a failable transform
    pub fn transform<U: 'static>(
        self,
        f: impl Fn(T) -> DecodeResult<U> + Send + Sync + 'static,
    ) -> NamedDeserializer<U> {
        let inner = self.decode_fn;
        NamedDeserializer::new(move |row| inner(row).and_then(&f))
    }

    /// Chain into a deserializer chosen from the decoded value; strictly
    /// sequential, the continuation sees the same row
    pub fn chain<U: 'static>(
        self,
        f: impl Fn(T) -> NamedDeserializer<U> + Send + Sync + 'static,
    ) -> NamedDeserializer<U> {
        let inner = self.decode_fn;
        NamedDeserializer::new(move |row| match inner(row) {
            DecodeResult::Success(value) => f(value).decode(row),
            DecodeResult::Failure(messages) => DecodeResult::Failure(messages),
        })
    }

    /// Try `self`; on failure retry `other` against the same row, keeping
    /// both failure message sets if both fail
    pub fn or(self, other: NamedDeserializer<T>) -> NamedDeserializer<T> {
        let left = self.decode_fn;
        let right = other.decode_fn;
        NamedDeserializer::new(move |row| match left(row) {
            DecodeResult::Success(value) => DecodeResult::Success(value),
            DecodeResult::Failure(mut left_messages) => match right(row) {
                DecodeResult::Success(value) => DecodeResult::Success(value),
                DecodeResult::Failure(right_messages) => {
                    left_messages.extend(right_messages);
                    DecodeResult::Failure(left_messages)
                }
            },
        })
    }

    /// Rewrite failure messages, leaving successes untouched
    pub fn map_failure(
        self,
        f: impl Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static,
    ) -> NamedDeserializer<T> {
        let inner = self.decode_fn;
        NamedDeserializer::new(move |row| match inner(row) {
            DecodeResult::Success(value) => DecodeResult::Success(value),
            DecodeResult::Failure(messages) => DecodeResult::Failure(f(messages)),
        })
    }

    /// Decode two independent column groups against the same row,
    /// accumulating failures from both
    pub fn zip<U: 'static>(self, other: NamedDeserializer<U>) -> NamedDeserializer<(T, U)> {
        let left = self.decode_fn;
        let right = other.decode_fn;
        NamedDeserializer::new(move |row| left(row).zip(right(row)))
    }

    /// Like [`zip`](Self::zip), combining the two values with `f`
    pub fn zip_with<U: 'static, V: 'static>(
        self,
        other: NamedDeserializer<U>,
        f: impl Fn(T, U) -> V + Send + Sync + 'static,
    ) -> NamedDeserializer<V> {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// Decode a list of same-typed column groups against the same row,
    /// accumulating every failure
    pub fn sequence(deserializers: Vec<NamedDeserializer<T>>) -> NamedDeserializer<Vec<T>> {
        NamedDeserializer::new(move |row| {
            DecodeResult::sequence(deserializers.iter().map(|d| d.decode(row)))
        })
    }
}

/// A reusable column decoder: a factory producing a [`NamedDeserializer`]
/// once bound to a column name.
///
/// Most decoders are shared across columns of the same type, so the column
/// name is supplied last:
///
/// ```
/// use sqlweave::core::decoders;
///
/// let price = decoders::number().for_column("price");
/// let tax = decoders::number().for_column("tax");
/// ```
pub struct ColumnDecoder<T> {
    bind_fn: Arc<ColumnFn<T>>,
}

impl<T> Clone for ColumnDecoder<T> {
    fn clone(&self) -> Self {
        Self {
            bind_fn: Arc::clone(&self.bind_fn),
        }
    }
}

impl<T: 'static> ColumnDecoder<T> {
    /// Build a decoder from a column-binding function
    pub fn new(bind_fn: impl Fn(&str) -> NamedDeserializer<T> + Send + Sync + 'static) -> Self {
        Self {
            bind_fn: Arc::new(bind_fn),
        }
    }

    /// Build a decoder from a value extractor and an error-message
    /// formatter. A missing column fails citing the available column list;
    /// a value rejected by the extractor fails with the formatted message.
    pub fn from_definition(
        extract: impl Fn(&SqlValue) -> Option<T> + Send + Sync + 'static,
        message: impl Fn(&SqlValue) -> String + Send + Sync + 'static,
    ) -> Self {
        let extract = Arc::new(extract);
        let message = Arc::new(message);
        ColumnDecoder::new(move |col| {
            let col = col.to_string();
            let extract = Arc::clone(&extract);
            let message = Arc::clone(&message);
            NamedDeserializer::new(move |row| match row.value_of(&col) {
                None => DecodeResult::failure(format!(
                    "No column named '{}' exists in the list of cols '{}'",
                    col,
                    row.columns().join(", ")
                )),
                Some(value) => match extract(value) {
                    Some(decoded) => DecodeResult::Success(decoded),
                    None => {
                        DecodeResult::failure(format!("Column '{}': {}", col, message(value)))
                    }
                },
            })
        })
    }

    /// Bind the decoder to a column name
    pub fn for_column(&self, col: &str) -> NamedDeserializer<T> {
        (self.bind_fn)(col)
    }

    /// Transform the decoded value
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> ColumnDecoder<U> {
        let f = Arc::new(f);
        let inner = self.bind_fn;
        ColumnDecoder::new(move |col| {
            let f = Arc::clone(&f);
            inner(col).map(move |value| f(value))
        })
    }

    /// Chain into a failable transform
    pub fn transform<U: 'static>(
        self,
        f: impl Fn(T) -> DecodeResult<U> + Send + Sync + 'static,
    ) -> ColumnDecoder<U> {
        let f = Arc::new(f);
        let inner = self.bind_fn;
        ColumnDecoder::new(move |col| {
            let f = Arc::clone(&f);
            inner(col).transform(move |value| f(value))
        })
    }

    /// Rewrite failure messages; the bound column name is passed along
    pub fn map_failure(
        self,
        f: impl Fn(&str, Vec<String>) -> Vec<String> + Send + Sync + 'static,
    ) -> ColumnDecoder<T> {
        let f = Arc::new(f);
        let inner = self.bind_fn;
        ColumnDecoder::new(move |col| {
            let col_name = col.to_string();
            let f = Arc::clone(&f);
            inner(col).map_failure(move |messages| f(&col_name, messages))
        })
    }

    /// Try `self`; on failure retry `other` on the same column
    pub fn or(self, other: ColumnDecoder<T>) -> ColumnDecoder<T> {
        let left = self.bind_fn;
        let right = other.bind_fn;
        ColumnDecoder::new(move |col| left(col).or(right(col)))
    }

    /// Succeed with `None` when the column holds SQL NULL
    pub fn or_null(self) -> ColumnDecoder<Option<T>> {
        self.map(Some).or(ColumnDecoder::from_definition(
            |value| value.is_null().then_some(None),
            |value| format!("'{}' is not null", value),
        ))
    }
}

/// Something that can decode a whole row; implemented by both deserializer
/// flavors so queries accept either.
pub trait RowDecode<T>: Clone + Send + Sync + 'static {
    /// Decode one row
    fn decode_row(&self, row: &SqlRow) -> DecodeResult<T>;
}

impl<T: 'static> RowDecode<T> for NamedDeserializer<T> {
    fn decode_row(&self, row: &SqlRow) -> DecodeResult<T> {
        self.decode(row)
    }
}

impl<T: 'static> RowDecode<T> for PositionalDeserializer<T> {
    fn decode_row(&self, row: &SqlRow) -> DecodeResult<T> {
        self.decode(row)
    }
}

/// Field sources accepted by [`from_columns!`](crate::from_columns): either
/// a [`ColumnDecoder`] (bound to the field name) or an already-bound
/// [`NamedDeserializer`] (the field name is ignored).
pub trait FieldDecode<T> {
    /// Resolve to a deserializer for the given struct field
    fn for_field(self, field: &str) -> NamedDeserializer<T>;
}

impl<T: 'static> FieldDecode<T> for ColumnDecoder<T> {
    fn for_field(self, field: &str) -> NamedDeserializer<T> {
        self.for_column(field)
    }
}

impl<T: 'static> FieldDecode<T> for NamedDeserializer<T> {
    fn for_field(self, _field: &str) -> NamedDeserializer<T> {
        self
    }
}

/// Decode a struct by decoding every field against the same row.
///
/// Field names double as column names unless a field is given an
/// already-bound deserializer (`decoders::string().for_column("other")`).
/// All field failures are accumulated in field-declaration order, so a
/// multi-column decode reports every bad column at once.
///
/// ```
/// use sqlweave::{decoders, from_columns};
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// let user = from_columns!(User {
///     id: decoders::integer(),
///     name: decoders::string(),
/// });
/// ```
#[macro_export]
macro_rules! from_columns {
    ($ty:path { $($field:ident : $decoder:expr),+ $(,)? }) => {{
        $(
            let $field =
                $crate::core::deserializer::FieldDecode::for_field($decoder, stringify!($field));
        )+
        $crate::core::deserializer::NamedDeserializer::new(move |row| {
            // A path metavariable cannot head a struct literal, so go
            // through a local alias.
            type Target = $ty;
            $(let $field = $field.decode(row);)+
            let mut failures: ::std::vec::Vec<::std::string::String> = ::std::vec::Vec::new();
            $(
                if let $crate::core::result::DecodeResult::Failure(messages) = &$field {
                    failures.extend(messages.iter().cloned());
                }
            )+
            if failures.is_empty() {
                $crate::core::result::DecodeResult::Success(Target {
                    $($field: match $field {
                        $crate::core::result::DecodeResult::Success(value) => value,
                        $crate::core::result::DecodeResult::Failure(_) => unreachable!(),
                    }),+
                })
            } else {
                $crate::core::result::DecodeResult::Failure(failures)
            }
        })
    }};
}
