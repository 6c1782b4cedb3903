//! SQL fragment composition
//!
//! A fragment is SQL text with embedded holes, kept un-numbered so that
//! fragments can be nested and concatenated freely; placeholders are
//! assigned `$1..$n` once, when the fragment is lowered to a
//! [`SqlQuery`]. Bound values always travel as parameters, so composed
//! queries are injection-safe by construction.

use crate::core::query::SqlQuery;
use crate::core::value::SqlValue;
use std::ops::Add;

/// One hole in a fragment, decided at construction time
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    /// A scalar sent as a query parameter
    Value(SqlValue),
    /// Raw SQL text spliced in verbatim; contributes no placeholder.
    /// Never build one from user input.
    Raw(String),
    /// A nested fragment, flattened in place
    Fragment(SqlFragment),
}

/// Un-numbered, concatenable SQL: ordered literal pieces interleaved with
/// ordered parameter values.
///
/// Invariant: `pieces.len() == values.len() + 1`. Piece `i` is the text
/// before value `i`; the last piece is the trailing text.
///
/// Usually built with the [`sql!`](crate::sql) macro:
///
/// ```
/// use sqlweave::sql;
///
/// let id = 1i64;
/// let fragment = sql!("SELECT * FROM users WHERE id = " {id});
/// let query = fragment.into_query();
/// assert_eq!(query.text(), "SELECT * FROM users WHERE id = $1");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pieces: Vec<String>,
    values: Vec<SqlValue>,
}

impl Default for SqlFragment {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlFragment {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self {
            pieces: vec![String::new()],
            values: Vec::new(),
        }
    }

    /// Create a fragment from literal text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            pieces: vec![text.into()],
            values: Vec::new(),
        }
    }

    /// Append literal text onto the trailing piece
    #[must_use]
    pub fn push_text(mut self, text: impl AsRef<str>) -> Self {
        if let Some(last) = self.pieces.last_mut() {
            last.push_str(text.as_ref());
        }
        self
    }

    /// Bind a value: it becomes one placeholder at this spot
    #[must_use]
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.values.push(value.into());
        self.pieces.push(String::new());
        self
    }

    /// Splice raw SQL verbatim; introduces no placeholder
    #[must_use]
    pub fn raw(self, text: impl AsRef<str>) -> Self {
        self.push_text(text)
    }

    /// Splice a nested fragment: its head merges onto the trailing piece,
    /// its middle pieces stay standalone, its tail becomes the new trailing
    /// piece, and its values are appended in order. No renumbering happens
    /// here.
    #[must_use]
    pub fn append(mut self, other: SqlFragment) -> Self {
        let mut pieces = other.pieces.into_iter();
        if let (Some(head), Some(last)) = (pieces.next(), self.pieces.last_mut()) {
            last.push_str(&head);
        }
        self.pieces.extend(pieces);
        self.values.extend(other.values);
        self
    }

    /// Add one hole of any kind
    #[must_use]
    pub fn push(self, arg: SqlArg) -> Self {
        match arg {
            SqlArg::Value(value) => self.bind(value),
            SqlArg::Raw(text) => self.raw(&text),
            SqlArg::Fragment(fragment) => self.append(fragment),
        }
    }

    /// Literal pieces, in order
    pub fn pieces(&self) -> &[String] {
        &self.pieces
    }

    /// Bound values, in order
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Lower to a query: placeholders are numbered `$1..$n` in
    /// left-to-right textual order, matching the value list exactly
    pub fn into_query(self) -> SqlQuery {
        let mut text = String::new();
        for (i, piece) in self.pieces.iter().enumerate() {
            if i > 0 {
                text.push('$');
                text.push_str(&i.to_string());
            }
            text.push_str(piece);
        }
        SqlQuery::new(text, self.values)
    }
}

impl Add for SqlFragment {
    type Output = SqlFragment;

    fn add(self, other: SqlFragment) -> SqlFragment {
        self.append(other)
    }
}

impl From<SqlValue> for SqlArg {
    fn from(value: SqlValue) -> Self {
        SqlArg::Value(value)
    }
}

impl From<SqlFragment> for SqlArg {
    fn from(fragment: SqlFragment) -> Self {
        SqlArg::Fragment(fragment)
    }
}

/// Build a [`SqlFragment`] template-string style.
///
/// String literals are SQL text, `{expr}` binds a parameter, `[expr]`
/// splices a nested fragment, and `(expr)` splices a raw SQL constant:
///
/// ```
/// use sqlweave::sql;
///
/// let column = "name";
/// let condition = sql!("WHERE id = " {3});
/// let query = sql!("SELECT " (column) " FROM users " [condition] " AND active = " {true})
///     .into_query();
/// assert_eq!(
///     query.text(),
///     "SELECT name FROM users WHERE id = $1 AND active = $2"
/// );
/// ```
#[macro_export]
macro_rules! sql {
    () => { $crate::core::fragment::SqlFragment::new() };
    ($($part:tt)+) => {{
        let fragment = $crate::core::fragment::SqlFragment::new();
        $crate::sql_parts!(fragment, $($part)+)
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! sql_parts {
    ($fragment:expr,) => { $fragment };
    ($fragment:expr, {$value:expr} $($rest:tt)*) => {
        $crate::sql_parts!($fragment.bind($value), $($rest)*)
    };
    ($fragment:expr, [$sub:expr] $($rest:tt)*) => {
        $crate::sql_parts!($fragment.append($sub), $($rest)*)
    };
    ($fragment:expr, ($raw:expr) $($rest:tt)*) => {
        $crate::sql_parts!($fragment.raw($raw), $($rest)*)
    };
    ($fragment:expr, $text:literal $($rest:tt)*) => {
        $crate::sql_parts!($fragment.push_text($text), $($rest)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let query = sql!("SELECT * FROM users").into_query();
        assert_eq!(query.text(), "SELECT * FROM users");
        assert!(query.values().is_empty());
    }

    #[test]
    fn test_scalar_holes_are_numbered_in_order() {
        let query = sql!("SELECT * FROM users WHERE id = " {1} " AND name = " {"a"})
            .into_query();
        assert_eq!(
            query.text(),
            "SELECT * FROM users WHERE id = $1 AND name = $2"
        );
        assert_eq!(
            query.values(),
            &[SqlValue::Int(1), SqlValue::String("a".to_string())]
        );
    }

    #[test]
    fn test_nested_fragment_is_flattened_and_renumbered() {
        let inner = sql!("WHERE id = " {3});
        let query = sql!("SELECT " {5} " FROM t " [inner] " AND name = " {"x"}).into_query();

        assert_eq!(query.text(), "SELECT $1 FROM t WHERE id = $2 AND name = $3");
        assert_eq!(
            query.values(),
            &[
                SqlValue::Int(5),
                SqlValue::Int(3),
                SqlValue::String("x".to_string())
            ]
        );
    }

    #[test]
    fn test_raw_constant_contributes_no_placeholder() {
        let field = "name";
        let query = sql!("SELECT " (field) " FROM users WHERE id = " {1}).into_query();
        assert_eq!(query.text(), "SELECT name FROM users WHERE id = $1");
        assert_eq!(query.values(), &[SqlValue::Int(1)]);
    }

    #[test]
    fn test_concat_is_associative() {
        let a = sql!("SELECT " {1});
        let b = sql!(" FROM t WHERE x = " {2});
        let c = sql!(" AND y = " {3});

        let left = (a.clone() + b.clone()) + c.clone();
        let right = a + (b + c);

        assert_eq!(left, right);
        assert_eq!(
            left.into_query().text(),
            "SELECT $1 FROM t WHERE x = $2 AND y = $3"
        );
    }

    #[test]
    fn test_wrapping_a_fragment_is_a_no_op() {
        let a = sql!("SELECT * FROM t WHERE id = " {7});
        let wrapped = sql!([a.clone()]);
        assert_eq!(wrapped, a);
    }

    #[test]
    fn test_nested_fragment_at_both_ends() {
        let head = sql!("SELECT id FROM t WHERE a = " {1});
        let tail = sql!("ORDER BY " ("id"));
        let query = sql!([head] " AND b = " {2} " " [tail]).into_query();
        assert_eq!(
            query.text(),
            "SELECT id FROM t WHERE a = $1 AND b = $2 ORDER BY id"
        );
        assert_eq!(query.values(), &[SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn test_push_arg_kinds() {
        let fragment = SqlFragment::text("SELECT ")
            .push(SqlArg::Raw("name".to_string()))
            .push_text(" FROM t WHERE id = ")
            .push(SqlArg::Value(SqlValue::Int(4)));
        let query = fragment.into_query();
        assert_eq!(query.text(), "SELECT name FROM t WHERE id = $1");
        assert_eq!(query.values(), &[SqlValue::Int(4)]);
    }

    #[test]
    fn test_placeholder_count_matches_values() {
        let query = sql!("a " {1} " b " {2} " c " {3}).into_query();
        let placeholders = query.text().matches('$').count();
        assert_eq!(placeholders, query.values().len());
    }
}
