//! Error-accumulating decode result
//!
//! Unlike `std::result::Result`, combining two failed `DecodeResult`s with
//! `zip` concatenates their messages instead of keeping only the first.
//! This is what lets a wide-row decode report every bad column at once.

use crate::core::error::SqlError;

/// Success-or-accumulated-failure value used throughout decoding.
///
/// A `Failure` always carries at least one message; construct failures with
/// [`DecodeResult::failure`] to keep that invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeResult<T> {
    /// The decoded value
    Success(T),
    /// Ordered, non-empty list of failure messages
    Failure(Vec<String>),
}

impl<T> DecodeResult<T> {
    /// Create a failure carrying a single message
    pub fn failure(message: impl Into<String>) -> Self {
        DecodeResult::Failure(vec![message.into()])
    }

    /// Check whether this is a `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, DecodeResult::Success(_))
    }

    /// Transform the success value, leaving failures untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DecodeResult<U> {
        match self {
            DecodeResult::Success(value) => DecodeResult::Success(f(value)),
            DecodeResult::Failure(messages) => DecodeResult::Failure(messages),
        }
    }

    /// Chain into a failable continuation; short-circuits on failure
    pub fn and_then<U>(self, f: impl FnOnce(T) -> DecodeResult<U>) -> DecodeResult<U> {
        match self {
            DecodeResult::Success(value) => f(value),
            DecodeResult::Failure(messages) => DecodeResult::Failure(messages),
        }
    }

    /// Retry a failure with an alternative; successes pass through unchanged
    pub fn recover(self, f: impl FnOnce(&[String]) -> DecodeResult<T>) -> DecodeResult<T> {
        match self {
            DecodeResult::Success(value) => DecodeResult::Success(value),
            DecodeResult::Failure(messages) => f(&messages),
        }
    }

    /// Pair two results, accumulating failures from both sides.
    ///
    /// If both sides fail, the left messages come before the right ones.
    pub fn zip<U>(self, other: DecodeResult<U>) -> DecodeResult<(T, U)> {
        match (self, other) {
            (DecodeResult::Success(a), DecodeResult::Success(b)) => DecodeResult::Success((a, b)),
            (DecodeResult::Failure(mut left), DecodeResult::Failure(right)) => {
                left.extend(right);
                DecodeResult::Failure(left)
            }
            (DecodeResult::Failure(messages), DecodeResult::Success(_)) => {
                DecodeResult::Failure(messages)
            }
            (DecodeResult::Success(_), DecodeResult::Failure(messages)) => {
                DecodeResult::Failure(messages)
            }
        }
    }

    /// Like [`zip`](Self::zip), combining the two success values with `f`
    pub fn zip_with<U, V>(
        self,
        other: DecodeResult<U>,
        f: impl FnOnce(T, U) -> V,
    ) -> DecodeResult<V> {
        self.zip(other).map(|(a, b)| f(a, b))
    }

    /// Collect a list of results into a result of a list, folding with
    /// [`zip`](Self::zip) so that every failure message is kept.
    pub fn sequence(results: impl IntoIterator<Item = DecodeResult<T>>) -> DecodeResult<Vec<T>> {
        let mut acc = DecodeResult::Success(Vec::new());
        for result in results {
            acc = acc.zip_with(result, |mut values, value| {
                values.push(value);
                values
            });
        }
        acc
    }

    /// Boundary conversion: failures become a [`SqlError::Decode`] whose
    /// display joins the messages with ", "
    pub fn into_result(self) -> Result<T, SqlError> {
        match self {
            DecodeResult::Success(value) => Ok(value),
            DecodeResult::Failure(messages) => Err(SqlError::decode(messages)),
        }
    }
}
