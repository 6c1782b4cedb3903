//! Error types for query execution and row decoding
//!
//! Two error channels exist and stay separate until the caller boundary:
//! decode failures accumulate human-readable messages per column, while
//! driver failures carry the query text that triggered them.

use crate::core::client::DriverError;

/// Result type alias for query operations
pub type Result<T> = std::result::Result<T, SqlError>;

/// Error types for query execution and decoding
#[derive(Debug, thiserror::Error)]
pub enum SqlError {
    /// The driver rejected a query; the message embeds the exact SQL text
    #[error("Got \"{message}\" on query \"{query}\"")]
    Execution {
        query: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One or more rows could not be decoded into the expected shape
    #[error("{}", .messages.join(", "))]
    Decode { messages: Vec<String> },

    /// A client could not be checked out of the pool
    #[error("Connection error: {0}")]
    Connection(String),
}

impl SqlError {
    /// Create an execution error without an underlying driver cause
    pub fn execution(query: impl Into<String>, message: impl Into<String>) -> Self {
        SqlError::Execution {
            query: query.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a driver error, attaching the query text it was triggered by
    pub fn from_driver(query: impl Into<String>, driver: DriverError) -> Self {
        let (message, source) = driver.into_parts();
        SqlError::Execution {
            query: query.into(),
            message,
            source,
        }
    }

    /// Create a decode error from accumulated failure messages
    pub fn decode(messages: Vec<String>) -> Self {
        SqlError::Decode { messages }
    }

    /// Create a decode error carrying a single message
    pub fn decode_message(message: impl Into<String>) -> Self {
        SqlError::Decode {
            messages: vec![message.into()],
        }
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        SqlError::Connection(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_display_embeds_query_text() {
        let err = SqlError::execution(
            "SELECT name FROM brownies",
            "relation \"brownies\" does not exist",
        );
        assert_eq!(
            err.to_string(),
            "Got \"relation \"brownies\" does not exist\" on query \"SELECT name FROM brownies\""
        );
    }

    #[test]
    fn test_decode_display_joins_messages() {
        let err = SqlError::decode(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(err.to_string(), "first, second");
    }

    #[test]
    fn test_from_driver_keeps_source() {
        let driver = DriverError::new("boom");
        let err = SqlError::from_driver("SELECT 1", driver);
        assert!(matches!(err, SqlError::Execution { .. }));
        assert_eq!(err.to_string(), "Got \"boom\" on query \"SELECT 1\"");
    }
}
