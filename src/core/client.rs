//! The narrow contract with the connection/pool collaborator
//!
//! The core only needs a client able to execute one parameterized query
//! and return rows with their column order, and a pool able to check out
//! such a client exclusively. Pooling, health checks and the wire protocol
//! all live behind these two traits.

use crate::core::error::Result;
use crate::core::value::{SqlRow, SqlValue};
use async_trait::async_trait;
use std::fmt;

/// Error surfaced by the driver for one query round trip.
///
/// Converted into [`SqlError::Execution`](crate::core::error::SqlError) at
/// the query layer, where the SQL text is known.
#[derive(Debug)]
pub struct DriverError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DriverError {
    /// Create a driver error from a bare message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a driver error keeping the underlying cause
    pub fn with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source),
        }
    }

    /// The driver's message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Split into message and cause
    pub fn into_parts(self) -> (String, Option<Box<dyn std::error::Error + Send + Sync>>) {
        (self.message, self.source)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A checked-out connection able to run one parameterized query.
///
/// `BEGIN`/`COMMIT`/`ROLLBACK` go through the same method with no
/// parameters. Implementations must tolerate concurrent `query` calls on
/// one handle (pipelining) for `zip`/`sequence` to overlap round trips.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Execute `text` with `values` bound to its `$n` placeholders and
    /// return the resulting rows in order
    async fn query(
        &self,
        text: &str,
        values: &[SqlValue],
    ) -> std::result::Result<Vec<SqlRow>, DriverError>;
}

/// A pool handing out exclusively-owned clients.
///
/// Release happens when the client is dropped, which guarantees it on
/// every exit path of the executor.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// The client type handed out by this pool
    type Client: QueryClient + 'static;

    /// Check out an exclusive client
    async fn acquire(&self) -> Result<Self::Client>;
}
