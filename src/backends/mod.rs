//! Database backend implementations
//!
//! Backends adapt a concrete driver to the [`crate::core::QueryClient`] and
//! [`crate::core::ConnectionPool`] traits. Only PostgreSQL is provided at
//! the moment, behind the `postgres` feature.

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::{PostgresClient, PostgresPool};
