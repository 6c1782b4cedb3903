//! # sqlweave
//!
//! Composable SQL construction and result decoding for async Rust.
//!
//! Queries are built from [`core::SqlFragment`] values that carry their
//! bind parameters with them, so placeholder numbering is assigned once,
//! at the end, no matter how deeply fragments nest. Rows coming back are
//! decoded by combinator-style deserializers that report *every* failing
//! column instead of stopping at the first one. Execution happens through
//! object-safe [`core::QueryClient`] / [`core::ConnectionPool`] traits,
//! with a PostgreSQL backend provided behind the `postgres` feature.
//!
//! ## Quick example
//!
//! ```no_run
//! # async fn example() -> sqlweave::Result<()> {
//! use sqlweave::backends::PostgresPool;
//! use sqlweave::core::decoders;
//! use sqlweave::prelude::*;
//! use sqlweave::{from_columns, sql};
//!
//! #[derive(Debug)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! let decode_user = from_columns!(User {
//!     id: decoders::integer(),
//!     name: decoders::string(),
//! });
//!
//! let executor = SqlExecutor::new(PostgresPool::connect("postgres://localhost/app")?);
//! let min_id = 10i64;
//! let users = executor
//!     .run(sql!("SELECT id, name FROM users WHERE id > " {min_id})
//!         .into_query()
//!         .list(decode_user))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod core;

pub use crate::core::decoders;
pub use crate::core::error::{Result, SqlError};
pub use crate::core::executor::SqlExecutor;
pub use crate::core::fragment::{SqlArg, SqlFragment};
pub use crate::core::query::{ExecutableQuery, SqlQuery};
pub use crate::core::value::{SqlRow, SqlValue};

/// Common imports for working with the crate
pub mod prelude {
    pub use crate::core::client::{ConnectionPool, DriverError, QueryClient};
    pub use crate::core::decoders;
    pub use crate::core::deserializer::{
        ColumnDecoder, FieldDecode, NamedDeserializer, PositionalDeserializer, RowDecode,
    };
    pub use crate::core::error::{Result, SqlError};
    pub use crate::core::executor::SqlExecutor;
    pub use crate::core::fragment::{SqlArg, SqlFragment};
    pub use crate::core::query::{ExecutableQuery, SqlQuery};
    pub use crate::core::result::DecodeResult;
    pub use crate::core::value::{SqlRow, SqlValue};

    #[cfg(feature = "postgres")]
    pub use crate::backends::{PostgresClient, PostgresPool};
}
