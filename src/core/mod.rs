//! Core query-construction and result-decoding layer
//!
//! Everything in here is backend-agnostic: fragments compose into
//! parameterized queries, deserializers turn rows into values while
//! accumulating every failure, and the executor drives units of work
//! against whatever [`client::ConnectionPool`] it is given.

pub mod client;
pub mod decoders;
pub mod deserializer;
pub mod error;
pub mod executor;
pub mod fragment;
pub mod query;
pub mod result;
pub mod value;

pub use client::{ConnectionPool, DriverError, QueryClient};
pub use deserializer::{
    ColumnDecoder, FieldDecode, NamedDeserializer, PositionalDeserializer, RowDecode,
};
pub use error::{Result, SqlError};
pub use executor::SqlExecutor;
pub use fragment::{SqlArg, SqlFragment};
pub use query::{ExecutableQuery, SqlQuery};
pub use result::DecodeResult;
pub use value::{SqlRow, SqlValue};
