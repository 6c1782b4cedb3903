//! Finalized queries and their executable forms
//!
//! A [`SqlQuery`] is immutable, parameter-numbered SQL; binding a decode
//! strategy turns it into an [`ExecutableQuery`], pure data wrapping an
//! async `client -> Result<T>` that only touches the driver when run.

use crate::core::client::QueryClient;
use crate::core::deserializer::RowDecode;
use crate::core::error::{Result, SqlError};
use crate::core::value::{SqlRow, SqlValue};
use futures::future::{try_join, try_join_all, BoxFuture};
use std::sync::Arc;

/// Finalized SQL: `$1..$n`-numbered text plus the matching value list.
///
/// Built once, usually via
/// [`SqlFragment::into_query`](crate::core::fragment::SqlFragment::into_query),
/// and reusable across executions.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    text: String,
    values: Vec<SqlValue>,
}

impl SqlQuery {
    /// Create a query from already-numbered text and its values
    pub fn new(text: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self {
            text: text.into(),
            values,
        }
    }

    /// The parameter-numbered SQL text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The bound values, in placeholder order
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    async fn fetch(&self, client: &dyn QueryClient) -> Result<Vec<SqlRow>> {
        client
            .query(&self.text, &self.values)
            .await
            .map_err(|driver| SqlError::from_driver(self.text.clone(), driver))
    }

    /// Execute and discard any returned rows
    pub fn update(&self) -> ExecutableQuery<()> {
        let query = self.clone();
        ExecutableQuery::new(move |client| {
            let query = query.clone();
            Box::pin(async move {
                query.fetch(client).await?;
                Ok(())
            })
        })
    }

    /// Execute and decode every row, preserving row order.
    ///
    /// The first row that fails to decode aborts the whole list; that
    /// failure already aggregates every bad column within the row.
    pub fn list<T, D>(&self, deserializer: D) -> ExecutableQuery<Vec<T>>
    where
        T: Send + 'static,
        D: RowDecode<T>,
    {
        let query = self.clone();
        ExecutableQuery::new(move |client| {
            let query = query.clone();
            let deserializer = deserializer.clone();
            Box::pin(async move {
                let rows = query.fetch(client).await?;
                let mut decoded = Vec::with_capacity(rows.len());
                for row in &rows {
                    decoded.push(deserializer.decode_row(row).into_result()?);
                }
                Ok(decoded)
            })
        })
    }

    /// Execute and decode exactly one row; zero or multiple rows fail
    pub fn unique<T, D>(&self, deserializer: D) -> ExecutableQuery<T>
    where
        T: Send + 'static,
        D: RowDecode<T>,
    {
        let query = self.clone();
        ExecutableQuery::new(move |client| {
            let query = query.clone();
            let deserializer = deserializer.clone();
            Box::pin(async move {
                let rows = query.fetch(client).await?;
                match rows.as_slice() {
                    [] => Err(SqlError::decode_message(format!(
                        "No row returned for query \"{}\"",
                        query.text
                    ))),
                    [row] => deserializer.decode_row(row).into_result(),
                    _ => Err(SqlError::decode_message(format!(
                        "More than one row were returned for query \"{}\"",
                        query.text
                    ))),
                }
            })
        })
    }

    /// Execute and decode at most one row; zero rows yield `None`,
    /// multiple rows fail as in [`unique`](Self::unique)
    pub fn option<T, D>(&self, deserializer: D) -> ExecutableQuery<Option<T>>
    where
        T: Send + 'static,
        D: RowDecode<T>,
    {
        let query = self.clone();
        ExecutableQuery::new(move |client| {
            let query = query.clone();
            let deserializer = deserializer.clone();
            Box::pin(async move {
                let rows = query.fetch(client).await?;
                match rows.as_slice() {
                    [] => Ok(None),
                    [row] => deserializer.decode_row(row).into_result().map(Some),
                    _ => Err(SqlError::decode_message(format!(
                        "More than one row were returned for query \"{}\"",
                        query.text
                    ))),
                }
            })
        })
    }
}

type RunFn<T> = dyn for<'a> Fn(&'a dyn QueryClient) -> BoxFuture<'a, Result<T>> + Send + Sync;

/// A query bound to a decode strategy, ready to run against a client.
///
/// Pure data until [`run`](Self::run) is invoked; combinators compose
/// units of work without touching the driver. `chain`/`and_then` are
/// strictly sequential, while `zip`/`sequence` issue their queries
/// without awaiting each other's round trip, relying on the client's
/// pipelining.
pub struct ExecutableQuery<T> {
    run_fn: Arc<RunFn<T>>,
}

impl<T> Clone for ExecutableQuery<T> {
    fn clone(&self) -> Self {
        Self {
            run_fn: Arc::clone(&self.run_fn),
        }
    }
}

impl<T: Send + 'static> ExecutableQuery<T> {
    /// Wrap an async `client -> Result<T>` function
    pub fn new(
        run_fn: impl for<'a> Fn(&'a dyn QueryClient) -> BoxFuture<'a, Result<T>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            run_fn: Arc::new(run_fn),
        }
    }

    /// A unit of work that always yields `value`, whatever the client.
    /// Mostly useful as a neutral element in compositions and in tests.
    pub fn of(value: T) -> Self
    where
        T: Clone + Sync,
    {
        ExecutableQuery::new(move |_client| {
            let value = value.clone();
            Box::pin(async move { Ok(value) })
        })
    }

    /// Run against a client
    pub async fn run(&self, client: &dyn QueryClient) -> Result<T> {
        (self.run_fn)(client).await
    }

    /// Transform the result
    pub fn map<U: Send + 'static>(
        self,
        f: impl Fn(T) -> U + Send + Sync + 'static,
    ) -> ExecutableQuery<U> {
        let inner = self.run_fn;
        let f = Arc::new(f);
        ExecutableQuery::new(move |client| {
            let inner = Arc::clone(&inner);
            let f = Arc::clone(&f);
            Box::pin(async move { inner(client).await.map(|value| f(value)) })
        })
    }

    /// Run `self`, discard its result, then run `next` sequentially
    pub fn and_then<U: Send + 'static>(self, next: ExecutableQuery<U>) -> ExecutableQuery<U> {
        let left = self.run_fn;
        let right = next.run_fn;
        ExecutableQuery::new(move |client| {
            let left = Arc::clone(&left);
            let right = Arc::clone(&right);
            Box::pin(async move {
                left(client).await?;
                right(client).await
            })
        })
    }

    /// Run `self`, then feed its result to `f` and run the produced unit
    /// of work. Data-dependent, so strictly sequential.
    pub fn chain<U: Send + 'static>(
        self,
        f: impl Fn(T) -> ExecutableQuery<U> + Send + Sync + 'static,
    ) -> ExecutableQuery<U> {
        let inner = self.run_fn;
        let f = Arc::new(f);
        ExecutableQuery::new(move |client| {
            let inner = Arc::clone(&inner);
            let f = Arc::clone(&f);
            Box::pin(async move {
                let value = inner(client).await?;
                let next = f(value);
                next.run(client).await
            })
        })
    }

    /// Run both units of work concurrently against the same client; the
    /// result pair matches argument order regardless of completion order
    pub fn zip<U: Send + 'static>(self, other: ExecutableQuery<U>) -> ExecutableQuery<(T, U)> {
        let left = self.run_fn;
        let right = other.run_fn;
        ExecutableQuery::new(move |client| {
            let left = Arc::clone(&left);
            let right = Arc::clone(&right);
            Box::pin(async move { try_join(left(client), right(client)).await })
        })
    }

    /// Run every unit of work concurrently against the same client;
    /// output order matches input order regardless of completion order
    pub fn sequence(queries: Vec<ExecutableQuery<T>>) -> ExecutableQuery<Vec<T>> {
        ExecutableQuery::new(move |client| {
            let futures: Vec<_> = queries.iter().map(|q| (q.run_fn)(client)).collect();
            Box::pin(async move { try_join_all(futures).await })
        })
    }
}
