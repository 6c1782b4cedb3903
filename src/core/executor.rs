//! Transactional execution of units of work
//!
//! The executor owns the connection lifecycle for one call: it checks a
//! client out of the injected pool, runs the unit of work (optionally
//! inside a transaction), and releases the client on every exit path by
//! letting the handle drop.

use crate::core::client::{ConnectionPool, QueryClient};
use crate::core::error::{Result, SqlError};
use crate::core::query::ExecutableQuery;
use tracing::{debug, warn};

/// Runs [`ExecutableQuery`] values against a pool, as a single run or
/// inside a transaction.
///
/// ```no_run
/// # async fn example() -> sqlweave::Result<()> {
/// use sqlweave::backends::PostgresPool;
/// use sqlweave::core::decoders;
/// use sqlweave::{sql, SqlExecutor};
///
/// let pool = PostgresPool::connect("postgres://localhost/app")?;
/// let executor = SqlExecutor::new(pool);
///
/// let ids = executor
///     .run(sql!("SELECT id FROM users").into_query().list(
///         decoders::integer().for_column("id"),
///     ))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct SqlExecutor<P> {
    pool: P,
}

impl<P: ConnectionPool> SqlExecutor<P> {
    /// Create an executor over a pool
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Check out a client, run the unit of work, release the client.
    /// No transaction is opened; meant for reads and fire-and-forget
    /// statements.
    pub async fn run<T: Send + 'static>(&self, work: ExecutableQuery<T>) -> Result<T> {
        let client = self.pool.acquire().await?;
        work.run(&client).await
    }

    /// Check out a client and run the unit of work inside a transaction.
    ///
    /// On success the transaction is committed; on any error (driver,
    /// decode, or a failing `COMMIT`) a best-effort `ROLLBACK` is issued
    /// and the original error is re-thrown. The client is released in all
    /// cases when its handle drops.
    pub async fn transact<T: Send + 'static>(&self, work: ExecutableQuery<T>) -> Result<T> {
        let client = self.pool.acquire().await?;

        let outcome = match statement(&client, "BEGIN").await {
            Err(e) => Err(e),
            Ok(()) => match work.run(&client).await {
                Ok(value) => statement(&client, "COMMIT").await.map(|()| value),
                Err(e) => Err(e),
            },
        };

        match outcome {
            Ok(value) => {
                debug!("transaction committed");
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = statement(&client, "ROLLBACK").await {
                    warn!(error = %rollback_error, "rollback failed after transaction error");
                }
                Err(error)
            }
        }
    }
}

async fn statement<C: QueryClient>(client: &C, text: &str) -> Result<()> {
    client
        .query(text, &[])
        .await
        .map(|_| ())
        .map_err(|driver| SqlError::from_driver(text, driver))
}
