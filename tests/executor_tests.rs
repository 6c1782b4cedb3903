//! End-to-end tests for query execution over a scripted in-memory client
//!
//! The mock pool records every statement it sees and counts how many
//! clients have been handed back, which lets these tests pin down the
//! transaction protocol and the release guarantee without a server.

use async_trait::async_trait;
use sqlweave::core::decoders;
use sqlweave::prelude::*;
use sqlweave::sql;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    log: Vec<String>,
    responses: HashMap<String, Vec<SqlRow>>,
    fail_on: HashSet<String>,
    released: usize,
}

#[derive(Clone, Default)]
struct MockPool {
    state: Arc<Mutex<MockState>>,
}

impl MockPool {
    fn respond(&self, text: &str, rows: Vec<SqlRow>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(text.to_string(), rows);
    }

    fn fail_on(&self, text: &str) {
        self.state.lock().unwrap().fail_on.insert(text.to_string());
    }

    fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    fn released(&self) -> usize {
        self.state.lock().unwrap().released
    }
}

struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl Drop for MockClient {
    fn drop(&mut self) {
        self.state.lock().unwrap().released += 1;
    }
}

#[async_trait]
impl QueryClient for MockClient {
    async fn query(
        &self,
        text: &str,
        _values: &[SqlValue],
    ) -> std::result::Result<Vec<SqlRow>, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.log.push(text.to_string());
        if state.fail_on.contains(text) {
            return Err(DriverError::new("forced failure"));
        }
        Ok(state.responses.get(text).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ConnectionPool for MockPool {
    type Client = MockClient;

    async fn acquire(&self) -> Result<MockClient> {
        Ok(MockClient {
            state: Arc::clone(&self.state),
        })
    }
}

fn id_row(id: i64) -> SqlRow {
    SqlRow::from_pairs([("id", SqlValue::Long(id))])
}

#[tokio::test]
async fn test_run_executes_without_transaction() {
    let pool = MockPool::default();
    let executor = SqlExecutor::new(pool.clone());

    executor
        .run(sql!("DELETE FROM users").into_query().update())
        .await
        .unwrap();

    assert_eq!(pool.log(), vec!["DELETE FROM users"]);
    assert_eq!(pool.released(), 1);
}

#[tokio::test]
async fn test_transact_wraps_work_in_begin_commit() {
    let pool = MockPool::default();
    let executor = SqlExecutor::new(pool.clone());

    executor
        .transact(sql!("DELETE FROM users").into_query().update())
        .await
        .unwrap();

    assert_eq!(pool.log(), vec!["BEGIN", "DELETE FROM users", "COMMIT"]);
    assert_eq!(pool.released(), 1);
}

#[tokio::test]
async fn test_transact_rolls_back_on_driver_error() {
    let pool = MockPool::default();
    pool.fail_on("DELETE FROM users");
    let executor = SqlExecutor::new(pool.clone());

    let error = executor
        .transact(sql!("DELETE FROM users").into_query().update())
        .await
        .unwrap_err();

    assert_eq!(
        error.to_string(),
        "Got \"forced failure\" on query \"DELETE FROM users\""
    );
    assert_eq!(pool.log(), vec!["BEGIN", "DELETE FROM users", "ROLLBACK"]);
    assert_eq!(pool.released(), 1);
}

#[tokio::test]
async fn test_transact_rolls_back_on_decode_error() {
    let pool = MockPool::default();
    pool.respond("SELECT id FROM users", vec![id_row(1)]);
    let executor = SqlExecutor::new(pool.clone());

    let result = executor
        .transact(
            sql!("SELECT id FROM users")
                .into_query()
                .unique(decoders::string().for_column("name")),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(pool.log(), vec!["BEGIN", "SELECT id FROM users", "ROLLBACK"]);
    assert_eq!(pool.released(), 1);
}

#[tokio::test]
async fn test_original_error_survives_a_failing_rollback() {
    let pool = MockPool::default();
    pool.fail_on("DELETE FROM users");
    pool.fail_on("ROLLBACK");
    let executor = SqlExecutor::new(pool.clone());

    let error = executor
        .transact(sql!("DELETE FROM users").into_query().update())
        .await
        .unwrap_err();

    assert_eq!(
        error.to_string(),
        "Got \"forced failure\" on query \"DELETE FROM users\""
    );
    assert_eq!(pool.released(), 1);
}

#[tokio::test]
async fn test_failing_commit_triggers_rollback() {
    let pool = MockPool::default();
    pool.fail_on("COMMIT");
    let executor = SqlExecutor::new(pool.clone());

    let error = executor
        .transact(sql!("DELETE FROM users").into_query().update())
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "Got \"forced failure\" on query \"COMMIT\"");
    assert_eq!(
        pool.log(),
        vec!["BEGIN", "DELETE FROM users", "COMMIT", "ROLLBACK"]
    );
}

#[tokio::test]
async fn test_list_decodes_rows_in_order() {
    let pool = MockPool::default();
    pool.respond(
        "SELECT id FROM users",
        vec![id_row(1), id_row(2), id_row(3)],
    );
    let executor = SqlExecutor::new(pool.clone());

    let ids = executor
        .run(
            sql!("SELECT id FROM users")
                .into_query()
                .list(decoders::integer().for_column("id")),
        )
        .await
        .unwrap();

    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_unique_rejects_empty_result() {
    let pool = MockPool::default();
    let executor = SqlExecutor::new(pool.clone());

    let error = executor
        .run(
            sql!("SELECT id FROM users")
                .into_query()
                .unique(decoders::integer().for_column("id")),
        )
        .await
        .unwrap_err();

    assert_eq!(
        error.to_string(),
        "No row returned for query \"SELECT id FROM users\""
    );
}

#[tokio::test]
async fn test_unique_rejects_multiple_rows() {
    let pool = MockPool::default();
    pool.respond("SELECT id FROM users", vec![id_row(1), id_row(2)]);
    let executor = SqlExecutor::new(pool.clone());

    let error = executor
        .run(
            sql!("SELECT id FROM users")
                .into_query()
                .unique(decoders::integer().for_column("id")),
        )
        .await
        .unwrap_err();

    assert_eq!(
        error.to_string(),
        "More than one row were returned for query \"SELECT id FROM users\""
    );
}

#[tokio::test]
async fn test_option_distinguishes_absent_from_present() {
    let pool = MockPool::default();
    let executor = SqlExecutor::new(pool.clone());

    let absent = executor
        .run(
            sql!("SELECT id FROM users")
                .into_query()
                .option(decoders::integer().for_column("id")),
        )
        .await
        .unwrap();
    assert_eq!(absent, None);

    pool.respond("SELECT id FROM users", vec![id_row(7)]);
    let present = executor
        .run(
            sql!("SELECT id FROM users")
                .into_query()
                .option(decoders::integer().for_column("id")),
        )
        .await
        .unwrap();
    assert_eq!(present, Some(7));
}

#[tokio::test]
async fn test_option_still_rejects_multiple_rows() {
    let pool = MockPool::default();
    pool.respond("SELECT id FROM users", vec![id_row(1), id_row(2)]);
    let executor = SqlExecutor::new(pool.clone());

    let result = executor
        .run(
            sql!("SELECT id FROM users")
                .into_query()
                .option(decoders::integer().for_column("id")),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_chain_feeds_the_first_result_into_the_second_query() {
    let pool = MockPool::default();
    pool.respond("SELECT id FROM users", vec![id_row(5)]);
    pool.respond("SELECT id FROM orders WHERE user_id = $1", vec![id_row(50)]);
    let executor = SqlExecutor::new(pool.clone());

    let order = executor
        .run(
            sql!("SELECT id FROM users")
                .into_query()
                .unique(decoders::integer().for_column("id"))
                .chain(|user_id| {
                    sql!("SELECT id FROM orders WHERE user_id = " {user_id})
                        .into_query()
                        .unique(decoders::integer().for_column("id"))
                }),
        )
        .await
        .unwrap();

    assert_eq!(order, 50);
    assert_eq!(
        pool.log(),
        vec![
            "SELECT id FROM users",
            "SELECT id FROM orders WHERE user_id = $1"
        ]
    );
}

#[tokio::test]
async fn test_zip_pairs_results_in_argument_order() {
    let pool = MockPool::default();
    pool.respond("SELECT id FROM users", vec![id_row(1)]);
    pool.respond("SELECT id FROM orders", vec![id_row(2)]);
    let executor = SqlExecutor::new(pool.clone());

    let (user, order) = executor
        .run(
            sql!("SELECT id FROM users")
                .into_query()
                .unique(decoders::integer().for_column("id"))
                .zip(
                    sql!("SELECT id FROM orders")
                        .into_query()
                        .unique(decoders::integer().for_column("id")),
                ),
        )
        .await
        .unwrap();

    assert_eq!((user, order), (1, 2));
}

#[tokio::test]
async fn test_sequence_preserves_input_order() {
    let pool = MockPool::default();
    pool.respond("SELECT id FROM a", vec![id_row(1)]);
    pool.respond("SELECT id FROM b", vec![id_row(2)]);
    pool.respond("SELECT id FROM c", vec![id_row(3)]);
    let executor = SqlExecutor::new(pool.clone());

    let ids = executor
        .run(ExecutableQuery::sequence(vec![
            sql!("SELECT id FROM a")
                .into_query()
                .unique(decoders::integer().for_column("id")),
            sql!("SELECT id FROM b")
                .into_query()
                .unique(decoders::integer().for_column("id")),
            sql!("SELECT id FROM c")
                .into_query()
                .unique(decoders::integer().for_column("id")),
        ]))
        .await
        .unwrap();

    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_of_never_touches_the_client() {
    let pool = MockPool::default();
    let executor = SqlExecutor::new(pool.clone());

    let value = executor.run(ExecutableQuery::of(99)).await.unwrap();

    assert_eq!(value, 99);
    assert!(pool.log().is_empty());
}

#[tokio::test]
async fn test_and_then_runs_both_and_keeps_the_second_result() {
    let pool = MockPool::default();
    pool.respond("SELECT id FROM users", vec![id_row(4)]);
    let executor = SqlExecutor::new(pool.clone());

    let id = executor
        .run(
            sql!("DELETE FROM stale").into_query().update().and_then(
                sql!("SELECT id FROM users")
                    .into_query()
                    .unique(decoders::integer().for_column("id")),
            ),
        )
        .await
        .unwrap();

    assert_eq!(id, 4);
    assert_eq!(pool.log(), vec!["DELETE FROM stale", "SELECT id FROM users"]);
}
