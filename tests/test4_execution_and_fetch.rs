use serde_json::json;
use sql_facade::driver::DriverError;
use sql_facade::prelude::*;
use sql_facade::test_utils::{MockOp, create_test_row, mock_database};
use sql_facade::translation::catalog;

#[test]
fn execute_needs_exactly_one_source() {
    let (mut db, driver, _sink) = mock_database();

    let err = db.execute(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert_eq!(err.code(), catalog::EXECUTION_INVALID_STATEMENT.code);
    let err = db.execute(Some("   ")).unwrap_err();
    assert_eq!(err.code(), catalog::EXECUTION_INVALID_STATEMENT.code);

    db.prepare("SELECT 1").unwrap();
    let err = db.execute(Some("SELECT 2")).unwrap_err();
    assert_eq!(err.code(), catalog::EXECUTION_INVALID_STATEMENT.code);

    let state = driver.snapshot();
    assert!(state.queries.is_empty());
    assert!(state.executed.is_empty());
}

#[test]
fn empty_prepare_never_reaches_the_driver() {
    let (mut db, driver, _sink) = mock_database();
    let err = db.prepare("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert_eq!(err.code(), catalog::QUERY_EMPTY_SQL.code);

    let state = driver.snapshot();
    assert_eq!(state.connects, 0);
    assert!(state.prepared.is_empty());
}

#[test]
fn fetch_requires_a_successful_execute() {
    let (mut db, driver, _sink) = mock_database();
    driver.set_rows("SELECT a FROM t", &["a"], vec![vec![SqlValue::from(1)]]);

    let not_executed = |err: SqlFacadeError| {
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(err.code(), catalog::FETCH_NOT_EXECUTED.code);
    };
    not_executed(db.fetch().unwrap_err());

    db.prepare("SELECT a FROM t").unwrap();
    not_executed(db.fetch_all().unwrap_err());
    not_executed(db.row_count().unwrap_err());

    driver.fail_next(MockOp::Execute, DriverError::new("40001", "deadlock"));
    let err = db.execute(None).unwrap_err();
    assert_eq!(err.code(), catalog::EXECUTION_DEADLOCK.code);
    assert_eq!(db.execution_status(), ExecutionStatus::Failed);
    not_executed(db.fetch().unwrap_err());

    db.execute(None).unwrap();
    assert_eq!(db.execution_status(), ExecutionStatus::Succeeded);
    assert_eq!(db.row_count().unwrap(), 1);
    assert_eq!(db.fetch_all_json().unwrap(), vec![json!({"a": 1})]);
}

#[test]
fn rejected_execute_hides_earlier_results() {
    let (mut db, driver, _sink) = mock_database();
    driver.set_rows("SELECT a FROM t", &["a"], vec![vec![SqlValue::from(1)]]);
    db.prepare("SELECT a FROM t").unwrap().execute(None).unwrap();
    assert_eq!(db.execution_status(), ExecutionStatus::Succeeded);

    let err = db.execute(Some("SELECT 2")).unwrap_err();
    assert_eq!(err.code(), catalog::EXECUTION_INVALID_STATEMENT.code);
    assert_eq!(db.execution_status(), ExecutionStatus::Failed);
    for err in [
        db.fetch().unwrap_err(),
        db.fetch_all().unwrap_err(),
        db.row_count().unwrap_err(),
    ] {
        assert_eq!(err.code(), catalog::FETCH_NOT_EXECUTED.code);
    }

    // with nothing prepared, a missing source is rejected the same way
    db.free_statement().execute(Some("SELECT a FROM t")).unwrap();
    assert!(db.execute(None).is_err());
    assert_eq!(
        db.fetch().unwrap_err().code(),
        catalog::FETCH_NOT_EXECUTED.code
    );
}

#[test]
fn a_false_execute_is_a_failed_status() {
    let (mut db, driver, _sink) = mock_database();
    driver.set_execute_result(false);
    db.prepare("UPDATE t SET a = 1").unwrap().execute(None).unwrap();
    assert_eq!(db.execution_status(), ExecutionStatus::Failed);
    assert_eq!(
        db.affected_row_count().unwrap_err().code(),
        catalog::FETCH_NOT_EXECUTED.code
    );

    driver.set_query_returns_handle(false);
    db.free_statement().execute(Some("DELETE FROM t")).unwrap();
    assert_eq!(db.execution_status(), ExecutionStatus::Failed);
    assert!(db.fetch().is_err());
}

#[test]
fn statement_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    assert_eq!(db.state(), StatementState::Idle);

    db.prepare("SELECT :a")?;
    assert_eq!(db.state(), StatementState::Prepared);
    db.bind_value("a", 1)?.execute(None)?;
    assert_eq!(db.state(), StatementState::Executed);
    assert_eq!(db.row_count()?, 1);

    db.free_statement();
    assert_eq!(db.state(), StatementState::Idle);
    assert_eq!(db.execution_status(), ExecutionStatus::NotExecuted);
    assert!(db.bound_parameters().is_empty());

    // preparing again replaces the statement and forgets its bindings
    db.prepare("SELECT :a")?.bind_value("a", 1)?;
    db.prepare("SELECT :b")?;
    assert!(db.bound_parameters().is_empty());
    assert_eq!(driver.snapshot().prepared.len(), 3);
    assert_eq!(driver.snapshot().connects, 1);
    Ok(())
}

#[test]
fn direct_results_are_read_through_the_facade() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    driver.set_rows(
        "SELECT id, name FROM users",
        &["id", "name"],
        vec![
            vec![SqlValue::from(1), SqlValue::from("ada")],
            vec![SqlValue::from(2), SqlValue::from("grace")],
        ],
    );

    db.execute(Some("SELECT id, name FROM users"))?;
    let first = db.fetch()?.expect("first row");
    assert_eq!(first.get("name"), Some(&SqlValue::Text("ada".into())));
    assert_eq!(
        db.fetch_all_as(FetchShape::Num)?,
        vec![json!([2, "grace"])]
    );
    assert!(db.fetch()?.is_none());

    let columns = vec!["id".to_owned(), "name".to_owned()];
    let expected = vec![
        create_test_row(
            columns.clone(),
            vec![SqlValue::from(1), SqlValue::from("ada")],
        ),
        create_test_row(columns, vec![SqlValue::from(2), SqlValue::from("grace")]),
    ];
    assert_eq!(db.query("SELECT id, name FROM users")?, expected);
    Ok(())
}

#[test]
fn insert_ids_come_from_the_connection() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    db.execute(Some("INSERT INTO t VALUES (1)"))?;
    db.execute(Some("INSERT INTO t VALUES (2)"))?;
    assert_eq!(db.last_insert_id()?, "2");
    assert_eq!(db.last_insert_id_for("t_id_seq")?, "2");

    driver.fail_next(MockOp::LastInsertId, DriverError::new("IM001", "not supported"));
    let err = db.last_insert_id().unwrap_err();
    assert_eq!(err.code(), catalog::EXECUTION_UNSUPPORTED.code);
    Ok(())
}

#[test]
fn closed_connection_fails_fast() {
    let (mut db, driver, _sink) = mock_database();
    db.prepare("SELECT 1").unwrap();
    let mut other = db.share();
    db.close().unwrap();

    let err = other.execute(Some("SELECT 1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(err.code(), catalog::CONNECTION_CLOSED.code);
    let err = other.prepare("SELECT 1").unwrap_err();
    assert_eq!(err.code(), catalog::CONNECTION_CLOSED.code);

    let err = db.close().unwrap_err();
    assert_eq!(err.code(), catalog::CONNECTION_NOT_CONNECTED.code);
    assert_eq!(driver.snapshot().connects, 1);
}

#[test]
fn execution_errors_are_classified() {
    let (mut db, driver, sink) = mock_database();
    db.prepare("INSERT INTO t VALUES (:a)").unwrap();

    let cases = [
        ("23502", catalog::EXECUTION_NOT_NULL_VIOLATION.code),
        ("23503", catalog::EXECUTION_FOREIGN_KEY_VIOLATION.code),
        ("23999", catalog::EXECUTION_INTEGRITY_VIOLATION.code),
        ("22012", catalog::EXECUTION_DIVISION_BY_ZERO.code),
        ("08S01", catalog::EXECUTION_CONNECTION_LOST.code),
    ];
    for (sqlstate, code) in cases {
        driver.fail_next(MockOp::Execute, DriverError::new(sqlstate, "boom"));
        let err = db.execute(None).unwrap_err();
        assert_eq!(err.code(), code, "{sqlstate}");
    }
    assert!(sink.entries().is_empty());
}
