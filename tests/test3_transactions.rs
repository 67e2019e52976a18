use sql_facade::driver::DriverError;
use sql_facade::prelude::*;
use sql_facade::test_utils::{MockOp, mock_database};
use sql_facade::translation::catalog;

#[test]
fn begin_commit_and_rollback_follow_the_live_flag() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    assert!(!db.has_active_transactions());

    db.begin_transaction()?;
    assert!(db.has_active_transactions());
    let err = db.begin_transaction().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transaction);
    assert_eq!(err.code(), catalog::TRANSACTION_ALREADY_ACTIVE.code);

    db.commit()?;
    assert!(!db.has_active_transactions());
    let err = db.commit().unwrap_err();
    assert_eq!(err.code(), catalog::TRANSACTION_NOT_ACTIVE.code);
    let err = db.rollback().unwrap_err();
    assert_eq!(err.code(), catalog::TRANSACTION_NOT_ACTIVE.code);

    // the flag is read from the connection, not cached by the facade
    driver.set_in_transaction(true);
    assert!(db.has_active_transactions());
    db.rollback()?;
    assert!(!driver.snapshot().in_transaction);
    Ok(())
}

#[test]
fn shared_facades_see_one_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let (mut first, driver, _sink) = mock_database();
    let mut second = first.share();

    first.begin_transaction()?;
    assert!(second.has_active_transactions());
    let err = second.begin_transaction().unwrap_err();
    assert_eq!(err.code(), catalog::TRANSACTION_ALREADY_ACTIVE.code);

    second.commit()?;
    assert!(!first.has_active_transactions());
    assert_eq!(driver.snapshot().connects, 1);
    Ok(())
}

#[test]
fn closure_commits_on_success_and_rolls_back_on_error() {
    let (mut db, driver, _sink) = mock_database();

    let id = db
        .transaction(|db| {
            db.execute(Some("INSERT INTO t VALUES (1)"))?;
            db.last_insert_id()
        })
        .expect("transaction commits");
    assert_eq!(id, "1");
    assert!(!db.has_active_transactions());

    let err = db
        .transaction(|db| {
            db.execute(Some("INSERT INTO t VALUES (2)"))?;
            db.execute(None).map(|_| ())
        })
        .unwrap_err();
    assert_eq!(err.code(), catalog::EXECUTION_INVALID_STATEMENT.code);
    assert!(!db.has_active_transactions());
    assert_eq!(driver.snapshot().queries.len(), 2);
}

#[test]
fn driver_failures_carry_details() {
    let (mut db, driver, _sink) = mock_database();

    driver.fail_next(MockOp::Begin, DriverError::new("HY000", "cannot start"));
    let err = db.begin_transaction().unwrap_err();
    assert_eq!(err.code(), catalog::TRANSACTION_BEGIN_FAILED.code);

    db.begin_transaction().unwrap();
    driver.fail_next(MockOp::Commit, DriverError::new("40001", "serialization failure"));
    let err = db.commit().unwrap_err();
    assert_eq!(err.code(), catalog::TRANSACTION_COMMIT_FAILED.code);
    let details = err.domain().details.clone().expect("details");
    assert_eq!(details["sqlstate"], "40001");
    assert_eq!(details["driver_message"], "serialization failure");

    driver.fail_next(MockOp::Rollback, DriverError::new("08S01", "gone"));
    let err = db.rollback().unwrap_err();
    assert_eq!(err.code(), catalog::TRANSACTION_ROLLBACK_FAILED.code);
}

#[test]
fn closed_connection_has_no_transactions() {
    let (mut db, _driver, _sink) = mock_database();
    db.begin_transaction().unwrap();
    db.close().unwrap();

    assert!(!db.has_active_transactions());
    for err in [
        db.begin_transaction().unwrap_err(),
        db.commit().unwrap_err(),
        db.rollback().unwrap_err(),
    ] {
        assert_eq!(err.code(), catalog::TRANSACTION_NO_CONNECTION.code);
    }
    let err = db.last_insert_id().unwrap_err();
    assert_eq!(err.code(), catalog::CONNECTION_CLOSED.code);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_rollback_discards_rows() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open_sqlite("sqlite::memory:")?;
    db.execute(Some("CREATE TABLE t (a TEXT)"))?;

    db.begin_transaction()?;
    db.free_statement()
        .execute(Some("INSERT INTO t VALUES ('kept?')"))?;
    assert!(db.has_active_transactions());
    db.rollback()?;
    assert!(!db.has_active_transactions());

    db.transaction(|db| {
        db.free_statement()
            .prepare("INSERT INTO t VALUES (:a)")?
            .bind_value("a", "kept")?
            .execute(None)
            .map(|_| ())
    })?;

    let rows = db.free_statement().query("SELECT a FROM t")?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("a"), Some(&SqlValue::Text("kept".into())));
    Ok(())
}
