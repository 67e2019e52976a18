use serde_json::json;
use sql_facade::driver::{BoundParameter, DriverError};
use sql_facade::prelude::*;
use sql_facade::test_utils::{MockOp, mock_database};
use sql_facade::translation::catalog;

#[test]
fn bind_round_trip_matches_submission() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    db.prepare("INSERT INTO t (a, b, c, d) VALUES (:a, :b, :c, :d)")?
        .bind_value_as("a", "x", "string")?
        .bind_value_as(":b", 7, "integer")?
        .bind_value_as("c", true, ParamType::Bool)?
        .bind_value_as("d", SqlValue::Null, 0_i64)?;

    let expected = vec![
        BoundParameter {
            key: ParamKey::Named(":a".into()),
            value: SqlValue::Text("x".into()),
            param_type: ParamType::Str,
            by_reference: false,
        },
        BoundParameter {
            key: ParamKey::Named(":b".into()),
            value: SqlValue::Int(7),
            param_type: ParamType::Int,
            by_reference: false,
        },
        BoundParameter {
            key: ParamKey::Named(":c".into()),
            value: SqlValue::Bool(true),
            param_type: ParamType::Bool,
            by_reference: false,
        },
        BoundParameter {
            key: ParamKey::Named(":d".into()),
            value: SqlValue::Null,
            param_type: ParamType::Null,
            by_reference: false,
        },
    ];
    assert_eq!(driver.snapshot().binds, expected);
    assert_eq!(db.bound_parameters(), expected);
    Ok(())
}

#[test]
fn marker_is_never_doubled() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    db.prepare("SELECT :id")?
        .bind_value(":id", 1)?
        .bind_value("id", 2)?;
    let keys: Vec<_> = driver.snapshot().binds.into_iter().map(|b| b.key).collect();
    assert_eq!(
        keys,
        vec![ParamKey::Named(":id".into()), ParamKey::Named(":id".into())]
    );
    // the second binding replaced the first
    assert_eq!(db.bound_parameters().len(), 1);
    assert_eq!(db.bound_parameters()[0].value, SqlValue::Int(2));
    Ok(())
}

#[test]
fn by_reference_and_by_value_differ_at_execute() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    let cell = ParamCell::new("old");
    let mut snapshot = String::from("old");
    db.prepare("UPDATE t SET a = :a, b = :b")?
        .bind_param("a", &cell)?
        .bind_value("b", snapshot.as_str())?;
    cell.set("new");
    snapshot.push_str("-changed");
    db.execute(None)?;

    let executed = driver.snapshot().executed;
    let (_, params) = executed.last().expect("executed once");
    assert_eq!(params[0].value, SqlValue::Text("new".into()));
    assert!(params[0].by_reference);
    assert_eq!(params[1].value, SqlValue::Text("old".into()));
    assert!(!params[1].by_reference);
    Ok(())
}

#[test]
fn mixed_shapes_apply_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    db.prepare("INSERT INTO t (a, b) VALUES (:a, :b)")?;

    let err = Bindings::from_json(&json!([["a", 1, "int"], "b", 2])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bind);
    assert_eq!(err.code(), catalog::BIND_INVALID_FORMAT.code);

    // a batch whose second entry has a bad type tag is rejected as a whole
    let batch = Bindings::from_json(&json!([
        {"name": "a", "value": 1, "type": "int"},
        {"column": "b", "value": 2.5, "type": "decimal"},
    ]))?;
    let err = db.bind_values(batch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidType);

    assert!(driver.snapshot().binds.is_empty());
    assert!(db.bound_parameters().is_empty());
    Ok(())
}

#[test]
fn driver_rejection_mid_batch_applies_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    driver.set_parameters(&["a", "b"]);
    db.prepare("INSERT INTO t (a, b) VALUES (:a, :b)")?;

    let err = db
        .bind_values(vec![
            Binding::new("a", SqlValue::from("x")),
            Binding::new("missing", SqlValue::from(1)),
        ])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bind);
    assert_eq!(err.code(), catalog::BIND_INVALID_PARAMETER_NUMBER.code);
    assert!(db.bound_parameters().is_empty());
    assert!(driver.snapshot().binds.is_empty());

    // the same batch without the unknown entry goes through
    db.bind_values(vec![
        Binding::new("a", SqlValue::from("x")),
        Binding::new("b", SqlValue::from(1)),
    ])?;
    assert_eq!(db.bound_parameters().len(), 2);
    Ok(())
}

#[test]
fn json_batch_binds_every_entry() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, driver, _sink) = mock_database();
    db.prepare("INSERT INTO t (a, b) VALUES (:a, ?2)")?
        .bind_values(Bindings::from_json(&json!([
            {"name": "a", "value": "x"},
            [2, 5, 1],
        ]))?)?;
    let binds = driver.snapshot().binds;
    assert_eq!(binds.len(), 2);
    assert_eq!(binds[0].param_type, ParamType::Str);
    assert_eq!(binds[1].key, ParamKey::Positional(2));
    assert_eq!(binds[1].param_type, ParamType::Int);

    db.bind_values(Bindings::from_json(&json!(["a", "y", "bool"]))?)?;
    assert_eq!(driver.snapshot().binds[2].param_type, ParamType::Bool);
    Ok(())
}

#[test]
fn cells_bind_in_batches() -> Result<(), Box<dyn std::error::Error>> {
    let (mut db, _driver, _sink) = mock_database();
    let a = ParamCell::new(1);
    let b = ParamCell::new(2);
    db.prepare("SELECT :a + :b")?.bind_params(vec![
        Binding::new("a", a.clone()).typed(ParamType::Int),
        Binding::new("b", b.clone()).typed("int"),
    ])?;
    b.set(40);
    let values: Vec<_> = db.bound_parameters().into_iter().map(|p| p.value).collect();
    assert_eq!(values, vec![SqlValue::Int(1), SqlValue::Int(40)]);
    Ok(())
}

#[test]
fn binding_needs_a_statement_and_a_name() {
    let (mut db, _driver, _sink) = mock_database();
    let err = db.bind_value("a", 1).unwrap_err();
    assert_eq!(err.code(), catalog::BIND_NO_STATEMENT.code);

    db.prepare("SELECT :a").unwrap();
    let err = db.bind_value("", 1).unwrap_err();
    assert_eq!(err.code(), catalog::BIND_INVALID_NAME.code);
    let err = db.bind_value_as("a", 1, "float").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidType);
    let err = db.bind_value_as("a", 1, 3_i64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidType);
}

#[test]
fn driver_bind_failures_are_translated() {
    let (mut db, driver, sink) = mock_database();
    db.prepare("SELECT :a").unwrap();

    driver.fail_next(MockOp::Bind, DriverError::new("HY093", "Invalid parameter number"));
    let err = db.bind_value("a", 1).unwrap_err();
    assert_eq!(err.code(), catalog::BIND_INVALID_PARAMETER_NUMBER.code);

    driver.fail_next(MockOp::Bind, DriverError::new("22001", "String data, right truncated"));
    let err = db.bind_value("a", 1).unwrap_err();
    assert_eq!(err.code(), catalog::BIND_TRUNCATED.code);

    driver.fail_next(MockOp::Bind, DriverError::new("XX999", "mystery"));
    let err = db.bind_value("a", 1).unwrap_err();
    assert_eq!(err.code(), catalog::BIND_UNKNOWN.code);
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].sql.as_deref(), Some("SELECT :a"));
}
