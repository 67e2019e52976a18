use std::sync::Arc;

use rusqlite::Statement;

use crate::driver::{BoundParameter, DriverError, DriverStatement};
use crate::results::{ResultSet, Row};
use crate::types::{BindSource, ParamKey, ParamType};

use super::config::{SharedSqliteConnection, lock};
use super::errors::translate;
use super::params::coerce;
use super::query::build_result_set;

#[derive(Debug, Clone)]
struct SlotBinding {
    key: ParamKey,
    index: usize,
    source: BindSource,
    ty: ParamType,
}

/// A statement on a shared `SQLite` connection.
///
/// Only the SQL text is held; the compiled statement lives in rusqlite's
/// statement cache and is fetched with `prepare_cached` on every use.
pub struct SqliteStatement {
    connection: SharedSqliteConnection,
    query: Arc<String>,
    bindings: Vec<SlotBinding>,
    result: Option<ResultSet>,
    rows_affected: Option<u64>,
}

impl SqliteStatement {
    /// Compile `query` once to validate it (and warm the cache).
    ///
    /// # Errors
    /// Returns the translated rusqlite error if the SQL does not compile.
    pub(crate) fn prepare(
        connection: SharedSqliteConnection,
        query: &str,
        cached: bool,
    ) -> Result<Self, DriverError> {
        {
            let conn = lock(&connection);
            if cached {
                conn.prepare_cached(query).map_err(|e| translate(&e))?;
            } else {
                conn.prepare(query).map_err(|e| translate(&e))?;
            }
        }
        Ok(Self {
            connection,
            query: Arc::new(query.to_owned()),
            bindings: Vec::new(),
            result: None,
            rows_affected: None,
        })
    }

    fn parameter_index(stmt: &Statement<'_>, key: &ParamKey) -> Result<usize, DriverError> {
        let index = match key {
            ParamKey::Named(name) => stmt.parameter_index(name).map_err(|e| translate(&e))?,
            ParamKey::Positional(pos) => {
                Some(*pos).filter(|p| (1..=stmt.parameter_count()).contains(p))
            }
        };
        index.ok_or_else(|| {
            DriverError::new(
                "HY093",
                format!("parameter {key} does not exist in the statement"),
            )
        })
    }

    /// Placeholder index for `key`, after checking a snapshot value against `ty`.
    fn slot_for(
        &self,
        key: &ParamKey,
        source: &BindSource,
        ty: ParamType,
    ) -> Result<usize, DriverError> {
        let index = {
            let conn = lock(&self.connection);
            let stmt = conn.prepare_cached(&self.query).map_err(|e| translate(&e))?;
            Self::parameter_index(&stmt, key)?
        };
        // Snapshots can be checked now; references only when they are read.
        if let BindSource::Value(value) = source {
            coerce(value, ty)?;
        }
        Ok(index)
    }

    fn run(&mut self) -> Result<(), DriverError> {
        let conn = lock(&self.connection);
        let mut stmt = conn.prepare_cached(&self.query).map_err(|e| translate(&e))?;
        for binding in &self.bindings {
            let value = coerce(&binding.source.resolve(), binding.ty)?;
            stmt.raw_bind_parameter(binding.index, value)
                .map_err(|e| translate(&e))?;
        }
        if stmt.column_count() > 0 {
            let result_set = build_result_set(&mut stmt).map_err(|e| translate(&e))?;
            self.rows_affected = Some(result_set.rows_affected);
            self.result = Some(result_set);
        } else {
            let affected = stmt.raw_execute().map_err(|e| translate(&e))?;
            let affected = u64::try_from(affected).unwrap_or(u64::MAX);
            self.rows_affected = Some(affected);
            self.result = Some(ResultSet::affected(affected));
        }
        Ok(())
    }
}

impl DriverStatement for SqliteStatement {
    fn sql(&self) -> &str {
        self.query.as_str()
    }

    fn check(
        &self,
        key: &ParamKey,
        source: &BindSource,
        ty: ParamType,
    ) -> Result<(), DriverError> {
        self.slot_for(key, source, ty).map(|_| ())
    }

    fn bind(
        &mut self,
        key: &ParamKey,
        source: BindSource,
        ty: ParamType,
    ) -> Result<(), DriverError> {
        let index = self.slot_for(key, &source, ty)?;
        let binding = SlotBinding {
            key: key.clone(),
            index,
            source,
            ty,
        };
        match self.bindings.iter_mut().find(|b| b.index == index) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
        Ok(())
    }

    fn bound_parameters(&self) -> Vec<BoundParameter> {
        self.bindings
            .iter()
            .map(|b| BoundParameter {
                key: b.key.clone(),
                value: b.source.resolve(),
                param_type: b.ty,
                by_reference: b.source.is_reference(),
            })
            .collect()
    }

    fn execute(&mut self) -> Result<bool, DriverError> {
        self.result = None;
        self.rows_affected = None;
        self.run()?;
        Ok(true)
    }

    fn fetch(&mut self) -> Result<Option<Row>, DriverError> {
        match self.result.as_mut() {
            Some(result) => Ok(result.next_row()),
            None => Err(DriverError::new("HY010", "statement has not been executed")),
        }
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>, DriverError> {
        match self.result.as_mut() {
            Some(result) => Ok(result.drain()),
            None => Err(DriverError::new("HY010", "statement has not been executed")),
        }
    }

    fn row_count(&self) -> Result<u64, DriverError> {
        self.rows_affected
            .ok_or_else(|| DriverError::new("HY010", "statement has not been executed"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::{ParamCell, SqlValue};

    fn shared() -> SharedSqliteConnection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, a TEXT, n INTEGER)")
            .unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn binds_by_name_and_position() {
        let conn = shared();
        let mut insert =
            SqliteStatement::prepare(conn.clone(), "INSERT INTO t (a, n) VALUES (:a, ?2)", true)
                .unwrap();
        insert
            .bind(&ParamKey::named("a"), BindSource::Value("x".into()), ParamType::Str)
            .unwrap();
        insert
            .bind(&ParamKey::Positional(2), BindSource::Value(SqlValue::Int(3)), ParamType::Int)
            .unwrap();
        assert!(insert.execute().unwrap());
        assert_eq!(insert.row_count().unwrap(), 1);

        let mut select = SqliteStatement::prepare(conn, "SELECT a, n FROM t", true).unwrap();
        select.execute().unwrap();
        let rows = select.fetch_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some(&SqlValue::Text("x".into())));
        assert_eq!(rows[0].get("n"), Some(&SqlValue::Int(3)));
    }

    #[test]
    fn unknown_placeholder_is_hy093() {
        let mut stmt =
            SqliteStatement::prepare(shared(), "SELECT * FROM t WHERE a = :a", true).unwrap();
        let err = stmt
            .bind(&ParamKey::named("b"), BindSource::Value(SqlValue::Null), ParamType::Str)
            .unwrap_err();
        assert_eq!(err.sqlstate, "HY093");
        let err = stmt
            .bind(&ParamKey::Positional(2), BindSource::Value(SqlValue::Null), ParamType::Str)
            .unwrap_err();
        assert_eq!(err.sqlstate, "HY093");
    }

    #[test]
    fn references_are_read_at_execute() {
        let conn = shared();
        let cell = ParamCell::new("first");
        let mut insert =
            SqliteStatement::prepare(conn.clone(), "INSERT INTO t (a) VALUES (:a)", true).unwrap();
        insert
            .bind(&ParamKey::named("a"), BindSource::Reference(cell.clone()), ParamType::Str)
            .unwrap();
        cell.set("second");
        insert.execute().unwrap();

        let a: String = lock(&conn)
            .query_row("SELECT a FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(a, "second");
    }

    #[test]
    fn fetch_before_execute_is_sequence_error() {
        let mut stmt = SqliteStatement::prepare(shared(), "SELECT 1", true).unwrap();
        assert_eq!(stmt.fetch().unwrap_err().sqlstate, "HY010");
        assert_eq!(stmt.row_count().unwrap_err().sqlstate, "HY010");
    }
}
