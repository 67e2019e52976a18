use std::fmt;

use tracing::debug;

use crate::driver::{DriverConnection, DriverError, DriverStatement, PrepareOptions};

use super::config::{SharedSqliteConnection, lock};
use super::errors::translate;
use super::prepared::SqliteStatement;

/// Connection wrapper around a shared rusqlite handle.
///
/// Transactions are explicit `BEGIN`/`COMMIT`/`ROLLBACK`; the engine's own
/// autocommit flag is the source of truth for whether one is open.
pub struct SqliteConnection {
    conn: SharedSqliteConnection,
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}

impl SqliteConnection {
    pub(crate) fn new(conn: SharedSqliteConnection) -> Self {
        Self { conn }
    }

    fn batch(&self, sql: &str) -> Result<(), DriverError> {
        lock(&self.conn).execute_batch(sql).map_err(|e| translate(&e))
    }
}

impl DriverConnection for SqliteConnection {
    fn prepare(
        &mut self,
        sql: &str,
        options: &PrepareOptions,
    ) -> Result<Box<dyn DriverStatement>, DriverError> {
        let stmt = SqliteStatement::prepare(self.conn.clone(), sql, options.cached)?;
        Ok(Box::new(stmt))
    }

    fn query(&mut self, sql: &str) -> Result<Option<Box<dyn DriverStatement>>, DriverError> {
        let mut stmt = SqliteStatement::prepare(self.conn.clone(), sql, true)?;
        if stmt.execute()? {
            Ok(Some(Box::new(stmt)))
        } else {
            Ok(None)
        }
    }

    fn begin_transaction(&mut self) -> Result<(), DriverError> {
        debug!("sqlite BEGIN");
        self.batch("BEGIN")
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        debug!("sqlite COMMIT");
        self.batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        debug!("sqlite ROLLBACK");
        self.batch("ROLLBACK")
    }

    fn in_transaction(&self) -> bool {
        !lock(&self.conn).is_autocommit()
    }

    fn last_insert_id(&self, _name: Option<&str>) -> Result<String, DriverError> {
        Ok(lock(&self.conn).last_insert_rowid().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn open() -> SqliteConnection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, a TEXT)")
            .unwrap();
        SqliteConnection::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn transaction_flag_follows_engine() {
        let mut conn = open();
        assert!(!conn.in_transaction());
        conn.begin_transaction().unwrap();
        assert!(conn.in_transaction());
        conn.rollback().unwrap();
        assert!(!conn.in_transaction());
        assert!(conn.commit().is_err());
    }

    #[test]
    fn direct_query_reports_rowid() {
        let mut conn = open();
        conn.query("INSERT INTO t (a) VALUES ('x')").unwrap();
        conn.query("INSERT INTO t (a) VALUES ('y')").unwrap();
        assert_eq!(conn.last_insert_id(None).unwrap(), "2");

        let mut rows = conn.query("SELECT a FROM t ORDER BY id").unwrap().unwrap();
        assert_eq!(rows.row_count().unwrap(), 2);
        assert_eq!(rows.fetch_all().unwrap().len(), 2);
    }

    #[test]
    fn prepare_failure_is_translated() {
        let mut conn = open();
        let err = conn
            .prepare("SELECT * FROM missing", &PrepareOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.sqlstate, "42S02");
    }
}
