use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::driver::{ConnectAttributes, Driver, DriverConnection, DriverError, Dsn, ErrorMode};
use crate::types::DriverKind;

use super::connection::SqliteConnection;
use super::errors::translate;

/// Connection handle shared between a connection and its statements.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// Where a `sqlite:` DSN points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    Memory,
    File(String),
}

impl SqliteTarget {
    /// Parse `sqlite::memory:` or `sqlite:<path>`.
    ///
    /// # Errors
    /// Returns `IM002` for any other scheme, `08001` for an empty path.
    pub fn from_dsn(dsn: &str) -> Result<Self, DriverError> {
        let Some(parsed) = Dsn::parse(dsn) else {
            let message = format!("DSN `{dsn}` has no driver scheme");
            return Err(DriverError::new("IM002", message));
        };
        if parsed.kind() != Some(DriverKind::Sqlite) {
            return Err(DriverError::new(
                "IM002",
                format!("driver `{}` is not available", parsed.scheme),
            ));
        }
        match parsed.body.as_str() {
            ":memory:" => Ok(SqliteTarget::Memory),
            "" => Err(DriverError::new("08001", "sqlite DSN has no database path")),
            path => Ok(SqliteTarget::File(path.to_owned())),
        }
    }

    fn open(&self) -> rusqlite::Result<rusqlite::Connection> {
        match self {
            SqliteTarget::Memory => rusqlite::Connection::open_in_memory(),
            SqliteTarget::File(path) => rusqlite::Connection::open(path),
        }
    }
}

/// Bundled `SQLite` driver. Credentials are accepted and ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn connect(
        &self,
        dsn: &str,
        _user: Option<&str>,
        _password: Option<&str>,
        attributes: &ConnectAttributes,
    ) -> Result<Box<dyn DriverConnection>, DriverError> {
        if attributes.error_mode != ErrorMode::Exception {
            return Err(DriverError::new(
                "IM001",
                "sqlite driver only reports errors as failures",
            ));
        }
        let target = SqliteTarget::from_dsn(dsn)?;
        let conn = target.open().map_err(|e| {
            let mut err = translate(&e);
            err.sqlstate = "08001".into();
            err
        })?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| translate(&e))?;
        debug!(database = ?target, "sqlite connection opened");
        Ok(Box::new(SqliteConnection::new(Arc::new(Mutex::new(conn)))))
    }
}

/// Lock the shared handle; a poisoned lock still holds a usable connection.
pub(crate) fn lock(handle: &SharedSqliteConnection) -> MutexGuard<'_, rusqlite::Connection> {
    match handle.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
