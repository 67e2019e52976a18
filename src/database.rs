mod execute;
mod fetch;
mod transaction;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::binder::{self, Binding, Bindings, ResolvedBinding};
use crate::config::ConfigSource;
use crate::connection::ConnectionManager;
use crate::driver::{BoundParameter, Driver, DriverError, DriverStatement, PrepareOptions};
use crate::error::{ErrorCategory, SqlFacadeError};
use crate::translation::catalog;
use crate::types::{ParamCell, ParamKey, SqlValue, TypeTag};

/// Outcome of the most recent `execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStatus {
    #[default]
    NotExecuted,
    Succeeded,
    Failed,
}

/// Where a facade is in the prepare → execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Idle,
    Prepared,
    Executed,
}

/// The database facade.
///
/// Owns at most one prepared statement; the connection belongs to the
/// [`ConnectionManager`] and is shared with every other facade built from it.
///
/// ```rust,no_run
/// use sql_facade::prelude::*;
///
/// # fn demo() -> Result<(), SqlFacadeError> {
/// let mut db = Database::open_sqlite("sqlite::memory:")?;
/// db.execute(Some("CREATE TABLE t (a TEXT)"))?;
/// db.prepare("INSERT INTO t (a) VALUES (:a)")?
///     .bind_value_as("a", "x", ParamType::Str)?
///     .execute(None)?;
/// assert!(!db.last_insert_id()?.is_empty());
/// # Ok(()) }
/// ```
pub struct Database {
    manager: ConnectionManager,
    statement: Option<Box<dyn DriverStatement>>,
    /// Result handle of a direct (unprepared) execution.
    cursor: Option<Box<dyn DriverStatement>>,
    status: ExecutionStatus,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("manager", &self.manager)
            .field("statement", &self.statement.as_ref().map(|s| s.sql().to_owned()))
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Facade over `manager`; connects on first use.
    #[must_use]
    pub fn new(manager: ConnectionManager) -> Self {
        Self {
            manager,
            statement: None,
            cursor: None,
            status: ExecutionStatus::NotExecuted,
        }
    }

    /// Facade over `manager`, connecting immediately.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if the connection cannot be opened.
    pub fn connect(manager: ConnectionManager) -> Result<Self, SqlFacadeError> {
        manager.ensure_connected()?;
        Ok(Self::new(manager))
    }

    /// Build a manager from `config` and `driver` and connect.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if the connection cannot be opened.
    pub fn from_config(
        config: Arc<dyn ConfigSource>,
        driver: Arc<dyn Driver>,
    ) -> Result<Self, SqlFacadeError> {
        Self::connect(ConnectionManager::new(config, driver))
    }

    /// Connect to a `sqlite:` DSN with the bundled driver.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if the database cannot be opened.
    #[cfg(feature = "sqlite")]
    pub fn open_sqlite(dsn: &str) -> Result<Self, SqlFacadeError> {
        Self::from_config(
            Arc::new(crate::config::MapConfig::for_dsn(dsn)),
            Arc::new(crate::sqlite::SqliteDriver),
        )
    }

    /// Another facade on the same connection, with its own statement slot.
    #[must_use]
    pub fn share(&self) -> Self {
        Self::new(self.manager.clone())
    }

    #[must_use]
    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    #[must_use]
    pub fn execution_status(&self) -> ExecutionStatus {
        self.status
    }

    #[must_use]
    pub fn state(&self) -> StatementState {
        match (self.status, self.statement.is_some() || self.cursor.is_some()) {
            (ExecutionStatus::NotExecuted, true) => StatementState::Prepared,
            (ExecutionStatus::NotExecuted, false) => StatementState::Idle,
            _ => StatementState::Executed,
        }
    }

    /// Prepare `sql` with default options, replacing any previous statement.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::QueryError` for empty SQL (the driver is not
    /// called) or when the driver rejects the statement.
    pub fn prepare(&mut self, sql: &str) -> Result<&mut Self, SqlFacadeError> {
        self.prepare_with(sql, &PrepareOptions::default())
    }

    /// Prepare `sql` with explicit driver options.
    ///
    /// # Errors
    /// See [`Database::prepare`].
    pub fn prepare_with(
        &mut self,
        sql: &str,
        options: &PrepareOptions,
    ) -> Result<&mut Self, SqlFacadeError> {
        if sql.trim().is_empty() {
            return Err(catalog::QUERY_EMPTY_SQL.error());
        }
        let translator = self.manager.translator().clone();
        let statement = self.manager.with_connection(|conn| {
            conn.prepare(sql, options)
                .map_err(|e| translator.translate(ErrorCategory::Query, &e, Some(sql)))
        })?;
        debug!(sql, cached = options.cached, "statement prepared");
        self.statement = Some(statement);
        self.cursor = None;
        self.status = ExecutionStatus::NotExecuted;
        Ok(self)
    }

    /// Bind `cell` by reference with the default (string) type; the value is
    /// read when the statement executes.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::BindError` if nothing is prepared, the key is
    /// invalid or the driver rejects the binding.
    pub fn bind_param(
        &mut self,
        key: impl Into<ParamKey>,
        cell: &ParamCell,
    ) -> Result<&mut Self, SqlFacadeError> {
        self.bind_params(Binding::new(key, cell.clone()))
    }

    /// [`Database::bind_param`] with an explicit type tag.
    ///
    /// # Errors
    /// As `bind_param`, plus `SqlFacadeError::InvalidType` for an unknown tag.
    pub fn bind_param_as(
        &mut self,
        key: impl Into<ParamKey>,
        cell: &ParamCell,
        ty: impl Into<TypeTag>,
    ) -> Result<&mut Self, SqlFacadeError> {
        self.bind_params(Binding::new(key, cell.clone()).typed(ty))
    }

    /// Bind a snapshot of `value` with the default (string) type.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::BindError` if nothing is prepared, the key is
    /// invalid or the driver rejects the binding.
    pub fn bind_value(
        &mut self,
        key: impl Into<ParamKey>,
        value: impl Into<SqlValue>,
    ) -> Result<&mut Self, SqlFacadeError> {
        let value: SqlValue = value.into();
        self.bind_values(Binding::new(key, value))
    }

    /// [`Database::bind_value`] with an explicit type tag.
    ///
    /// # Errors
    /// As `bind_value`, plus `SqlFacadeError::InvalidType` for an unknown tag.
    pub fn bind_value_as(
        &mut self,
        key: impl Into<ParamKey>,
        value: impl Into<SqlValue>,
        ty: impl Into<TypeTag>,
    ) -> Result<&mut Self, SqlFacadeError> {
        let value: SqlValue = value.into();
        self.bind_values(Binding::new(key, value).typed(ty))
    }

    /// Bind one or many parameter cells by reference.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::BindError`/`InvalidType`; when any binding is
    /// invalid none of them is applied.
    pub fn bind_params(
        &mut self,
        bindings: impl Into<Bindings<ParamCell>>,
    ) -> Result<&mut Self, SqlFacadeError> {
        let resolved = binder::resolve_all(bindings.into())?;
        self.apply_bindings(resolved)
    }

    /// Bind one or many values by value.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::BindError`/`InvalidType`; when any binding is
    /// invalid none of them is applied.
    pub fn bind_values(
        &mut self,
        bindings: impl Into<Bindings<SqlValue>>,
    ) -> Result<&mut Self, SqlFacadeError> {
        let resolved = binder::resolve_all(bindings.into())?;
        self.apply_bindings(resolved)
    }

    fn apply_bindings(
        &mut self,
        resolved: Vec<ResolvedBinding>,
    ) -> Result<&mut Self, SqlFacadeError> {
        let translator = self.manager.translator().clone();
        let statement = self
            .statement
            .as_mut()
            .ok_or_else(|| catalog::BIND_NO_STATEMENT.error())?;
        let sql = statement.sql().to_owned();
        let translate = |e: DriverError| translator.translate(ErrorCategory::Bind, &e, Some(&sql));
        for binding in &resolved {
            statement
                .check(&binding.key, &binding.source, binding.ty)
                .map_err(translate)?;
        }
        for binding in resolved {
            debug!(
                key = %binding.key,
                ty = %binding.ty,
                by_reference = binding.source.is_reference(),
                "binding parameter"
            );
            statement
                .bind(&binding.key, binding.source, binding.ty)
                .map_err(translate)?;
        }
        Ok(self)
    }

    /// Bindings applied to the current prepared statement, references resolved.
    #[must_use]
    pub fn bound_parameters(&self) -> Vec<BoundParameter> {
        self.statement
            .as_ref()
            .map(|s| s.bound_parameters())
            .unwrap_or_default()
    }

    /// Drop the prepared statement and any result, back to `Idle`.
    pub fn free_statement(&mut self) -> &mut Self {
        self.statement = None;
        self.cursor = None;
        self.status = ExecutionStatus::NotExecuted;
        self
    }

    /// Release this facade's statement and close the shared connection.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if there is no open connection.
    pub fn close(&mut self) -> Result<(), SqlFacadeError> {
        self.free_statement();
        self.manager.close()?;
        debug!("facade closed the connection");
        Ok(())
    }
}
