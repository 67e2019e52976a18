use serde_json::Value as JsonValue;

use super::{Database, ExecutionStatus};
use crate::driver::DriverStatement;
use crate::error::{ErrorCategory, SqlFacadeError};
use crate::results::Row;
use crate::translation::catalog;
use crate::types::FetchShape;

impl Database {
    /// The handle results are read from, only after a successful execute.
    fn executed_handle(&mut self) -> Result<&mut Box<dyn DriverStatement>, SqlFacadeError> {
        if self.status != ExecutionStatus::Succeeded {
            return Err(catalog::FETCH_NOT_EXECUTED.error());
        }
        match (&mut self.cursor, &mut self.statement) {
            (Some(handle), _) | (None, Some(handle)) => Ok(handle),
            (None, None) => Err(catalog::FETCH_NOT_EXECUTED.error()),
        }
    }

    /// Next row of the result, `None` once exhausted.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::FetchError` unless the last execute succeeded,
    /// or when the driver fails to read.
    pub fn fetch(&mut self) -> Result<Option<Row>, SqlFacadeError> {
        let translator = self.manager.translator().clone();
        let handle = self.executed_handle()?;
        handle
            .fetch()
            .map_err(|e| translator.translate(ErrorCategory::Fetch, &e, Some(handle.sql())))
    }

    /// Every remaining row.
    ///
    /// # Errors
    /// See [`Database::fetch`].
    pub fn fetch_all(&mut self) -> Result<Vec<Row>, SqlFacadeError> {
        let translator = self.manager.translator().clone();
        let handle = self.executed_handle()?;
        handle
            .fetch_all()
            .map_err(|e| translator.translate(ErrorCategory::Fetch, &e, Some(handle.sql())))
    }

    /// Every remaining row as JSON, in the connection's default fetch shape.
    ///
    /// # Errors
    /// See [`Database::fetch`].
    pub fn fetch_all_json(&mut self) -> Result<Vec<JsonValue>, SqlFacadeError> {
        let shape = self.manager.attributes().default_fetch;
        self.fetch_all_as(shape)
    }

    /// Every remaining row as JSON in `shape`.
    ///
    /// # Errors
    /// See [`Database::fetch`].
    pub fn fetch_all_as(&mut self, shape: FetchShape) -> Result<Vec<JsonValue>, SqlFacadeError> {
        Ok(self.fetch_all()?.iter().map(|row| row.to_json(shape)).collect())
    }

    /// Rows affected by the last DML statement (or produced by a query).
    ///
    /// # Errors
    /// See [`Database::fetch`].
    pub fn row_count(&mut self) -> Result<u64, SqlFacadeError> {
        let translator = self.manager.translator().clone();
        let handle = self.executed_handle()?;
        handle
            .row_count()
            .map_err(|e| translator.translate(ErrorCategory::Fetch, &e, Some(handle.sql())))
    }

    /// Alias of [`Database::row_count`].
    ///
    /// # Errors
    /// See [`Database::fetch`].
    pub fn affected_row_count(&mut self) -> Result<u64, SqlFacadeError> {
        self.row_count()
    }
}
