use tracing::debug;

use super::{Database, ExecutionStatus};
use crate::error::{ErrorCategory, SqlFacadeError};
use crate::translation::catalog;

impl Database {
    /// Run either `sql` directly or the prepared statement.
    ///
    /// Exactly one of the two must be present: `Some(sql)` requires that
    /// nothing is prepared, `None` requires a prepared statement.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ExecutionError` when both or neither are
    /// present or the driver fails; `SqlFacadeError::ConnectionError` when the
    /// connection has been closed.
    pub fn execute(&mut self, sql: Option<&str>) -> Result<&mut Self, SqlFacadeError> {
        let sql = sql.filter(|s| !s.trim().is_empty());
        match (sql, self.statement.is_some()) {
            (Some(sql), false) => self.execute_direct(sql),
            (None, true) => self.execute_prepared(),
            (Some(_), true) | (None, false) => {
                self.status = ExecutionStatus::Failed;
                Err(catalog::EXECUTION_INVALID_STATEMENT.error())
            }
        }
    }

    /// Direct-execute `sql` and return every row it produced.
    ///
    /// # Errors
    /// As [`Database::execute`] and [`Database::fetch_all`].
    pub fn query(&mut self, sql: &str) -> Result<Vec<crate::results::Row>, SqlFacadeError> {
        self.execute(Some(sql))?.fetch_all()
    }

    fn execute_direct(&mut self, sql: &str) -> Result<&mut Self, SqlFacadeError> {
        self.cursor = None;
        self.status = ExecutionStatus::Failed;
        let translator = self.manager.translator().clone();
        let handle = self.manager.with_connection(|conn| {
            conn.query(sql)
                .map_err(|e| translator.translate(ErrorCategory::Execution, &e, Some(sql)))
        })?;
        if handle.is_some() {
            self.status = ExecutionStatus::Succeeded;
        }
        debug!(sql, status = ?self.status, "direct execution");
        self.cursor = handle;
        Ok(self)
    }

    fn execute_prepared(&mut self) -> Result<&mut Self, SqlFacadeError> {
        self.status = ExecutionStatus::Failed;
        let translator = self.manager.translator().clone();
        let statement = &mut self.statement;
        let succeeded = self.manager.with_connection(|_| {
            let Some(statement) = statement.as_mut() else {
                return Err(catalog::EXECUTION_INVALID_STATEMENT.error());
            };
            statement.execute().map_err(|e| {
                translator.translate(ErrorCategory::Execution, &e, Some(statement.sql()))
            })
        })?;
        if succeeded {
            self.status = ExecutionStatus::Succeeded;
        }
        debug!(status = ?self.status, "prepared execution");
        Ok(self)
    }
}
