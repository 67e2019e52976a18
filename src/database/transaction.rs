use tracing::{debug, warn};

use super::Database;
use crate::driver::{DriverConnection, DriverError};
use crate::error::{ErrorCategory, SqlFacadeError};
use crate::translation::{ErrorDescriptor, catalog, driver_details};

impl Database {
    /// Run `func` on the shared connection, reporting a closed connection as a
    /// transaction error.
    fn on_connection<F, R>(&self, func: F) -> Result<R, SqlFacadeError>
    where
        F: FnOnce(&mut dyn DriverConnection) -> Result<R, SqlFacadeError>,
    {
        match self.manager.with_connection(func) {
            Err(SqlFacadeError::ConnectionError(domain))
                if domain.code == catalog::CONNECTION_CLOSED.code =>
            {
                Err(catalog::TRANSACTION_NO_CONNECTION.error())
            }
            other => other,
        }
    }

    /// # Errors
    /// Returns `SqlFacadeError::TransactionError` if there is no connection, a
    /// transaction is already active, or the driver fails to open one.
    pub fn begin_transaction(&mut self) -> Result<&mut Self, SqlFacadeError> {
        self.on_connection(|conn| {
            if conn.in_transaction() {
                return Err(catalog::TRANSACTION_ALREADY_ACTIVE.error());
            }
            conn.begin_transaction()
                .map_err(|e| failed(&catalog::TRANSACTION_BEGIN_FAILED, &e))
        })?;
        debug!("transaction started");
        Ok(self)
    }

    /// # Errors
    /// Returns `SqlFacadeError::TransactionError` if there is no connection, no
    /// active transaction, or the commit fails.
    pub fn commit(&mut self) -> Result<&mut Self, SqlFacadeError> {
        self.on_connection(|conn| {
            if !conn.in_transaction() {
                let message = "no active transaction to commit";
                return Err(catalog::TRANSACTION_NOT_ACTIVE.error_with(message));
            }
            conn.commit()
                .map_err(|e| failed(&catalog::TRANSACTION_COMMIT_FAILED, &e))
        })?;
        debug!("transaction committed");
        Ok(self)
    }

    /// # Errors
    /// Returns `SqlFacadeError::TransactionError` if there is no connection, no
    /// active transaction, or the rollback fails.
    pub fn rollback(&mut self) -> Result<&mut Self, SqlFacadeError> {
        self.on_connection(|conn| {
            if !conn.in_transaction() {
                let message = "no active transaction to roll back";
                return Err(catalog::TRANSACTION_NOT_ACTIVE.error_with(message));
            }
            conn.rollback()
                .map_err(|e| failed(&catalog::TRANSACTION_ROLLBACK_FAILED, &e))
        })?;
        debug!("transaction rolled back");
        Ok(self)
    }

    /// Live transaction flag of the shared connection; `false` when not connected.
    #[must_use]
    pub fn has_active_transactions(&self) -> bool {
        self.manager
            .with_open_connection(|conn| conn.in_transaction())
            .unwrap_or(false)
    }

    /// Run `func` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// # Errors
    /// Returns the error from `func`, or a `SqlFacadeError::TransactionError`
    /// from begin/commit.
    pub fn transaction<T, F>(&mut self, func: F) -> Result<T, SqlFacadeError>
    where
        F: FnOnce(&mut Self) -> Result<T, SqlFacadeError>,
    {
        self.begin_transaction()?;
        match func(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                if self.has_active_transactions() {
                    if let Err(rollback_err) = self.rollback() {
                        warn!("rollback after failed transaction body also failed: {rollback_err}");
                    }
                }
                Err(err)
            }
        }
    }

    /// Id of the last inserted row as reported by the driver.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if the connection is closed, or
    /// a translated execution error if the driver cannot report an id.
    pub fn last_insert_id(&self) -> Result<String, SqlFacadeError> {
        self.last_insert_id_inner(None)
    }

    /// Like [`Database::last_insert_id`], for drivers that key ids by sequence name.
    ///
    /// # Errors
    /// See [`Database::last_insert_id`].
    pub fn last_insert_id_for(&self, name: &str) -> Result<String, SqlFacadeError> {
        self.last_insert_id_inner(Some(name))
    }

    fn last_insert_id_inner(&self, name: Option<&str>) -> Result<String, SqlFacadeError> {
        let translator = self.manager.translator().clone();
        self.manager.with_connection(|conn| {
            conn.last_insert_id(name)
                .map_err(|e| translator.translate(ErrorCategory::Execution, &e, None))
        })
    }
}

fn failed(descriptor: &ErrorDescriptor, err: &DriverError) -> SqlFacadeError {
    descriptor.raise(
        descriptor
            .domain()
            .with_message(format!("{}: {}", descriptor.message, err.message))
            .with_details(driver_details(err)),
    )
}
