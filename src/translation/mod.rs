//! Driver error → domain error translation.
//!
//! The mapping itself is data: [`catalog`] lists every domain error and
//! [`table`] pairs driver codes with them. [`ErrorTranslator`] adds the one
//! side effect, reporting codes the table does not know.

pub mod catalog;
pub mod table;

use std::fmt;
use std::sync::Arc;

use serde_json::{Value as JsonValue, json};
use tracing::debug;

use crate::diagnostics::{DiagnosticEntry, DiagnosticSink, TracingSink};
use crate::driver::DriverError;
use crate::error::{ErrorCategory, SqlFacadeError};

pub use catalog::ErrorDescriptor;
pub use table::{DriverCode, lookup};

/// Translates driver failures, reporting the ones it cannot classify.
#[derive(Clone)]
pub struct ErrorTranslator {
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl fmt::Debug for ErrorTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorTranslator").finish_non_exhaustive()
    }
}

impl ErrorTranslator {
    #[must_use]
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Translate `err`, raised while performing an operation of `category`.
    ///
    /// `sql` is the statement text, when there is one; it only ends up in the
    /// diagnostic report, never in the returned error.
    #[must_use]
    pub fn translate(
        &self,
        category: ErrorCategory,
        err: &DriverError,
        sql: Option<&str>,
    ) -> SqlFacadeError {
        let details = driver_details(err);
        match table::lookup(category, err) {
            Some(descriptor) => {
                debug!(
                    code = descriptor.code,
                    label = descriptor.label,
                    "translated driver error {err}"
                );
                descriptor.raise(descriptor.domain().with_details(details))
            }
            None => {
                self.sink.record(&DiagnosticEntry::new(category, err, sql));
                let descriptor = table::fallback(category);
                descriptor.raise(descriptor.domain().with_details(details))
            }
        }
    }
}

/// Structured details attached to every domain error built from a driver failure.
#[must_use]
pub fn driver_details(err: &DriverError) -> JsonValue {
    json!({
        "sqlstate": err.sqlstate,
        "vendor_code": err.vendor.map(|v| v.code),
        "driver_message": err.message,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::driver::VendorFamily;
    use crate::error::ErrorKind;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<DiagnosticEntry>>);

    impl DiagnosticSink for Recorder {
        fn record(&self, entry: &DiagnosticEntry) {
            self.0.lock().unwrap().push(entry.clone());
        }
    }

    #[test]
    fn known_codes_are_not_reported() {
        let recorder = Arc::new(Recorder::default());
        let translator = ErrorTranslator::new(recorder.clone());
        let err = DriverError::new("23000", "Duplicate entry 'x'")
            .with_vendor(VendorFamily::Mysql, 1062);

        let translated = translator.translate(ErrorCategory::Execution, &err, Some("INSERT ..."));
        assert_eq!(translated.kind(), ErrorKind::Execution);
        assert_eq!(translated.label(), "db.execution.unique_violation");
        assert_eq!(translated.domain().details.as_ref().unwrap()["vendor_code"], 1062);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_codes_are_reported_with_sql() {
        let recorder = Arc::new(Recorder::default());
        let translator = ErrorTranslator::new(recorder.clone());
        let err = DriverError::new("XX000", "internal error");

        let translated = translator.translate(ErrorCategory::Query, &err, Some("SELECT 1"));
        assert_eq!(translated.kind(), ErrorKind::Query);
        assert_eq!(translated.code(), catalog::QUERY_UNKNOWN.code);
        assert_eq!(translated.domain().message, "unknown error in statement preparation");

        let entries = recorder.0.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sql.as_deref(), Some("SELECT 1"));
        assert_eq!(entries[0].sqlstate, "XX000");
    }

    #[test]
    fn same_condition_same_code_regardless_of_sql() {
        let translator = ErrorTranslator::new(Arc::new(Recorder::default()));
        let err = DriverError::new("23505", "UNIQUE constraint failed: t.a");
        let (insert, update) = ("INSERT INTO t VALUES (1)", "UPDATE t SET a = 1");
        let a = translator.translate(ErrorCategory::Execution, &err, Some(insert));
        let b = translator.translate(ErrorCategory::Execution, &err, Some(update));
        assert_eq!(a.code(), b.code());
        assert_eq!(a.code(), catalog::EXECUTION_UNIQUE_VIOLATION.code);
    }
}
