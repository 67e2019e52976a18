//! Helper utilities for testing and development.

use std::sync::{Arc, Mutex};

use crate::config::MapConfig;
use crate::connection::ConnectionManager;
use crate::database::Database;
use crate::diagnostics::{DiagnosticEntry, DiagnosticSink};
use crate::results::Row;
use crate::translation::ErrorTranslator;
use crate::types::SqlValue;

use super::mock::MockDriver;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<SqlValue>) -> Row {
    Row::new(Arc::new(column_names), values)
}

/// Diagnostic sink that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<DiagnosticEntry>>,
}

impl MemorySink {
    #[must_use]
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, entry: &DiagnosticEntry) {
        match self.entries.lock() {
            Ok(mut guard) => guard.push(entry.clone()),
            Err(poisoned) => poisoned.into_inner().push(entry.clone()),
        }
    }
}

/// A lazily connecting facade over a fresh [`MockDriver`], with its
/// diagnostics captured in a [`MemorySink`].
#[must_use]
pub fn mock_database() -> (Database, MockDriver, Arc<MemorySink>) {
    let driver = MockDriver::new();
    let sink = Arc::new(MemorySink::default());
    let manager = ConnectionManager::new(
        Arc::new(MapConfig::for_dsn("mock:test")),
        Arc::new(driver.clone()),
    )
    .with_translator(ErrorTranslator::new(sink.clone()));
    (Database::new(manager), driver, sink)
}
