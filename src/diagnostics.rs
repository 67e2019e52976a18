//! Where unmapped driver errors are reported.
//!
//! Reporting never fails the caller: sinks swallow their own I/O errors.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};

use crate::driver::DriverError;
use crate::error::ErrorCategory;

/// One unmapped driver failure, with the context needed to diagnose it offline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEntry {
    pub timestamp: DateTime<Utc>,
    pub category: ErrorCategory,
    pub sqlstate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_code: Option<i64>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

impl DiagnosticEntry {
    #[must_use]
    pub fn new(category: ErrorCategory, err: &DriverError, sql: Option<&str>) -> Self {
        Self {
            timestamp: Utc::now(),
            category,
            sqlstate: err.sqlstate.clone(),
            vendor_code: err.vendor.map(|v| v.code),
            message: err.message.clone(),
            sql: sql.map(str::to_owned),
        }
    }
}

/// Receiver of diagnostic entries.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, entry: &DiagnosticEntry);
}

/// Default sink: one `tracing` error event per entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, entry: &DiagnosticEntry) {
        error!(
            category = %entry.category,
            sqlstate = %entry.sqlstate,
            vendor_code = ?entry.vendor_code,
            sql = entry.sql.as_deref().unwrap_or(""),
            "unmapped driver error: {}",
            entry.message
        );
    }
}

/// Writes each entry as a single JSON line.
pub struct JsonLineSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Give the writer back, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> fmt::Debug for JsonLineSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLineSink").finish_non_exhaustive()
    }
}

impl<W: Write + Send> DiagnosticSink for JsonLineSink<W> {
    fn record(&self, entry: &DiagnosticEntry) {
        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(e) => {
                warn!("could not serialize diagnostic entry: {e}");
                return;
            }
        };
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            warn!("could not write diagnostic entry: {e}");
        }
    }
}
