use rusqlite::{ErrorCode, ffi};

use crate::driver::{DriverError, VendorFamily};

/// Map a rusqlite error to a SQLSTATE, keeping the extended result code.
#[must_use]
pub fn translate(err: &rusqlite::Error) -> DriverError {
    let message = err.to_string();
    let (sqlstate, extended) = match err {
        rusqlite::Error::InvalidParameterCount(..) | rusqlite::Error::InvalidParameterName(_) => {
            ("HY093", None)
        }
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            ("22018", None)
        }
        rusqlite::Error::IntegralValueOutOfRange(..) => ("22003", None),
        _ => match err.sqlite_error() {
            Some(ffi_err) => (
                sqlstate_for(ffi_err, &message),
                Some(i64::from(ffi_err.extended_code)),
            ),
            None => (sqlstate_from_message(&message), None),
        },
    };
    let translated = DriverError::new(sqlstate, message);
    match extended {
        Some(code) => translated.with_vendor(VendorFamily::Sqlite, code),
        None => translated,
    }
}

fn sqlstate_for(err: &ffi::Error, message: &str) -> &'static str {
    match err.code {
        ErrorCode::ConstraintViolation => match err.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => "23505",
            ffi::SQLITE_CONSTRAINT_NOTNULL => "23502",
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => "23503",
            ffi::SQLITE_CONSTRAINT_CHECK => "23514",
            _ => "23000",
        },
        ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => "40001",
        ErrorCode::ReadOnly => "25006",
        ErrorCode::DiskFull => "53100",
        ErrorCode::OutOfMemory => "53200",
        ErrorCode::TooBig => "22001",
        ErrorCode::CannotOpen => "08001",
        ErrorCode::NotADatabase => "08004",
        ErrorCode::OperationInterrupted => "HY008",
        ErrorCode::ParameterOutOfRange => "HY093",
        _ => sqlstate_from_message(message),
    }
}

// SQLITE_ERROR covers every prepare-time failure; only the text tells them apart.
fn sqlstate_from_message(message: &str) -> &'static str {
    let lower = message.to_ascii_lowercase();
    if lower.contains("no such table") || lower.contains("no such view") {
        "42S02"
    } else if lower.contains("no such column") {
        "42S22"
    } else if lower.contains("ambiguous column") {
        "42702"
    } else if lower.contains("syntax error") || lower.contains("incomplete input") {
        "42000"
    } else {
        "HY000"
    }
}
