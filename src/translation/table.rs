use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::driver::{DriverError, VendorFamily};
use crate::error::ErrorCategory;

use super::catalog::{self, ErrorDescriptor};

/// A driver-side error code the table can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverCode {
    /// Vendor-specific numeric code.
    Vendor(VendorFamily, i64),
    /// Exact five character SQLSTATE.
    State(&'static str),
    /// Two character SQLSTATE class.
    Class(&'static str),
}

#[derive(Debug)]
pub struct TableEntry {
    pub category: ErrorCategory,
    pub code: DriverCode,
    pub descriptor: &'static ErrorDescriptor,
}

use DriverCode::{Class, State, Vendor};
use ErrorCategory::{Bind, Connection, Execution, Fetch, Query};
use VendorFamily::Mysql;

macro_rules! entries {
    ($( $category:ident $code:expr => $descriptor:ident; )+) => {
        &[$(
            TableEntry {
                category: $category,
                code: $code,
                descriptor: &catalog::$descriptor,
            },
        )+]
    };
}

/// Every (category, driver code) pair with a dedicated domain error.
pub static TABLE: &[TableEntry] = entries! {
    // connection
    Connection Vendor(Mysql, 1045) => CONNECTION_AUTH_FAILED;
    Connection State("28000") => CONNECTION_AUTH_FAILED;
    Connection State("28P01") => CONNECTION_AUTH_FAILED;
    Connection Vendor(Mysql, 1044) => CONNECTION_DATABASE_ACCESS_DENIED;
    Connection Vendor(Mysql, 1049) => CONNECTION_UNKNOWN_DATABASE;
    Connection State("3D000") => CONNECTION_UNKNOWN_DATABASE;
    Connection Vendor(Mysql, 2002) => CONNECTION_REFUSED;
    Connection Vendor(Mysql, 2003) => CONNECTION_REFUSED;
    Connection State("08001") => CONNECTION_REFUSED;
    Connection Vendor(Mysql, 2005) => CONNECTION_UNKNOWN_HOST;
    Connection State("HYT00") => CONNECTION_TIMEOUT;
    Connection State("HYT01") => CONNECTION_TIMEOUT;
    Connection Vendor(Mysql, 1040) => CONNECTION_REJECTED;
    Connection State("08004") => CONNECTION_REJECTED;
    Connection State("IM002") => CONNECTION_INVALID_DSN;
    Connection Vendor(Mysql, 2006) => CONNECTION_LOST;
    Connection Vendor(Mysql, 2013) => CONNECTION_LOST;
    Connection State("08S01") => CONNECTION_LOST;
    Connection State("08006") => CONNECTION_LOST;
    Connection Class("08") => CONNECTION_REFUSED;

    // query (preparation)
    Query Vendor(Mysql, 1064) => QUERY_SYNTAX_ERROR;
    Query State("42000") => QUERY_SYNTAX_ERROR;
    Query State("42601") => QUERY_SYNTAX_ERROR;
    Query Vendor(Mysql, 1146) => QUERY_UNKNOWN_TABLE;
    Query State("42S02") => QUERY_UNKNOWN_TABLE;
    Query State("42P01") => QUERY_UNKNOWN_TABLE;
    Query Vendor(Mysql, 1054) => QUERY_UNKNOWN_COLUMN;
    Query State("42S22") => QUERY_UNKNOWN_COLUMN;
    Query State("42703") => QUERY_UNKNOWN_COLUMN;
    Query Vendor(Mysql, 1142) => QUERY_ACCESS_DENIED;
    Query State("42501") => QUERY_ACCESS_DENIED;
    Query Vendor(Mysql, 1052) => QUERY_AMBIGUOUS_COLUMN;
    Query State("42702") => QUERY_AMBIGUOUS_COLUMN;
    Query Vendor(Mysql, 2006) => QUERY_CONNECTION_LOST;
    Query State("08S01") => QUERY_CONNECTION_LOST;
    Query State("IM001") => QUERY_UNSUPPORTED;
    Query State("0A000") => QUERY_UNSUPPORTED;
    Query Class("42") => QUERY_SYNTAX_ERROR;
    Query Class("08") => QUERY_CONNECTION_LOST;

    // bind
    Bind State("HY093") => BIND_INVALID_PARAMETER_NUMBER;
    Bind State("07001") => BIND_INVALID_PARAMETER_NUMBER;
    Bind State("22018") => BIND_TYPE_MISMATCH;
    Bind State("HY105") => BIND_TYPE_MISMATCH;
    Bind State("HY004") => BIND_TYPE_MISMATCH;
    Bind State("22001") => BIND_TRUNCATED;
    Bind State("01004") => BIND_TRUNCATED;

    // execution
    Execution Vendor(Mysql, 2006) => EXECUTION_CONNECTION_LOST;
    Execution Vendor(Mysql, 2013) => EXECUTION_CONNECTION_LOST;
    Execution State("08S01") => EXECUTION_CONNECTION_LOST;
    Execution State("08003") => EXECUTION_CONNECTION_LOST;
    Execution State("08006") => EXECUTION_CONNECTION_LOST;
    Execution State("08007") => EXECUTION_CONNECTION_LOST;
    Execution Class("08") => EXECUTION_CONNECTION_LOST;
    Execution Vendor(Mysql, 1048) => EXECUTION_NOT_NULL_VIOLATION;
    Execution State("23502") => EXECUTION_NOT_NULL_VIOLATION;
    Execution Vendor(Mysql, 1451) => EXECUTION_FOREIGN_KEY_VIOLATION;
    Execution Vendor(Mysql, 1452) => EXECUTION_FOREIGN_KEY_VIOLATION;
    Execution State("23503") => EXECUTION_FOREIGN_KEY_VIOLATION;
    Execution Vendor(Mysql, 1062) => EXECUTION_UNIQUE_VIOLATION;
    Execution Vendor(Mysql, 1586) => EXECUTION_UNIQUE_VIOLATION;
    Execution State("23505") => EXECUTION_UNIQUE_VIOLATION;
    Execution Vendor(Mysql, 3819) => EXECUTION_CHECK_VIOLATION;
    Execution State("23514") => EXECUTION_CHECK_VIOLATION;
    Execution State("23000") => EXECUTION_INTEGRITY_VIOLATION;
    Execution Class("23") => EXECUTION_INTEGRITY_VIOLATION;
    Execution Vendor(Mysql, 1213) => EXECUTION_DEADLOCK;
    Execution State("40001") => EXECUTION_DEADLOCK;
    Execution State("40P01") => EXECUTION_DEADLOCK;
    Execution Vendor(Mysql, 1205) => EXECUTION_LOCK_TIMEOUT;
    Execution State("55P03") => EXECUTION_LOCK_TIMEOUT;
    Execution Vendor(Mysql, 1064) => EXECUTION_SYNTAX_ERROR;
    Execution State("42000") => EXECUTION_SYNTAX_ERROR;
    Execution State("42601") => EXECUTION_SYNTAX_ERROR;
    Execution Vendor(Mysql, 1146) => EXECUTION_UNKNOWN_TABLE;
    Execution State("42S02") => EXECUTION_UNKNOWN_TABLE;
    Execution State("42P01") => EXECUTION_UNKNOWN_TABLE;
    Execution Vendor(Mysql, 1054) => EXECUTION_UNKNOWN_COLUMN;
    Execution State("42S22") => EXECUTION_UNKNOWN_COLUMN;
    Execution State("42703") => EXECUTION_UNKNOWN_COLUMN;
    Execution Vendor(Mysql, 1142) => EXECUTION_ACCESS_DENIED;
    Execution Vendor(Mysql, 1143) => EXECUTION_ACCESS_DENIED;
    Execution State("42501") => EXECUTION_ACCESS_DENIED;
    Execution Class("42") => EXECUTION_SYNTAX_ERROR;
    Execution Vendor(Mysql, 1264) => EXECUTION_OUT_OF_RANGE;
    Execution State("22003") => EXECUTION_OUT_OF_RANGE;
    Execution Vendor(Mysql, 1406) => EXECUTION_DATA_TOO_LONG;
    Execution State("22001") => EXECUTION_DATA_TOO_LONG;
    Execution Vendor(Mysql, 1292) => EXECUTION_INVALID_DATETIME;
    Execution State("22007") => EXECUTION_INVALID_DATETIME;
    Execution State("22008") => EXECUTION_INVALID_DATETIME;
    Execution Vendor(Mysql, 1365) => EXECUTION_DIVISION_BY_ZERO;
    Execution State("22012") => EXECUTION_DIVISION_BY_ZERO;
    Execution Vendor(Mysql, 1366) => EXECUTION_INVALID_VALUE;
    Execution State("22018") => EXECUTION_INVALID_VALUE;
    Execution State("22P02") => EXECUTION_INVALID_VALUE;
    Execution Class("22") => EXECUTION_INVALID_VALUE;
    Execution Vendor(Mysql, 1114) => EXECUTION_DISK_FULL;
    Execution State("53100") => EXECUTION_DISK_FULL;
    Execution Vendor(Mysql, 1037) => EXECUTION_OUT_OF_MEMORY;
    Execution Vendor(Mysql, 1038) => EXECUTION_OUT_OF_MEMORY;
    Execution State("53200") => EXECUTION_OUT_OF_MEMORY;
    Execution Vendor(Mysql, 1040) => EXECUTION_TOO_MANY_CONNECTIONS;
    Execution State("53300") => EXECUTION_TOO_MANY_CONNECTIONS;
    Execution Vendor(Mysql, 1317) => EXECUTION_INTERRUPTED;
    Execution State("HY008") => EXECUTION_INTERRUPTED;
    Execution State("57014") => EXECUTION_INTERRUPTED;
    Execution Vendor(Mysql, 1792) => EXECUTION_READ_ONLY;
    Execution State("25006") => EXECUTION_READ_ONLY;
    Execution State("HY093") => EXECUTION_PARAMETER_MISMATCH;
    Execution State("07001") => EXECUTION_PARAMETER_MISMATCH;
    Execution State("IM001") => EXECUTION_UNSUPPORTED;
    Execution State("HYC00") => EXECUTION_UNSUPPORTED;
    Execution State("0A000") => EXECUTION_UNSUPPORTED;

    // fetch
    Fetch State("22003") => FETCH_OUT_OF_RANGE;
    Fetch State("22018") => FETCH_INVALID_TYPE;
    Fetch State("22P02") => FETCH_INVALID_TYPE;
    Fetch State("HY010") => FETCH_SEQUENCE_ERROR;
    Fetch State("24000") => FETCH_CURSOR_STATE;
    Fetch State("01004") => FETCH_TRUNCATED;
    Fetch State("22001") => FETCH_TRUNCATED;
    Fetch Vendor(Mysql, 2006) => FETCH_CONNECTION_LOST;
    Fetch Vendor(Mysql, 2013) => FETCH_CONNECTION_LOST;
    Fetch State("08S01") => FETCH_CONNECTION_LOST;
    Fetch Class("08") => FETCH_CONNECTION_LOST;
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Vendor(VendorFamily, i64),
    State(String),
    Class(String),
}

impl From<DriverCode> for IndexKey {
    fn from(code: DriverCode) -> Self {
        match code {
            Vendor(family, code) => IndexKey::Vendor(family, code),
            State(state) => IndexKey::State(state.to_owned()),
            Class(class) => IndexKey::Class(class.to_owned()),
        }
    }
}

lazy_static! {
    static ref INDEX: HashMap<(ErrorCategory, IndexKey), &'static ErrorDescriptor> = TABLE
        .iter()
        .map(|entry| ((entry.category, IndexKey::from(entry.code)), entry.descriptor))
        .collect();
}

/// Resolve a driver error: vendor code first, then exact SQLSTATE, then the
/// SQLSTATE class. `None` means the error is unknown to the table.
#[must_use]
pub fn lookup(category: ErrorCategory, err: &DriverError) -> Option<&'static ErrorDescriptor> {
    let vendor = err
        .vendor
        .map(|v| (category, IndexKey::Vendor(v.family, v.code)));
    let state = (category, IndexKey::State(err.sqlstate.to_ascii_uppercase()));
    let class = (
        category,
        IndexKey::Class(err.sqlstate_class().to_ascii_uppercase()),
    );
    vendor
        .into_iter()
        .chain([state, class])
        .find_map(|key| INDEX.get(&key).copied())
}

/// Fallback when [`lookup`] finds nothing.
#[must_use]
pub fn fallback(category: ErrorCategory) -> &'static ErrorDescriptor {
    catalog::unknown(category)
}
