//! Every domain error the facade can raise.
//!
//! Codes are grouped by category: connection 1xxx, query 2xxx, bind 3xxx,
//! execution 4xxx, transaction 5xxx, fetch 6xxx. `x099` is the category's
//! generic "unknown error" entry.

use crate::error::{DomainError, ErrorCategory, ErrorKind, SqlFacadeError};

/// Static description of one error condition.
#[derive(Debug, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub code: u32,
    pub label: &'static str,
    pub message: &'static str,
    pub status: u16,
    pub category: ErrorCategory,
    pub kind: ErrorKind,
}

impl ErrorDescriptor {
    #[must_use]
    pub fn domain(&self) -> DomainError {
        DomainError {
            code: self.code,
            label: self.label,
            message: self.message.to_owned(),
            status: self.status,
            category: self.category,
            details: None,
        }
    }

    /// Build the error with the descriptor's default message.
    #[must_use]
    pub fn error(&self) -> SqlFacadeError {
        self.raise(self.domain())
    }

    /// Build the error with a message specific to this occurrence.
    #[must_use]
    pub fn error_with(&self, message: impl Into<String>) -> SqlFacadeError {
        self.raise(self.domain().with_message(message))
    }

    /// Wrap an already-built domain error in this descriptor's variant.
    #[must_use]
    pub fn raise(&self, domain: DomainError) -> SqlFacadeError {
        match self.kind {
            ErrorKind::Connection => SqlFacadeError::ConnectionError(domain),
            ErrorKind::Query => SqlFacadeError::QueryError(domain),
            ErrorKind::Bind => SqlFacadeError::BindError(domain),
            ErrorKind::InvalidType => SqlFacadeError::InvalidType(domain),
            ErrorKind::Execution => SqlFacadeError::ExecutionError(domain),
            ErrorKind::Transaction => SqlFacadeError::TransactionError(domain),
            ErrorKind::Fetch => SqlFacadeError::FetchError(domain),
        }
    }
}

macro_rules! descriptors {
    ($( $name:ident: $kind:ident / $category:ident = $code:literal, $label:literal, $status:literal, $message:literal; )+) => {
        $(
            pub static $name: ErrorDescriptor = ErrorDescriptor {
                code: $code,
                label: $label,
                message: $message,
                status: $status,
                category: ErrorCategory::$category,
                kind: ErrorKind::$kind,
            };
        )+

        /// All descriptors, in declaration order.
        pub static ALL: &[&ErrorDescriptor] = &[$(&$name),+];
    };
}

descriptors! {
    // connection
    CONNECTION_CONFIG_UNAVAILABLE: Connection / Connection = 1001, "db.connection.config_unavailable", 503, "configuration source is unavailable";
    CONNECTION_CONFIG_MISSING_KEY: Connection / Connection = 1002, "db.connection.config_missing_key", 500, "required connection setting is missing";
    CONNECTION_NOT_CONNECTED: Connection / Connection = 1003, "db.connection.not_connected", 409, "there is no open connection";
    CONNECTION_CLOSED: Connection / Connection = 1004, "db.connection.closed", 503, "the connection has been closed";
    CONNECTION_AUTH_FAILED: Connection / Connection = 1010, "db.connection.auth_failed", 401, "database authentication failed";
    CONNECTION_DATABASE_ACCESS_DENIED: Connection / Connection = 1011, "db.connection.database_access_denied", 403, "access to the database was denied";
    CONNECTION_UNKNOWN_DATABASE: Connection / Connection = 1012, "db.connection.unknown_database", 404, "the target database does not exist";
    CONNECTION_REFUSED: Connection / Connection = 1013, "db.connection.refused", 503, "the database server is unreachable";
    CONNECTION_UNKNOWN_HOST: Connection / Connection = 1014, "db.connection.unknown_host", 503, "the database host could not be resolved";
    CONNECTION_TIMEOUT: Connection / Connection = 1015, "db.connection.timeout", 504, "the connection attempt timed out";
    CONNECTION_REJECTED: Connection / Connection = 1016, "db.connection.rejected", 503, "the server rejected the connection";
    CONNECTION_INVALID_DSN: Connection / Connection = 1017, "db.connection.invalid_dsn", 500, "the data source name is invalid or has no driver";
    CONNECTION_LOST: Connection / Connection = 1018, "db.connection.lost", 503, "the connection to the server was lost";
    CONNECTION_UNKNOWN: Connection / Connection = 1099, "db.connection.unknown", 500, "unknown error in connection";

    // query (statement preparation)
    QUERY_EMPTY_SQL: Query / Query = 2001, "db.query.empty_sql", 400, "cannot prepare an empty SQL statement";
    QUERY_SYNTAX_ERROR: Query / Query = 2010, "db.query.syntax_error", 400, "the SQL statement has a syntax error";
    QUERY_UNKNOWN_TABLE: Query / Query = 2011, "db.query.unknown_table", 400, "the statement references a table or view that does not exist";
    QUERY_UNKNOWN_COLUMN: Query / Query = 2012, "db.query.unknown_column", 400, "the statement references a column that does not exist";
    QUERY_ACCESS_DENIED: Query / Query = 2013, "db.query.access_denied", 403, "insufficient privileges for the statement";
    QUERY_AMBIGUOUS_COLUMN: Query / Query = 2014, "db.query.ambiguous_column", 400, "a column reference in the statement is ambiguous";
    QUERY_CONNECTION_LOST: Query / Query = 2015, "db.query.connection_lost", 503, "the connection was lost while preparing the statement";
    QUERY_UNSUPPORTED: Query / Query = 2016, "db.query.unsupported", 501, "the driver does not support this statement";
    QUERY_UNKNOWN: Query / Query = 2099, "db.query.unknown", 500, "unknown error in statement preparation";

    // bind
    BIND_INVALID_FORMAT: Bind / Bind = 3001, "db.bind.invalid_format", 400, "binding input mixes single and batch shapes";
    BIND_INVALID_TYPE: InvalidType / Bind = 3002, "db.bind.invalid_type", 400, "parameter type must be string, integer, boolean or null";
    BIND_NO_STATEMENT: Bind / Bind = 3003, "db.bind.no_statement", 409, "no prepared statement to bind parameters to";
    BIND_INVALID_NAME: Bind / Bind = 3004, "db.bind.invalid_name", 400, "parameter name or position is empty or invalid";
    BIND_INVALID_PARAMETER_NUMBER: Bind / Bind = 3010, "db.bind.invalid_parameter_number", 400, "the parameter does not exist in the statement";
    BIND_TYPE_MISMATCH: Bind / Bind = 3011, "db.bind.type_mismatch", 422, "the value does not match the declared parameter type";
    BIND_TRUNCATED: Bind / Bind = 3012, "db.bind.truncated", 422, "the value would be truncated";
    BIND_UNKNOWN: Bind / Bind = 3099, "db.bind.unknown", 500, "unknown error in parameter binding";

    // execution
    EXECUTION_INVALID_STATEMENT: Execution / Execution = 4001, "db.execution.invalid_statement", 400, "invalid or no statement to execute";
    EXECUTION_CONNECTION_LOST: Execution / Execution = 4010, "db.execution.connection_lost", 503, "the connection was lost during execution";
    EXECUTION_NOT_NULL_VIOLATION: Execution / Execution = 4011, "db.execution.not_null_violation", 409, "a required column was given NULL";
    EXECUTION_FOREIGN_KEY_VIOLATION: Execution / Execution = 4012, "db.execution.foreign_key_violation", 409, "a foreign key constraint failed";
    EXECUTION_UNIQUE_VIOLATION: Execution / Execution = 4013, "db.execution.unique_violation", 409, "a unique constraint failed";
    EXECUTION_CHECK_VIOLATION: Execution / Execution = 4014, "db.execution.check_violation", 409, "a check constraint failed";
    EXECUTION_INTEGRITY_VIOLATION: Execution / Execution = 4015, "db.execution.integrity_violation", 409, "an integrity constraint failed";
    EXECUTION_DEADLOCK: Execution / Execution = 4016, "db.execution.deadlock", 409, "the statement was chosen as a deadlock victim";
    EXECUTION_LOCK_TIMEOUT: Execution / Execution = 4017, "db.execution.lock_wait_timeout", 503, "timed out waiting for a lock";
    EXECUTION_SYNTAX_ERROR: Execution / Execution = 4018, "db.execution.syntax_error", 400, "the SQL statement has a syntax error";
    EXECUTION_UNKNOWN_TABLE: Execution / Execution = 4019, "db.execution.unknown_table", 400, "the statement references a table or view that does not exist";
    EXECUTION_UNKNOWN_COLUMN: Execution / Execution = 4020, "db.execution.unknown_column", 400, "the statement references a column that does not exist";
    EXECUTION_ACCESS_DENIED: Execution / Execution = 4021, "db.execution.access_denied", 403, "insufficient privileges for the statement";
    EXECUTION_OUT_OF_RANGE: Execution / Execution = 4022, "db.execution.out_of_range", 422, "a numeric value is out of range";
    EXECUTION_DATA_TOO_LONG: Execution / Execution = 4023, "db.execution.data_too_long", 422, "a value is too long for its column";
    EXECUTION_INVALID_DATETIME: Execution / Execution = 4024, "db.execution.invalid_datetime", 422, "a date or time value is invalid";
    EXECUTION_DIVISION_BY_ZERO: Execution / Execution = 4025, "db.execution.division_by_zero", 422, "division by zero";
    EXECUTION_INVALID_VALUE: Execution / Execution = 4026, "db.execution.invalid_value", 422, "a value is invalid for its column type";
    EXECUTION_DISK_FULL: Execution / Execution = 4027, "db.execution.disk_full", 507, "the database storage is full";
    EXECUTION_OUT_OF_MEMORY: Execution / Execution = 4028, "db.execution.out_of_memory", 503, "the database server is out of memory";
    EXECUTION_TOO_MANY_CONNECTIONS: Execution / Execution = 4029, "db.execution.too_many_connections", 503, "the database server has too many connections";
    EXECUTION_INTERRUPTED: Execution / Execution = 4030, "db.execution.interrupted", 408, "the statement was cancelled";
    EXECUTION_READ_ONLY: Execution / Execution = 4031, "db.execution.read_only", 403, "the database or transaction is read-only";
    EXECUTION_PARAMETER_MISMATCH: Execution / Execution = 4032, "db.execution.parameter_mismatch", 400, "bound parameters do not match the statement placeholders";
    EXECUTION_UNSUPPORTED: Execution / Execution = 4033, "db.execution.unsupported", 501, "the driver does not support this operation";
    EXECUTION_UNKNOWN: Execution / Execution = 4099, "db.execution.unknown", 500, "unknown error in statement execution";

    // transaction
    TRANSACTION_NO_CONNECTION: Transaction / Transaction = 5001, "db.transaction.no_connection", 503, "no connection to run a transaction on";
    TRANSACTION_ALREADY_ACTIVE: Transaction / Transaction = 5002, "db.transaction.already_active", 409, "a transaction is already active";
    TRANSACTION_NOT_ACTIVE: Transaction / Transaction = 5003, "db.transaction.not_active", 409, "there is no active transaction";
    TRANSACTION_BEGIN_FAILED: Transaction / Transaction = 5004, "db.transaction.begin_failed", 500, "the transaction could not be started";
    TRANSACTION_COMMIT_FAILED: Transaction / Transaction = 5005, "db.transaction.commit_failed", 500, "the transaction could not be committed";
    TRANSACTION_ROLLBACK_FAILED: Transaction / Transaction = 5006, "db.transaction.rollback_failed", 500, "the transaction could not be rolled back";
    TRANSACTION_UNKNOWN: Transaction / Transaction = 5099, "db.transaction.unknown", 500, "unknown error in transaction handling";

    // fetch
    FETCH_NOT_EXECUTED: Fetch / Fetch = 6001, "db.fetch.not_executed", 409, "no successfully executed statement to read from";
    FETCH_OUT_OF_RANGE: Fetch / Fetch = 6010, "db.fetch.out_of_range", 422, "a fetched value is out of range";
    FETCH_INVALID_TYPE: Fetch / Fetch = 6011, "db.fetch.invalid_type", 422, "a fetched value cannot be converted";
    FETCH_SEQUENCE_ERROR: Fetch / Fetch = 6012, "db.fetch.sequence_error", 409, "the cursor was read out of sequence";
    FETCH_CURSOR_STATE: Fetch / Fetch = 6013, "db.fetch.invalid_cursor_state", 409, "the cursor is in an invalid state";
    FETCH_TRUNCATED: Fetch / Fetch = 6014, "db.fetch.truncated", 422, "a fetched value was truncated";
    FETCH_CONNECTION_LOST: Fetch / Fetch = 6015, "db.fetch.connection_lost", 503, "the connection was lost while fetching";
    FETCH_UNKNOWN: Fetch / Fetch = 6099, "db.fetch.unknown", 500, "unknown error in result fetching";
}

/// Generic descriptor raised for driver codes the table does not know.
#[must_use]
pub fn unknown(category: ErrorCategory) -> &'static ErrorDescriptor {
    match category {
        ErrorCategory::Connection => &CONNECTION_UNKNOWN,
        ErrorCategory::Query => &QUERY_UNKNOWN,
        ErrorCategory::Bind => &BIND_UNKNOWN,
        ErrorCategory::Execution => &EXECUTION_UNKNOWN,
        ErrorCategory::Transaction => &TRANSACTION_UNKNOWN,
        ErrorCategory::Fetch => &FETCH_UNKNOWN,
    }
}

/// Look a descriptor up by its numeric code.
#[must_use]
pub fn by_code(code: u32) -> Option<&'static ErrorDescriptor> {
    ALL.iter().copied().find(|d| d.code == code)
}
