use std::fmt;

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Operation category a failure belongs to. Determines the code range and the
/// error kind a driver failure is surfaced as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Connection,
    Query,
    Bind,
    Execution,
    Transaction,
    Fetch,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 6] = [
        ErrorCategory::Connection,
        ErrorCategory::Query,
        ErrorCategory::Bind,
        ErrorCategory::Execution,
        ErrorCategory::Transaction,
        ErrorCategory::Fetch,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Connection => "connection",
            ErrorCategory::Query => "query",
            ErrorCategory::Bind => "bind",
            ErrorCategory::Execution => "execution",
            ErrorCategory::Transaction => "transaction",
            ErrorCategory::Fetch => "fetch",
        }
    }

    /// Human name of the operation, used in "unknown error in <operation>" messages.
    #[must_use]
    pub fn operation(self) -> &'static str {
        match self {
            ErrorCategory::Connection => "connection",
            ErrorCategory::Query => "statement preparation",
            ErrorCategory::Bind => "parameter binding",
            ErrorCategory::Execution => "statement execution",
            ErrorCategory::Transaction => "transaction handling",
            ErrorCategory::Fetch => "result fetching",
        }
    }

    /// Lowest numeric code of the category's range.
    #[must_use]
    pub fn code_base(self) -> u32 {
        match self {
            ErrorCategory::Connection => 1000,
            ErrorCategory::Query => 2000,
            ErrorCategory::Bind => 3000,
            ErrorCategory::Execution => 4000,
            ErrorCategory::Transaction => 5000,
            ErrorCategory::Fetch => 6000,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable, application-facing description of a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainError {
    /// Unique across the whole taxonomy.
    pub code: u32,
    /// `db.<category>.<reason>`
    pub label: &'static str,
    pub message: String,
    /// HTTP-equivalent status class.
    pub status: u16,
    pub category: ErrorCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl DomainError {
    #[must_use]
    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} #{}]", self.message, self.label, self.code)
    }
}

/// Which variant of [`SqlFacadeError`] a failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Query,
    Bind,
    InvalidType,
    Execution,
    Transaction,
    Fetch,
}

#[derive(Debug, Error)]
pub enum SqlFacadeError {
    #[error("Connection error: {0}")]
    ConnectionError(DomainError),

    #[error("Query error: {0}")]
    QueryError(DomainError),

    #[error("Parameter binding error: {0}")]
    BindError(DomainError),

    #[error("Invalid parameter type: {0}")]
    InvalidType(DomainError),

    #[error("SQL execution error: {0}")]
    ExecutionError(DomainError),

    #[error("Transaction error: {0}")]
    TransactionError(DomainError),

    #[error("Fetch error: {0}")]
    FetchError(DomainError),
}

impl SqlFacadeError {
    /// Wrap a domain error in the variant matching its category.
    #[must_use]
    pub fn from_domain(domain: DomainError) -> Self {
        match domain.category {
            ErrorCategory::Connection => SqlFacadeError::ConnectionError(domain),
            ErrorCategory::Query => SqlFacadeError::QueryError(domain),
            ErrorCategory::Bind => SqlFacadeError::BindError(domain),
            ErrorCategory::Execution => SqlFacadeError::ExecutionError(domain),
            ErrorCategory::Transaction => SqlFacadeError::TransactionError(domain),
            ErrorCategory::Fetch => SqlFacadeError::FetchError(domain),
        }
    }

    #[must_use]
    pub fn domain(&self) -> &DomainError {
        match self {
            SqlFacadeError::ConnectionError(d)
            | SqlFacadeError::QueryError(d)
            | SqlFacadeError::BindError(d)
            | SqlFacadeError::InvalidType(d)
            | SqlFacadeError::ExecutionError(d)
            | SqlFacadeError::TransactionError(d)
            | SqlFacadeError::FetchError(d) => d,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlFacadeError::ConnectionError(_) => ErrorKind::Connection,
            SqlFacadeError::QueryError(_) => ErrorKind::Query,
            SqlFacadeError::BindError(_) => ErrorKind::Bind,
            SqlFacadeError::InvalidType(_) => ErrorKind::InvalidType,
            SqlFacadeError::ExecutionError(_) => ErrorKind::Execution,
            SqlFacadeError::TransactionError(_) => ErrorKind::Transaction,
            SqlFacadeError::FetchError(_) => ErrorKind::Fetch,
        }
    }

    #[must_use]
    pub fn code(&self) -> u32 {
        self.domain().code
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.domain().label
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.domain().status
    }
}

impl From<DomainError> for SqlFacadeError {
    fn from(domain: DomainError) -> Self {
        SqlFacadeError::from_domain(domain)
    }
}

/// Failure reported by the configuration collaborator.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration source unavailable: {0}")]
    Unavailable(String),

    #[error("configuration lookup for `{key}` failed: {reason}")]
    Lookup { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
