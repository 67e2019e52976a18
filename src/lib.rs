//! Synchronous database-access facade.
//!
//! A [`Database`] owns at most one prepared statement and talks to a single
//! connection held by a [`ConnectionManager`]. Driver failures are translated
//! into a closed taxonomy of [`DomainError`]s with stable numeric codes before
//! they reach the caller.

pub mod binder;
pub mod config;
pub mod connection;
pub mod database;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use binder::{Binding, Bindings};
pub use config::{ConfigKeys, ConfigSource, EnvConfig, JsonFileConfig, MapConfig};
pub use connection::ConnectionManager;
pub use database::{Database, ExecutionStatus, StatementState};
pub use diagnostics::{DiagnosticEntry, DiagnosticSink, JsonLineSink, TracingSink};
pub use driver::{Driver, DriverConnection, DriverError, DriverStatement};
pub use error::{ConfigError, DomainError, ErrorCategory, ErrorKind, SqlFacadeError};
pub use results::{ResultSet, Row};
pub use translation::ErrorTranslator;
pub use types::{DriverKind, FetchShape, ParamCell, ParamKey, ParamType, SqlValue, TypeTag};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;
