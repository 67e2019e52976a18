//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::binder::{Binding, Bindings};
pub use crate::config::{ConfigKeys, ConfigSource, MapConfig};
pub use crate::connection::ConnectionManager;
pub use crate::database::{Database, ExecutionStatus, StatementState};
pub use crate::driver::{ConnectAttributes, PrepareOptions};
pub use crate::error::{DomainError, ErrorKind, SqlFacadeError};
pub use crate::results::Row;
pub use crate::types::{FetchShape, ParamCell, ParamKey, ParamType, SqlValue, TypeTag};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteDriver;
