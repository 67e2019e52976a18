//! Narrow capability the facade calls into.
//!
//! Everything below these traits (wire protocol, SQL parsing, the engine
//! itself) belongs to the backend. Implementations report failures as
//! [`DriverError`]s; the facade translates them before they reach callers.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::results::Row;
use crate::types::{BindSource, DriverKind, FetchShape, ParamKey, ParamType, SqlValue};

/// Numbering scheme a vendor-specific error code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorFamily {
    Mysql,
    Sqlite,
    Pgsql,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VendorCode {
    pub family: VendorFamily,
    pub code: i64,
}

/// Raw failure reported by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    /// Five character SQLSTATE (`HY000` when the driver has nothing better).
    pub sqlstate: String,
    pub vendor: Option<VendorCode>,
    pub message: String,
}

impl DriverError {
    #[must_use]
    pub fn new(sqlstate: &str, message: impl Into<String>) -> Self {
        Self {
            sqlstate: sqlstate.to_owned(),
            vendor: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_vendor(mut self, family: VendorFamily, code: i64) -> Self {
        self.vendor = Some(VendorCode { family, code });
        self
    }

    /// Two character SQLSTATE class, e.g. `23` for integrity violations.
    #[must_use]
    pub fn sqlstate_class(&self) -> &str {
        self.sqlstate.get(..2).unwrap_or("")
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQLSTATE[{}]", self.sqlstate)?;
        if let Some(vendor) = self.vendor {
            write!(f, " ({:?} {})", vendor.family, vendor.code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for DriverError {}

/// How the driver reports failures. Only exception-style reporting is
/// supported by the facade; the field exists so adapters can assert it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    #[default]
    Exception,
    Silent,
}

/// Attributes every connection is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectAttributes {
    pub persistent: bool,
    pub error_mode: ErrorMode,
    pub default_fetch: FetchShape,
}

impl Default for ConnectAttributes {
    fn default() -> Self {
        Self {
            persistent: true,
            error_mode: ErrorMode::Exception,
            default_fetch: FetchShape::Assoc,
        }
    }
}

/// Per-statement preparation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Let the driver reuse a cached compiled statement for identical SQL.
    pub cached: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self { cached: true }
    }
}

/// A binding as it was applied to a statement, with references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    pub key: ParamKey,
    pub value: SqlValue,
    pub param_type: ParamType,
    pub by_reference: bool,
}

/// Entry point of a backend: opens connections.
pub trait Driver: Send + Sync {
    /// Open a connection.
    ///
    /// `user`/`password` are `None` when the configuration does not carry them,
    /// which is different from an empty string.
    ///
    /// # Errors
    /// Returns a [`DriverError`] describing why the connection could not be opened.
    fn connect(
        &self,
        dsn: &str,
        user: Option<&str>,
        password: Option<&str>,
        attributes: &ConnectAttributes,
    ) -> Result<Box<dyn DriverConnection>, DriverError>;
}

/// An open database connection.
pub trait DriverConnection: Send {
    /// # Errors
    /// Returns a [`DriverError`] when the SQL cannot be compiled.
    fn prepare(
        &mut self,
        sql: &str,
        options: &PrepareOptions,
    ) -> Result<Box<dyn DriverStatement>, DriverError>;

    /// Prepare and run `sql` in one step. `Ok(None)` means the driver produced
    /// no usable result handle.
    ///
    /// # Errors
    /// Returns a [`DriverError`] when preparation or execution fails.
    fn query(&mut self, sql: &str) -> Result<Option<Box<dyn DriverStatement>>, DriverError>;

    /// # Errors
    /// Returns a [`DriverError`] when the transaction cannot be opened.
    fn begin_transaction(&mut self) -> Result<(), DriverError>;

    /// # Errors
    /// Returns a [`DriverError`] when the commit fails.
    fn commit(&mut self) -> Result<(), DriverError>;

    /// # Errors
    /// Returns a [`DriverError`] when the rollback fails.
    fn rollback(&mut self) -> Result<(), DriverError>;

    /// Live transaction flag, read from the engine.
    fn in_transaction(&self) -> bool;

    /// # Errors
    /// Returns a [`DriverError`] when the driver cannot report an id.
    fn last_insert_id(&self, name: Option<&str>) -> Result<String, DriverError>;
}

/// A statement bound to one SQL text.
pub trait DriverStatement: Send {
    fn sql(&self) -> &str;

    /// Validate a binding without storing it. The facade checks every entry
    /// of a call before binding any of them; drivers that cannot tell ahead of
    /// time keep the default.
    ///
    /// # Errors
    /// Returns the [`DriverError`] `bind` would report for this entry.
    fn check(
        &self,
        _key: &ParamKey,
        _source: &BindSource,
        _ty: ParamType,
    ) -> Result<(), DriverError> {
        Ok(())
    }

    /// # Errors
    /// Returns a [`DriverError`] when the placeholder does not exist or the
    /// value is rejected.
    fn bind(
        &mut self,
        key: &ParamKey,
        source: BindSource,
        ty: ParamType,
    ) -> Result<(), DriverError>;

    /// Bindings currently applied, in bind order, references resolved.
    fn bound_parameters(&self) -> Vec<BoundParameter>;

    /// # Errors
    /// Returns a [`DriverError`] when execution fails.
    fn execute(&mut self) -> Result<bool, DriverError>;

    /// # Errors
    /// Returns a [`DriverError`] when reading the next row fails.
    fn fetch(&mut self) -> Result<Option<Row>, DriverError>;

    /// # Errors
    /// Returns a [`DriverError`] when reading the remaining rows fails.
    fn fetch_all(&mut self) -> Result<Vec<Row>, DriverError>;

    /// Rows affected by DML, or rows produced by a query.
    ///
    /// # Errors
    /// Returns a [`DriverError`] when the count is unavailable.
    fn row_count(&self) -> Result<u64, DriverError>;
}

lazy_static! {
    static ref DSN_RE: Regex = Regex::new(r"^\s*(?P<scheme>[A-Za-z][A-Za-z0-9_]*):(?P<body>.*)$")
        .expect("valid DSN pattern");
}

/// A DSN split into its scheme and driver-specific body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    pub scheme: String,
    pub body: String,
}

impl Dsn {
    /// Split `scheme:body`. Returns `None` for strings without a scheme.
    #[must_use]
    pub fn parse(dsn: &str) -> Option<Self> {
        let caps = DSN_RE.captures(dsn)?;
        Some(Self {
            scheme: caps["scheme"].to_ascii_lowercase(),
            body: caps["body"].trim().to_owned(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> Option<DriverKind> {
        DriverKind::from_scheme(&self.scheme)
    }
}
