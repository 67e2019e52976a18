use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Marker that prefixes every named bind parameter.
pub const PLACEHOLDER_MARKER: char = ':';

/// Values that can be bound as statement parameters or read back from a row.
///
/// ```rust
/// use sql_facade::prelude::*;
///
/// let params = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// NULL value
    Null,
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(value) => Some(*value),
            SqlValue::Int(1) => Some(true),
            SqlValue::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Convert a loosely typed JSON scalar into a bindable value.
    ///
    /// Arrays and objects have no scalar counterpart and yield `None`.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => Some(SqlValue::Null),
            JsonValue::Bool(b) => Some(SqlValue::Bool(*b)),
            JsonValue::Number(n) => n
                .as_i64()
                .map(SqlValue::Int)
                .or_else(|| n.as_f64().map(SqlValue::Float)),
            JsonValue::String(s) => Some(SqlValue::Text(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }

    /// Render the value as JSON for row serialization.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            SqlValue::Int(i) => JsonValue::from(*i),
            SqlValue::Float(f) => JsonValue::from(*f),
            SqlValue::Text(s) => JsonValue::from(s.as_str()),
            SqlValue::Bool(b) => JsonValue::from(*b),
            SqlValue::Null => JsonValue::Null,
            SqlValue::Blob(bytes) => JsonValue::from(bytes.clone()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Blob(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Type tag attached to every binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Text (the default when no tag is given)
    #[default]
    Str,
    Int,
    Bool,
    Null,
}

impl ParamType {
    /// Canonical numeric tag, as used by PDO-style drivers.
    #[must_use]
    pub fn tag(self) -> i64 {
        match self {
            ParamType::Null => 0,
            ParamType::Int => 1,
            ParamType::Str => 2,
            ParamType::Bool => 5,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Str => "string",
            ParamType::Int => "integer",
            ParamType::Bool => "boolean",
            ParamType::Null => "null",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a type tag does not name one of the four parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParamType(pub String);

impl fmt::Display for UnknownParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parameter type `{}`", self.0)
    }
}

impl std::error::Error for UnknownParamType {}

impl FromStr for ParamType {
    type Err = UnknownParamType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(ParamType::Str),
            "integer" | "int" => Ok(ParamType::Int),
            "boolean" | "bool" => Ok(ParamType::Bool),
            "null" => Ok(ParamType::Null),
            _ => Err(UnknownParamType(s.to_owned())),
        }
    }
}

impl TryFrom<i64> for ParamType {
    type Error = UnknownParamType;

    fn try_from(tag: i64) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(ParamType::Null),
            1 => Ok(ParamType::Int),
            2 => Ok(ParamType::Str),
            5 => Ok(ParamType::Bool),
            other => Err(UnknownParamType(other.to_string())),
        }
    }
}

/// Loosely specified type tag, resolved to a [`ParamType`] by the binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Canonical(ParamType),
    Name(String),
    Numeric(i64),
}

impl TypeTag {
    /// Resolve the tag to one of the four canonical parameter types.
    ///
    /// # Errors
    /// Returns [`UnknownParamType`] when the tag names anything else.
    pub fn resolve(&self) -> Result<ParamType, UnknownParamType> {
        match self {
            TypeTag::Canonical(ty) => Ok(*ty),
            TypeTag::Name(name) => name.parse(),
            TypeTag::Numeric(tag) => ParamType::try_from(*tag),
        }
    }
}

impl From<ParamType> for TypeTag {
    fn from(value: ParamType) -> Self {
        TypeTag::Canonical(value)
    }
}

impl From<&str> for TypeTag {
    fn from(value: &str) -> Self {
        TypeTag::Name(value.to_owned())
    }
}

impl From<i64> for TypeTag {
    fn from(value: i64) -> Self {
        TypeTag::Numeric(value)
    }
}

/// Placeholder a value is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Named placeholder, always stored with exactly one leading marker.
    Named(String),
    /// 1-based positional placeholder.
    Positional(usize),
}

impl ParamKey {
    /// Named key with the placeholder marker applied exactly once.
    #[must_use]
    pub fn named(name: &str) -> Self {
        let trimmed = name.trim();
        if trimmed.starts_with(PLACEHOLDER_MARKER) {
            ParamKey::Named(trimmed.to_owned())
        } else {
            ParamKey::Named(format!("{PLACEHOLDER_MARKER}{trimmed}"))
        }
    }

    /// A key is usable when it names something beyond the marker or a position >= 1.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            ParamKey::Named(name) => name.len() > PLACEHOLDER_MARKER.len_utf8(),
            ParamKey::Positional(pos) => *pos >= 1,
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Named(name) => f.write_str(name),
            ParamKey::Positional(pos) => write!(f, "?{pos}"),
        }
    }
}

impl From<&str> for ParamKey {
    fn from(value: &str) -> Self {
        ParamKey::named(value)
    }
}

impl From<String> for ParamKey {
    fn from(value: String) -> Self {
        ParamKey::named(&value)
    }
}

impl From<usize> for ParamKey {
    fn from(value: usize) -> Self {
        ParamKey::Positional(value)
    }
}

/// Shared, mutable parameter slot used for by-reference binding.
///
/// Cloning the cell shares the slot; a `set` before `execute` changes what the
/// statement sees.
#[derive(Debug, Clone, Default)]
pub struct ParamCell(Arc<Mutex<SqlValue>>);

impl ParamCell {
    #[must_use]
    pub fn new(value: impl Into<SqlValue>) -> Self {
        Self(Arc::new(Mutex::new(value.into())))
    }

    pub fn set(&self, value: impl Into<SqlValue>) {
        *self.lock() = value.into();
    }

    #[must_use]
    pub fn get(&self) -> SqlValue {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SqlValue> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for SqlValue {
    fn default() -> Self {
        SqlValue::Null
    }
}

/// The value half of a binding as the driver receives it.
#[derive(Debug, Clone)]
pub enum BindSource {
    /// Snapshot taken at bind time.
    Value(SqlValue),
    /// Read when the statement executes.
    Reference(ParamCell),
}

impl BindSource {
    /// Current value of the binding.
    #[must_use]
    pub fn resolve(&self) -> SqlValue {
        match self {
            BindSource::Value(value) => value.clone(),
            BindSource::Reference(cell) => cell.get(),
        }
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, BindSource::Reference(_))
    }
}

/// Row shape produced by fetch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FetchShape {
    /// Column name → value
    #[default]
    Assoc,
    /// Values by column position
    Num,
}

/// The driver family a DSN selects.
///
/// Also parses as a `clap` argument, for command-line tools that pick a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DriverKind {
    /// `SQLite` database
    Sqlite,
    /// `MySQL`-compatible server
    Mysql,
    /// `PostgreSQL` server
    Pgsql,
}

impl DriverKind {
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            DriverKind::Sqlite => "sqlite",
            DriverKind::Mysql => "mysql",
            DriverKind::Pgsql => "pgsql",
        }
    }

    #[must_use]
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        DriverKind::value_variants()
            .iter()
            .copied()
            .find(|kind| kind.scheme().eq_ignore_ascii_case(scheme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_are_prefixed_once() {
        assert_eq!(ParamKey::named("a"), ParamKey::Named(":a".into()));
        assert_eq!(ParamKey::named(":a"), ParamKey::Named(":a".into()));
        assert!(!ParamKey::named(":").is_valid());
        assert!(!ParamKey::Positional(0).is_valid());
    }

    #[test]
    fn type_names_and_tags_resolve_to_the_same_set() {
        for (name, ty) in [
            ("string", ParamType::Str),
            ("integer", ParamType::Int),
            ("int", ParamType::Int),
            ("boolean", ParamType::Bool),
            ("bool", ParamType::Bool),
            ("null", ParamType::Null),
        ] {
            assert_eq!(name.parse::<ParamType>().unwrap(), ty);
            assert_eq!(ParamType::try_from(ty.tag()).unwrap(), ty);
        }
        assert!("float".parse::<ParamType>().is_err());
        assert!(ParamType::try_from(3).is_err());
    }

    #[test]
    fn param_cell_is_shared_between_clones() {
        let cell = ParamCell::new("before");
        let source = BindSource::Reference(cell.clone());
        cell.set("after");
        assert_eq!(source.resolve(), SqlValue::Text("after".into()));
    }

    #[test]
    fn driver_kind_from_scheme() {
        assert_eq!(DriverKind::from_scheme("SQLITE"), Some(DriverKind::Sqlite));
        assert_eq!(DriverKind::from_scheme("oracle"), None);
    }
}
