use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::ConfigError;

/// Source of connection settings.
///
/// `Ok(None)` means the key is absent, which is not the same as `Ok(Some(""))`.
/// `Err` means the source itself could not be consulted.
pub trait ConfigSource: Send + Sync {
    /// # Errors
    /// Returns [`ConfigError`] when the source cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// # Errors
    /// Returns [`ConfigError`] when the source cannot be read.
    fn exists(&self, key: &str) -> Result<bool, ConfigError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Names of the settings the connection manager reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigKeys {
    pub dsn: String,
    pub user: String,
    pub password: String,
}

impl Default for ConfigKeys {
    fn default() -> Self {
        Self {
            dsn: "database.dsn".into(),
            user: "database.user".into(),
            password: "database.password".into(),
        }
    }
}

impl ConfigKeys {
    /// Keys under a custom section, e.g. `reporting` → `reporting.dsn`.
    #[must_use]
    pub fn with_section(section: &str) -> Self {
        Self {
            dsn: format!("{section}.dsn"),
            user: format!("{section}.user"),
            password: format!("{section}.password"),
        }
    }
}

/// Resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub dsn: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("dsn", &self.dsn)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// In-memory settings.
///
/// ```rust
/// use sql_facade::config::{ConfigSource, MapConfig};
///
/// let config = MapConfig::new().with("database.dsn", "sqlite::memory:");
/// assert_eq!(config.get("database.dsn").unwrap().as_deref(), Some("sqlite::memory:"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Shortcut for a config holding only a DSN under the default key.
    #[must_use]
    pub fn for_dsn(dsn: impl Into<String>) -> Self {
        Self::new().with(ConfigKeys::default().dsn, dsn)
    }
}

impl ConfigSource for MapConfig {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Settings from environment variables: `database.dsn` is read from
/// `<PREFIX>_DATABASE_DSN`.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    prefix: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new("SQL_FACADE")
    }
}

impl EnvConfig {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn var_name(&self, key: &str) -> String {
        let suffix: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        if self.prefix.is_empty() {
            suffix
        } else {
            format!("{}_{suffix}", self.prefix)
        }
    }
}

impl ConfigSource for EnvConfig {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let name = self.var_name(key);
        match std::env::var(&name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::Lookup {
                key: key.to_owned(),
                reason: format!("{name} is not valid unicode"),
            }),
        }
    }
}

/// Settings from a JSON document; dotted keys walk nested objects.
///
/// Numbers and booleans are returned as their JSON text, `null` counts as absent.
#[derive(Debug, Clone)]
pub struct JsonFileConfig {
    root: JsonValue,
}

impl JsonFileConfig {
    /// Load and parse `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// # Errors
    /// Returns [`ConfigError::Json`] if `text` is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            root: serde_json::from_str(text)?,
        })
    }

    #[must_use]
    pub fn from_value(root: JsonValue) -> Self {
        Self { root }
    }
}

impl ConfigSource for JsonFileConfig {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let mut node = &self.root;
        for part in key.split('.') {
            match node.get(part) {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }
        match node {
            JsonValue::Null => Ok(None),
            JsonValue::String(s) => Ok(Some(s.clone())),
            JsonValue::Bool(_) | JsonValue::Number(_) => Ok(Some(node.to_string())),
            JsonValue::Array(_) | JsonValue::Object(_) => Err(ConfigError::Lookup {
                key: key.to_owned(),
                reason: "value is not a scalar".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_config_distinguishes_absent_and_empty() {
        let config = MapConfig::new().with("database.password", "");
        assert_eq!(config.get("database.password").unwrap(), Some(String::new()));
        assert_eq!(config.get("database.user").unwrap(), None);
        assert!(config.exists("database.password").unwrap());
        assert!(!config.exists("database.user").unwrap());
    }

    #[test]
    fn env_var_names() {
        let config = EnvConfig::new("APP");
        assert_eq!(config.var_name("database.dsn"), "APP_DATABASE_DSN");
        assert_eq!(EnvConfig::new("").var_name("a.b-c"), "A_B_C");
    }

    #[test]
    fn json_config_walks_sections() {
        let config = JsonFileConfig::parse(
            r#"{"database": {"dsn": "sqlite::memory:", "user": "", "port": 5432, "password": null}}"#,
        )
        .unwrap();
        assert_eq!(
            config.get("database.dsn").unwrap().as_deref(),
            Some("sqlite::memory:")
        );
        assert_eq!(config.get("database.user").unwrap().as_deref(), Some(""));
        assert_eq!(config.get("database.port").unwrap().as_deref(), Some("5432"));
        assert_eq!(config.get("database.password").unwrap(), None);
        assert_eq!(config.get("other.dsn").unwrap(), None);
        assert!(config.get("database").is_err());
    }

    #[test]
    fn json_config_rejects_bad_documents() {
        assert!(matches!(
            JsonFileConfig::parse("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn settings_debug_hides_password() {
        let settings = ConnectionSettings {
            dsn: "mysql:host=db".into(),
            user: Some("app".into()),
            password: Some("secret".into()),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("***"));
    }
}
