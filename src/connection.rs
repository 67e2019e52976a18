use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::config::{ConfigKeys, ConfigSource, ConnectionSettings};
use crate::driver::{ConnectAttributes, Driver, DriverConnection, Dsn};
use crate::error::{ErrorCategory, SqlFacadeError};
use crate::translation::ErrorTranslator;
use crate::translation::catalog;

enum Slot {
    /// Never connected; the first operation that needs a connection opens one.
    Pending,
    Open(Box<dyn DriverConnection>),
    /// Explicitly closed; only `ensure_connected` reopens.
    Closed,
}

/// Owner of the one connection shared by every facade built from it.
///
/// Cloning the manager shares the connection: a transaction begun through one
/// clone is visible to all of them.
#[derive(Clone)]
pub struct ConnectionManager {
    slot: Arc<Mutex<Slot>>,
    config: Arc<dyn ConfigSource>,
    driver: Arc<dyn Driver>,
    keys: ConfigKeys,
    attributes: ConnectAttributes,
    translator: ErrorTranslator,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connected", &self.check_connection())
            .field("keys", &self.keys)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    #[must_use]
    pub fn new(config: Arc<dyn ConfigSource>, driver: Arc<dyn Driver>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Pending)),
            config,
            driver,
            keys: ConfigKeys::default(),
            attributes: ConnectAttributes::default(),
            translator: ErrorTranslator::default(),
        }
    }

    #[must_use]
    pub fn with_keys(mut self, keys: ConfigKeys) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: ConnectAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_translator(mut self, translator: ErrorTranslator) -> Self {
        self.translator = translator;
        self
    }

    #[must_use]
    pub fn translator(&self) -> &ErrorTranslator {
        &self.translator
    }

    #[must_use]
    pub fn attributes(&self) -> &ConnectAttributes {
        &self.attributes
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Open the connection unless one is already live. Reopens after `close`.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if the settings cannot be
    /// resolved or the driver refuses the connection.
    pub fn ensure_connected(&self) -> Result<(), SqlFacadeError> {
        let mut slot = self.lock();
        if matches!(*slot, Slot::Open(_)) {
            return Ok(());
        }
        let conn = self.open()?;
        *slot = Slot::Open(conn);
        Ok(())
    }

    /// Whether a live connection handle exists.
    #[must_use]
    pub fn check_connection(&self) -> bool {
        matches!(*self.lock(), Slot::Open(_))
    }

    /// Discard the connection.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if there is no open connection.
    pub fn close(&self) -> Result<(), SqlFacadeError> {
        let mut slot = self.lock();
        match std::mem::replace(&mut *slot, Slot::Closed) {
            Slot::Open(_) => {
                info!("database connection closed");
                Ok(())
            }
            previous => {
                *slot = previous;
                let message = "cannot close: no open connection";
                Err(catalog::CONNECTION_NOT_CONNECTED.error_with(message))
            }
        }
    }

    /// Close the connection if it is open, then connect again.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if reconnecting fails.
    pub fn reconnect(&self) -> Result<(), SqlFacadeError> {
        {
            let mut slot = self.lock();
            if matches!(*slot, Slot::Open(_)) {
                *slot = Slot::Closed;
            }
        }
        self.ensure_connected()
    }

    /// Run `func` on the live connection, connecting first if this manager has
    /// never been connected.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if the connection was closed
    /// or cannot be opened; otherwise whatever `func` returns.
    pub fn with_connection<F, R>(&self, func: F) -> Result<R, SqlFacadeError>
    where
        F: FnOnce(&mut dyn DriverConnection) -> Result<R, SqlFacadeError>,
    {
        let mut slot = self.lock();
        if matches!(*slot, Slot::Pending) {
            *slot = Slot::Open(self.open()?);
        }
        match &mut *slot {
            Slot::Open(conn) => func(conn.as_mut()),
            Slot::Pending | Slot::Closed => Err(catalog::CONNECTION_CLOSED.error()),
        }
    }

    /// Run `func` on the connection only if it is already open.
    pub fn with_open_connection<F, R>(&self, func: F) -> Option<R>
    where
        F: FnOnce(&mut dyn DriverConnection) -> R,
    {
        match &mut *self.lock() {
            Slot::Open(conn) => Some(func(conn.as_mut())),
            Slot::Pending | Slot::Closed => None,
        }
    }

    /// Resolve DSN and credentials from the configuration source.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if the source is unavailable
    /// or the DSN key is missing.
    pub fn resolve_settings(&self) -> Result<ConnectionSettings, SqlFacadeError> {
        let unavailable = |e: crate::error::ConfigError| {
            catalog::CONNECTION_CONFIG_UNAVAILABLE.error_with(format!(
                "configuration source is unavailable: {e}"
            ))
        };
        if !self.config.exists(&self.keys.dsn).map_err(unavailable)? {
            return Err(catalog::CONNECTION_CONFIG_MISSING_KEY
                .error_with(format!("missing required setting `{}`", self.keys.dsn)));
        }
        let dsn = self
            .config
            .get(&self.keys.dsn)
            .map_err(unavailable)?
            .ok_or_else(|| {
                catalog::CONNECTION_CONFIG_MISSING_KEY
                    .error_with(format!("missing required setting `{}`", self.keys.dsn))
            })?;
        let user = self.config.get(&self.keys.user).map_err(unavailable)?;
        let password = self.config.get(&self.keys.password).map_err(unavailable)?;
        Ok(ConnectionSettings {
            dsn,
            user,
            password,
        })
    }

    fn open(&self) -> Result<Box<dyn DriverConnection>, SqlFacadeError> {
        let settings = self.resolve_settings()?;
        let scheme = Dsn::parse(&settings.dsn).map(|d| d.scheme);
        debug!(scheme = ?scheme, "opening database connection");
        let conn = self
            .driver
            .connect(
                &settings.dsn,
                settings.user.as_deref(),
                settings.password.as_deref(),
                &self.attributes,
            )
            .map_err(|e| self.translator.translate(ErrorCategory::Connection, &e, None))?;
        info!(scheme = ?scheme, "database connection established");
        Ok(conn)
    }
}
