// SQLite driver adapter.
//
// - config: DSN handling, opening connections, the shared handle
// - connection: `DriverConnection` (prepare, direct query, transactions)
// - prepared: `DriverStatement` over a cached rusqlite statement
// - params: coercion of bound values to their declared type
// - query: result extraction into a `ResultSet`
// - errors: rusqlite error → SQLSTATE mapping

pub mod config;
pub mod connection;
pub mod errors;
pub mod params;
pub mod prepared;
pub mod query;

pub use config::SqliteDriver;
pub use connection::SqliteConnection;
pub use prepared::SqliteStatement;
