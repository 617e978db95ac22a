//! SQLite drivers.

#[cfg(feature = "rusqlite")]
pub mod rusqlite;

#[cfg(feature = "rusqlite")]
pub use self::rusqlite::SqliteConnection;
