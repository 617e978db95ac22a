//! Synchronous SQLite connection using [`rusqlite`].
//!
//! # Example
//!
//! ```no_run
//! use crudite::prelude::*;
//! use crudite::sqlite::rusqlite::SqliteConnection;
//!
//! #[derive(Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Entity for User {
//!     fn class_map(builder: ClassMapBuilder<Self>) -> Result<ClassMap<Self>> {
//!         builder
//!             .table("users")
//!             .identity("Id", |u| u.id.into(), |u, v| { u.id = v.convert()?; Ok(()) })
//!             .column("Name", |u| u.name.as_str().into(), |u, v| { u.name = v.convert()?; Ok(()) })
//!             .build()
//!     }
//! }
//!
//! fn main() -> crudite::Result<()> {
//!     let conn = SqliteConnection::open_in_memory()?;
//!     conn.inner().execute_batch(
//!         "CREATE TABLE users (Id INTEGER PRIMARY KEY AUTOINCREMENT, Name TEXT NOT NULL)",
//!     )?;
//!     let mut db = Database::new(conn, Configuration::new(Dialect::SQLite));
//!
//!     let mut user = User { name: "Alice".into(), ..Default::default() };
//!     db.insert(&mut user)?;
//!
//!     let found: Option<User> = db.get(user.id)?;
//!     assert!(found.is_some());
//!     Ok(())
//! }
//! ```

use crudite_core::{
    BufferedResultSets, Connection, CruditeError, IsolationLevel, Parameters, PlaceholderStyle,
    Result, ResultSet, ResultSets, Value,
};
use std::path::Path;
use std::time::Duration;

/// [`Connection`] over a [`rusqlite::Connection`].
///
/// Parameters bind by placeholder name (`@p0`, `:name`, `$1`), or by
/// position for `?` placeholders. A command timeout becomes the busy timeout.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: ::rusqlite::Connection,
}

impl SqliteConnection {
    pub fn new(conn: ::rusqlite::Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(::rusqlite::Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(::rusqlite::Connection::open_in_memory()?))
    }

    /// Gets a reference to the underlying connection
    #[inline]
    pub fn inner(&self) -> &::rusqlite::Connection {
        &self.conn
    }

    pub fn into_inner(self) -> ::rusqlite::Connection {
        self.conn
    }

    fn prepare(&self, sql: &str, params: &Parameters, timeout: Option<Duration>) -> Result<::rusqlite::Statement<'_>> {
        if let Some(timeout) = timeout {
            self.conn.busy_timeout(timeout)?;
        }
        let mut stmt = self.conn.prepare(sql)?;
        bind(&mut stmt, params)?;
        Ok(stmt)
    }

    fn tx_statement(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

fn bind(stmt: &mut ::rusqlite::Statement<'_>, params: &Parameters) -> Result<()> {
    match params.style() {
        PlaceholderStyle::Positional => {
            let count = stmt.parameter_count();
            for (i, value) in params.values().enumerate().take(count) {
                stmt.raw_bind_parameter(i + 1, value)?;
            }
        }
        _ => {
            // Batches share one parameter set; bind only what this statement names.
            for param in params {
                if let Some(index) = stmt.parameter_index(&param.placeholder)? {
                    stmt.raw_bind_parameter(index, &param.value)?;
                }
            }
        }
    }
    Ok(())
}

fn read_set(stmt: &mut ::rusqlite::Statement<'_>) -> Result<ResultSet> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut set = ResultSet::new(columns);

    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|i| row.get::<_, Value>(i))
            .collect::<::rusqlite::Result<Vec<_>>>()?;
        set.push(values);
    }
    Ok(set)
}

impl Connection for SqliteConnection {
    fn execute(&mut self, sql: &str, params: &Parameters, timeout: Option<Duration>) -> Result<u64> {
        crudite_core::crudite_trace_query!(sql, params.len());
        let mut stmt = self.prepare(sql, params, timeout)?;
        Ok(stmt.raw_execute()? as u64)
    }

    fn query(&mut self, sql: &str, params: &Parameters, timeout: Option<Duration>) -> Result<ResultSet> {
        crudite_core::crudite_trace_query!(sql, params.len());
        let mut stmt = self.prepare(sql, params, timeout)?;
        read_set(&mut stmt)
    }

    /// SQLite returns one result set per prepared statement, so the batch is
    /// split on `;` and run statement by statement. Literals containing `;`
    /// are not supported here.
    fn query_multiple(
        &mut self,
        sql: &str,
        params: &Parameters,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn ResultSets + '_>> {
        let mut sets = Vec::new();
        for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
            sets.push(self.query(statement, params, timeout)?);
        }
        Ok(Box::new(BufferedResultSets::new(sets)))
    }

    fn begin(&mut self, isolation: IsolationLevel) -> Result<()> {
        if self.has_active_transaction() {
            return Err(CruditeError::Transaction(
                "a transaction is already active on this connection".to_string(),
            ));
        }
        let sql = match isolation {
            IsolationLevel::ReadUncommitted | IsolationLevel::ReadCommitted => "BEGIN DEFERRED",
            IsolationLevel::RepeatableRead => "BEGIN IMMEDIATE",
            IsolationLevel::Serializable => "BEGIN EXCLUSIVE",
        };
        crudite_core::crudite_trace_tx!("begin", "sqlite.rusqlite");
        self.tx_statement(sql)
    }

    fn commit(&mut self) -> Result<()> {
        if !self.has_active_transaction() {
            return Err(CruditeError::Transaction("no active transaction to commit".to_string()));
        }
        crudite_core::crudite_trace_tx!("commit", "sqlite.rusqlite");
        self.tx_statement("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.has_active_transaction() {
            return Err(CruditeError::Transaction("no active transaction to roll back".to_string()));
        }
        crudite_core::crudite_trace_tx!("rollback", "sqlite.rusqlite");
        self.tx_statement("ROLLBACK")
    }

    fn has_active_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl From<::rusqlite::Connection> for SqliteConnection {
    fn from(conn: ::rusqlite::Connection) -> Self {
        Self::new(conn)
    }
}
