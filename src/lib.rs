//! # Crudite
//!
//! A small entity mapper: describe how a struct maps to a table once, then
//! insert, update, delete and select it without writing SQL.
//!
//! ## Quick Start
//!
//! ```rust
//! use crudite::prelude::*;
//! use crudite::sqlite::SqliteConnection;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     age: i32,
//! }
//!
//! impl Entity for User {
//!     fn class_map(builder: ClassMapBuilder<Self>) -> Result<ClassMap<Self>> {
//!         builder
//!             .table("Users")
//!             .identity("Id", |u| u.id.into(), |u, v| { u.id = v.convert()?; Ok(()) })
//!             .column("Name", |u| u.name.as_str().into(), |u, v| { u.name = v.convert()?; Ok(()) })
//!             .column("Age", |u| u.age.into(), |u, v| { u.age = v.convert()?; Ok(()) })
//!             .build()
//!     }
//! }
//!
//! # fn main() -> crudite::Result<()> {
//! let conn = SqliteConnection::open_in_memory()?;
//! conn.inner().execute_batch(
//!     "CREATE TABLE Users (Id INTEGER PRIMARY KEY AUTOINCREMENT, Name TEXT, Age INTEGER)",
//! )?;
//! let mut db = Database::new(conn, Configuration::new(Dialect::SQLite));
//!
//! let mut alice = User { name: "Alice".into(), age: 30, ..Default::default() };
//! db.insert(&mut alice)?;
//! assert_eq!(alice.id, 1);
//!
//! let adults: Vec<User> = db.where_expr(Some(&col("Age").ge(18)), None)?;
//! assert_eq!(adults, vec![alice]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Database Support
//!
//! | Database   | Driver   | Feature Flag | Status |
//! |------------|----------|--------------|--------|
//! | SQLite     | rusqlite | `rusqlite`   | ✅     |
//!
//! Other dialects (PostgreSQL, MySQL, SQL Server) are supported at the SQL
//! generation level; bring a [`Connection`] implementation for the driver.

mod database;
mod implementor;
mod multiple;
mod transaction;

#[cfg(feature = "rusqlite")]
pub mod sqlite;

pub use database::{Database, Session};
pub use implementor::{Implementor, InsertedKey};
pub use multiple::{MultiQuery, MultipleResultReader};
pub use transaction::UnitOfWork;

/// Result type for crudite operations
pub use crudite_core::error::Result;

/// Error types
pub mod error {
    pub use crudite_core::error::CruditeError;
}

pub use crudite_core::{
    Accessor, BinaryOp, BufferedResultSets, ClassMap, ClassMapBuilder, ColumnInfo, Configuration,
    Connection, CruditeError, DefaultSqlGenerator, Dialect, Entity, Example, Expr, FieldPredicate,
    FieldSet, Filter, FromValue, GroupOperator, Id, IsolationLevel, KeyKind, Method, Operator,
    Param, Parameters, PlaceholderStyle, Predicate, PredicateGroup, QueryPage, RandomUuid,
    ResultSet, ResultSets, Row, Sort, SqlGenerator, SurrogateGenerator, TableMap, TimeOrderedUuid,
    Value, col, compile_where, materialize, paged_sql, paged_where,
};

/// Everything needed to map entities and run operations.
pub mod prelude {
    pub use crate::{Database, InsertedKey, MultiQuery, Session, UnitOfWork};
    pub use crudite_core::{
        ClassMap, ClassMapBuilder, Configuration, Connection, Dialect, Entity, Example, Expr,
        FieldSet, Filter, FromValue, Id, IsolationLevel, Operator, Predicate, QueryPage, Result,
        Sort, Value, col,
    };
}
