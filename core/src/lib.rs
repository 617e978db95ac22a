//! Core building blocks for crudite: values, class maps, predicates,
//! expression compilation, paging and SQL generation.
//!
//! Nothing here talks to a database directly; connections implement
//! [`Connection`] and the `crudite` crate drives them.

pub mod accessor;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod generator;
pub mod mapper;
pub mod paging;
pub mod params;
pub mod predicate;
pub mod row;
mod tracing;
pub mod value;

pub use accessor::{Accessor, RowReader, materialize};
pub use config::{Configuration, RandomUuid, SurrogateGenerator, TimeOrderedUuid};
pub use connection::{BufferedResultSets, Connection, IsolationLevel, ResultSets};
pub use dialect::{Dialect, DialectParseError};
pub use error::{CruditeError, Result};
pub use expr::{BinaryOp, Expr, Method, col, compile_where};
pub use generator::{DefaultSqlGenerator, SqlGenerator};
pub use mapper::{ClassMap, ClassMapBuilder, ColumnInfo, Entity, KeyKind, TableMap};
pub use paging::{QueryPage, paged_sql, paged_where};
pub use params::{Param, Parameters, PlaceholderStyle};
pub use predicate::{
    Example, FieldPredicate, FieldSet, Filter, GroupOperator, Id, Operator, Predicate,
    PredicateGroup, Sort, by_example_predicate, identifier_predicate, key_predicate,
    resolve_predicate,
};
pub use row::{ResultSet, Row};
pub use value::{FromValue, Value};
