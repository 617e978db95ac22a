//! Per-type field descriptor tables.
//!
//! An [`Entity`] describes its table once through a [`ClassMapBuilder`]: the
//! column names, key classification, flags and the getter/setter pair that
//! moves each field in and out of a [`Value`]. The resulting [`ClassMap`] is
//! cached by the [`Configuration`](crate::Configuration) and shared read-only.

use crate::accessor::Accessor;
use crate::error::{CruditeError, Result};
use crate::value::Value;
use std::fmt;

/// How a column participates in the entity's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyKind {
    #[default]
    NotAKey,
    /// Caller supplies the key value
    Assigned,
    /// Database assigns the value on insert
    Identity,
    /// A client-side generator fills the value when it is unset
    GeneratedSurrogate,
}

impl KeyKind {
    #[inline]
    pub const fn is_key(&self) -> bool {
        !matches!(self, KeyKind::NotAKey)
    }
}

/// Column descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Property name used by predicates, examples and field sets
    pub name: String,
    /// Column name in the table
    pub column_name: String,
    pub key_kind: KeyKind,
    /// Not mapped to a column at all
    pub ignored: bool,
    /// Read from the table but never written by insert or update
    pub read_only: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, key_kind: KeyKind) -> Self {
        let name = name.into();
        Self {
            column_name: name.clone(),
            name,
            key_kind,
            ignored: false,
            read_only: false,
        }
    }

    #[inline]
    pub const fn is_key(&self) -> bool {
        self.key_kind.is_key()
    }

    /// Whether an insert statement writes this column.
    ///
    /// Identity columns are assigned by the database.
    pub fn is_insertable(&self) -> bool {
        !self.ignored && !self.read_only && self.key_kind != KeyKind::Identity
    }

    /// Whether an update's SET list may contain this column.
    pub fn is_updatable(&self) -> bool {
        self.is_insertable()
    }
}

/// The type-erased half of a class map handed to SQL generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMap {
    pub entity_name: String,
    pub table_name: String,
    pub schema_name: Option<String>,
    pub columns: Vec<ColumnInfo>,
}

impl TableMap {
    /// Column by property name, compared case-insensitively.
    pub fn column(&self, property: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(property))
    }

    pub(crate) fn require_column(&self, property: &str) -> Result<&ColumnInfo> {
        self.column(property).ok_or_else(|| {
            CruditeError::configuration(format!(
                "{} has no property named `{property}`",
                self.entity_name
            ))
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| c.is_key())
    }

    pub fn key_count(&self) -> usize {
        self.keys().count()
    }

    pub fn identity(&self) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.key_kind == KeyKind::Identity)
    }

    /// Columns that appear in result sets.
    pub fn mapped(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| !c.ignored)
    }
}

pub(crate) type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
pub(crate) type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;

pub(crate) struct Property<T> {
    pub(crate) get: Getter<T>,
    pub(crate) set: Setter<T>,
}

/// Field descriptor table for one entity type.
pub struct ClassMap<T> {
    table: TableMap,
    properties: Vec<Property<T>>,
}

impl<T> ClassMap<T> {
    pub fn table(&self) -> &TableMap {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.table.columns
    }

    pub fn accessor(&self) -> Accessor<'_, T> {
        Accessor::new(self)
    }

    pub(crate) fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    fn index_of(&self, property: &str) -> Result<usize> {
        self.table
            .columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(property))
            .ok_or_else(|| {
                CruditeError::configuration(format!(
                    "{} has no property named `{property}`",
                    self.table.entity_name
                ))
            })
    }

    /// Current value of one property.
    pub fn get_value(&self, entity: &T, property: &str) -> Result<Value> {
        let index = self.index_of(property)?;
        Ok((self.properties[index].get)(entity))
    }

    /// Assigns one property.
    pub fn set_value(&self, entity: &mut T, property: &str, value: Value) -> Result<()> {
        let index = self.index_of(property)?;
        (self.properties[index].set)(entity, value)
    }

    /// Key columns paired with the entity's current values, in declaration order.
    pub fn key_values(&self, entity: &T) -> Vec<(&ColumnInfo, Value)> {
        self.table
            .columns
            .iter()
            .zip(&self.properties)
            .filter(|(info, _)| info.is_key())
            .map(|(info, prop)| (info, (prop.get)(entity)))
            .collect()
    }
}

impl<T> fmt::Debug for ClassMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMap")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Builds a [`ClassMap`].
///
/// Flag methods (`column_name`, `read_only`, `ignored`) apply to the most
/// recently added property.
///
/// ```
/// use crudite_core::{ClassMap, ClassMapBuilder, Entity, Result};
///
/// #[derive(Default)]
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// impl Entity for Tag {
///     fn class_map(builder: ClassMapBuilder<Self>) -> Result<ClassMap<Self>> {
///         builder
///             .table("tags")
///             .identity("Id", |t| t.id.into(), |t, v| { t.id = v.convert()?; Ok(()) })
///             .column("Label", |t| t.label.as_str().into(), |t, v| { t.label = v.convert()?; Ok(()) })
///             .column_name("label")
///             .build()
///     }
/// }
/// ```
pub struct ClassMapBuilder<T> {
    entity_name: String,
    table_name: String,
    schema_name: Option<String>,
    columns: Vec<ColumnInfo>,
    properties: Vec<Property<T>>,
}

impl<T: 'static> ClassMapBuilder<T> {
    /// Starts a map whose table name defaults to the type's name.
    pub fn new() -> Self {
        let full = std::any::type_name::<T>();
        let short = full.rsplit("::").next().unwrap_or(full).to_string();
        Self {
            table_name: short.clone(),
            entity_name: short,
            schema_name: None,
            columns: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    pub fn schema(mut self, name: impl Into<String>) -> Self {
        self.schema_name = Some(name.into());
        self
    }

    /// Adds a property with an explicit key classification.
    pub fn property<G, S>(mut self, name: impl Into<String>, key_kind: KeyKind, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.columns.push(ColumnInfo::new(name, key_kind));
        self.properties.push(Property {
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    pub fn column<G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.property(name, KeyKind::NotAKey, get, set)
    }

    pub fn identity<G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.property(name, KeyKind::Identity, get, set)
    }

    pub fn assigned<G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.property(name, KeyKind::Assigned, get, set)
    }

    pub fn surrogate<G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.property(name, KeyKind::GeneratedSurrogate, get, set)
    }

    pub fn column_name(mut self, column: impl Into<String>) -> Self {
        if let Some(last) = self.columns.last_mut() {
            last.column_name = column.into();
        }
        self
    }

    pub fn read_only(mut self) -> Self {
        if let Some(last) = self.columns.last_mut() {
            last.read_only = true;
        }
        self
    }

    pub fn ignored(mut self) -> Self {
        if let Some(last) = self.columns.last_mut() {
            last.ignored = true;
        }
        self
    }

    /// Validates and finishes the map.
    ///
    /// Fails when the table name is blank, a property name repeats, or more
    /// than one column is an identity key.
    pub fn build(self) -> Result<ClassMap<T>> {
        if self.table_name.trim().is_empty() {
            return Err(CruditeError::configuration(format!(
                "{} maps to a blank table name",
                self.entity_name
            )));
        }

        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i]
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&column.name))
            {
                return Err(CruditeError::configuration(format!(
                    "{} maps property `{}` twice",
                    self.entity_name, column.name
                )));
            }
        }

        let identities = self
            .columns
            .iter()
            .filter(|c| c.key_kind == KeyKind::Identity)
            .count();
        if identities > 1 {
            return Err(CruditeError::configuration(format!(
                "{} declares {identities} identity keys; at most one is allowed",
                self.entity_name
            )));
        }

        Ok(ClassMap {
            table: TableMap {
                entity_name: self.entity_name,
                table_name: self.table_name,
                schema_name: self.schema_name,
                columns: self.columns,
            },
            properties: self.properties,
        })
    }
}

impl<T: 'static> Default for ClassMapBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type that maps to a table.
pub trait Entity: Default + Send + Sync + 'static {
    fn class_map(builder: ClassMapBuilder<Self>) -> Result<ClassMap<Self>>;
}
