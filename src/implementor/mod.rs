//! CRUD orchestration: derives predicates, asks the SQL generator for
//! statements and runs them on a connection.

mod raw;

use crudite_core::{
    ClassMap, Configuration, Connection, Entity, Filter, Id, KeyKind, Parameters, QueryPage,
    Result, SqlGenerator, Sort, Value, identifier_predicate, key_predicate, materialize,
    resolve_predicate,
};
use std::sync::Arc;
use std::time::Duration;

/// Key values of a freshly inserted entity.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertedKey {
    /// The map has exactly one key column
    Single(Value),
    /// Every key column by property name, in declaration order
    Composite(Vec<(String, Value)>),
}

impl InsertedKey {
    pub fn single(&self) -> Option<&Value> {
        match self {
            InsertedKey::Single(value) => Some(value),
            InsertedKey::Composite(_) => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            InsertedKey::Single(value) => Some(value),
            InsertedKey::Composite(pairs) => pairs
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v),
        }
    }
}

/// Runs entity operations against any [`Connection`].
pub struct Implementor {
    generator: Box<dyn SqlGenerator>,
}

impl Implementor {
    pub fn new(generator: impl SqlGenerator + 'static) -> Self {
        Self {
            generator: Box::new(generator),
        }
    }

    pub fn generator(&self) -> &dyn SqlGenerator {
        self.generator.as_ref()
    }

    pub fn configuration(&self) -> &Configuration {
        self.generator.configuration()
    }

    pub(crate) fn class_map<T: Entity>(&self) -> Result<Arc<ClassMap<T>>> {
        self.configuration().class_map::<T>()
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.configuration().command_timeout()
    }

    fn params(&self) -> Parameters {
        self.generator.parameters()
    }

    /// Fills every unset surrogate key from the configured generator.
    fn assign_surrogates<T>(&self, map: &ClassMap<T>, entity: &mut T) -> Result<()> {
        for column in map
            .columns()
            .iter()
            .filter(|c| c.key_kind == KeyKind::GeneratedSurrogate)
        {
            if map.get_value(entity, &column.name)?.is_unset_key() {
                map.set_value(entity, &column.name, self.configuration().surrogate_value())?;
            }
        }
        Ok(())
    }

    fn fetch<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        map: &ClassMap<T>,
        sql: &str,
        params: &Parameters,
    ) -> Result<Vec<T>> {
        let set = conn.query(sql, params, self.timeout())?;
        materialize(map, &set)
    }

    /// Inserts one entity and returns its key values.
    ///
    /// An identity key is read back after the insert, in the same round trip
    /// when the generator supports multiple statements, and is assigned onto
    /// the entity.
    pub fn insert<T: Entity>(&self, conn: &mut dyn Connection, entity: &mut T) -> Result<InsertedKey> {
        let map = self.class_map::<T>()?;
        self.assign_surrogates(&map, entity)?;

        let values = map.accessor().get_all(entity);
        let mut params = self.params();
        let sql = self.generator.insert(map.table(), &values, &mut params)?;

        match map.table().identity() {
            Some(identity) => {
                let identity_sql = self.generator.identity_sql(map.table());
                let id: i64 = if self.generator.supports_multiple_statements() {
                    let batch = format!("{sql}{}{identity_sql}", self.generator.batch_separator());
                    conn.query(&batch, &params, self.timeout())?.scalar()?
                } else {
                    conn.execute(&sql, &params, self.timeout())?;
                    conn.query(&identity_sql, &self.params(), self.timeout())?
                        .scalar()?
                };
                map.set_value(entity, &identity.name, Value::Integer(id))?;
            }
            None => {
                conn.execute(&sql, &params, self.timeout())?;
            }
        }

        let mut keys: Vec<(String, Value)> = map
            .key_values(entity)
            .into_iter()
            .map(|(info, value)| (info.name.clone(), value))
            .collect();
        Ok(match keys.len() {
            1 => InsertedKey::Single(keys.remove(0).1),
            _ => InsertedKey::Composite(keys),
        })
    }

    /// Inserts every entity with one multi-row statement.
    ///
    /// Identity values are not read back.
    pub fn insert_many<T: Entity>(&self, conn: &mut dyn Connection, entities: &mut [T]) -> Result<()> {
        let map = self.class_map::<T>()?;
        for entity in entities.iter_mut() {
            self.assign_surrogates(&map, entity)?;
        }
        let rows: Vec<Vec<Value>> = entities.iter().map(|e| map.accessor().get_all(e)).collect();

        let mut params = self.params();
        if let Some(sql) = self.generator.insert_rows(map.table(), &rows, &mut params)? {
            conn.execute(&sql, &params, self.timeout())?;
            return Ok(());
        }
        for values in &rows {
            let mut params = self.params();
            let sql = self.generator.insert(map.table(), values, &mut params)?;
            conn.execute(&sql, &params, self.timeout())?;
        }
        Ok(())
    }

    /// Updates the row matching the entity's keys; true when a row changed.
    pub fn update<T: Entity>(&self, conn: &mut dyn Connection, entity: &T) -> Result<bool> {
        let map = self.class_map::<T>()?;
        let predicate = key_predicate(&map, entity)?;
        let values = map.accessor().get_all(entity);
        let mut params = self.params();
        let sql = self
            .generator
            .update(map.table(), &predicate, &values, &mut params)?;
        Ok(conn.execute(&sql, &params, self.timeout())? > 0)
    }

    pub fn delete<T: Entity>(&self, conn: &mut dyn Connection, entity: &T) -> Result<bool> {
        let map = self.class_map::<T>()?;
        let predicate = key_predicate(&map, entity)?;
        self.delete_matching(conn, &map, Some(&predicate.into()))
    }

    /// Deletes rows matching a filter. An empty example deletes every row.
    pub fn delete_where<T: Entity>(&self, conn: &mut dyn Connection, filter: &Filter) -> Result<bool> {
        let map = self.class_map::<T>()?;
        self.delete_matching(conn, &map, Some(filter))
    }

    pub fn delete_by_id<T: Entity>(&self, conn: &mut dyn Connection, id: &Id) -> Result<bool> {
        let map = self.class_map::<T>()?;
        let predicate = identifier_predicate(map.table(), id)?;
        self.delete_matching(conn, &map, Some(&predicate.into()))
    }

    fn delete_matching<T>(
        &self,
        conn: &mut dyn Connection,
        map: &ClassMap<T>,
        filter: Option<&Filter>,
    ) -> Result<bool> {
        let predicate = resolve_predicate(filter);
        let mut params = self.params();
        let sql = self
            .generator
            .delete(map.table(), predicate.as_ref(), &mut params)?;
        Ok(conn.execute(&sql, &params, self.timeout())? > 0)
    }

    /// The entity with the given id, `None` when no row matches.
    pub fn get<T: Entity>(&self, conn: &mut dyn Connection, id: &Id) -> Result<Option<T>> {
        let map = self.class_map::<T>()?;
        let predicate = identifier_predicate(map.table(), id)?;
        let mut params = self.params();
        let sql = self
            .generator
            .select(map.table(), Some(&predicate), &[], &mut params)?;
        Ok(self.fetch(conn, &map, &sql, &params)?.into_iter().next())
    }

    pub fn get_list<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        filter: Option<&Filter>,
        sort: &[Sort],
    ) -> Result<Vec<T>> {
        let map = self.class_map::<T>()?;
        let predicate = resolve_predicate(filter);
        let mut params = self.params();
        let sql = self
            .generator
            .select(map.table(), predicate.as_ref(), sort, &mut params)?;
        self.fetch(conn, &map, &sql, &params)
    }

    pub fn get_page<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        filter: Option<&Filter>,
        sort: &[Sort],
        page: QueryPage,
    ) -> Result<Vec<T>> {
        let map = self.class_map::<T>()?;
        let predicate = resolve_predicate(filter);
        let mut params = self.params();
        let sql = self
            .generator
            .select_paged(map.table(), predicate.as_ref(), sort, page, &mut params)?;
        self.fetch(conn, &map, &sql, &params)
    }

    /// Rows `first_result..first_result + max_results`, zero-based.
    pub fn get_set<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        filter: Option<&Filter>,
        sort: &[Sort],
        first_result: u64,
        max_results: u64,
    ) -> Result<Vec<T>> {
        let map = self.class_map::<T>()?;
        let predicate = resolve_predicate(filter);
        let mut params = self.params();
        let sql = self.generator.select_set(
            map.table(),
            predicate.as_ref(),
            sort,
            first_result,
            max_results,
            &mut params,
        )?;
        self.fetch(conn, &map, &sql, &params)
    }

    pub fn count<T: Entity>(&self, conn: &mut dyn Connection, filter: Option<&Filter>) -> Result<u64> {
        let map = self.class_map::<T>()?;
        let predicate = resolve_predicate(filter);
        let mut params = self.params();
        let sql = self
            .generator
            .count(map.table(), predicate.as_ref(), &mut params)?;
        conn.query(&sql, &params, self.timeout())?.scalar()
    }
}
