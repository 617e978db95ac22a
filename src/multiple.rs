//! Several heterogeneous selects read back in submission order.
//!
//! When the generator supports multiple statements every select is joined
//! into one batch and executed once; otherwise each runs as its own round
//! trip. Both paths hand back the same [`MultipleResultReader`].

use crate::implementor::Implementor;
use crudite_core::{
    Configuration, Connection, CruditeError, Entity, Filter, Result, ResultSet, ResultSets, Sort,
    TableMap, materialize, resolve_predicate,
};
use std::any::TypeId;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
struct Submitted {
    type_id: TypeId,
    type_name: &'static str,
}

struct SubQuery {
    entity: Submitted,
    table: fn(&Configuration) -> Result<TableMap>,
    filter: Option<Filter>,
    sort: Vec<Sort>,
}

fn table_of<T: Entity>(config: &Configuration) -> Result<TableMap> {
    Ok(config.class_map::<T>()?.table().clone())
}

/// Ordered list of sub-queries for [`Implementor::get_multiple`].
#[derive(Default)]
pub struct MultiQuery {
    items: Vec<SubQuery>,
}

impl MultiQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a select of `T`; results are read back at this position.
    pub fn add<T: Entity>(mut self, filter: Option<Filter>, sort: &[Sort]) -> Self {
        self.items.push(SubQuery {
            entity: Submitted {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
            table: table_of::<T>,
            filter,
            sort: sort.to_vec(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

enum Source<'a> {
    /// One batched command; sets are pulled lazily
    Grid(Box<dyn ResultSets + 'a>),
    /// Sets fetched up front, one round trip each
    Sequence(VecDeque<ResultSet>),
}

/// Reads each sub-query's entities in submission order.
pub struct MultipleResultReader<'a> {
    config: &'a Configuration,
    expected: VecDeque<Submitted>,
    source: Source<'a>,
}

impl<'a> MultipleResultReader<'a> {
    /// Whether the results came from a single batched round trip.
    pub fn is_batched(&self) -> bool {
        matches!(self.source, Source::Grid(_))
    }

    /// Sub-queries not read yet.
    pub fn remaining(&self) -> usize {
        self.expected.len()
    }

    /// Reads the next result set as `T`.
    ///
    /// Fails when `T` is not the type submitted at this position or every
    /// set was already read.
    pub fn read<T: Entity>(&mut self) -> Result<Vec<T>> {
        let next = self.expected.front().copied().ok_or_else(|| {
            CruditeError::ReaderMisuse("every result set was already read".to_string())
        })?;
        if next.type_id != TypeId::of::<T>() {
            return Err(CruditeError::ReaderMisuse(format!(
                "next result set holds {}, not {}",
                next.type_name,
                std::any::type_name::<T>()
            )));
        }

        let set = match &mut self.source {
            Source::Grid(sets) => sets.next_set()?,
            Source::Sequence(sets) => sets.pop_front(),
        }
        .ok_or_else(|| {
            CruditeError::ReaderMisuse(format!(
                "connection returned no result set for {}",
                next.type_name
            ))
        })?;
        self.expected.pop_front();

        let map = self.config.class_map::<T>()?;
        materialize(&map, &set)
    }
}

impl Implementor {
    pub fn get_multiple<'a>(
        &'a self,
        conn: &'a mut dyn Connection,
        query: &MultiQuery,
    ) -> Result<MultipleResultReader<'a>> {
        let expected = query.items.iter().map(|item| item.entity).collect();
        let config = self.configuration();
        let generator = self.generator();

        if generator.supports_multiple_statements() {
            #[cfg(feature = "tracing")]
            tracing::debug!(strategy = "batch", queries = query.len(), "crudite.get_multiple");

            let mut params = generator.parameters();
            let mut statements = Vec::with_capacity(query.len());
            for item in &query.items {
                let table = (item.table)(config)?;
                let predicate = resolve_predicate(item.filter.as_ref());
                statements.push(generator.select(&table, predicate.as_ref(), &item.sort, &mut params)?);
            }
            let sql = statements.join(generator.batch_separator());
            let sets = conn.query_multiple(&sql, &params, self.timeout())?;
            return Ok(MultipleResultReader {
                config,
                expected,
                source: Source::Grid(sets),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(strategy = "sequence", queries = query.len(), "crudite.get_multiple");

        let mut sets = VecDeque::with_capacity(query.len());
        for item in &query.items {
            let table = (item.table)(config)?;
            let predicate = resolve_predicate(item.filter.as_ref());
            let mut params = generator.parameters();
            let sql = generator.select(&table, predicate.as_ref(), &item.sort, &mut params)?;
            sets.push_back(conn.query(&sql, &params, self.timeout())?);
        }
        Ok(MultipleResultReader {
            config,
            expected,
            source: Source::Sequence(sets),
        })
    }
}
