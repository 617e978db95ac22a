//! Bulk field access built from a class map's descriptor table.

use crate::error::{CruditeError, Result};
use crate::mapper::ClassMap;
use crate::row::{ResultSet, Row};
use crate::value::Value;

/// Reads and writes every mapped field of an entity in descriptor order.
pub struct Accessor<'a, T> {
    map: &'a ClassMap<T>,
}

impl<T> Clone for Accessor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Accessor<'_, T> {}

impl<'a, T> Accessor<'a, T> {
    pub(crate) fn new(map: &'a ClassMap<T>) -> Self {
        Self { map }
    }

    /// Assigns each slot to the field at the same position. `None` slots are
    /// skipped and leave the field untouched.
    pub fn set_all(&self, entity: &mut T, values: &[Option<Value>]) -> Result<()> {
        let properties = self.map.properties();
        if values.len() > properties.len() {
            return Err(CruditeError::Mapping(format!(
                "{} values supplied for {} properties of {}",
                values.len(),
                properties.len(),
                self.map.table().entity_name
            )));
        }
        for (property, slot) in properties.iter().zip(values) {
            if let Some(value) = slot {
                (property.set)(entity, value.clone())?;
            }
        }
        Ok(())
    }

    /// Every field's current value in descriptor order.
    pub fn get_all(&self, entity: &T) -> Vec<Value> {
        self.map
            .properties()
            .iter()
            .map(|property| (property.get)(entity))
            .collect()
    }

    /// Resolves the position of each mapped column in a result set's columns.
    pub fn bind(self, columns: &[String]) -> RowReader<'a, T> {
        let positions = self
            .map
            .columns()
            .iter()
            .map(|info| {
                if info.ignored {
                    return None;
                }
                columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(&info.column_name))
            })
            .collect();
        RowReader {
            accessor: self,
            positions,
        }
    }
}

/// Materializes rows whose column positions were resolved once.
pub struct RowReader<'a, T> {
    accessor: Accessor<'a, T>,
    positions: Vec<Option<usize>>,
}

impl<T: Default> RowReader<'_, T> {
    pub fn read(&self, row: &Row) -> Result<T> {
        let slots: Vec<Option<Value>> = self
            .positions
            .iter()
            .map(|pos| pos.and_then(|i| row.values().get(i).cloned()))
            .collect();
        let mut entity = T::default();
        self.accessor.set_all(&mut entity, &slots)?;
        Ok(entity)
    }
}

/// Materializes every row of a result set into entities.
pub fn materialize<T: Default>(map: &ClassMap<T>, set: &ResultSet) -> Result<Vec<T>> {
    let reader = map.accessor().bind(set.columns());
    set.rows().iter().map(|row| reader.read(row)).collect()
}
