//! Backend connection abstraction.
//!
//! This allows the mapper to work with different connection types, the
//! bundled rusqlite driver or an in-memory test double.

use crate::error::Result;
use crate::params::Parameters;
use crate::row::ResultSet;
use std::collections::VecDeque;
use std::time::Duration;

/// Transaction isolation requested when a unit of work begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Cursor over the result sets of one multi-statement command.
pub trait ResultSets {
    /// The next result set, `None` once every set was returned.
    fn next_set(&mut self) -> Result<Option<ResultSet>>;
}

/// Result sets already read off the wire.
#[derive(Debug, Default)]
pub struct BufferedResultSets {
    sets: VecDeque<ResultSet>,
}

impl BufferedResultSets {
    pub fn new(sets: impl IntoIterator<Item = ResultSet>) -> Self {
        Self {
            sets: sets.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.sets.len()
    }
}

impl ResultSets for BufferedResultSets {
    fn next_set(&mut self) -> Result<Option<ResultSet>> {
        Ok(self.sets.pop_front())
    }
}

/// A caller-owned database connection.
///
/// Every call takes an optional command timeout; backends that cannot
/// enforce one ignore it.
pub trait Connection {
    /// Executes a statement and returns the number of affected rows.
    fn execute(&mut self, sql: &str, params: &Parameters, timeout: Option<Duration>) -> Result<u64>;

    /// Runs a query and returns all of its rows.
    fn query(&mut self, sql: &str, params: &Parameters, timeout: Option<Duration>) -> Result<ResultSet>;

    /// Runs a command carrying several statements in one round trip.
    fn query_multiple(
        &mut self,
        sql: &str,
        params: &Parameters,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn ResultSets + '_>>;

    /// Starts a transaction; fails when one is already active.
    fn begin(&mut self, isolation: IsolationLevel) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    fn has_active_transaction(&self) -> bool;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn execute(&mut self, sql: &str, params: &Parameters, timeout: Option<Duration>) -> Result<u64> {
        (**self).execute(sql, params, timeout)
    }

    fn query(&mut self, sql: &str, params: &Parameters, timeout: Option<Duration>) -> Result<ResultSet> {
        (**self).query(sql, params, timeout)
    }

    fn query_multiple(
        &mut self,
        sql: &str,
        params: &Parameters,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn ResultSets + '_>> {
        (**self).query_multiple(sql, params, timeout)
    }

    fn begin(&mut self, isolation: IsolationLevel) -> Result<()> {
        (**self).begin(isolation)
    }

    fn commit(&mut self) -> Result<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<()> {
        (**self).rollback()
    }

    fn has_active_transaction(&self) -> bool {
        (**self).has_active_transaction()
    }
}
