//! Explicit transaction scope borrowed from a [`Database`].

use crate::database::{Database, Session};
use crate::implementor::Implementor;
use crudite_core::{Connection, Result};

/// An active transaction.
///
/// Holding the `&mut Database` borrow keeps a second unit of work from
/// starting while this one is alive. Dropping an unfinished unit rolls back.
pub struct UnitOfWork<'a, C: Connection> {
    db: &'a mut Database<C>,
    finished: bool,
}

impl<'a, C: Connection> UnitOfWork<'a, C> {
    pub(crate) fn new(db: &'a mut Database<C>) -> Self {
        Self { db, finished: false }
    }

    /// Gets a reference to the underlying connection
    #[inline]
    pub fn connection(&self) -> &C {
        &self.db.conn
    }

    /// Commits the transaction. If the commit fails the unit is still
    /// unfinished, so dropping it rolls back whatever the backend left open.
    pub fn commit(mut self) -> Result<()> {
        self.db.conn.commit()?;
        self.finished = true;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        self.db.conn.rollback()?;
        self.finished = true;
        Ok(())
    }
}

impl<C: Connection> Session for UnitOfWork<'_, C> {
    fn parts(&mut self) -> (&Implementor, &mut dyn Connection) {
        (&self.db.implementor, &mut self.db.conn)
    }
}

impl<C: Connection> Drop for UnitOfWork<'_, C> {
    fn drop(&mut self) {
        if !self.finished && self.db.conn.has_active_transaction() {
            let _ = self.db.conn.rollback();
        }
    }
}
