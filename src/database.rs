//! Connection-owning facade over the implementor.

use crate::implementor::{Implementor, InsertedKey};
use crate::multiple::{MultiQuery, MultipleResultReader};
use crate::transaction::UnitOfWork;
use crudite_core::{
    Configuration, Connection, CruditeError, DefaultSqlGenerator, Entity, Expr, FieldSet, Filter,
    Id, IsolationLevel, QueryPage, Result, Row, Sort, SqlGenerator, Value,
};

/// Every mapper operation, available on a [`Database`] and inside a
/// [`UnitOfWork`].
pub trait Session {
    #[doc(hidden)]
    fn parts(&mut self) -> (&Implementor, &mut dyn Connection);

    fn insert<T: Entity>(&mut self, entity: &mut T) -> Result<InsertedKey> {
        let (imp, conn) = self.parts();
        imp.insert(conn, entity)
    }

    fn insert_many<T: Entity>(&mut self, entities: &mut [T]) -> Result<()> {
        let (imp, conn) = self.parts();
        imp.insert_many(conn, entities)
    }

    fn update<T: Entity>(&mut self, entity: &T) -> Result<bool> {
        let (imp, conn) = self.parts();
        imp.update(conn, entity)
    }

    fn update_fields<T: Entity>(&mut self, assign: &FieldSet, matching: &FieldSet) -> Result<u64> {
        let (imp, conn) = self.parts();
        imp.update_fields::<T>(conn, assign, matching)
    }

    fn update_sql(&mut self, sql: &str) -> Result<u64> {
        let (imp, conn) = self.parts();
        imp.update_sql(conn, sql)
    }

    fn delete<T: Entity>(&mut self, entity: &T) -> Result<bool> {
        let (imp, conn) = self.parts();
        imp.delete(conn, entity)
    }

    fn delete_where<T: Entity>(&mut self, filter: impl Into<Filter>) -> Result<bool> {
        let (imp, conn) = self.parts();
        imp.delete_where::<T>(conn, &filter.into())
    }

    fn delete_by_id<T: Entity>(&mut self, id: impl Into<Id>) -> Result<bool> {
        let (imp, conn) = self.parts();
        imp.delete_by_id::<T>(conn, &id.into())
    }

    fn get<T: Entity>(&mut self, id: impl Into<Id>) -> Result<Option<T>> {
        let (imp, conn) = self.parts();
        imp.get(conn, &id.into())
    }

    fn get_where<T: Entity>(&mut self, expr: &Expr) -> Result<Option<T>> {
        let (imp, conn) = self.parts();
        imp.get_where(conn, expr)
    }

    fn get_list<T: Entity>(&mut self, filter: Option<Filter>, sort: &[Sort]) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.get_list(conn, filter.as_ref(), sort)
    }

    fn get_page<T: Entity>(&mut self, filter: Option<Filter>, sort: &[Sort], page: QueryPage) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.get_page(conn, filter.as_ref(), sort, page)
    }

    fn get_set<T: Entity>(
        &mut self,
        filter: Option<Filter>,
        sort: &[Sort],
        first_result: u64,
        max_results: u64,
    ) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.get_set(conn, filter.as_ref(), sort, first_result, max_results)
    }

    fn count<T: Entity>(&mut self, filter: Option<Filter>) -> Result<u64> {
        let (imp, conn) = self.parts();
        imp.count::<T>(conn, filter.as_ref())
    }

    fn count_where<T: Entity>(&mut self, expr: Option<&Expr>) -> Result<u64> {
        let (imp, conn) = self.parts();
        imp.count_where::<T>(conn, expr)
    }

    fn count_sql<T: Entity>(&mut self, sql: &str, where_clause: &str) -> Result<u64> {
        let (imp, conn) = self.parts();
        imp.count_sql::<T>(conn, sql, where_clause)
    }

    fn where_expr<T: Entity>(&mut self, expr: Option<&Expr>, order_by: Option<&str>) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.where_expr(conn, expr, order_by)
    }

    fn where_expr_paged<T: Entity>(
        &mut self,
        expr: Option<&Expr>,
        order_by: Option<&str>,
        page: QueryPage,
    ) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.where_expr_paged(conn, expr, order_by, page)
    }

    fn where_sql<T: Entity>(&mut self, where_clause: &str, order_by: Option<&str>) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.where_sql(conn, where_clause, order_by)
    }

    fn where_sql_paged<T: Entity>(
        &mut self,
        where_clause: &str,
        order_by: Option<&str>,
        page: QueryPage,
    ) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.where_sql_paged(conn, where_clause, order_by, page)
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Row>> {
        let (imp, conn) = self.parts();
        imp.query_rows(conn, sql)
    }

    fn query<T: Entity>(&mut self, sql: &str) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.query(conn, sql)
    }

    fn query_rows_paged(&mut self, sql: &str, order_by: &str, page: QueryPage) -> Result<Vec<Row>> {
        let (imp, conn) = self.parts();
        imp.query_rows_paged(conn, sql, order_by, page)
    }

    fn query_paged<T: Entity>(&mut self, sql: &str, order_by: &str, page: QueryPage) -> Result<Vec<T>> {
        let (imp, conn) = self.parts();
        imp.query_paged(conn, sql, order_by, page)
    }

    fn execute_procedure(&mut self, name: &str, params: &[(&str, Value)]) -> Result<Vec<Row>> {
        let (imp, conn) = self.parts();
        imp.execute_procedure(conn, name, params)
    }

    fn get_multiple(&mut self, query: &MultiQuery) -> Result<MultipleResultReader<'_>> {
        let (imp, conn) = self.parts();
        imp.get_multiple(conn, query)
    }
}

/// Owns a connection and the implementor that drives it.
pub struct Database<C: Connection> {
    pub(crate) conn: C,
    pub(crate) implementor: Implementor,
}

impl<C: Connection> Database<C> {
    /// Uses the [`DefaultSqlGenerator`] for the configuration's dialect.
    pub fn new(conn: C, config: Configuration) -> Self {
        Self::with_generator(conn, DefaultSqlGenerator::new(config))
    }

    pub fn with_generator(conn: C, generator: impl SqlGenerator + 'static) -> Self {
        Self {
            conn,
            implementor: Implementor::new(generator),
        }
    }

    #[inline]
    pub fn connection(&self) -> &C {
        &self.conn
    }

    #[inline]
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    pub fn implementor(&self) -> &Implementor {
        &self.implementor
    }

    pub fn configuration(&self) -> &Configuration {
        self.implementor.configuration()
    }

    pub fn clear_cache(&self) {
        self.configuration().clear_cache();
    }

    /// Starts a unit of work. It rolls back on drop unless committed.
    pub fn begin(&mut self, isolation: IsolationLevel) -> Result<UnitOfWork<'_, C>> {
        if self.conn.has_active_transaction() {
            return Err(CruditeError::Transaction(
                "a transaction is already active on this connection".to_string(),
            ));
        }
        self.conn.begin(isolation)?;
        Ok(UnitOfWork::new(self))
    }

    /// Runs `f` in a unit of work: commits on `Ok`, rolls back on `Err` and
    /// returns the original error.
    pub fn run_in_transaction<F, R>(&mut self, isolation: IsolationLevel, f: F) -> Result<R>
    where
        F: FnOnce(&mut UnitOfWork<'_, C>) -> Result<R>,
    {
        let mut unit = self.begin(isolation)?;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&mut unit)));

        match result {
            Ok(Ok(value)) => {
                unit.commit()?;
                Ok(value)
            }
            Ok(Err(e)) => {
                let _ = unit.rollback();
                Err(e)
            }
            Err(panic_payload) => {
                let _ = unit.rollback();
                std::panic::resume_unwind(panic_payload);
            }
        }
    }
}

impl<C: Connection> Session for Database<C> {
    fn parts(&mut self) -> (&Implementor, &mut dyn Connection) {
        (&self.implementor, &mut self.conn)
    }
}

impl<C: Connection + std::fmt::Debug> std::fmt::Debug for Database<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("conn", &self.conn)
            .field("configuration", self.configuration())
            .finish()
    }
}
