//! Operations that interpolate caller text or compiled expressions into SQL.
//!
//! Nothing here is bound or escaped: where clauses, order-by text, field-set
//! names and raw statements are trusted as given.

use super::Implementor;
use crudite_core::{
    Connection, CruditeError, Entity, Expr, FieldSet, QueryPage, Result, Row, TableMap, Value,
    compile_where, materialize, paged_sql, paged_where,
};

fn blank(text: &str) -> bool {
    text.trim().is_empty()
}

impl Implementor {
    fn default_order<T: Entity>(&self, order_by: Option<&str>) -> Result<String> {
        match order_by {
            Some(order) if !blank(order) => Ok(order.to_string()),
            _ => {
                let map = self.class_map::<T>()?;
                Ok(self.generator.order_by(map.table()))
            }
        }
    }

    fn table_sql<T: Entity>(&self) -> Result<String> {
        let map = self.class_map::<T>()?;
        Ok(self.generator.table_name(map.table()))
    }

    fn query_entities<T: Entity>(&self, conn: &mut dyn Connection, sql: &str) -> Result<Vec<T>> {
        let map = self.class_map::<T>()?;
        let set = conn.query(sql, &self.params(), self.timeout())?;
        materialize(&map, &set)
    }

    fn query_scalar(&self, conn: &mut dyn Connection, sql: &str) -> Result<u64> {
        conn.query(sql, &self.params(), self.timeout())?.scalar()
    }

    /// First entity matching a compiled expression.
    pub fn get_where<T: Entity>(&self, conn: &mut dyn Connection, expr: &Expr) -> Result<Option<T>> {
        let fragment = compile_where(Some(expr))?;
        let table = self.table_sql::<T>()?;
        let sql = if fragment.is_empty() {
            format!("select * from {table}")
        } else {
            format!("select * from {table} where {fragment}")
        };
        Ok(self.query_entities::<T>(conn, &sql)?.into_iter().next())
    }

    pub fn count_where<T: Entity>(&self, conn: &mut dyn Connection, expr: Option<&Expr>) -> Result<u64> {
        let fragment = compile_where(expr)?;
        let table = self.table_sql::<T>()?;
        let sql = if fragment.is_empty() {
            format!("select count(1) from {table}")
        } else {
            format!("select count(1) from {table} where {fragment}")
        };
        self.query_scalar(conn, &sql)
    }

    /// Entities matching a compiled expression, ordered by `order_by` or the
    /// table's key columns.
    pub fn where_expr<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        expr: Option<&Expr>,
        order_by: Option<&str>,
    ) -> Result<Vec<T>> {
        let fragment = compile_where(expr)?;
        let order = self.default_order::<T>(order_by)?;
        let table = self.table_sql::<T>()?;
        let sql = if fragment.is_empty() {
            format!("select * from {table} order by {order}")
        } else {
            format!("select * from {table} where {fragment} order by {order}")
        };
        self.query_entities(conn, &sql)
    }

    pub fn where_expr_paged<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        expr: Option<&Expr>,
        order_by: Option<&str>,
        page: QueryPage,
    ) -> Result<Vec<T>> {
        let fragment = compile_where(expr)?;
        let order = self.default_order::<T>(order_by)?;
        let sql = paged_where(&self.table_sql::<T>()?, &fragment, &order, page);
        self.query_entities(conn, &sql)
    }

    /// Entities matching a caller-written where clause; blank matches all.
    pub fn where_sql<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        where_clause: &str,
        order_by: Option<&str>,
    ) -> Result<Vec<T>> {
        let where_clause = if blank(where_clause) { "1=1" } else { where_clause };
        let order = self.default_order::<T>(order_by)?;
        let sql = format!(
            "select * from {} where {where_clause} order by {order}",
            self.table_sql::<T>()?
        );
        self.query_entities(conn, &sql)
    }

    pub fn where_sql_paged<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        where_clause: &str,
        order_by: Option<&str>,
        page: QueryPage,
    ) -> Result<Vec<T>> {
        let order = self.default_order::<T>(order_by)?;
        let sql = paged_where(&self.table_sql::<T>()?, where_clause, &order, page);
        self.query_entities(conn, &sql)
    }

    /// Counts rows from a caller statement and/or where clause.
    ///
    /// With only `where_clause` the table is counted under it; with only
    /// `sql` the text is itself the where clause; with both, `sql` is a full
    /// count statement and `where_clause` is appended.
    pub fn count_sql<T: Entity>(&self, conn: &mut dyn Connection, sql: &str, where_clause: &str) -> Result<u64> {
        let table = self.table_sql::<T>()?;
        let statement = match (blank(sql), blank(where_clause)) {
            (true, true) => format!("select count(1) from {table}"),
            (true, false) => format!("select count(1) from {table} where {where_clause}"),
            (false, true) => format!("select count(1) from {table} where {sql}"),
            (false, false) => format!("{sql} where {where_clause}"),
        };
        self.query_scalar(conn, &statement)
    }

    /// Assigns `assign` on rows equal to every pair of `matching`.
    ///
    /// Names present in both sets are not assigned. Values render as literals.
    pub fn update_fields<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        assign: &FieldSet,
        matching: &FieldSet,
    ) -> Result<u64> {
        let map = self.class_map::<T>()?;
        let table = map.table();

        let assignments: Vec<String> = assign
            .iter()
            .filter(|(name, _)| !matching.contains(name))
            .map(|(name, value)| literal_pair(table, name, value))
            .collect();
        if assignments.is_empty() {
            return Err(CruditeError::Configuration(format!(
                "update of {} assigns no fields",
                table.entity_name
            )));
        }
        if matching.is_empty() {
            return Err(CruditeError::Configuration(format!(
                "update of {} matches no fields",
                table.entity_name
            )));
        }

        let conditions: Vec<String> = matching
            .iter()
            .map(|(name, value)| literal_pair(table, name, value))
            .collect();
        let sql = format!(
            "update {} set {} where {}",
            self.generator.table_name(table),
            assignments.join(","),
            conditions.join(" and ")
        );
        conn.execute(&sql, &self.params(), self.timeout())
    }

    /// Executes a caller statement verbatim; returns affected rows.
    pub fn update_sql(&self, conn: &mut dyn Connection, sql: &str) -> Result<u64> {
        conn.execute(sql, &self.params(), self.timeout())
    }

    pub fn query_rows(&self, conn: &mut dyn Connection, sql: &str) -> Result<Vec<Row>> {
        Ok(conn.query(sql, &self.params(), self.timeout())?.into_rows())
    }

    pub fn query<T: Entity>(&self, conn: &mut dyn Connection, sql: &str) -> Result<Vec<T>> {
        self.query_entities(conn, sql)
    }

    pub fn query_rows_paged(
        &self,
        conn: &mut dyn Connection,
        sql: &str,
        order_by: &str,
        page: QueryPage,
    ) -> Result<Vec<Row>> {
        self.query_rows(conn, &paged_sql(sql, order_by, page))
    }

    pub fn query_paged<T: Entity>(
        &self,
        conn: &mut dyn Connection,
        sql: &str,
        order_by: &str,
        page: QueryPage,
    ) -> Result<Vec<T>> {
        self.query_entities(conn, &paged_sql(sql, order_by, page))
    }

    /// Runs a stored routine with named, bound parameters and returns its rows.
    pub fn execute_procedure(
        &self,
        conn: &mut dyn Connection,
        name: &str,
        params: &[(&str, Value)],
    ) -> Result<Vec<Row>> {
        let mut bound = self.params();
        for (param, value) in params {
            bound.push_named(param, value.clone());
        }
        let sql = self.generator.procedure(name, &bound)?;
        Ok(conn.query(&sql, &bound, self.timeout())?.into_rows())
    }
}

/// `column=literal`, using the mapped column name when the property is known.
fn literal_pair(table: &TableMap, name: &str, value: &Value) -> String {
    let column = table.column(name).map_or(name, |c| c.column_name.as_str());
    format!("{column}={}", value.to_literal())
}
