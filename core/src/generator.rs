//! Dialect SQL generation for mapped tables.

use crate::config::Configuration;
use crate::dialect::Dialect;
use crate::error::{CruditeError, Result};
use crate::mapper::{ColumnInfo, TableMap};
use crate::paging::QueryPage;
use crate::params::Parameters;
use crate::predicate::{Predicate, Sort};
use crate::value::Value;

/// Builds parameterized statements for a [`TableMap`].
///
/// Value slices passed to `insert` and `update` are positioned like
/// `table.columns`; generators pick the columns they write.
pub trait SqlGenerator: Send + Sync {
    fn configuration(&self) -> &Configuration;

    fn dialect(&self) -> Dialect {
        self.configuration().dialect()
    }

    fn supports_multiple_statements(&self) -> bool {
        self.dialect().supports_multiple_statements()
    }

    fn batch_separator(&self) -> &str {
        self.dialect().batch_separator()
    }

    /// An empty parameter set using this generator's placeholder style.
    fn parameters(&self) -> Parameters {
        Parameters::new(self.dialect().placeholder_style())
    }

    fn table_name(&self, table: &TableMap) -> String;

    fn column_name(&self, column: &ColumnInfo) -> String;

    fn select(
        &self,
        table: &TableMap,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        params: &mut Parameters,
    ) -> Result<String>;

    fn select_paged(
        &self,
        table: &TableMap,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        page: QueryPage,
        params: &mut Parameters,
    ) -> Result<String>;

    fn select_set(
        &self,
        table: &TableMap,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        first_result: u64,
        max_results: u64,
        params: &mut Parameters,
    ) -> Result<String>;

    fn count(&self, table: &TableMap, predicate: Option<&Predicate>, params: &mut Parameters) -> Result<String>;

    fn insert(&self, table: &TableMap, values: &[Value], params: &mut Parameters) -> Result<String>;

    /// One statement inserting every row; `None` when the table has no
    /// insertable columns and rows must go in one at a time.
    fn insert_rows(&self, table: &TableMap, rows: &[Vec<Value>], params: &mut Parameters) -> Result<Option<String>>;

    fn update(
        &self,
        table: &TableMap,
        predicate: &Predicate,
        values: &[Value],
        params: &mut Parameters,
    ) -> Result<String>;

    fn delete(&self, table: &TableMap, predicate: Option<&Predicate>, params: &mut Parameters) -> Result<String>;

    /// Reads back the identity value assigned by the preceding insert.
    fn identity_sql(&self, table: &TableMap) -> String;

    /// Default ordering for a table: its key columns.
    fn order_by(&self, table: &TableMap) -> String;

    /// Invokes a stored routine with every parameter in order.
    fn procedure(&self, name: &str, params: &Parameters) -> Result<String>;
}

/// [`SqlGenerator`] driven entirely by the configuration's [`Dialect`].
#[derive(Debug, Default)]
pub struct DefaultSqlGenerator {
    config: Configuration,
}

impl DefaultSqlGenerator {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    fn where_clause(
        &self,
        table: &TableMap,
        predicate: Option<&Predicate>,
        params: &mut Parameters,
    ) -> Result<String> {
        match predicate {
            Some(predicate) => Ok(format!(
                " WHERE {}",
                predicate.to_sql(table, self.dialect(), params)?
            )),
            None => Ok(String::new()),
        }
    }

    fn order_clause(&self, table: &TableMap, sort: &[Sort]) -> Result<String> {
        let parts = sort
            .iter()
            .map(|s| {
                let column = table.require_column(&s.property_name)?;
                Ok(format!(
                    "{} {}",
                    self.column_name(column),
                    if s.ascending { "ASC" } else { "DESC" }
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(", "))
    }

    fn column_list(&self, table: &TableMap) -> String {
        table
            .mapped()
            .map(|c| self.column_name(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl SqlGenerator for DefaultSqlGenerator {
    fn configuration(&self) -> &Configuration {
        &self.config
    }

    fn table_name(&self, table: &TableMap) -> String {
        let dialect = self.dialect();
        match &table.schema_name {
            Some(schema) => format!("{}.{}", dialect.quote(schema), dialect.quote(&table.table_name)),
            None => dialect.quote(&table.table_name),
        }
    }

    fn column_name(&self, column: &ColumnInfo) -> String {
        self.dialect().quote(&column.column_name)
    }

    fn select(
        &self,
        table: &TableMap,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        params: &mut Parameters,
    ) -> Result<String> {
        let mut sql = format!(
            "SELECT {} FROM {}{}",
            self.column_list(table),
            self.table_name(table),
            self.where_clause(table, predicate, params)?
        );
        if !sort.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clause(table, sort)?);
        }
        Ok(sql)
    }

    fn select_paged(
        &self,
        table: &TableMap,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        page: QueryPage,
        params: &mut Parameters,
    ) -> Result<String> {
        self.select_set(table, predicate, sort, page.first_result(), page.size(), params)
    }

    fn select_set(
        &self,
        table: &TableMap,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        first_result: u64,
        max_results: u64,
        params: &mut Parameters,
    ) -> Result<String> {
        // Row limiting needs a stable order; fall back to the keys.
        let order = if sort.is_empty() {
            self.order_by(table)
        } else {
            self.order_clause(table, sort)?
        };
        Ok(format!(
            "SELECT {} FROM {}{} ORDER BY {order} {}",
            self.column_list(table),
            self.table_name(table),
            self.where_clause(table, predicate, params)?,
            self.dialect().limit_clause(first_result, max_results)
        ))
    }

    fn count(&self, table: &TableMap, predicate: Option<&Predicate>, params: &mut Parameters) -> Result<String> {
        Ok(format!(
            "SELECT COUNT(*) AS {} FROM {}{}",
            self.dialect().quote("Total"),
            self.table_name(table),
            self.where_clause(table, predicate, params)?
        ))
    }

    fn insert(&self, table: &TableMap, values: &[Value], params: &mut Parameters) -> Result<String> {
        let mut columns = Vec::new();
        let mut placeholders = Vec::new();
        for (column, value) in table.columns.iter().zip(values) {
            if column.is_insertable() {
                columns.push(self.column_name(column));
                placeholders.push(params.push(value.clone()));
            }
        }

        if columns.is_empty() {
            return Ok(format!("INSERT INTO {} DEFAULT VALUES", self.table_name(table)));
        }
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table_name(table),
            columns.join(", "),
            placeholders.join(", ")
        ))
    }

    fn insert_rows(&self, table: &TableMap, rows: &[Vec<Value>], params: &mut Parameters) -> Result<Option<String>> {
        let insertable: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_insertable())
            .map(|(i, _)| i)
            .collect();
        if insertable.is_empty() || rows.is_empty() {
            return Ok(None);
        }

        let columns: Vec<String> = insertable
            .iter()
            .map(|&i| self.column_name(&table.columns[i]))
            .collect();
        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            let mut placeholders = Vec::with_capacity(insertable.len());
            for &i in &insertable {
                let value = row.get(i).cloned().ok_or_else(|| {
                    CruditeError::configuration(format!(
                        "row for {} has no value for column {i}",
                        table.table_name
                    ))
                })?;
                placeholders.push(params.push(value));
            }
            tuples.push(format!("({})", placeholders.join(", ")));
        }
        Ok(Some(format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table_name(table),
            columns.join(", "),
            tuples.join(", ")
        )))
    }

    fn update(
        &self,
        table: &TableMap,
        predicate: &Predicate,
        values: &[Value],
        params: &mut Parameters,
    ) -> Result<String> {
        let assignments: Vec<String> = table
            .columns
            .iter()
            .zip(values)
            .filter(|(column, _)| column.is_updatable())
            .map(|(column, value)| format!("{} = {}", self.column_name(column), params.push(value.clone())))
            .collect();

        if assignments.is_empty() {
            return Err(CruditeError::configuration(format!(
                "{} has no updatable columns",
                table.entity_name
            )));
        }
        Ok(format!(
            "UPDATE {} SET {} WHERE {}",
            self.table_name(table),
            assignments.join(", "),
            predicate.to_sql(table, self.dialect(), params)?
        ))
    }

    fn delete(&self, table: &TableMap, predicate: Option<&Predicate>, params: &mut Parameters) -> Result<String> {
        Ok(format!(
            "DELETE FROM {}{}",
            self.table_name(table),
            self.where_clause(table, predicate, params)?
        ))
    }

    fn identity_sql(&self, _table: &TableMap) -> String {
        self.dialect().identity_sql().to_string()
    }

    fn order_by(&self, table: &TableMap) -> String {
        let keys: Vec<String> = table.keys().map(|c| self.column_name(c)).collect();
        if !keys.is_empty() {
            return keys.join(", ");
        }
        table
            .mapped()
            .next()
            .map_or_else(|| "1".to_string(), |c| self.column_name(c))
    }

    fn procedure(&self, name: &str, params: &Parameters) -> Result<String> {
        let dialect = self.dialect();
        let keyword = dialect.procedure_keyword().ok_or_else(|| {
            CruditeError::configuration(format!("{dialect} has no stored procedures"))
        })?;
        let args: Vec<String> = params
            .iter()
            .map(|p| match (&p.name, dialect) {
                (Some(name), Dialect::PostgreSQL) => format!("{name} => {}", p.placeholder),
                _ => p.placeholder.clone(),
            })
            .collect();
        Ok(match dialect {
            Dialect::SqlServer if args.is_empty() => format!("{keyword} {name}"),
            Dialect::SqlServer => format!("{keyword} {name} {}", args.join(", ")),
            _ => format!("{keyword} {name}({})", args.join(", ")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::KeyKind;

    fn people() -> TableMap {
        let mut name = ColumnInfo::new("Name", KeyKind::NotAKey);
        name.column_name = "full_name".into();
        let mut created = ColumnInfo::new("Created", KeyKind::NotAKey);
        created.read_only = true;
        let mut scratch = ColumnInfo::new("Scratch", KeyKind::NotAKey);
        scratch.ignored = true;
        TableMap {
            entity_name: "Person".into(),
            table_name: "people".into(),
            schema_name: None,
            columns: vec![ColumnInfo::new("Id", KeyKind::Identity), name, created, scratch],
        }
    }

    fn generator(dialect: Dialect) -> DefaultSqlGenerator {
        DefaultSqlGenerator::new(Configuration::new(dialect))
    }

    fn values() -> Vec<Value> {
        vec![Value::Integer(1), Value::from("ann"), Value::Null, Value::Null]
    }

    #[test]
    fn select_with_predicate_and_sort() {
        let generator = generator(Dialect::SQLite);
        let mut params = generator.parameters();
        let sql = generator
            .select(
                &people(),
                Some(&Predicate::eq("Name", "ann")),
                &[Sort::desc("Id")],
                &mut params,
            )
            .unwrap();
        assert_eq!(
            sql,
            "SELECT \"Id\", \"full_name\", \"Created\" FROM \"people\" WHERE (\"full_name\" = @p0) ORDER BY \"Id\" DESC"
        );
        assert_eq!(params.get("@p0"), Some(&Value::from("ann")));
    }

    #[test]
    fn insert_skips_identity_read_only_and_ignored() {
        let generator = generator(Dialect::PostgreSQL);
        let mut params = generator.parameters();
        let sql = generator.insert(&people(), &values(), &mut params).unwrap();
        assert_eq!(sql, "INSERT INTO \"people\" (\"full_name\") VALUES ($1)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn insert_rows_emits_one_tuple_per_row() {
        let generator = generator(Dialect::PostgreSQL);
        let mut params = generator.parameters();
        let rows = vec![values(), vec![Value::Integer(2), Value::from("bo"), Value::Null, Value::Null]];
        let sql = generator.insert_rows(&people(), &rows, &mut params).unwrap();
        assert_eq!(
            sql.as_deref(),
            Some("INSERT INTO \"people\" (\"full_name\") VALUES ($1), ($2)")
        );
        assert_eq!(params.get("$2"), Some(&Value::from("bo")));

        let mut params = generator.parameters();
        assert_eq!(generator.insert_rows(&people(), &[], &mut params).unwrap(), None);
    }

    #[test]
    fn update_sets_writable_columns() {
        let generator = generator(Dialect::SqlServer);
        let mut params = generator.parameters();
        let sql = generator
            .update(&people(), &Predicate::eq("Id", 1), &values(), &mut params)
            .unwrap();
        assert_eq!(sql, "UPDATE [people] SET [full_name] = @p0 WHERE ([Id] = @p1)");
    }

    #[test]
    fn select_set_defaults_to_key_order() {
        let generator = generator(Dialect::SqlServer);
        let mut params = generator.parameters();
        let sql = generator
            .select_set(&people(), None, &[], 10, 5, &mut params)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT [Id], [full_name], [Created] FROM [people] ORDER BY [Id] OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn paged_select_uses_page_offsets() {
        let generator = generator(Dialect::SQLite);
        let mut params = generator.parameters();
        let page = QueryPage::new(2, 10).unwrap();
        let sql = generator
            .select_paged(&people(), None, &[Sort::asc("Name")], page, &mut params)
            .unwrap();
        assert!(sql.ends_with("ORDER BY \"full_name\" ASC LIMIT 10 OFFSET 20"));
    }

    #[test]
    fn count_and_delete() {
        let generator = generator(Dialect::MySQL);
        let mut params = generator.parameters();
        let predicate = Predicate::eq("Id", 3);
        assert_eq!(
            generator.count(&people(), Some(&predicate), &mut params).unwrap(),
            "SELECT COUNT(*) AS `Total` FROM `people` WHERE (`Id` = ?)"
        );
        assert_eq!(
            generator.delete(&people(), None, &mut params).unwrap(),
            "DELETE FROM `people`"
        );
    }

    #[test]
    fn schema_qualified_table() {
        let mut table = people();
        table.schema_name = Some("hr".into());
        assert_eq!(generator(Dialect::PostgreSQL).table_name(&table), "\"hr\".\"people\"");
    }

    #[test]
    fn procedures_per_dialect() {
        let mut params = Parameters::new(Dialect::MySQL.placeholder_style());
        params.push(1);
        params.push("x");
        assert_eq!(
            generator(Dialect::MySQL).procedure("archive", &params).unwrap(),
            "CALL archive(?, ?)"
        );

        let mut params = Parameters::new(Dialect::SqlServer.placeholder_style());
        params.push_named("days", 30);
        assert_eq!(
            generator(Dialect::SqlServer).procedure("purge", &params).unwrap(),
            "EXEC purge @days"
        );

        let mut params = Parameters::new(Dialect::PostgreSQL.placeholder_style());
        params.push_named("days", 30);
        params.push_named("dry", true);
        assert_eq!(
            generator(Dialect::PostgreSQL).procedure("purge", &params).unwrap(),
            "CALL purge(days => $1, dry => $2)"
        );

        assert!(matches!(
            generator(Dialect::SQLite).procedure("x", &Parameters::default()),
            Err(CruditeError::Configuration(_))
        ));
    }
}
