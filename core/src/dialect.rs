//! SQL dialect identification and the syntax facts each dialect contributes
//! to generated statements.

use crate::params::PlaceholderStyle;

/// SQL dialect for database-specific behavior
///
/// Each dialect has its own identifier quoting, placeholder syntax,
/// identity read-back and row-limiting clauses.
///
/// # Examples
///
/// ```
/// use crudite_core::Dialect;
///
/// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
/// assert_eq!(Dialect::SqlServer.quote("Users"), "[Users]");
/// assert!(!Dialect::SQLite.supports_multiple_statements());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// SQLite - `@name` placeholders, one result set per statement
    ///
    /// Compatible with: rusqlite
    #[default]
    SQLite,

    /// PostgreSQL - uses `$1, $2, ...` numbered placeholders
    PostgreSQL,

    /// MySQL - uses `?` positional placeholders
    MySQL,

    /// SQL Server - `@name` placeholders, bracket-quoted identifiers
    SqlServer,
}

impl Dialect {
    /// Parse a dialect from a string (case-insensitive)
    ///
    /// Supports various common aliases:
    /// - SQLite: `"sqlite"`
    /// - PostgreSQL: `"postgresql"`, `"postgres"`, `"pg"`
    /// - MySQL: `"mysql"`
    /// - SQL Server: `"sqlserver"`, `"mssql"`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("sqlite") {
            Some(Dialect::SQLite)
        } else if s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("pg")
        {
            Some(Dialect::PostgreSQL)
        } else if s.eq_ignore_ascii_case("mysql") {
            Some(Dialect::MySQL)
        } else if s.eq_ignore_ascii_case("sqlserver") || s.eq_ignore_ascii_case("mssql") {
            Some(Dialect::SqlServer)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
            Dialect::SqlServer => "sqlserver",
        }
    }

    #[inline]
    #[must_use]
    pub const fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Dialect::SQLite | Dialect::SqlServer => PlaceholderStyle::AtSign,
            Dialect::PostgreSQL => PlaceholderStyle::Dollar,
            Dialect::MySQL => PlaceholderStyle::Positional,
        }
    }

    /// Quotes an identifier for this dialect. Embedded quote characters are
    /// not escaped.
    #[must_use]
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::SQLite | Dialect::PostgreSQL => format!("\"{ident}\""),
            Dialect::MySQL => format!("`{ident}`"),
            Dialect::SqlServer => format!("[{ident}]"),
        }
    }

    /// Whether one command may carry several statements and return one
    /// result set per statement.
    ///
    /// rusqlite prepares a single statement at a time, so SQLite reports
    /// `false` and multi-result requests fall back to sequential execution.
    #[inline]
    #[must_use]
    pub const fn supports_multiple_statements(&self) -> bool {
        !matches!(self, Dialect::SQLite)
    }

    #[inline]
    #[must_use]
    pub const fn batch_separator(&self) -> &'static str {
        ";\n"
    }

    /// Statement that reads back the identity value assigned by the last insert
    /// on this connection. The value is returned in a column named `id`.
    #[must_use]
    pub const fn identity_sql(&self) -> &'static str {
        match self {
            Dialect::SQLite => "SELECT last_insert_rowid() AS id",
            Dialect::PostgreSQL => "SELECT LASTVAL() AS id",
            Dialect::MySQL => "SELECT LAST_INSERT_ID() AS id",
            Dialect::SqlServer => "SELECT CAST(SCOPE_IDENTITY() AS BIGINT) AS [id]",
        }
    }

    /// Row-limiting clause appended after `ORDER BY`.
    #[must_use]
    pub fn limit_clause(&self, first_result: u64, max_results: u64) -> String {
        match self {
            Dialect::SqlServer => {
                format!("OFFSET {first_result} ROWS FETCH NEXT {max_results} ROWS ONLY")
            }
            _ => format!("LIMIT {max_results} OFFSET {first_result}"),
        }
    }

    /// Keyword that invokes a stored routine, `None` when the dialect has none.
    #[must_use]
    pub const fn procedure_keyword(&self) -> Option<&'static str> {
        match self {
            Dialect::SQLite => None,
            Dialect::PostgreSQL | Dialect::MySQL => Some("CALL"),
            Dialect::SqlServer => Some("EXEC"),
        }
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect")]
pub struct DialectParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_parse() {
        assert_eq!(Dialect::parse("sqlite"), Some(Dialect::SQLite));
        assert_eq!(Dialect::parse("SQLite"), Some(Dialect::SQLite));

        assert_eq!(Dialect::parse("postgresql"), Some(Dialect::PostgreSQL));
        assert_eq!(Dialect::parse("postgres"), Some(Dialect::PostgreSQL));
        assert_eq!(Dialect::parse("PG"), Some(Dialect::PostgreSQL));

        assert_eq!(Dialect::parse("MySQL"), Some(Dialect::MySQL));
        assert_eq!(Dialect::parse("mssql"), Some(Dialect::SqlServer));

        assert_eq!(Dialect::parse("unknown"), None);
        assert_eq!(Dialect::parse(""), None);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_dialect_quoting() {
        assert_eq!(Dialect::SQLite.quote("Users"), "\"Users\"");
        assert_eq!(Dialect::MySQL.quote("Users"), "`Users`");
        assert_eq!(Dialect::SqlServer.quote("Users"), "[Users]");
    }

    #[test]
    fn test_dialect_limits() {
        assert_eq!(Dialect::SQLite.limit_clause(5, 10), "LIMIT 10 OFFSET 5");
        assert_eq!(
            Dialect::SqlServer.limit_clause(5, 10),
            "OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_dialect_display() {
        assert_eq!(format!("{}", Dialect::SQLite), "sqlite");
        assert_eq!(format!("{}", Dialect::PostgreSQL), "postgresql");
        assert_eq!(format!("{}", Dialect::SqlServer), "sqlserver");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_dialect_serde() {
        let json = serde_json::to_string(&Dialect::SqlServer).unwrap();
        assert_eq!(json, "\"sqlserver\"");
        let back: Dialect = serde_json::from_str("\"mysql\"").unwrap();
        assert_eq!(back, Dialect::MySQL);
    }
}
