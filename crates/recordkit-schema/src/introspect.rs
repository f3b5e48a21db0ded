//! Database introspection.
//!
//! Column allow-lists are checked against live metadata, never against
//! hard-coded lists. Reading metadata per request would be wasteful, so the
//! [`Introspector`] loads it once into a [`SchemaSnapshot`] that answers
//! [`SchemaIntrospector`] lookups from memory until it is explicitly
//! reloaded.

use recordkit_core::{Connection, Dialect, Error, Result, SchemaError, SchemaErrorKind, Value};
use std::collections::{HashMap, HashSet};

/// Answers existence questions about tables and columns.
pub trait SchemaIntrospector: Send + Sync {
    fn table_exists(&self, table: &str) -> bool;

    fn column_exists(&self, table: &str, column: &str) -> bool;
}

/// Column names of one table, in ordinal order.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<String>,
    lookup: HashSet<String>,
}

impl TableInfo {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let lookup = columns.iter().cloned().collect();
        Self {
            name: name.into(),
            columns,
            lookup,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.lookup.contains(column)
    }
}

/// An immutable, in-memory copy of the database's table metadata.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    tables: HashMap<String, TableInfo>,
}

impl SchemaSnapshot {
    /// Build a snapshot from known table definitions.
    pub fn from_tables(tables: impl IntoIterator<Item = TableInfo>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    /// Read every table's columns through `conn`.
    #[tracing::instrument(level = "debug", skip(conn))]
    pub fn load<C: Connection>(conn: &C) -> Result<Self> {
        let introspector = Introspector::new(conn.dialect());
        let mut tables = Vec::new();
        for name in introspector.table_names(conn)? {
            let columns = introspector.column_names(conn, &name)?;
            tables.push(TableInfo::new(name, columns));
        }
        tracing::debug!(tables = tables.len(), "Schema snapshot loaded");
        Ok(Self::from_tables(tables))
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }
}

impl SchemaIntrospector for SchemaSnapshot {
    fn table_exists(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    fn column_exists(&self, table: &str, column: &str) -> bool {
        self.tables.get(table).is_some_and(|t| t.has_column(column))
    }
}

/// Reads table and column names from live metadata.
pub struct Introspector {
    dialect: Dialect,
}

impl Introspector {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// List all table names in the database.
    pub fn table_names<C: Connection>(&self, conn: &C) -> Result<Vec<String>> {
        let sql = match self.dialect {
            Dialect::Sqlite => {
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'"
            }
            Dialect::Postgres => {
                "SELECT table_name FROM information_schema.tables WHERE table_schema = 'public'"
            }
            Dialect::Mysql => "SHOW TABLES",
        };

        let rows = conn.query(sql, &[]).map_err(introspection_error)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str().map(String::from)))
            .collect())
    }

    /// List a table's column names in ordinal order.
    pub fn column_names<C: Connection>(&self, conn: &C, table: &str) -> Result<Vec<String>> {
        let (sql, params, name_column) = match self.dialect {
            Dialect::Sqlite => (
                format!("PRAGMA table_info({})", self.dialect.quote_identifier(table)),
                Vec::new(),
                "name",
            ),
            Dialect::Postgres => (
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_name = $1 AND table_schema = 'public' \
                 ORDER BY ordinal_position"
                    .to_string(),
                vec![Value::Text(table.to_string())],
                "column_name",
            ),
            Dialect::Mysql => (
                format!("SHOW COLUMNS FROM {}", self.dialect.quote_identifier(table)),
                Vec::new(),
                "Field",
            ),
        };

        let rows = conn.query(&sql, &params).map_err(introspection_error)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get_named::<String>(name_column).ok())
            .collect())
    }
}

fn introspection_error(err: Error) -> Error {
    Error::Schema(SchemaError {
        kind: SchemaErrorKind::Introspection,
        message: format!("failed to read schema metadata: {err}"),
        source: Some(Box::new(err)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SchemaSnapshot {
        SchemaSnapshot::from_tables([
            TableInfo::new("countries", ["id", "code", "user_id"]),
            TableInfo::new("country_translations", ["id", "country_id", "language_id", "name"]),
        ])
    }

    #[test]
    fn snapshot_answers_existence() {
        let schema = snapshot();
        assert!(schema.table_exists("countries"));
        assert!(!schema.table_exists("cities"));
        assert!(schema.column_exists("countries", "code"));
        assert!(!schema.column_exists("countries", "name"));
        assert!(!schema.column_exists("cities", "id"));
        assert_eq!(schema.table("countries").map(|t| t.columns.len()), Some(3));
    }
}
