//! Statement builders for INSERT, UPDATE, DELETE and single-row lookups
//! against tables known only at runtime.

use crate::clause::{Predicate, QualifiedColumn};
use recordkit_core::{Dialect, Record, Value};

fn render_where(
    predicates: &[Predicate],
    dialect: Dialect,
    sql: &mut String,
    params: &mut Vec<Value>,
) {
    if predicates.is_empty() {
        return;
    }
    let rendered: Vec<String> = predicates.iter().map(|p| p.build(dialect, params)).collect();
    sql.push_str(" WHERE ");
    sql.push_str(&rendered.join(" AND "));
}

/// INSERT query builder.
#[derive(Debug)]
pub struct InsertBuilder<'a> {
    table: &'a str,
    values: &'a Record,
    returning: Option<&'a str>,
}

impl<'a> InsertBuilder<'a> {
    pub fn new(table: &'a str, values: &'a Record) -> Self {
        Self {
            table,
            values,
            returning: None,
        }
    }

    /// Ask for the generated key back (Postgres only; the other dialects
    /// report it through the driver).
    pub fn returning(mut self, column: &'a str) -> Self {
        self.returning = Some(column);
        self
    }

    pub fn build(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let table = dialect.quote_identifier(self.table);
        let mut columns = Vec::with_capacity(self.values.len());
        let mut params = Vec::with_capacity(self.values.len());
        for (name, value) in self.values.attributes() {
            columns.push(dialect.quote_identifier(name));
            params.push(value.clone());
        }

        let mut sql = if columns.is_empty() {
            match dialect {
                Dialect::Mysql => format!("INSERT INTO {table} () VALUES ()"),
                _ => format!("INSERT INTO {table} DEFAULT VALUES"),
            }
        } else {
            let placeholders: Vec<String> =
                (1..=params.len()).map(|i| dialect.placeholder(i)).collect();
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        if let (Dialect::Postgres, Some(column)) = (dialect, self.returning) {
            sql.push_str(" RETURNING ");
            sql.push_str(&dialect.quote_identifier(column));
        }

        (sql, params)
    }
}

/// UPDATE query builder.
#[derive(Debug)]
pub struct UpdateBuilder<'a> {
    table: &'a str,
    values: &'a Record,
    filters: Vec<Predicate>,
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(table: &'a str, values: &'a Record) -> Self {
        Self {
            table,
            values,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Shorthand for `table.column = value`.
    pub fn filter_eq(self, column: &str, value: impl Into<Value>) -> Self {
        let column = QualifiedColumn::new(self.table, column);
        self.filter(Predicate::Equals(column, value.into()))
    }

    /// Whether there is nothing to SET.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn build(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::with_capacity(self.values.len());
        let mut assignments = Vec::with_capacity(self.values.len());
        for (name, value) in self.values.attributes() {
            params.push(value.clone());
            assignments.push(format!(
                "{} = {}",
                dialect.quote_identifier(name),
                dialect.placeholder(params.len())
            ));
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            dialect.quote_identifier(self.table),
            assignments.join(", ")
        );
        render_where(&self.filters, dialect, &mut sql, &mut params);
        (sql, params)
    }
}

/// DELETE query builder.
#[derive(Debug)]
pub struct DeleteBuilder<'a> {
    table: &'a str,
    filters: Vec<Predicate>,
}

impl<'a> DeleteBuilder<'a> {
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn filter_eq(self, column: &str, value: impl Into<Value>) -> Self {
        let column = QualifiedColumn::new(self.table, column);
        self.filter(Predicate::Equals(column, value.into()))
    }

    pub fn build(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", dialect.quote_identifier(self.table));
        let mut params = Vec::new();
        render_where(&self.filters, dialect, &mut sql, &mut params);
        (sql, params)
    }
}

/// Single-row lookup on one table.
#[derive(Debug)]
pub struct FindBuilder<'a> {
    table: &'a str,
    filters: Vec<Predicate>,
}

impl<'a> FindBuilder<'a> {
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn filter_eq(self, column: &str, value: impl Into<Value>) -> Self {
        let column = QualifiedColumn::new(self.table, column);
        self.filter(Predicate::Equals(column, value.into()))
    }

    pub fn build(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut sql = format!(
            "SELECT {} FROM {}",
            dialect.quote_qualified(self.table, "*"),
            dialect.quote_identifier(self.table)
        );
        let mut params = Vec::new();
        render_where(&self.filters, dialect, &mut sql, &mut params);
        sql.push_str(" LIMIT 1");
        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Record {
        Record::from_pairs([("code", Value::from("ES")), ("user_id", Value::BigInt(7))])
    }

    #[test]
    fn insert_quotes_and_binds() {
        let record = payload();
        let (sql, params) = InsertBuilder::new("countries", &record)
            .returning("id")
            .build(Dialect::Postgres);
        assert_eq!(
            sql,
            "INSERT INTO \"countries\" (\"code\", \"user_id\") VALUES ($1, $2) RETURNING \"id\""
        );
        assert_eq!(params, vec![Value::from("ES"), Value::BigInt(7)]);

        let (sql, _) = InsertBuilder::new("countries", &record)
            .returning("id")
            .build(Dialect::Sqlite);
        assert_eq!(
            sql,
            "INSERT INTO \"countries\" (\"code\", \"user_id\") VALUES (?1, ?2)"
        );
    }

    #[test]
    fn empty_insert_uses_defaults() {
        let empty = Record::new();
        let (sql, params) = InsertBuilder::new("tags", &empty).build(Dialect::Sqlite);
        assert_eq!(sql, "INSERT INTO \"tags\" DEFAULT VALUES");
        assert!(params.is_empty());
        let (sql, _) = InsertBuilder::new("tags", &empty).build(Dialect::Mysql);
        assert_eq!(sql, "INSERT INTO `tags` () VALUES ()");
    }

    #[test]
    fn update_numbers_filters_after_assignments() {
        let record = payload();
        let builder = UpdateBuilder::new("countries", &record).filter_eq("id", 3_i64);
        assert!(!builder.is_empty());
        let (sql, params) = builder.build(Dialect::Postgres);
        assert_eq!(
            sql,
            "UPDATE \"countries\" SET \"code\" = $1, \"user_id\" = $2 WHERE \"countries\".\"id\" = $3"
        );
        assert_eq!(params.len(), 3);
        assert_eq!(params[2], Value::BigInt(3));
    }

    #[test]
    fn delete_and_find() {
        let (sql, params) = DeleteBuilder::new("countries")
            .filter_eq("id", 3_i64)
            .build(Dialect::Mysql);
        assert_eq!(sql, "DELETE FROM `countries` WHERE `countries`.`id` = ?");
        assert_eq!(params, vec![Value::BigInt(3)]);

        let (sql, params) = FindBuilder::new("country_translations")
            .filter_eq("country_id", 3_i64)
            .filter_eq("language_id", 2_i64)
            .build(Dialect::Postgres);
        assert_eq!(
            sql,
            "SELECT \"country_translations\".* FROM \"country_translations\" \
             WHERE \"country_translations\".\"country_id\" = $1 \
             AND \"country_translations\".\"language_id\" = $2 LIMIT 1"
        );
        assert_eq!(params, vec![Value::BigInt(3), Value::BigInt(2)]);
    }
}
