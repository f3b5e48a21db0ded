//! SQL clause types (columns, predicates, ORDER BY).

use recordkit_core::{Dialect, Value};
use std::fmt;

/// A column reference qualified with its table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

impl QualifiedColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        dialect.quote_qualified(&self.table, &self.column)
    }
}

impl fmt::Display for QualifiedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// One entry of a SELECT list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    /// `table.*`
    All(String),
    Column(QualifiedColumn),
}

impl SelectItem {
    pub fn to_sql(&self, dialect: Dialect) -> String {
        match self {
            SelectItem::All(table) => dialect.quote_qualified(table, "*"),
            SelectItem::Column(col) => col.to_sql(dialect),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Parse a client-supplied direction; anything unrecognized is `Asc`.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            OrderDirection::Desc
        } else {
            OrderDirection::Asc
        }
    }

    pub const fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: QualifiedColumn,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn to_sql(&self, dialect: Dialect) -> String {
        format!("{} {}", self.column.to_sql(dialect), self.direction.as_sql())
    }
}

/// A WHERE predicate over a qualified column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `col = ?`, or `col IS NULL` when the value is NULL
    Equals(QualifiedColumn, Value),
    NotNull(QualifiedColumn),
    /// `col IN (?, ...)`; an empty list matches nothing
    In(QualifiedColumn, Vec<Value>),
}

impl Predicate {
    /// Render with placeholders numbered after `params.len()`, pushing bound
    /// values onto `params`.
    pub fn build(&self, dialect: Dialect, params: &mut Vec<Value>) -> String {
        match self {
            Predicate::Equals(col, Value::Null) => format!("{} IS NULL", col.to_sql(dialect)),
            Predicate::Equals(col, value) => {
                params.push(value.clone());
                format!(
                    "{} = {}",
                    col.to_sql(dialect),
                    dialect.placeholder(params.len())
                )
            }
            Predicate::NotNull(col) => format!("{} IS NOT NULL", col.to_sql(dialect)),
            Predicate::In(_, values) if values.is_empty() => "1 = 0".to_string(),
            Predicate::In(col, values) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| {
                        params.push(v.clone());
                        dialect.placeholder(params.len())
                    })
                    .collect();
                format!("{} IN ({})", col.to_sql(dialect), placeholders.join(", "))
            }
        }
    }

    pub fn column(&self) -> &QualifiedColumn {
        match self {
            Predicate::Equals(col, _) | Predicate::NotNull(col) | Predicate::In(col, _) => col,
        }
    }
}
