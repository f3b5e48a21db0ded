//! Validated query plans.
//!
//! A [`QueryPlan`] is produced by the [`QueryComposer`](crate::QueryComposer)
//! and only ever contains columns that passed a schema check. Rendering
//! quotes every identifier and binds every value.

use crate::clause::{OrderBy, Predicate, QualifiedColumn, SelectItem};
use recordkit_core::{Dialect, Value};
use recordkit_schema::{RelationDef, TranslationJoin};

/// A relation to load alongside the primary rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EagerLoad {
    pub relation: RelationDef,
    /// Restricted projection on the related table; `None` selects all.
    pub columns: Option<Vec<String>>,
}

/// The fully validated description of one read.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub table: String,
    pub select: Vec<SelectItem>,
    pub join: Option<TranslationJoin>,
    /// Owner scoping, always rendered first.
    pub owner_scope: Option<Predicate>,
    pub where_equals: Vec<(QualifiedColumn, Value)>,
    pub where_not_null: Vec<QualifiedColumn>,
    /// Predicates added programmatically (e.g. a lookup by id).
    pub extra: Vec<Predicate>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u64>,
    pub eager_loads: Vec<EagerLoad>,
}

impl QueryPlan {
    /// A plan selecting every column of `table` and nothing else.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            select: vec![SelectItem::All(table.clone())],
            table,
            join: None,
            owner_scope: None,
            where_equals: Vec::new(),
            where_not_null: Vec::new(),
            extra: Vec::new(),
            order_by: None,
            limit: None,
            eager_loads: Vec::new(),
        }
    }

    /// Add a programmatic predicate.
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.extra.push(predicate);
        self
    }

    /// All predicates in rendering order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        predicates.extend(self.owner_scope.clone());
        predicates.extend(
            self.where_equals
                .iter()
                .map(|(col, value)| Predicate::Equals(col.clone(), value.clone())),
        );
        predicates.extend(self.where_not_null.iter().cloned().map(Predicate::NotNull));
        predicates.extend(self.extra.iter().cloned());
        predicates
    }

    pub fn eager_load(&self, name: &str) -> Option<&EagerLoad> {
        self.eager_loads.iter().find(|e| e.relation.name == name)
    }

    /// Render the SELECT statement and its bound parameters.
    pub fn to_sql(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let columns: Vec<String> = self.select.iter().map(|s| s.to_sql(dialect)).collect();
        let mut sql = format!(
            "SELECT {} FROM {}",
            columns.join(", "),
            dialect.quote_identifier(&self.table)
        );

        if let Some(join) = &self.join {
            let language = QualifiedColumn::new(&join.table, &join.language_column);
            let language = Predicate::Equals(language, Value::from(join.language_id));
            sql.push_str(&format!(
                " LEFT JOIN {} ON {} = {} AND {}",
                dialect.quote_identifier(&join.table),
                dialect.quote_qualified(&join.primary_table, "id"),
                dialect.quote_qualified(&join.table, &join.foreign_key),
                language.build(dialect, &mut params),
            ));
        }

        let predicates = self.predicates();
        if !predicates.is_empty() {
            let rendered: Vec<String> = predicates
                .iter()
                .map(|p| p.build(dialect, &mut params))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&rendered.join(" AND "));
        }

        if let Some(order) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.to_sql(dialect));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::OrderDirection;

    #[test]
    fn bare_plan_selects_everything() {
        let (sql, params) = QueryPlan::new("countries").to_sql(Dialect::Postgres);
        assert_eq!(sql, "SELECT \"countries\".* FROM \"countries\"");
        assert!(params.is_empty());
    }

    #[test]
    fn renders_join_filters_order_and_limit() {
        let mut plan = QueryPlan::new("countries");
        plan.select = vec![
            SelectItem::All("country_translations".into()),
            SelectItem::All("countries".into()),
        ];
        plan.join = Some(TranslationJoin {
            primary_table: "countries".into(),
            table: "country_translations".into(),
            foreign_key: "country_id".into(),
            language_column: "language_id".into(),
            language_id: Some(2),
        });
        plan.owner_scope = Some(Predicate::Equals(
            QualifiedColumn::new("countries", "user_id"),
            Value::BigInt(7),
        ));
        plan.where_equals
            .push((QualifiedColumn::new("countries", "code"), Value::from("ES")));
        plan.where_not_null
            .push(QualifiedColumn::new("country_translations", "name"));
        plan.order_by = Some(OrderBy {
            column: QualifiedColumn::new("countries", "code"),
            direction: OrderDirection::Desc,
        });
        plan.limit = Some(10);

        let (sql, params) = plan.to_sql(Dialect::Postgres);
        assert_eq!(
            sql,
            "SELECT \"country_translations\".*, \"countries\".* FROM \"countries\" \
             LEFT JOIN \"country_translations\" ON \"countries\".\"id\" = \"country_translations\".\"country_id\" \
             AND \"country_translations\".\"language_id\" = $1 \
             WHERE \"countries\".\"user_id\" = $2 AND \"countries\".\"code\" = $3 \
             AND \"country_translations\".\"name\" IS NOT NULL \
             ORDER BY \"countries\".\"code\" DESC LIMIT 10"
        );
        assert_eq!(
            params,
            vec![Value::BigInt(2), Value::BigInt(7), Value::from("ES")]
        );
    }

    #[test]
    fn missing_language_joins_null_language() {
        let mut plan = QueryPlan::new("countries");
        plan.join = Some(TranslationJoin {
            primary_table: "countries".into(),
            table: "country_translations".into(),
            foreign_key: "country_id".into(),
            language_column: "language_id".into(),
            language_id: None,
        });
        let (sql, params) = plan.to_sql(Dialect::Sqlite);
        assert!(sql.ends_with("AND \"country_translations\".\"language_id\" IS NULL"));
        assert!(params.is_empty());
    }

    #[test]
    fn extra_predicates_render_last() {
        let plan = QueryPlan::new("invoices").and(Predicate::Equals(
            QualifiedColumn::new("invoices", "id"),
            Value::BigInt(3),
        ));
        let (sql, params) = plan.to_sql(Dialect::Mysql);
        assert_eq!(
            sql,
            "SELECT `invoices`.* FROM `invoices` WHERE `invoices`.`id` = ?"
        );
        assert_eq!(params, vec![Value::BigInt(3)]);
    }
}
