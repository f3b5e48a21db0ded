//! Query composition from raw request parameters.
//!
//! The composer never trusts a client-supplied name. Every filter key,
//! selected field, sort key and relation projection is checked against the
//! schema snapshot; anything unknown is dropped (and logged at `debug`),
//! never turned into an error.

use crate::clause::{OrderBy, OrderDirection, Predicate, QualifiedColumn, SelectItem};
use crate::params::{ParamValues, RequestParams, parse_parameters, split_list};
use crate::plan::{EagerLoad, QueryPlan};
use recordkit_core::Value;
use recordkit_schema::{EntityDescriptor, SchemaIntrospector, TranslationResolver};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Plain identifiers, optionally qualified once (`table.column`).
fn identifier_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").ok())
        .as_ref()
}

fn is_identifier(name: &str) -> bool {
    identifier_pattern().is_some_and(|re| re.is_match(name))
}

/// Builds validated [`QueryPlan`]s for one entity.
pub struct QueryComposer<'a> {
    descriptor: &'a EntityDescriptor,
    schema: &'a dyn SchemaIntrospector,
    resolver: &'a TranslationResolver,
    owner_column: String,
    default_language_id: Option<i64>,
    max_limit: Option<u64>,
}

impl<'a> QueryComposer<'a> {
    pub fn new(
        descriptor: &'a EntityDescriptor,
        schema: &'a dyn SchemaIntrospector,
        resolver: &'a TranslationResolver,
    ) -> Self {
        Self {
            descriptor,
            schema,
            resolver,
            owner_column: "user_id".to_string(),
            default_language_id: None,
            max_limit: None,
        }
    }

    pub fn owner_column(mut self, column: impl Into<String>) -> Self {
        self.owner_column = column.into();
        self
    }

    /// Language joined when the request carries no `language_id`.
    pub fn default_language_id(mut self, language_id: Option<i64>) -> Self {
        self.default_language_id = language_id;
        self
    }

    pub fn max_limit(mut self, max_limit: Option<u64>) -> Self {
        self.max_limit = max_limit;
        self
    }

    fn primary(&self) -> &str {
        self.descriptor.table()
    }

    fn translation(&self) -> Option<&str> {
        self.descriptor
            .is_translatable()
            .then(|| self.descriptor.translation_table())
    }

    /// Compose the complete plan for a list request.
    ///
    /// `acting_user` feeds owner scoping; `allowed_relations` is the set of
    /// relations the caller permits for eager loading.
    #[tracing::instrument(level = "debug", skip_all, fields(entity = self.descriptor.name()))]
    pub fn compose(
        &self,
        params: &RequestParams,
        acting_user: Option<i64>,
        allowed_relations: &[&str],
    ) -> QueryPlan {
        let mut plan = QueryPlan::new(self.primary());

        let language_id = params.language_id().or(self.default_language_id);
        plan.join = self.resolver.join(self.descriptor, language_id);
        if let Some(translation) = self.translation() {
            plan.select = vec![
                SelectItem::All(translation.to_string()),
                SelectItem::All(self.primary().to_string()),
            ];
        }

        plan.owner_scope = self.owner_scope(acting_user);

        plan.where_equals = self
            .filtering_for_params(params)
            .into_iter()
            .map(|(column, value)| {
                (
                    QualifiedColumn::new(self.primary(), column),
                    Value::Text(value),
                )
            })
            .collect();

        let mut restricted = false;
        if let Some(raw) = params.get("selected_fields") {
            let fields = self.select_fields(raw);
            if !fields.is_empty() {
                plan.select = fields.into_iter().map(SelectItem::Column).collect();
                restricted = true;
            }
        }
        if let Some(raw) = params.get("order_by") {
            plan.order_by = self.order_by(raw);
        }
        if let Some(raw) = params.get("where_not_null") {
            plan.where_not_null = self.where_not_null(raw);
        }
        if let Some(raw) = params.get("limit") {
            plan.limit = self.limit(raw);
        }
        if let Some(raw) = params.get("with") {
            plan.eager_loads = self.eager_loads(raw, allowed_relations);
        }

        // Relations are stitched on a parent column the client may not
        // have selected.
        if restricted {
            for load in &plan.eager_loads {
                let (parent_key, _) = load.relation.keys();
                let key = SelectItem::Column(QualifiedColumn::new(self.primary(), parent_key));
                if !plan.select.contains(&key) {
                    plan.select.push(key);
                }
            }
        }

        plan
    }

    /// Owner scoping for owner-managed entities.
    ///
    /// Without an acting user the scope is `owner IS NULL`. A missing owner
    /// column matches nothing.
    pub fn owner_scope(&self, acting_user: Option<i64>) -> Option<Predicate> {
        if !self.descriptor.is_owner_managed() {
            return None;
        }
        let column = QualifiedColumn::new(self.primary(), &self.owner_column);
        if !self.schema.column_exists(self.primary(), &self.owner_column) {
            tracing::warn!(
                entity = self.descriptor.name(),
                column = %column,
                "Owner column missing from schema; scoping to no rows"
            );
            return Some(Predicate::In(column, Vec::new()));
        }
        Some(Predicate::Equals(column, Value::from(acting_user)))
    }

    /// Keep only the non-reserved parameters naming a primary-table column.
    ///
    /// Keys and values are returned unchanged.
    pub fn filtering_for_params(&self, params: &RequestParams) -> BTreeMap<String, String> {
        params
            .filter_candidates()
            .filter(|(key, _)| {
                let keep = is_identifier(key) && self.schema.column_exists(self.primary(), key);
                if !keep {
                    tracing::debug!(entity = self.descriptor.name(), key, "Dropping unknown filter");
                }
                keep
            })
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    /// Resolve a `selected_fields` list into qualified columns.
    ///
    /// `id` always resolves to the primary table. Other fields resolve to
    /// the translation table and the primary table, in that order, for each
    /// one that has the column. Already-qualified input is accepted, so
    /// feeding the rendered output back in is a no-op.
    pub fn select_fields(&self, raw: &str) -> Vec<QualifiedColumn> {
        let mut resolved: Vec<QualifiedColumn> = Vec::new();
        for field in split_list(raw) {
            for column in self.resolve_field(&field) {
                if !resolved.contains(&column) {
                    resolved.push(column);
                }
            }
        }
        resolved
    }

    /// Resolve a `where_not_null` list; same resolution as field selection.
    pub fn where_not_null(&self, raw: &str) -> Vec<QualifiedColumn> {
        self.select_fields(raw)
    }

    fn resolve_field(&self, field: &str) -> Vec<QualifiedColumn> {
        if !is_identifier(field) {
            tracing::debug!(entity = self.descriptor.name(), field, "Dropping malformed field");
            return Vec::new();
        }
        let (table, column) = match field.split_once('.') {
            Some((table, column)) => (Some(table), column),
            None => (None, field),
        };

        if column == "id" {
            let known = table.is_none_or(|t| t == self.primary() || Some(t) == self.translation());
            if known && self.schema.column_exists(self.primary(), "id") {
                return vec![QualifiedColumn::new(self.primary(), "id")];
            }
            return Vec::new();
        }

        let candidates: Vec<&str> = match table {
            Some(t) if t == self.primary() || Some(t) == self.translation() => vec![t],
            Some(_) => Vec::new(),
            None => self.translation().into_iter().chain([self.primary()]).collect(),
        };
        let resolved: Vec<QualifiedColumn> = candidates
            .into_iter()
            .filter(|t| self.schema.column_exists(t, column))
            .map(|t| QualifiedColumn::new(t, column))
            .collect();
        if resolved.is_empty() {
            tracing::debug!(entity = self.descriptor.name(), field, "Dropping unknown field");
        }
        resolved
    }

    /// Parse `column[:direction]`; only the first group is used.
    ///
    /// The column resolves like a selected field and the first match wins.
    pub fn order_by(&self, raw: &str) -> Option<OrderBy> {
        let parsed = parse_parameters(raw).into_iter().next()?;
        let column = self.resolve_field(&parsed.name).into_iter().next()?;
        let direction = parsed
            .values
            .as_ref()
            .and_then(ParamValues::first)
            .map(OrderDirection::parse)
            .unwrap_or_default();
        Some(OrderBy { column, direction })
    }

    /// Parse a row cap; non-numeric input is ignored.
    pub fn limit(&self, raw: &str) -> Option<u64> {
        let limit: u64 = raw.trim().parse().ok()?;
        Some(match self.max_limit {
            Some(max) => limit.min(max),
            None => limit,
        })
    }

    /// Parse the `with` parameter into eager loads.
    ///
    /// A relation is honored only if the caller allows it, the entity
    /// declares it and both of its key columns exist. Requested columns are
    /// filtered against the related table; when none survive the projection
    /// is unrestricted. Restricted projections always include the column
    /// needed to stitch rows back.
    pub fn eager_loads(&self, raw: &str, allowed_relations: &[&str]) -> Vec<EagerLoad> {
        let mut loads: Vec<EagerLoad> = Vec::new();
        for parsed in parse_parameters(raw) {
            if loads.iter().any(|l| l.relation.name == parsed.name) {
                continue;
            }
            let relation = match self.descriptor.relation(&parsed.name) {
                Some(relation) if allowed_relations.contains(&parsed.name.as_str()) => relation,
                _ => {
                    tracing::debug!(
                        entity = self.descriptor.name(),
                        relation = %parsed.name,
                        "Ignoring relation"
                    );
                    continue;
                }
            };

            let table = relation.related_table.as_str();
            let (parent_key, related_key) = relation.keys();
            if !self.schema.column_exists(self.primary(), parent_key)
                || !self.schema.column_exists(table, related_key)
            {
                tracing::debug!(
                    entity = self.descriptor.name(),
                    relation = %parsed.name,
                    table,
                    "Relation keys missing from schema; ignoring relation"
                );
                continue;
            }

            let mut columns: Vec<String> = Vec::new();
            for column in parsed.values.iter().flat_map(ParamValues::iter) {
                let known = is_identifier(column)
                    && !column.contains('.')
                    && self.schema.column_exists(table, column);
                if known && !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }

            let columns = if columns.is_empty() {
                None
            } else {
                if !columns.iter().any(|c| c == related_key) {
                    columns.insert(0, related_key.to_string());
                }
                Some(columns)
            };

            loads.push(EagerLoad {
                relation: relation.clone(),
                columns,
            });
        }
        loads
    }
}
