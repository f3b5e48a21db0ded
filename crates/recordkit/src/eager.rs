//! Eager loading of relations.
//!
//! Each requested relation is fetched with one batched `IN (...)` query
//! over the keys of every parent record, then stitched back onto the
//! parents under the relation's name.

use recordkit_core::{Connection, Record, Result, Value};
use recordkit_query::{EagerLoad, Predicate, QualifiedColumn, QueryPlan, SelectItem};
use std::collections::{BTreeMap, BTreeSet};

/// Load every relation in `loads` onto `records`.
pub fn load_relations<C: Connection>(
    conn: &C,
    records: &mut [Record],
    loads: &[EagerLoad],
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    for load in loads {
        load_relation(conn, records, load)?;
    }
    Ok(())
}

#[tracing::instrument(level = "debug", skip(conn, records), fields(relation = %load.relation.name))]
fn load_relation<C: Connection>(conn: &C, records: &mut [Record], load: &EagerLoad) -> Result<()> {
    let relation = &load.relation;
    let (parent_key, related_key) = relation.keys();

    let keys: BTreeSet<i64> = records
        .iter()
        .filter_map(|r| r.get(parent_key).and_then(Value::as_i64))
        .collect();

    let mut grouped: BTreeMap<i64, Vec<Record>> = BTreeMap::new();
    if !keys.is_empty() {
        let table = relation.related_table.as_str();
        let mut plan = QueryPlan::new(table).and(Predicate::In(
            QualifiedColumn::new(table, related_key),
            keys.iter().copied().map(Value::BigInt).collect(),
        ));
        if let Some(columns) = &load.columns {
            plan.select = columns
                .iter()
                .map(|c| SelectItem::Column(QualifiedColumn::new(table, c)))
                .collect();
        }

        let (sql, params) = plan.to_sql(conn.dialect());
        tracing::trace!(sql = %sql, "Loading relation");
        for row in conn.query(&sql, &params)? {
            let related = Record::from_row(&row);
            if let Some(key) = related.get(related_key).and_then(Value::as_i64) {
                grouped.entry(key).or_default().push(related);
            }
        }
    }

    for record in records.iter_mut() {
        let related = record
            .get(parent_key)
            .and_then(Value::as_i64)
            .and_then(|key| grouped.get(&key))
            .cloned()
            .unwrap_or_default();
        record.set_relation(relation.name.as_str(), related);
    }
    Ok(())
}
