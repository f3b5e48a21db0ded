//! Scripted in-memory connection for integration tests.

#![allow(dead_code)]

use recordkit::{
    AccessConfig, Connection, Dialect, EntityDefinition, EntityRegistry, Error, RecordAccess,
    RegistryBuilder, RelationDef, Result, Row, SchemaSnapshot, TableInfo, TransactionOps, Value,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Execute,
    Insert,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    pub sql: String,
    pub params: Vec<Value>,
    pub in_tx: bool,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<Call>,
    pub commits: usize,
    pub rollbacks: usize,
    responses: Vec<(String, Vec<Row>)>,
    failures: Vec<String>,
    next_id: i64,
}

impl MockState {
    /// Statements that would change data.
    pub fn writes(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| c.kind != CallKind::Query)
            .collect()
    }

    pub fn queries(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| c.kind == CallKind::Query)
            .collect()
    }

    fn record(&mut self, kind: CallKind, sql: &str, params: &[Value], in_tx: bool) -> Result<()> {
        self.calls.push(Call {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
            in_tx,
        });
        if self.failures.iter().any(|needle| sql.contains(needle.as_str())) {
            return Err(Error::database(format!("scripted failure: {sql}")));
        }
        Ok(())
    }

    fn rows_for(&self, sql: &str) -> Vec<Row> {
        self.responses
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default()
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        100 + self.next_id
    }
}

#[derive(Debug, Clone)]
pub struct MockConnection {
    pub state: Arc<Mutex<MockState>>,
    dialect: Dialect,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::with_dialect(Dialect::Postgres)
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            dialect,
        }
    }

    /// Answer any query whose SQL contains `needle` with `rows`. The first
    /// matching registration wins.
    pub fn on_query(&self, needle: &str, rows: Vec<Row>) -> &Self {
        self.lock().responses.push((needle.to_string(), rows));
        self
    }

    /// Fail any statement whose SQL contains `needle`.
    pub fn fail_on(&self, needle: &str) -> &Self {
        self.lock().failures.push(needle.to_string());
        self
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("lock poisoned")
    }
}

impl Connection for MockConnection {
    type Tx<'conn>
        = MockTransaction
    where
        Self: 'conn;

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut state = self.lock();
        state.record(CallKind::Query, sql, params, false)?;
        Ok(state.rows_for(sql))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.lock().record(CallKind::Execute, sql, params, false)?;
        Ok(1)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        let mut state = self.lock();
        state.record(CallKind::Insert, sql, params, false)?;
        Ok(state.next_id())
    }

    fn begin(&self) -> Result<Self::Tx<'_>> {
        Ok(MockTransaction {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MockTransaction {
    state: Arc<Mutex<MockState>>,
}

impl MockTransaction {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("lock poisoned")
    }
}

impl TransactionOps for MockTransaction {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut state = self.lock();
        state.record(CallKind::Query, sql, params, true)?;
        Ok(state.rows_for(sql))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.lock().record(CallKind::Execute, sql, params, true)?;
        Ok(1)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        let mut state = self.lock();
        state.record(CallKind::Insert, sql, params, true)?;
        Ok(state.next_id())
    }

    fn commit(self) -> Result<()> {
        self.lock().commits += 1;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.lock().rollbacks += 1;
        Ok(())
    }
}

/// Build a row from (column, value) pairs.
pub fn row(pairs: &[(&str, Value)]) -> Row {
    Row::new(
        pairs.iter().map(|(name, _)| (*name).to_string()).collect(),
        pairs.iter().map(|(_, value)| value.clone()).collect(),
    )
}

pub fn schema() -> SchemaSnapshot {
    SchemaSnapshot::from_tables([
        TableInfo::new("countries", ["id", "code", "name", "currency_id"]),
        TableInfo::new(
            "country_translations",
            ["id", "country_id", "language_id", "name", "title"],
        ),
        TableInfo::new("currencies", ["id", "symbol"]),
        TableInfo::new("cities", ["id", "country_id", "name", "population"]),
        TableInfo::new("invoices", ["id", "user_id", "total"]),
        TableInfo::new("posts", ["id", "user_id", "name"]),
        TableInfo::new("post_translations", ["id", "post_id", "language_id", "title"]),
    ])
}

pub fn entities() -> RegistryBuilder {
    EntityRegistry::builder()
        .register(
            EntityDefinition::new("country", "countries")
                .translated("CountryTranslation")
                .relation(RelationDef::belongs_to("currency"))
                .relation(RelationDef::has_many("city", "country_id")),
        )
        .register(EntityDefinition::new("invoice", "invoices").owner_managed())
        .register(
            EntityDefinition::new("post", "posts")
                .translated("PostTranslation")
                .owner_managed(),
        )
}

pub fn access() -> RecordAccess {
    RecordAccess::new(AccessConfig::default(), schema(), entities()).expect("valid fixture")
}
