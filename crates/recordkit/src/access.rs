//! The record-access entry point.

use crate::config::AccessConfig;
use crate::eager::load_relations;
use crate::identity::AuthContext;
use crate::messages::{DefaultMessages, MessageCatalog, access_error};
use crate::mutation::MutationOrchestrator;
use recordkit_core::{AccessErrorKind, Connection, Error, Record, Result, Value};
use recordkit_query::{Predicate, QualifiedColumn, QueryComposer, QueryPlan, RequestParams};
use recordkit_schema::{
    EntityDescriptor, EntityRegistry, RegistryBuilder, SchemaSnapshot, TranslationResolver,
};
use std::sync::{Arc, RwLock};

/// Schema snapshot and the registry derived from it, swapped together.
#[derive(Debug)]
struct AccessState {
    schema: Arc<SchemaSnapshot>,
    registry: EntityRegistry,
}

/// Generic list/find/create/update/delete over registered entity types.
///
/// Cheap to share across request threads. Schema metadata is read once and
/// replaced only by [`refresh_schema`](Self::refresh_schema); in-flight
/// requests keep the snapshot they started with.
pub struct RecordAccess {
    config: AccessConfig,
    resolver: TranslationResolver,
    entities: RegistryBuilder,
    messages: Arc<dyn MessageCatalog>,
    state: RwLock<Arc<AccessState>>,
}

impl std::fmt::Debug for RecordAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordAccess")
            .field("config", &self.config)
            .field("entities", &self.entities)
            .finish_non_exhaustive()
    }
}

impl RecordAccess {
    /// Build over a known schema snapshot.
    ///
    /// Fails when an entity maps to a table missing from `schema`.
    pub fn new(
        config: AccessConfig,
        schema: SchemaSnapshot,
        entities: RegistryBuilder,
    ) -> Result<Self> {
        let resolver = config.translation_resolver();
        let entities = entities.translation_suffix(config.translation_suffix.as_str());
        let registry = entities.build(&schema, &resolver)?;
        Ok(Self {
            config,
            resolver,
            entities,
            messages: Arc::new(DefaultMessages),
            state: RwLock::new(Arc::new(AccessState {
                schema: Arc::new(schema),
                registry,
            })),
        })
    }

    /// Build by reading schema metadata through `conn`.
    pub fn load<C: Connection>(
        config: AccessConfig,
        conn: &C,
        entities: RegistryBuilder,
    ) -> Result<Self> {
        let schema = SchemaSnapshot::load(conn)?;
        Self::new(config, schema, entities)
    }

    /// Use `catalog` for client-facing error text.
    pub fn with_messages(mut self, catalog: impl MessageCatalog + 'static) -> Self {
        self.messages = Arc::new(catalog);
        self
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    fn state(&self) -> Arc<AccessState> {
        match self.state.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// The schema snapshot currently in effect.
    pub fn schema(&self) -> Arc<SchemaSnapshot> {
        Arc::clone(&self.state().schema)
    }

    pub fn descriptor(&self, entity: &str) -> Result<Arc<EntityDescriptor>> {
        self.state().registry.get(entity)
    }

    /// Reload schema metadata and re-derive every entity descriptor.
    ///
    /// On failure the previous state stays in effect.
    pub fn refresh_schema<C: Connection>(&self, conn: &C) -> Result<()> {
        let schema = SchemaSnapshot::load(conn)?;
        let registry = self.entities.build(&schema, &self.resolver)?;
        let entities = registry.len();
        let next = Arc::new(AccessState {
            schema: Arc::new(schema),
            registry,
        });
        match self.state.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        tracing::info!(entities, "Schema refreshed");
        Ok(())
    }

    fn composer<'s>(
        &'s self,
        state: &'s AccessState,
        descriptor: &'s EntityDescriptor,
    ) -> QueryComposer<'s> {
        QueryComposer::new(descriptor, state.schema.as_ref(), &self.resolver)
            .owner_column(self.config.owner_column.as_str())
            .default_language_id(self.config.default_language_id)
            .max_limit(self.config.max_limit)
    }

    /// Compose the validated plan for a list request without running it.
    pub fn plan(
        &self,
        entity: &str,
        params: &RequestParams,
        auth: &dyn AuthContext,
        allowed_relations: &[&str],
    ) -> Result<QueryPlan> {
        let state = self.state();
        let descriptor = state.registry.get(entity)?;
        let composer = self.composer(&state, &descriptor);
        Ok(composer.compose(params, auth.current_user_id(), allowed_relations))
    }

    fn run<C: Connection>(&self, conn: &C, plan: &QueryPlan) -> Result<Vec<Record>> {
        let (sql, params) = plan.to_sql(conn.dialect());
        tracing::trace!(sql = %sql, params = params.len(), "Running query");
        let mut records: Vec<Record> = conn
            .query(&sql, &params)?
            .iter()
            .map(Record::from_row)
            .collect();
        load_relations(conn, &mut records, &plan.eager_loads)?;
        Ok(records)
    }

    /// List records matching the request parameters.
    #[tracing::instrument(level = "debug", skip(self, conn, params, auth, allowed_relations))]
    pub fn list<C: Connection>(
        &self,
        conn: &C,
        entity: &str,
        params: &RequestParams,
        auth: &dyn AuthContext,
        allowed_relations: &[&str],
    ) -> Result<Vec<Record>> {
        let plan = self.plan(entity, params, auth, allowed_relations)?;
        self.run(conn, &plan)
    }

    /// Fetch one record by id under the same plan a list request would use.
    #[tracing::instrument(level = "debug", skip(self, conn, params, auth, allowed_relations))]
    pub fn find<C: Connection>(
        &self,
        conn: &C,
        entity: &str,
        id: i64,
        params: &RequestParams,
        auth: &dyn AuthContext,
        allowed_relations: &[&str],
    ) -> Result<Record> {
        let plan = self.plan(entity, params, auth, allowed_relations)?;
        let id_column = QualifiedColumn::new(plan.table.as_str(), "id");
        let plan = plan.and(Predicate::Equals(id_column, Value::BigInt(id)));
        self.run(conn, &plan)?.into_iter().next().ok_or_else(|| {
            Error::Access(access_error(
                self.messages.as_ref(),
                AccessErrorKind::NotFound,
                entity,
                Some(id),
            ))
        })
    }

    fn mutate<T>(
        &self,
        entity: &str,
        f: impl FnOnce(&MutationOrchestrator<'_>) -> Result<T>,
    ) -> Result<T> {
        let state = self.state();
        let descriptor = state.registry.get(entity)?;
        let orchestrator = MutationOrchestrator::new(
            &descriptor,
            state.schema.as_ref(),
            &self.config,
            self.messages.as_ref(),
        );
        f(&orchestrator)
    }

    pub fn create<C: Connection>(
        &self,
        conn: &C,
        entity: &str,
        auth: &dyn AuthContext,
        payload: &Record,
    ) -> Result<Record> {
        self.mutate(entity, |m| m.create(conn, auth, payload))
    }

    pub fn update<C: Connection>(
        &self,
        conn: &C,
        entity: &str,
        auth: &dyn AuthContext,
        id: i64,
        payload: &Record,
    ) -> Result<Record> {
        self.mutate(entity, |m| m.update(conn, auth, id, payload))
    }

    pub fn delete<C: Connection>(
        &self,
        conn: &C,
        entity: &str,
        auth: &dyn AuthContext,
        id: i64,
    ) -> Result<()> {
        self.mutate(entity, |m| m.delete(conn, auth, id))
    }
}
