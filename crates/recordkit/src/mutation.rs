//! Create, update and delete with translation-row synchronization.
//!
//! Every mutation runs in one transaction spanning the primary row and its
//! translation row, so a failed translation write never leaves a dangling
//! primary change behind.

use crate::config::AccessConfig;
use crate::guard::PermissionGuard;
use crate::identity::AuthContext;
use crate::messages::{MessageCatalog, access_error};
use recordkit_core::{
    AccessErrorKind, Connection, Dialect, Error, Record, Result, TransactionOps, Value,
};
use recordkit_query::{DeleteBuilder, FindBuilder, InsertBuilder, UpdateBuilder};
use recordkit_schema::{EntityDescriptor, SchemaIntrospector};

/// Commit on success, roll back on failure.
fn finish<T, X: TransactionOps>(tx: X, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback() {
                tracing::warn!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Executes mutations for one entity.
pub struct MutationOrchestrator<'a> {
    descriptor: &'a EntityDescriptor,
    schema: &'a dyn SchemaIntrospector,
    config: &'a AccessConfig,
    messages: &'a dyn MessageCatalog,
}

impl<'a> MutationOrchestrator<'a> {
    pub fn new(
        descriptor: &'a EntityDescriptor,
        schema: &'a dyn SchemaIntrospector,
        config: &'a AccessConfig,
        messages: &'a dyn MessageCatalog,
    ) -> Self {
        Self {
            descriptor,
            schema,
            config,
            messages,
        }
    }

    fn access(&self, kind: AccessErrorKind, id: Option<i64>) -> Error {
        Error::Access(access_error(self.messages, kind, self.descriptor.name(), id))
    }

    /// Log the low-level cause and replace it with a conflict.
    fn conflict(&self, kind: AccessErrorKind, id: Option<i64>, cause: &Error) -> Error {
        tracing::error!(
            entity = self.descriptor.name(),
            id,
            error = %cause,
            sql = cause.sql(),
            "Persistence failure"
        );
        self.access(kind, id)
    }

    /// The payload restricted to columns of `table`, minus `skip`.
    fn columns_for(&self, table: &str, payload: &Record, skip: &[&str]) -> Record {
        let mut values = payload.clone();
        values.retain(|column, _| {
            !skip.contains(&column) && self.schema.column_exists(table, column)
        });
        values
    }

    /// Language for the translation row: payload, then caller, then default.
    fn language_for(&self, payload: &Record, auth: &dyn AuthContext) -> Option<i64> {
        payload
            .get(&self.config.language_column)
            .and_then(Value::as_i64)
            .or_else(|| auth.language_id())
            .or(self.config.default_language_id)
    }

    /// Load the primary row by id.
    pub fn load<C: Connection>(&self, conn: &C, id: i64) -> Result<Record> {
        let (sql, params) = FindBuilder::new(self.descriptor.table())
            .filter_eq("id", id)
            .build(conn.dialect());
        tracing::trace!(sql = %sql, "Loading record");
        match conn.query_one(&sql, &params)? {
            Some(row) => Ok(Record::from_row(&row)),
            None => Err(self.access(AccessErrorKind::NotFound, Some(id))),
        }
    }

    /// Load by id and run the ownership check.
    fn authorize<C: Connection>(
        &self,
        conn: &C,
        auth: &dyn AuthContext,
        id: i64,
    ) -> Result<Record> {
        let record = self.load(conn, id)?;
        let guard = PermissionGuard::new(self.schema);
        if !guard.can_mutate_own(self.descriptor, auth, &record, &self.config.owner_column) {
            tracing::info!(
                entity = self.descriptor.name(),
                id,
                user = auth.current_user_id(),
                "Mutation denied"
            );
            return Err(self.access(AccessErrorKind::PermissionDenied, Some(id)));
        }
        Ok(record)
    }

    /// Create a record, plus its translation row when translatable.
    ///
    /// The owner column is always set to the acting user. Any storage
    /// failure is logged and reported as a save conflict.
    #[tracing::instrument(level = "debug", skip_all, fields(entity = self.descriptor.name()))]
    pub fn create<C: Connection>(
        &self,
        conn: &C,
        auth: &dyn AuthContext,
        payload: &Record,
    ) -> Result<Record> {
        let mut payload = payload.clone();
        payload.set(
            self.config.owner_column.as_str(),
            Value::from(auth.current_user_id()),
        );

        let dialect = conn.dialect();
        let tx = conn
            .begin()
            .map_err(|e| self.conflict(AccessErrorKind::SaveConflict, None, &e))?;
        let outcome = self.write_create(&tx, dialect, auth, &payload);
        let record = finish(tx, outcome)
            .map_err(|e| self.conflict(AccessErrorKind::SaveConflict, None, &e))?;

        tracing::info!(entity = self.descriptor.name(), id = record.id(), "Record created");
        Ok(record)
    }

    fn write_create<T: TransactionOps>(
        &self,
        tx: &T,
        dialect: Dialect,
        auth: &dyn AuthContext,
        payload: &Record,
    ) -> Result<Record> {
        let table = self.descriptor.table();
        let mut record = self.columns_for(table, payload, &["id"]);
        let (sql, params) = InsertBuilder::new(table, &record)
            .returning("id")
            .build(dialect);
        tracing::trace!(sql = %sql, "Inserting primary row");
        let id = tx.insert(&sql, &params)?;
        record.set("id", id);

        if self.descriptor.is_translatable() {
            if let Some(language_id) = self.language_for(payload, auth) {
                let translation = self.insert_translation(tx, dialect, id, language_id, payload)?;
                record.merge_over(&translation, &["id"]);
            } else {
                tracing::debug!(
                    entity = self.descriptor.name(),
                    id,
                    "No language; skipping translation row"
                );
            }
        }
        Ok(record)
    }

    fn insert_translation<T: TransactionOps>(
        &self,
        tx: &T,
        dialect: Dialect,
        id: i64,
        language_id: i64,
        payload: &Record,
    ) -> Result<Record> {
        let table = self.descriptor.translation_table();
        let foreign_key = self.descriptor.translation_foreign_key();
        let language_column = self.config.language_column.as_str();

        let mut translation =
            self.columns_for(table, payload, &["id", foreign_key, language_column]);
        translation.set(foreign_key, id);
        translation.set(language_column, language_id);

        let (sql, params) = InsertBuilder::new(table, &translation)
            .returning("id")
            .build(dialect);
        tracing::trace!(sql = %sql, "Inserting translation row");
        let translation_id = tx.insert(&sql, &params)?;
        translation.set("id", translation_id);
        Ok(translation)
    }

    /// Update a record and find-or-create its translation row.
    ///
    /// Fails with NotFound before any write when the id does not resolve,
    /// and with PermissionDenied when the guard refuses. Write failures are
    /// returned unchanged. Only elevated callers may change the owner column.
    #[tracing::instrument(level = "debug", skip(self, conn, auth, payload), fields(entity = self.descriptor.name()))]
    pub fn update<C: Connection>(
        &self,
        conn: &C,
        auth: &dyn AuthContext,
        id: i64,
        payload: &Record,
    ) -> Result<Record> {
        let current = self.authorize(conn, auth, id)?;

        let dialect = conn.dialect();
        let tx = conn.begin()?;
        let outcome = self.write_update(&tx, dialect, auth, id, current, payload);
        let record = finish(tx, outcome)?;

        tracing::info!(entity = self.descriptor.name(), id, "Record updated");
        Ok(record)
    }

    fn write_update<T: TransactionOps>(
        &self,
        tx: &T,
        dialect: Dialect,
        auth: &dyn AuthContext,
        id: i64,
        mut record: Record,
        payload: &Record,
    ) -> Result<Record> {
        let table = self.descriptor.table();
        let mut changes = self.columns_for(table, payload, &["id"]);
        if !auth.has_elevated_permission()
            && changes.remove(&self.config.owner_column).is_some()
        {
            tracing::debug!(entity = self.descriptor.name(), id, "Ignoring owner change");
        }
        let update = UpdateBuilder::new(table, &changes).filter_eq("id", id);
        if !update.is_empty() {
            let (sql, params) = update.build(dialect);
            tracing::trace!(sql = %sql, "Updating primary row");
            tx.execute(&sql, &params)?;
        }
        record.merge_over(&changes, &[]);

        if self.descriptor.is_translatable() {
            match self.language_for(payload, auth) {
                Some(language_id) => {
                    let translation = self.sync_translation(tx, dialect, id, language_id, payload)?;
                    record.merge_over(&translation, &["id"]);
                }
                None => tracing::debug!(
                    entity = self.descriptor.name(),
                    id,
                    "No language; skipping translation row"
                ),
            }
        }
        Ok(record)
    }

    fn sync_translation<T: TransactionOps>(
        &self,
        tx: &T,
        dialect: Dialect,
        id: i64,
        language_id: i64,
        payload: &Record,
    ) -> Result<Record> {
        let table = self.descriptor.translation_table();
        let foreign_key = self.descriptor.translation_foreign_key();
        let language_column = self.config.language_column.as_str();

        let (sql, params) = FindBuilder::new(table)
            .filter_eq(foreign_key, id)
            .filter_eq(language_column, language_id)
            .build(dialect);
        let Some(row) = tx.query_one(&sql, &params)? else {
            return self.insert_translation(tx, dialect, id, language_id, payload);
        };

        let mut existing = Record::from_row(&row);
        let changes = self.columns_for(table, payload, &["id", foreign_key, language_column]);
        if !changes.is_empty() {
            let mut update = UpdateBuilder::new(table, &changes);
            update = match existing.get("id") {
                Some(translation_id) => update.filter_eq("id", translation_id.clone()),
                None => update
                    .filter_eq(foreign_key, id)
                    .filter_eq(language_column, language_id),
            };
            let (sql, params) = update.build(dialect);
            tracing::trace!(sql = %sql, "Updating translation row");
            tx.execute(&sql, &params)?;
        }
        existing.merge_over(&changes, &[]);
        Ok(existing)
    }

    /// Delete a record. Translation rows are left to the storage layer's
    /// cascade. Storage failures are reported as a destroy conflict.
    #[tracing::instrument(level = "debug", skip(self, conn, auth), fields(entity = self.descriptor.name()))]
    pub fn delete<C: Connection>(&self, conn: &C, auth: &dyn AuthContext, id: i64) -> Result<()> {
        self.authorize(conn, auth, id)?;

        let (sql, params) = DeleteBuilder::new(self.descriptor.table())
            .filter_eq("id", id)
            .build(conn.dialect());
        tracing::trace!(sql = %sql, "Deleting record");
        let outcome = conn.begin().and_then(|tx| {
            let written = tx.execute(&sql, &params);
            finish(tx, written)
        });
        outcome.map_err(|e| self.conflict(AccessErrorKind::DestroyConflict, Some(id), &e))?;

        tracing::info!(entity = self.descriptor.name(), id, "Record deleted");
        Ok(())
    }
}
