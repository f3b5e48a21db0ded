//! Translation table resolution.

use crate::entity::EntityDescriptor;
use crate::introspect::SchemaIntrospector;

/// Decides whether an entity's translation table is active and describes
/// the join to it.
#[derive(Debug, Clone)]
pub struct TranslationResolver {
    language_column: String,
    strict: bool,
}

/// Left join from a primary table to its translation table, restricted to
/// one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJoin {
    pub primary_table: String,
    pub table: String,
    pub foreign_key: String,
    pub language_column: String,
    /// `None` joins the rows whose language column IS NULL, i.e. nothing
    /// for well-formed data.
    pub language_id: Option<i64>,
}

impl TranslationResolver {
    pub fn new(language_column: impl Into<String>) -> Self {
        Self {
            language_column: language_column.into(),
            strict: true,
        }
    }

    /// With `strict` off, only the foreign-key column is checked and the
    /// language column is assumed.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn language_column(&self) -> &str {
        &self.language_column
    }

    /// True iff a translation entity is registered and the translation table
    /// carries the foreign-key column (and, when strict, the language column).
    pub fn is_translatable(
        &self,
        descriptor: &EntityDescriptor,
        schema: &dyn SchemaIntrospector,
    ) -> bool {
        if !descriptor.has_translation_entity() {
            return false;
        }
        let table = descriptor.translation_table();
        let has_foreign_key = schema.column_exists(table, descriptor.translation_foreign_key());
        let has_language = !self.strict || schema.column_exists(table, &self.language_column);
        if has_foreign_key && !has_language {
            tracing::debug!(
                entity = descriptor.name(),
                table = table,
                "Translation table lacks language column; treating entity as untranslated"
            );
        }
        has_foreign_key && has_language
    }

    /// The join clause for a translatable entity.
    pub fn join(
        &self,
        descriptor: &EntityDescriptor,
        language_id: Option<i64>,
    ) -> Option<TranslationJoin> {
        if !descriptor.is_translatable() {
            return None;
        }
        Some(TranslationJoin {
            primary_table: descriptor.table().to_string(),
            table: descriptor.translation_table().to_string(),
            foreign_key: descriptor.translation_foreign_key().to_string(),
            language_column: self.language_column.clone(),
            language_id,
        })
    }
}

impl Default for TranslationResolver {
    fn default() -> Self {
        Self::new("language_id")
    }
}
