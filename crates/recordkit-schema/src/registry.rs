//! Entity registry.
//!
//! Entity types are registered once at startup. Building the registry
//! derives every descriptor and settles translatability against a schema
//! snapshot; afterwards the registry is read-only and can be shared across
//! request threads behind an `Arc`. After a schema refresh, build it again
//! from the same builder.

use crate::entity::{EntityDefinition, EntityDescriptor};
use crate::introspect::SchemaIntrospector;
use crate::translation::TranslationResolver;
use recordkit_core::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: HashMap<String, Arc<EntityDescriptor>>,
}

/// Collects definitions before the registry is frozen.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    definitions: Vec<EntityDefinition>,
    translation_suffix: String,
}

impl EntityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            definitions: Vec::new(),
            translation_suffix: "_translations".to_string(),
        }
    }

    /// Resolve an entity type by name.
    pub fn get(&self, name: &str) -> Result<Arc<EntityDescriptor>> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| Error::config(format!("entity type '{name}' is not registered")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl RegistryBuilder {
    pub fn translation_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.translation_suffix = suffix.into();
        self
    }

    pub fn register(mut self, definition: EntityDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Derive descriptors and freeze the registry.
    ///
    /// Fails when two definitions share a name or a primary table is missing
    /// from the schema.
    #[tracing::instrument(level = "debug", skip_all, fields(count = self.definitions.len()))]
    pub fn build(
        &self,
        schema: &dyn SchemaIntrospector,
        resolver: &TranslationResolver,
    ) -> Result<EntityRegistry> {
        let mut entities = HashMap::with_capacity(self.definitions.len());
        for def in &self.definitions {
            if !schema.table_exists(&def.table) {
                return Err(Error::config(format!(
                    "entity '{}' maps to unknown table '{}'",
                    def.name, def.table
                )));
            }
            let descriptor = EntityDescriptor::derive(def, &self.translation_suffix);
            let translatable = resolver.is_translatable(&descriptor, schema);
            tracing::debug!(
                entity = %def.name,
                table = %def.table,
                translatable,
                "Registered entity"
            );
            let descriptor = descriptor.with_translatable(translatable);
            if entities
                .insert(def.name.clone(), Arc::new(descriptor))
                .is_some()
            {
                return Err(Error::config(format!(
                    "entity '{}' registered twice",
                    def.name
                )));
            }
        }
        Ok(EntityRegistry { entities })
    }
}
