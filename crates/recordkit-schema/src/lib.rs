//! Schema metadata and entity descriptors for RecordKit.
//!
//! `recordkit-schema` is the **metadata layer**. Nothing in RecordKit trusts a
//! client-supplied column name until it has been checked here.
//!
//! - **Introspection**: `SchemaIntrospector` answers table/column existence;
//!   `SchemaSnapshot` caches live metadata until an explicit reload.
//! - **Entities**: `EntityDefinition` is what callers register;
//!   `EntityDescriptor` is the immutable set of derived table names.
//! - **Translations**: `TranslationResolver` decides whether an entity's
//!   per-language table is active and describes the join to it.

pub mod entity;
pub mod introspect;
pub mod registry;
pub mod translation;

pub use entity::{EntityDefinition, EntityDescriptor, RelationDef, RelationKind};
pub use introspect::{Introspector, SchemaIntrospector, SchemaSnapshot, TableInfo};
pub use registry::{EntityRegistry, RegistryBuilder};
pub use translation::{TranslationJoin, TranslationResolver};
