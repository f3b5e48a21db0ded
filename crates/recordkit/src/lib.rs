//! RecordKit: generic, schema-validated record access.
//!
//! RecordKit serves many heterogeneous tables through one interface. Client
//! request parameters (filters, selected fields, sort keys, eager-load
//! projections) are checked against live schema metadata before anything
//! reaches SQL, optional per-language translation tables are joined
//! transparently, and mutations keep a primary row and its translation row
//! consistent inside one transaction.
//!
//! # Quick Start
//!
//! ```ignore
//! use recordkit::prelude::*;
//!
//! let entities = EntityRegistry::builder()
//!     .register(
//!         EntityDefinition::new("country", "countries")
//!             .translated("CountryTranslation")
//!             .relation(RelationDef::has_many("city", "country_id")),
//!     )
//!     .register(EntityDefinition::new("invoice", "invoices").owner_managed());
//!
//! let access = RecordAccess::load(AccessConfig::default(), &conn, entities)?;
//!
//! let params = RequestParams::new()
//!     .with("language_id", "2")
//!     .with("selected_fields", "id,name")
//!     .with("with", "city:name,population")
//!     .with("order_by", "name:desc");
//! let countries = access.list(&conn, "country", &params, &Identity::user(7), &["city"])?;
//!
//! let created = access.create(
//!     &conn,
//!     "invoice",
//!     &Identity::user(7),
//!     &Record::from_pairs([("total", Value::BigInt(120))]),
//! )?;
//! ```
//!
//! # Errors At The Boundary
//!
//! Failures a transport layer must translate arrive as
//! [`Error::Access`](recordkit_core::Error::Access) with an
//! [`AccessErrorKind`](recordkit_core::AccessErrorKind): `NotFound`,
//! `PermissionDenied`, `SaveConflict` and `DestroyConflict`. Update write
//! failures are returned as the underlying error.

pub mod access;
pub mod config;
pub mod eager;
pub mod guard;
pub mod identity;
pub mod messages;
pub mod mutation;

pub use access::RecordAccess;
pub use config::AccessConfig;
pub use eager::load_relations;
pub use guard::PermissionGuard;
pub use identity::{AuthContext, Identity};
pub use messages::{DefaultMessages, MessageCatalog};
pub use mutation::MutationOrchestrator;

pub use recordkit_core::{
    AccessError, AccessErrorKind, Connection, Dialect, Error, Record, Result, Row, TransactionOps,
    Value,
};
pub use recordkit_query::{
    ParamValues, ParsedParameter, QueryComposer, QueryPlan, RequestParams, parse_parameters,
};
pub use recordkit_schema::{
    EntityDefinition, EntityDescriptor, EntityRegistry, Introspector, RegistryBuilder, RelationDef,
    RelationKind, SchemaIntrospector, SchemaSnapshot, TableInfo,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        AccessConfig, AccessErrorKind, AuthContext, Connection, EntityDefinition, EntityRegistry,
        Error, Identity, Record, RecordAccess, RelationDef, RequestParams, Result, Value,
    };
}
