//! Request parsing and query composition for RecordKit.
//!
//! `recordkit-query` is the **query construction layer**. It turns raw,
//! loosely-typed request parameters into validated [`QueryPlan`]s and renders
//! plans and mutations into dialect-specific SQL.
//!
//! # Role In The Architecture
//!
//! - **Parameter parsing**: `parse_parameters` splits compound strings such as
//!   `"city:id,name|currency"`; `RequestParams` holds the raw key/value map.
//! - **Composition**: `QueryComposer` checks every client-supplied name against
//!   a `SchemaIntrospector` and drops what does not exist.
//! - **Rendering**: `QueryPlan::to_sql` and the statement builders quote every
//!   identifier and bind every value.
//!
//! # Example
//!
//! ```
//! use recordkit_query::{QueryComposer, RequestParams};
//! use recordkit_schema::{
//!     EntityDefinition, EntityRegistry, SchemaSnapshot, TableInfo, TranslationResolver,
//! };
//! use recordkit_core::Dialect;
//!
//! let schema = SchemaSnapshot::from_tables([TableInfo::new("tags", ["id", "label"])]);
//! let resolver = TranslationResolver::default();
//! let registry = EntityRegistry::builder()
//!     .register(EntityDefinition::new("tag", "tags"))
//!     .build(&schema, &resolver)
//!     .unwrap();
//! let tag = registry.get("tag").unwrap();
//!
//! let params = RequestParams::new().with("label", "rust").with("nope", "1");
//! let plan = QueryComposer::new(&tag, &schema, &resolver).compose(&params, None, &[]);
//! let (sql, values) = plan.to_sql(Dialect::Sqlite);
//! assert_eq!(sql, "SELECT \"tags\".* FROM \"tags\" WHERE \"tags\".\"label\" = ?1");
//! assert_eq!(values.len(), 1);
//! ```

pub mod builder;
pub mod clause;
pub mod composer;
pub mod params;
pub mod plan;

pub use builder::{DeleteBuilder, FindBuilder, InsertBuilder, UpdateBuilder};
pub use clause::{OrderBy, OrderDirection, Predicate, QualifiedColumn, SelectItem};
pub use composer::QueryComposer;
pub use params::{
    ParamValues, ParsedParameter, RESERVED_KEYS, RequestParams, parse_parameters, split_list,
};
pub use plan::{EagerLoad, QueryPlan};
