//! Core types and traits for RecordKit.
//!
//! This crate provides the foundational pieces every other RecordKit crate
//! builds on:
//!
//! - `Value`, `Row` and `Record` for loosely-typed data
//! - `Connection` / `TransactionOps`, the synchronous storage boundary
//! - `Dialect` and identifier quoting
//! - `Error`, including the boundary taxonomy in `AccessErrorKind`
//! - English inflection for table names

pub mod connection;
pub mod dialect;
pub mod error;
pub mod inflect;
pub mod record;
pub mod row;
pub mod value;

pub use connection::{Connection, TransactionOps};
pub use dialect::{Dialect, quote_ident, quote_ident_mysql};
pub use error::{
    AccessError, AccessErrorKind, ConfigError, Error, QueryError, QueryErrorKind, Result,
    SchemaError, SchemaErrorKind, TypeError,
};
pub use inflect::{pluralize, singularize};
pub use record::Record;
pub use row::{ColumnInfo, FromValue, Row};
pub use value::Value;
