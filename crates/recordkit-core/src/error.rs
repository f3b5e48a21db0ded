//! Error types for RecordKit operations.

use std::fmt;

/// The primary error type for all RecordKit operations.
#[derive(Debug)]
pub enum Error {
    /// Storage-level query or statement failure
    Query(QueryError),
    /// Schema metadata errors (introspection, unknown tables)
    Schema(SchemaError),
    /// Type conversion errors
    Type(TypeError),
    /// Configuration errors (bad config, unknown entity)
    Config(ConfigError),
    /// Boundary errors surfaced to the transport layer
    Access(AccessError),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Deadlock or serialization failure
    Deadlock,
    /// Connection lost or unavailable
    Connection,
    /// Other database error
    Database,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Table not found
    TableNotFound,
    /// Metadata could not be read
    Introspection,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// An error that crosses the record-access boundary.
///
/// The transport collaborator maps [`AccessErrorKind`] to its own status
/// codes; the low-level cause (if any) has already been logged and is not
/// carried here.
#[derive(Debug, Clone)]
pub struct AccessError {
    pub kind: AccessErrorKind,
    /// Entity type name the operation targeted
    pub entity: String,
    /// Record id, when the operation addressed a single record
    pub id: Option<i64>,
    /// Localized, client-safe message
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessErrorKind {
    /// Record id does not resolve
    NotFound,
    /// Permission guard refused the mutation
    PermissionDenied,
    /// Create failed in the storage layer
    SaveConflict,
    /// Delete failed in the storage layer
    DestroyConflict,
}

impl AccessErrorKind {
    /// HTTP status code conventionally associated with this kind.
    pub const fn status_code(self) -> u16 {
        match self {
            AccessErrorKind::NotFound => 404,
            AccessErrorKind::PermissionDenied => 403,
            AccessErrorKind::SaveConflict | AccessErrorKind::DestroyConflict => 409,
        }
    }

    /// Message catalog key for this kind.
    pub const fn message_key(self) -> &'static str {
        match self {
            AccessErrorKind::NotFound => "record.not_found",
            AccessErrorKind::PermissionDenied => "record.permission_denied",
            AccessErrorKind::SaveConflict => "record.save_conflict",
            AccessErrorKind::DestroyConflict => "record.destroy_conflict",
        }
    }
}

impl Error {
    /// The boundary kind, if this is an access error.
    pub fn access_kind(&self) -> Option<AccessErrorKind> {
        match self {
            Error::Access(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.access_kind() == Some(AccessErrorKind::NotFound)
    }

    pub fn is_permission_denied(&self) -> bool {
        self.access_kind() == Some(AccessErrorKind::PermissionDenied)
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }

    /// Shorthand for a generic database failure.
    pub fn database(message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind: QueryErrorKind::Database,
            sql: None,
            message: message.into(),
            source: None,
        })
    }

    /// Shorthand for a configuration failure.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            message: message.into(),
            source: None,
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Query(e) => write!(f, "Query error: {}", e.message),
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Access(e) => write!(f, "{}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Schema(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} ({} #{})", self.message, self.entity, id),
            None => write!(f, "{} ({})", self.message, self.entity),
        }
    }
}

impl std::error::Error for AccessError {}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Error::Access(err)
    }
}

/// Result type alias for RecordKit operations.
pub type Result<T> = std::result::Result<T, Error>;
