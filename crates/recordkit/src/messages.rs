//! Client-facing error text.

use recordkit_core::{AccessError, AccessErrorKind};

/// Localized message lookup.
///
/// Keys are the ones returned by [`AccessErrorKind::message_key`].
pub trait MessageCatalog: Send + Sync {
    fn message(&self, key: &str, entity: &str) -> String;
}

/// English fallback catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageCatalog for DefaultMessages {
    fn message(&self, key: &str, entity: &str) -> String {
        match key {
            "record.not_found" => format!("The requested {entity} does not exist"),
            "record.permission_denied" => {
                format!("You are not allowed to modify this {entity}")
            }
            "record.save_conflict" => format!("The {entity} could not be saved"),
            "record.destroy_conflict" => format!("The {entity} could not be deleted"),
            other => other.to_string(),
        }
    }
}

/// Build a boundary error with catalog text.
pub(crate) fn access_error(
    catalog: &dyn MessageCatalog,
    kind: AccessErrorKind,
    entity: &str,
    id: Option<i64>,
) -> AccessError {
    AccessError {
        kind,
        entity: entity.to_string(),
        id,
        message: catalog.message(kind.message_key(), entity),
    }
}
