//! Record-access configuration.

use recordkit_core::{ConfigError, Error, Result};
use recordkit_schema::TranslationResolver;
use serde::Deserialize;

/// Settings shared by every entity served through one [`RecordAccess`](crate::RecordAccess).
///
/// SQL dialect is not configured here; it comes from the connection.
/// Deserializes from JSON with every field optional:
///
/// ```
/// use recordkit::AccessConfig;
///
/// let config = AccessConfig::from_json(r#"{"owner_column": "owner_id", "max_limit": 100}"#).unwrap();
/// assert_eq!(config.owner_column, "owner_id");
/// assert_eq!(config.language_column, "language_id");
/// assert_eq!(config.max_limit, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Column holding the owning user on owner-managed tables
    pub owner_column: String,
    /// Column holding the language on translation tables
    pub language_column: String,
    /// Appended to the singular table name to form the translation table
    pub translation_suffix: String,
    /// Language used when a request carries none
    pub default_language_id: Option<i64>,
    /// Upper bound applied to the `limit` parameter
    pub max_limit: Option<u64>,
    /// Require both the foreign-key and language columns on translation tables
    pub strict_translation_check: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            owner_column: "user_id".to_string(),
            language_column: "language_id".to_string(),
            translation_suffix: "_translations".to_string(),
            default_language_id: None,
            max_limit: None,
            strict_translation_check: true,
        }
    }
}

impl AccessConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            Error::Config(ConfigError {
                message: format!("invalid access configuration: {e}"),
                source: Some(Box::new(e)),
            })
        })
    }

    pub fn with_owner_column(mut self, column: impl Into<String>) -> Self {
        self.owner_column = column.into();
        self
    }

    pub fn with_language_column(mut self, column: impl Into<String>) -> Self {
        self.language_column = column.into();
        self
    }

    pub fn with_translation_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.translation_suffix = suffix.into();
        self
    }

    pub fn with_default_language(mut self, language_id: i64) -> Self {
        self.default_language_id = Some(language_id);
        self
    }

    pub fn with_max_limit(mut self, max_limit: u64) -> Self {
        self.max_limit = Some(max_limit);
        self
    }

    pub fn with_strict_translation_check(mut self, strict: bool) -> Self {
        self.strict_translation_check = strict;
        self
    }

    /// The translation resolver these settings describe.
    pub fn translation_resolver(&self) -> TranslationResolver {
        TranslationResolver::new(&self.language_column).strict(self.strict_translation_check)
    }
}
