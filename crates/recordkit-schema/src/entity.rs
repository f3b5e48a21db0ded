//! Entity definitions and the descriptors derived from them.

use recordkit_core::{pluralize, singularize};

/// How a relation's rows are keyed back to the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// Parent holds `foreign_key` pointing at the related table's `id`.
    BelongsTo { foreign_key: String },
    /// Related table holds `foreign_key` pointing at the parent's `id`.
    HasMany { foreign_key: String },
}

/// An association an entity exposes for eager loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub name: String,
    pub related_table: String,
    pub kind: RelationKind,
}

impl RelationDef {
    /// A belongs-to relation; the related table is `pluralize(name)` and the
    /// local key is `<name>_id`.
    pub fn belongs_to(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            related_table: pluralize(&name),
            kind: RelationKind::BelongsTo {
                foreign_key: format!("{name}_id"),
            },
            name,
        }
    }

    /// A has-many relation; the related table is `pluralize(name)` and the
    /// remote key must be given.
    pub fn has_many(name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            related_table: pluralize(&name),
            kind: RelationKind::HasMany {
                foreign_key: foreign_key.into(),
            },
            name,
        }
    }

    /// Override the related table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.related_table = table.into();
        self
    }

    /// The (parent column, related column) pair joining the two rows.
    pub fn keys(&self) -> (&str, &str) {
        match &self.kind {
            RelationKind::BelongsTo { foreign_key } => (foreign_key.as_str(), "id"),
            RelationKind::HasMany { foreign_key } => ("id", foreign_key.as_str()),
        }
    }
}

/// Registration-time facts about an entity type.
///
/// ```
/// use recordkit_schema::{EntityDefinition, RelationDef};
///
/// let def = EntityDefinition::new("country", "countries")
///     .translated("CountryTranslation")
///     .relation(RelationDef::has_many("city", "country_id"));
/// assert_eq!(def.table, "countries");
/// ```
#[derive(Debug, Clone)]
pub struct EntityDefinition {
    /// Entity type identifier used by callers.
    pub name: String,
    /// Registered plural table name.
    pub table: String,
    /// Translation entity type, if one is registered.
    pub translation: Option<String>,
    /// Rows carry an owner column restricting mutation.
    pub owner_managed: bool,
    pub relations: Vec<RelationDef>,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            translation: None,
            owner_managed: false,
            relations: Vec::new(),
        }
    }

    /// Register a translation entity type for this entity.
    pub fn translated(mut self, translation_entity: impl Into<String>) -> Self {
        self.translation = Some(translation_entity.into());
        self
    }

    pub fn owner_managed(mut self) -> Self {
        self.owner_managed = true;
        self
    }

    pub fn relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }
}

/// Immutable per-entity facts, derived once at registration.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    name: String,
    plural_table: String,
    singular_table: String,
    translation_entity: Option<String>,
    translation_table: String,
    translation_foreign_key: String,
    owner_managed: bool,
    translatable: bool,
    relations: Vec<RelationDef>,
}

impl EntityDescriptor {
    /// Derive table names from a definition.
    ///
    /// `translatable` starts out false; the registry settles it against the
    /// schema through a [`TranslationResolver`](crate::TranslationResolver).
    pub fn derive(def: &EntityDefinition, translation_suffix: &str) -> Self {
        let singular_table = singularize(&def.table);
        Self {
            name: def.name.clone(),
            plural_table: def.table.clone(),
            translation_table: format!("{singular_table}{translation_suffix}"),
            translation_foreign_key: format!("{singular_table}_id"),
            singular_table,
            translation_entity: def.translation.clone(),
            owner_managed: def.owner_managed,
            translatable: false,
            relations: def.relations.clone(),
        }
    }

    pub(crate) fn with_translatable(mut self, translatable: bool) -> Self {
        self.translatable = translatable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primary table.
    pub fn table(&self) -> &str {
        &self.plural_table
    }

    pub fn singular_table(&self) -> &str {
        &self.singular_table
    }

    pub fn translation_entity(&self) -> Option<&str> {
        self.translation_entity.as_deref()
    }

    pub fn has_translation_entity(&self) -> bool {
        self.translation_entity.is_some()
    }

    pub fn translation_table(&self) -> &str {
        &self.translation_table
    }

    pub fn translation_foreign_key(&self) -> &str {
        &self.translation_foreign_key
    }

    pub fn is_owner_managed(&self) -> bool {
        self.owner_managed
    }

    /// Whether a translation table is active for this entity.
    pub fn is_translatable(&self) -> bool {
        self.translatable
    }

    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }
}
