//! Ownership check for mutations.

use crate::identity::AuthContext;
use recordkit_core::{Record, Value};
use recordkit_schema::{EntityDescriptor, SchemaIntrospector};

/// Decides whether the acting identity may mutate a record.
///
/// Elevated callers may always mutate. Otherwise only owner-managed
/// entities can be mutated, and only when the record's value in `column`
/// matches the expected value. NULL never matches.
pub struct PermissionGuard<'a> {
    schema: &'a dyn SchemaIntrospector,
}

impl<'a> PermissionGuard<'a> {
    pub fn new(schema: &'a dyn SchemaIntrospector) -> Self {
        Self { schema }
    }

    pub fn can_mutate(
        &self,
        descriptor: &EntityDescriptor,
        auth: &dyn AuthContext,
        record: &Record,
        column: &str,
        expected: &Value,
    ) -> bool {
        if auth.has_elevated_permission() {
            return true;
        }
        if !descriptor.is_owner_managed() {
            return false;
        }
        if !self.schema.column_exists(descriptor.table(), column) {
            return false;
        }
        record
            .get(column)
            .is_some_and(|actual| actual.loosely_equals(expected))
    }

    /// [`can_mutate`](Self::can_mutate) against the caller's own user id.
    pub fn can_mutate_own(
        &self,
        descriptor: &EntityDescriptor,
        auth: &dyn AuthContext,
        record: &Record,
        owner_column: &str,
    ) -> bool {
        let expected = Value::from(auth.current_user_id());
        self.can_mutate(descriptor, auth, record, owner_column, &expected)
    }
}
