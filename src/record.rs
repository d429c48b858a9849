//! Record types and their field accessor tables.
//!
//! A [`Record`] lists its mappable fields as [`FieldDescriptor`]s. The table is
//! normally generated by `#[derive(Record)]`; each descriptor carries the
//! setter functions and the null policy chosen for the field's type, so the
//! mapper never inspects types while walking cells.
use crate::cache::MappingCache;
use crate::error::Result;
use crate::value::{ColumnValue, NullPolicy, Value};
use std::fmt;

/// A type that rows can be mapped onto.
///
/// `Default` provides the instance that mapped cells are written into;
/// fields without a matching column keep their default value.
pub trait Record: Default + 'static {
    /// Enumerates the mappable fields. Called once per cache, when the
    /// type's mapping is first built.
    fn fields() -> Vec<FieldDescriptor<Self>>;

    /// Type name used in logs and errors.
    fn record_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Static metadata for one mappable field of `T`.
pub struct FieldDescriptor<T> {
    name: &'static str,
    column: Option<&'static str>,
    type_name: &'static str,
    null_policy: NullPolicy,
    assign: fn(&mut T, Value) -> std::result::Result<(), Value>,
    assign_null: fn(&mut T),
}

impl<T> FieldDescriptor<T> {
    /// Builds a descriptor for a field of type `F`.
    ///
    /// `assign` writes a converted value into the field and hands back the
    /// value when `F` rejects it. `assign_null` writes `F::null_value()`.
    pub fn new<F: ColumnValue>(
        name: &'static str,
        column: Option<&'static str>,
        assign: fn(&mut T, Value) -> std::result::Result<(), Value>,
        assign_null: fn(&mut T),
    ) -> Self {
        FieldDescriptor {
            name,
            column,
            type_name: F::TYPE_NAME,
            null_policy: F::NULL_POLICY,
            assign,
            assign_null,
        }
    }

    /// Declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Explicit column override, if the field carries one.
    pub fn column_override(&self) -> Option<&'static str> {
        self.column
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn null_policy(&self) -> NullPolicy {
        self.null_policy
    }

    /// External column name: the override if present, otherwise the
    /// declared name, lower-cased.
    pub fn column_name(&self) -> String {
        self.column.unwrap_or(self.name).to_lowercase()
    }

    pub(crate) fn assign(&self, target: &mut T, value: Value) -> std::result::Result<(), Value> {
        (self.assign)(target, value)
    }

    pub(crate) fn assign_null(&self, target: &mut T) {
        (self.assign_null)(target)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        FieldDescriptor {
            name: self.name,
            column: self.column,
            type_name: self.type_name,
            null_policy: self.null_policy,
            assign: self.assign,
            assign_null: self.assign_null,
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("type_name", &self.type_name)
            .field("null_policy", &self.null_policy)
            .finish()
    }
}

/// Link-time registration of a record type, submitted by `#[derive(Record)]`
/// and consumed by [`MappingCache::warm_up`].
pub struct Registration {
    pub record: &'static str,
    pub preload: fn(&MappingCache) -> Result<()>,
}
