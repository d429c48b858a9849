//! Per-type column mappings and the cache that holds them.
//!
//! A [`TypeMapping`] is built once per record type and shared through an
//! `Arc`. Lookups take a read lock; a miss builds the mapping with no lock
//! held and then inserts it only if no other caller got there first, so
//! racing first-callers may duplicate the build but all of them end up
//! holding the same retained mapping.
use crate::error::{MapError, Result};
use crate::record::{FieldDescriptor, Record, Registration};
use log::{debug, info};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

static GLOBAL: Lazy<Arc<MappingCache>> = Lazy::new(|| Arc::new(MappingCache::new()));

/// Lower-cased column name to field descriptor, for one record type.
pub struct TypeMapping<T> {
    record: &'static str,
    columns: HashMap<String, FieldDescriptor<T>>,
}

impl<T: Record> TypeMapping<T> {
    /// Builds the mapping from `T::fields()`. Fails if two fields resolve
    /// to the same column.
    pub fn build() -> Result<Self> {
        let record = T::record_name();
        let mut columns: HashMap<String, FieldDescriptor<T>> = HashMap::new();
        for field in T::fields() {
            match columns.entry(field.column_name()) {
                Entry::Occupied(existing) => {
                    return Err(MapError::DuplicateColumn {
                        record,
                        column: existing.key().clone(),
                        first: existing.get().name(),
                        second: field.name(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(field);
                }
            }
        }
        Ok(TypeMapping { record, columns })
    }
}

impl<T> TypeMapping<T> {
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Looks up a column. `column` must already be lower-cased.
    pub fn get(&self, column: &str) -> Option<&FieldDescriptor<T>> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

type Cached = Arc<dyn Any + Send + Sync>;

/// Type-keyed cache of [`TypeMapping`]s.
///
/// Create one per scope that needs isolation, or use [`MappingCache::global`]
/// for the process-wide instance.
#[derive(Default)]
pub struct MappingCache {
    mappings: RwLock<HashMap<TypeId, Cached>>,
    builds: AtomicUsize,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by [`crate::CursorExt`] and
    /// [`crate::RowMapper::global`].
    pub fn global() -> Arc<MappingCache> {
        GLOBAL.clone()
    }

    /// Returns the mapping for `T`, building and caching it on first use.
    pub fn get_mapping<T: Record>(&self) -> Result<Arc<TypeMapping<T>>> {
        let key = TypeId::of::<T>();
        if let Some(entry) = self.mappings.read().get(&key) {
            return Ok(downcast(entry.clone()));
        }

        let mapping = Arc::new(TypeMapping::<T>::build()?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Built column mapping for `{}` ({} columns)",
            mapping.record(),
            mapping.len()
        );

        let built: Cached = mapping;
        let retained = {
            let mut mappings = self.mappings.write();
            mappings.entry(key).or_insert(built).clone()
        };
        Ok(downcast(retained))
    }

    /// Builds the mapping for `T` if it is not cached yet.
    pub fn preload<T: Record>(&self) -> Result<()> {
        self.get_mapping::<T>().map(|_| ())
    }

    /// Preloads every record type registered by `#[derive(Record)]`.
    /// Returns how many types were loaded.
    pub fn warm_up(&self) -> Result<usize> {
        info!("Warming up column mappings for all registered records...");
        let mut total = 0;
        for registration in inventory::iter::<Registration> {
            if let Err(e) = (registration.preload)(self) {
                log::error!("Preloading `{}` failed: {}", registration.record, e);
                return Err(e);
            }
            total += 1;
        }
        info!("Warm-up completed for {} records.", total);
        Ok(total)
    }

    pub fn contains<T: Record>(&self) -> bool {
        self.mappings.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of cached record types.
    pub fn len(&self) -> usize {
        self.mappings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.read().is_empty()
    }

    /// How many times a mapping was built, including builds discarded after
    /// losing an insert race.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

fn downcast<T: Record>(entry: Cached) -> Arc<TypeMapping<T>> {
    match entry.downcast::<TypeMapping<T>>() {
        Ok(mapping) => mapping,
        Err(_) => unreachable!("mapping cached under the TypeId of another type"),
    }
}
