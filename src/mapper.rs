//! Row-to-record mapping.
//!
//! Usage:
//! let mapper = RowMapper::new(Arc::new(MappingCache::new()));
//! let first: Option<User> = mapper.map_row(Some(&cursor))?;
//! let all: Option<Vec<User>> = mapper.map_all(Some(&mut cursor))?;
use crate::cache::{MappingCache, TypeMapping};
use crate::cursor::RowCursor;
use crate::error::{MapError, Result};
use crate::record::Record;
use log::debug;
use std::sync::Arc;

/// Maps cursor rows onto [`Record`] types through a shared [`MappingCache`].
#[derive(Clone)]
pub struct RowMapper {
    cache: Arc<MappingCache>,
}

impl RowMapper {
    pub fn new(cache: Arc<MappingCache>) -> Self {
        RowMapper { cache }
    }

    /// A mapper backed by the process-wide cache.
    pub fn global() -> Self {
        RowMapper::new(MappingCache::global())
    }

    pub fn cache(&self) -> &Arc<MappingCache> {
        &self.cache
    }

    /// Maps the cursor's current row onto a new `T`.
    ///
    /// Returns `Ok(None)` when there is no cursor or the cursor has no rows.
    /// The cursor is not advanced.
    pub fn map_row<T, C>(&self, cursor: Option<&C>) -> Result<Option<T>>
    where
        T: Record,
        C: RowCursor + ?Sized,
    {
        let cursor = match cursor {
            Some(c) if c.has_rows() => c,
            _ => return Ok(None),
        };
        let mapping = self.cache.get_mapping::<T>()?;
        map_current(&mapping, cursor).map(Some)
    }

    /// Advances through every remaining row, mapping each onto a `T`.
    ///
    /// Returns `Ok(None)` when there is no cursor or the cursor has no rows,
    /// as opposed to an empty vector. The cursor is left open.
    pub fn map_all<T, C>(&self, cursor: Option<&mut C>) -> Result<Option<Vec<T>>>
    where
        T: Record,
        C: RowCursor + ?Sized,
    {
        let cursor = match cursor {
            Some(c) if c.has_rows() => c,
            _ => return Ok(None),
        };
        let mapping = self.cache.get_mapping::<T>()?;
        let mut records = Vec::new();
        while cursor.advance()? {
            records.push(map_current(&mapping, &*cursor)?);
        }
        debug!("Mapped {} rows onto `{}`", records.len(), mapping.record());
        Ok(Some(records))
    }
}

fn map_current<T, C>(mapping: &TypeMapping<T>, cursor: &C) -> Result<T>
where
    T: Record,
    C: RowCursor + ?Sized,
{
    let mut record = T::default();
    for index in 0..cursor.field_count() {
        let column = cursor.column_name(index)?.to_lowercase();
        let Some(field) = mapping.get(&column) else {
            mdebug!("`{}`: no field for column `{}`", mapping.record(), column);
            continue;
        };
        let value = cursor.value(index)?;
        if cursor.is_null(&value) {
            mdebug!(
                "`{}.{}`: null in `{}`, applying {:?}",
                mapping.record(),
                field.name(),
                column,
                field.null_policy()
            );
            field.assign_null(&mut record);
            continue;
        }
        if let Err(rejected) = field.assign(&mut record, value) {
            return Err(MapError::TypeMismatch {
                record: mapping.record(),
                field: field.name(),
                column,
                expected: field.type_name(),
                found: rejected.kind(),
            });
        }
    }
    Ok(record)
}

/// Mapping shortcuts on any cursor, backed by the process-wide cache.
pub trait CursorExt: RowCursor {
    /// Maps the current row. See [`RowMapper::map_row`].
    fn to<T: Record>(&self) -> Result<Option<T>> {
        RowMapper::global().map_row(Some(self))
    }

    /// Maps all remaining rows. See [`RowMapper::map_all`].
    fn to_list<T: Record>(&mut self) -> Result<Option<Vec<T>>> {
        RowMapper::global().map_all(Some(self))
    }
}

impl<C: RowCursor + ?Sized> CursorExt for C {}
