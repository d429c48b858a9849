//! Error type shared by the mapper, the cache and the cursor adapters.

use thiserror::Error;

/// Errors raised while mapping rows onto records.
#[derive(Debug, Error)]
pub enum MapError {
    /// A cell could not be assigned to its field.
    #[error(
        "cannot assign {found} value from column `{column}` to field `{record}.{field}` of type {expected}"
    )]
    TypeMismatch {
        record: &'static str,
        field: &'static str,
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Two fields of one record resolve to the same column name.
    #[error("fields `{first}` and `{second}` of `{record}` both map to column `{column}`")]
    DuplicateColumn {
        record: &'static str,
        column: String,
        first: &'static str,
        second: &'static str,
    },

    /// A cell was read while the cursor was not positioned on a row.
    #[error("cursor is not positioned on a row")]
    NoCurrentRow,

    #[error("column index {index} out of range ({count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MapError>;
