//! SQLite cursor over rows fetched with sqlx
//!
//! Usage:
//! let pool = SqlitePool::connect("sqlite::memory:").await?;
//! let mut cursor = SqliteCursor::fetch(&pool, "SELECT ...").await?;
//! let users: Option<Vec<User>> = cursor.to_list()?;
//!
//! The pool and the query belong to the caller; the cursor only walks the
//! rows it was given.
use crate::cursor::RowCursor;
use crate::error::{MapError, Result};
use crate::value::Value;
use chrono::NaiveDateTime;
use log::{debug, info};
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Column, Executor, Row, TypeInfo, ValueRef};

/// A [`RowCursor`] over a buffered SQLite result set.
pub struct SqliteCursor {
    columns: Vec<String>,
    rows: Vec<SqliteRow>,
    // Rows advanced past; the current row is `position - 1`.
    position: usize,
}

impl SqliteCursor {
    /// Wraps rows that were already fetched. Column names come from the
    /// first row; an empty result set has no columns.
    pub fn new(rows: Vec<SqliteRow>) -> Self {
        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        SqliteCursor {
            columns,
            rows,
            position: 0,
        }
    }

    /// Runs `sql` on the caller's executor and buffers the result.
    pub async fn fetch<'e, E>(executor: E, sql: &str) -> Result<Self>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!("Fetching rows with SQL: {}", sql);
        let result = sqlx::query(sql).fetch_all(executor).await;
        match &result {
            Ok(rows) => info!("Fetched {} rows successfully", rows.len()),
            Err(e) => log::error!("Row fetch failed: {}", e),
        }
        Ok(SqliteCursor::new(result?))
    }

    fn current(&self) -> Result<&SqliteRow> {
        self.position
            .checked_sub(1)
            .and_then(|p| self.rows.get(p))
            .ok_or(MapError::NoCurrentRow)
    }
}

impl RowCursor for SqliteCursor {
    fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    fn field_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        self.columns
            .get(index)
            .map(String::as_str)
            .ok_or(MapError::ColumnOutOfRange {
                index,
                count: self.columns.len(),
            })
    }

    fn value(&self, index: usize) -> Result<Value> {
        if index >= self.columns.len() {
            return Err(MapError::ColumnOutOfRange {
                index,
                count: self.columns.len(),
            });
        }
        decode(self.current()?, index)
    }

    fn advance(&mut self) -> Result<bool> {
        if self.position < self.rows.len() {
            self.position += 1;
            Ok(true)
        } else {
            self.position = self.rows.len() + 1;
            Ok(false)
        }
    }
}

/// Decodes one cell. The declared column type picks booleans and
/// timestamps when the stored value decodes as one; otherwise the stored
/// value's class decides.
fn decode(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage = raw.type_info().name().to_string();
    let declared = row.column(index).type_info().name().to_ascii_uppercase();

    let typed = match declared.as_str() {
        "BOOLEAN" | "BOOL" => row.try_get::<bool, _>(index).ok().map(Value::Bool),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .ok()
            .map(Value::Timestamp),
        _ => None,
    };
    // Affinity lets these columns hold any storage class.
    let value = match typed {
        Some(value) => value,
        None => match storage.as_str() {
            "INTEGER" => Value::Int(row.try_get(index)?),
            "REAL" => Value::Float(row.try_get(index)?),
            "BLOB" => Value::Bytes(row.try_get(index)?),
            _ => Value::Text(row.try_get(index)?),
        },
    };
    Ok(value)
}
