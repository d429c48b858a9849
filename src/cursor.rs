//! Forward-only row cursors.
use crate::error::{MapError, Result};
use crate::value::Value;

/// A sequential, forward-only handle over query rows.
///
/// A fresh cursor sits before the first row; `advance` moves onto the next
/// row and reports whether there was one. Cell reads address the current row.
pub trait RowCursor {
    /// Whether the result set holds any rows at all, regardless of position.
    fn has_rows(&self) -> bool;

    fn field_count(&self) -> usize;

    fn column_name(&self, index: usize) -> Result<&str>;

    /// Raw value of a cell in the current row.
    fn value(&self, index: usize) -> Result<Value>;

    fn advance(&mut self) -> Result<bool>;

    fn is_null(&self, value: &Value) -> bool {
        value.is_null()
    }
}

/// A cursor over rows held in memory.
///
/// ```
/// use rowbind::{MemoryCursor, Value};
///
/// let cursor = MemoryCursor::new(["id", "name"])
///     .row([Value::from(1), Value::from("Alice")])
///     .row([Value::from(2), Value::Null]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    // Rows advanced past; the current row is `position - 1`.
    position: usize,
}

impl MemoryCursor {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemoryCursor {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            position: 0,
        }
    }

    /// Appends a row. Missing trailing cells read as null; extra cells are
    /// dropped.
    pub fn row<I>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut row: Vec<Value> = cells.into_iter().take(self.columns.len()).collect();
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn current(&self) -> Result<&[Value]> {
        self.position
            .checked_sub(1)
            .and_then(|p| self.rows.get(p))
            .map(Vec::as_slice)
            .ok_or(MapError::NoCurrentRow)
    }
}

impl RowCursor for MemoryCursor {
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
        let count = self.columns.len();
        self.current()?
            .get(index)
            .cloned()
            .ok_or(MapError::ColumnOutOfRange { index, count })
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
