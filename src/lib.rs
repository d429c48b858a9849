//! Maps tabular query rows onto strongly-typed records.
//!
//! Columns are matched to fields by lower-cased name, with an optional
//! `#[rowbind(column = "...")]` override. Null cells become zero values for
//! plain fields and `None` for `Option` fields.
//!
//! ```
//! use rowbind::{CursorExt, MemoryCursor, Record, Value};
//!
//! #[derive(Debug, Default, PartialEq, Record)]
//! struct Payment {
//!     id: i32,
//!     name: Option<String>,
//!     #[rowbind(column = "amt")]
//!     amount: f64,
//! }
//!
//! let mut cursor = MemoryCursor::new(["ID", "name", "amt"])
//!     .row([Value::from(5), Value::Null, Value::Null]);
//! let payments: Vec<Payment> = cursor.to_list().unwrap().unwrap();
//! assert_eq!(payments, vec![Payment { id: 5, name: None, amount: 0.0 }]);
//! ```
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global switch for per-cell mapping logs
static DISPLAY_LOGS: Lazy<AtomicBool> = Lazy::new(|| AtomicBool::new(false));

/// Enable or disable per-cell debug logs
pub fn set_display_logs(enabled: bool) {
    DISPLAY_LOGS.store(enabled, Ordering::Relaxed);
}

/// Whether per-cell debug logs are enabled
#[doc(hidden)]
pub fn display_logs() -> bool {
    DISPLAY_LOGS.load(Ordering::Relaxed)
}

/// Internal debug: logs only if DISPLAY_LOGS is true
macro_rules! mdebug {
    ($($arg:tt)+) => {
        if $crate::display_logs() {
            log::debug!($($arg)+);
        }
    }
}

pub mod cache;
pub mod cursor;
pub mod error;
pub mod mapper;
pub mod record;
pub mod settings;
pub mod sqlite;
pub mod value;

pub use cache::{MappingCache, TypeMapping};
pub use cursor::{MemoryCursor, RowCursor};
pub use error::{MapError, Result};
pub use mapper::{CursorExt, RowMapper};
pub use record::{FieldDescriptor, Record, Registration};
pub use rowbind_derive::Record;
pub use settings::Settings;
pub use sqlite::SqliteCursor;
pub use value::{ColumnValue, NullPolicy, Value};

#[doc(hidden)]
pub use inventory;

inventory::collect!(crate::record::Registration);
