//! Cell values and the conversions used to assign them to record fields.
//!
//! A cursor hands out raw [`Value`]s. Each mappable field type implements
//! [`ColumnValue`], which decides which value kinds it accepts and what it
//! becomes when the cell is null.
use chrono::NaiveDateTime;
use std::fmt;

/// A raw cell read from a cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value kind, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    Vec<u8> => Bytes,
    NaiveDateTime => Timestamp,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// What a field receives when its cell is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// Non-nullable slot: zero, `false`, empty, or epoch.
    ZeroValue,
    /// `Option` slot: `None`.
    Absent,
}

/// A field type that can be assigned from a cursor cell.
///
/// `from_value` never sees [`Value::Null`] from the mapper; nulls go through
/// `null_value` instead. A rejected value is handed back so the caller can
/// report what it found.
pub trait ColumnValue: Sized {
    const TYPE_NAME: &'static str;
    const NULL_POLICY: NullPolicy;

    fn null_value() -> Self;

    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! integer_column {
    ($($ty:ty),*) => {
        $(
            impl ColumnValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);
                const NULL_POLICY: NullPolicy = NullPolicy::ZeroValue;

                fn null_value() -> Self {
                    0
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i).map_err(|_| Value::Int(i)),
                        Value::Null => Ok(Self::null_value()),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

integer_column!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ColumnValue for f64 {
    const TYPE_NAME: &'static str = "f64";
    const NULL_POLICY: NullPolicy = NullPolicy::ZeroValue;

    fn null_value() -> Self {
        0.0
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Null => Ok(Self::null_value()),
            other => Err(other),
        }
    }
}

/// Accepts a float only when narrowing loses nothing.
impl ColumnValue for f32 {
    const TYPE_NAME: &'static str = "f32";
    const NULL_POLICY: NullPolicy = NullPolicy::ZeroValue;

    fn null_value() -> Self {
        0.0
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(x) => {
                let narrowed = x as f32;
                if f64::from(narrowed) == x || x.is_nan() {
                    Ok(narrowed)
                } else {
                    Err(Value::Float(x))
                }
            }
            Value::Null => Ok(Self::null_value()),
            other => Err(other),
        }
    }
}

impl ColumnValue for bool {
    const TYPE_NAME: &'static str = "bool";
    const NULL_POLICY: NullPolicy = NullPolicy::ZeroValue;

    fn null_value() -> Self {
        false
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(Self::null_value()),
            other => Err(other),
        }
    }
}

impl ColumnValue for String {
    const TYPE_NAME: &'static str = "String";
    const NULL_POLICY: NullPolicy = NullPolicy::ZeroValue;

    fn null_value() -> Self {
        String::new()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null => Ok(Self::null_value()),
            other => Err(other),
        }
    }
}

impl ColumnValue for Vec<u8> {
    const TYPE_NAME: &'static str = "Vec<u8>";
    const NULL_POLICY: NullPolicy = NullPolicy::ZeroValue;

    fn null_value() -> Self {
        Vec::new()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Null => Ok(Self::null_value()),
            other => Err(other),
        }
    }
}

impl ColumnValue for NaiveDateTime {
    const TYPE_NAME: &'static str = "NaiveDateTime";
    const NULL_POLICY: NullPolicy = NullPolicy::ZeroValue;

    fn null_value() -> Self {
        NaiveDateTime::default()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            Value::Null => Ok(Self::null_value()),
            other => Err(other),
        }
    }
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const NULL_POLICY: NullPolicy = NullPolicy::Absent;

    fn null_value() -> Self {
        None
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_narrow_only_when_in_range() {
        assert_eq!(i32::from_value(Value::Int(42)), Ok(42));
        assert_eq!(u8::from_value(Value::Int(300)), Err(Value::Int(300)));
        assert_eq!(u32::from_value(Value::Int(-1)), Err(Value::Int(-1)));
    }

    #[test]
    fn test_small_and_pointer_sized_integers() {
        assert_eq!(i8::from_value(Value::Int(-128)), Ok(-128));
        assert_eq!(i8::from_value(Value::Int(128)), Err(Value::Int(128)));
        assert_eq!(usize::from_value(Value::Int(7)), Ok(7));
        assert_eq!(usize::from_value(Value::Int(-7)), Err(Value::Int(-7)));
        assert_eq!(isize::from_value(Value::Int(-7)), Ok(-7));
    }

    #[test]
    fn test_f32_requires_exact_narrowing() {
        assert_eq!(f32::from_value(Value::Float(1.5)), Ok(1.5));
        assert_eq!(f32::from_value(Value::Float(0.1)), Err(Value::Float(0.1)));
        assert!(f32::from_value(Value::Float(f64::NAN)).unwrap().is_nan());
        assert_eq!(f32::from_value(Value::Int(1)), Err(Value::Int(1)));
        assert_eq!(Value::from(0.5f32), Value::Float(0.5));
    }

    #[test]
    fn test_no_cross_kind_conversion() {
        assert_eq!(
            i64::from_value(Value::Text("5".into())),
            Err(Value::Text("5".into()))
        );
        assert_eq!(f64::from_value(Value::Int(5)), Err(Value::Int(5)));
        assert_eq!(bool::from_value(Value::Int(1)), Err(Value::Int(1)));
    }

    #[test]
    fn test_null_policies() {
        assert_eq!(<i32 as ColumnValue>::NULL_POLICY, NullPolicy::ZeroValue);
        assert_eq!(<String as ColumnValue>::NULL_POLICY, NullPolicy::ZeroValue);
        assert_eq!(<Option<i32> as ColumnValue>::NULL_POLICY, NullPolicy::Absent);
        assert_eq!(<Option<String>>::null_value(), None);
        assert_eq!(<f64 as ColumnValue>::null_value(), 0.0);
        assert!(!<bool as ColumnValue>::null_value());
    }

    #[test]
    fn test_option_wraps_inner_conversion() {
        assert_eq!(
            <Option<String>>::from_value(Value::Text("a".into())),
            Ok(Some("a".to_string()))
        );
        assert_eq!(
            <Option<i64>>::from_value(Value::Float(1.5)),
            Err(Value::Float(1.5))
        );
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }
}
