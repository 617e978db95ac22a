//! Bindable values shared by predicates, compiled expressions and rows.

#[cfg(feature = "rusqlite")]
mod rusqlite;

use crate::error::{CruditeError, Result};
use chrono::NaiveDateTime;
use std::fmt;
use uuid::Uuid;

/// Text layout used for date-times, both when binding and when interpolating.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Represents a value that can be bound to a statement or rendered as a literal.
#[derive(Debug, Clone, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// NULL value
    #[default]
    Null,
    Bool(bool),
    /// Integer value (i64); enums are stored as their discriminant
    Integer(i64),
    Real(f64),
    Text(String),
    Char(char),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    Blob(Vec<u8>),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Values that render single-quoted when interpolated into SQL text.
    #[inline]
    pub const fn is_text_like(&self) -> bool {
        matches!(
            self,
            Value::Text(_) | Value::Char(_) | Value::DateTime(_) | Value::Uuid(_)
        )
    }

    /// True when a key column holds no caller-supplied value yet.
    pub fn is_unset_key(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Uuid(id) => id.is_nil(),
            _ => false,
        }
    }

    /// Renders this value as a SQL literal.
    ///
    /// Text-like values are wrapped in single quotes without escaping; callers
    /// on literal-interpolating paths own the trust boundary. Non-finite reals
    /// render as `null`.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Real(r) if !r.is_finite() => "null".to_string(),
            Value::Blob(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2 + 3);
                out.push_str("X'");
                for byte in bytes {
                    out.push_str(&format!("{byte:02X}"));
                }
                out.push('\'');
                out
            }
            v if v.is_text_like() => format!("'{v}'"),
            v => v.to_string(),
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Char(_) => "char",
            Value::DateTime(_) => "datetime",
            Value::Uuid(_) => "uuid",
            Value::Blob(_) => "blob",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Real(r) if r.fract() == 0.0 => Some(*r as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Converts into a field type; shorthand for [`FromValue::from_value`].
    #[inline]
    pub fn convert<T: FromValue>(self) -> Result<T> {
        T::from_value(self)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Char(c) => write!(f, "{c}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::Uuid(id) => write!(f, "{}", id.hyphenated()),
            Value::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

//------------------------------------------------------------------------------
// Conversions into Value
//------------------------------------------------------------------------------

macro_rules! integer_into_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_into_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

//------------------------------------------------------------------------------
// Conversions out of Value
//------------------------------------------------------------------------------

/// Conversion from a row or predicate value into a field type.
///
/// Conversions are lenient where backends store one type as another
/// (SQLite keeps booleans as integers and uuids/date-times as text).
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T> {
    Err(CruditeError::Mapping(format!(
        "cannot convert {} value `{value}` into {expected}",
        value.type_name()
    )))
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value.as_i64() {
            Some(i) => Ok(i),
            None => mismatch("i64", &value),
        }
    }
}

macro_rules! narrow_integer_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value.as_i64().map(<$ty>::try_from) {
                        Some(Ok(v)) => Ok(v),
                        _ => mismatch(stringify!($ty), &value),
                    }
                }
            }
        )*
    };
}

narrow_integer_from_value!(i8, i16, i32, u8, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(r) => Ok(r),
            Value::Integer(i) => Ok(i as f64),
            Value::Text(ref s) => s.trim().parse().or_else(|_| mismatch("f64", &value)),
            other => mismatch("f64", &other),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Integer(i) => Ok(i != 0),
            other => mismatch("bool", &other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null | Value::Blob(_) => mismatch("String", &value),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(c) => Ok(c),
            Value::Text(ref s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => mismatch("char", &value),
                }
            }
            other => mismatch("char", &other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Text(ref s) => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
                .or_else(|_| mismatch("NaiveDateTime", &value)),
            other => mismatch("NaiveDateTime", &other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(id) => Ok(id),
            Value::Text(ref s) => Uuid::parse_str(s).or_else(|_| mismatch("Uuid", &value)),
            Value::Blob(ref b) => Uuid::from_slice(b).or_else(|_| mismatch("Uuid", &value)),
            other => mismatch("Uuid", &other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => mismatch("Vec<u8>", &other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn literal_rendering_quotes_text_like_values() {
        assert_eq!(Value::from(18).to_literal(), "18");
        assert_eq!(Value::from(2.5).to_literal(), "2.5");
        assert_eq!(Value::from(true).to_literal(), "1");
        assert_eq!(Value::from("bob").to_literal(), "'bob'");
        assert_eq!(Value::from('x').to_literal(), "'x'");
        assert_eq!(Value::Null.to_literal(), "null");
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_literal(), "X'DEAD'");
        assert_eq!(Value::Real(f64::NAN).to_literal(), "null");
        assert_eq!(Value::Real(f64::NEG_INFINITY).to_literal(), "null");

        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(Value::from(dt).to_literal(), "'2024-03-01 08:30:00'");
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn unset_key_detection() {
        assert!(Value::Null.is_unset_key());
        assert!(Value::Uuid(Uuid::nil()).is_unset_key());
        assert!(!Value::Uuid(Uuid::new_v4()).is_unset_key());
        assert!(!Value::Integer(0).is_unset_key());
    }

    #[test]
    fn lenient_conversions_from_stored_forms() {
        assert!(bool::from_value(Value::Integer(1)).unwrap());
        assert_eq!(i32::from_value(Value::Integer(7)).unwrap(), 7);
        assert_eq!(f64::from_value(Value::Integer(3)).unwrap(), 3.0);

        let id = Uuid::new_v4();
        let parsed = Uuid::from_value(Value::Text(id.to_string())).unwrap();
        assert_eq!(parsed, id);

        let dt = NaiveDateTime::from_value(Value::Text("2024-03-01 08:30:00".into())).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-01 08:30:00");

        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
    }

    #[test]
    fn conversion_mismatch_is_a_mapping_error() {
        let err = i32::from_value(Value::Text("abc".into())).unwrap_err();
        assert!(matches!(err, CruditeError::Mapping(_)));

        let err = u8::from_value(Value::Integer(300)).unwrap_err();
        assert!(matches!(err, CruditeError::Mapping(_)));
    }
}
