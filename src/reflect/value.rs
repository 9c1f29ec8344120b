//! Dynamic field values and the conversions between them.
//!
//! Every reflected field is read as a [`Value`] and written from one. When the
//! kind of an incoming value differs from the field's declared [`Kind`], the
//! value is coerced: text is parsed, integers widen to floats, whole floats
//! narrow to integers, dates widen to midnight date-times, and any scalar can
//! be rendered as text.

use std::any::type_name;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use super::CoercionError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The storage class of a non-null [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Text,
    Uuid,
    Date,
    DateTime,
    Bytes,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "integer",
            Kind::Float => "float",
            Kind::Text => "text",
            Kind::Uuid => "uuid",
            Kind::Date => "date",
            Kind::DateTime => "date-time",
            Kind::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

/// Declared type of a reflected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    kind: Kind,
    nullable: bool,
    rust_type: &'static str,
}

impl FieldType {
    /// A non-nullable field of Rust type `T` stored as `kind`.
    pub fn required<T>(kind: Kind) -> Self {
        Self {
            kind,
            nullable: false,
            rust_type: type_name::<T>(),
        }
    }

    /// The same storage kind, but accepting [`Value::Null`].
    pub fn nullable<T>(self) -> Self {
        Self {
            nullable: true,
            rust_type: type_name::<T>(),
            ..self
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Full Rust type name of the field, e.g. `core::option::Option<i32>`.
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    /// Converts `value` to this field's kind. `Null` is only accepted by
    /// nullable fields.
    pub fn coerce(&self, value: Value) -> Result<Value, CoercionError> {
        if self.nullable {
            value.coerce(self.kind)
        } else {
            require(value, self.kind)
        }
    }
}

/// A dynamically typed field value.
///
/// `Null` stands for an absent `Option`. Serializes untagged, so a map of
/// values renders as plain JSON/TOML-like data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Storage kind, or `None` for [`Value::Null`].
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(Kind::Bool),
            Value::Int(_) => Some(Kind::Int),
            Value::Float(_) => Some(Kind::Float),
            Value::Text(_) => Some(Kind::Text),
            Value::Uuid(_) => Some(Kind::Uuid),
            Value::Date(_) => Some(Kind::Date),
            Value::DateTime(_) => Some(Kind::DateTime),
            Value::Bytes(_) => Some(Kind::Bytes),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Parses `text` into a value of the given kind.
    pub fn parse_as(text: &str, kind: Kind) -> Result<Value, CoercionError> {
        let fail = |reason: &str| Err(CoercionError::new(format!("{text:?}"), kind, reason));
        let trimmed = text.trim();

        match kind {
            Kind::Text => Ok(Value::Text(text.to_string())),
            Kind::Bytes => Ok(Value::Bytes(text.as_bytes().to_vec())),
            Kind::Bool => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    fail("expected `true` or `false`")
                }
            }
            Kind::Int => match trimmed.parse::<i64>() {
                Ok(i) => Ok(Value::Int(i)),
                Err(e) => fail(&e.to_string()),
            },
            Kind::Float => match trimmed.parse::<f64>() {
                Ok(f) => Ok(Value::Float(f)),
                Err(e) => fail(&e.to_string()),
            },
            Kind::Uuid => match Uuid::parse_str(trimmed) {
                Ok(id) => Ok(Value::Uuid(id)),
                Err(e) => fail(&e.to_string()),
            },
            Kind::Date => match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
                Ok(date) => Ok(Value::Date(date)),
                Err(e) => fail(&e.to_string()),
            },
            Kind::DateTime => match parse_date_time(trimmed) {
                Some(dt) => Ok(Value::DateTime(dt)),
                None => fail("unrecognized date-time format"),
            },
        }
    }

    /// Converts this value to `kind`. `Null` passes through unchanged.
    pub fn coerce(self, kind: Kind) -> Result<Value, CoercionError> {
        match self.kind() {
            None => return Ok(self),
            Some(own) if own == kind => return Ok(self),
            Some(_) => {}
        }

        match (self, kind) {
            (Value::Text(s), kind) => Value::parse_as(&s, kind),
            (Value::Int(i), Kind::Float) => Ok(Value::Float(i as f64)),
            (Value::Float(f), Kind::Int) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Ok(Value::Int(f as i64))
                } else {
                    Err(CoercionError::new(f.to_string(), kind, "not a whole number"))
                }
            }
            (Value::Date(d), Kind::DateTime) => d
                .and_hms_opt(0, 0, 0)
                .map(Value::DateTime)
                .ok_or_else(|| CoercionError::new(d.to_string(), kind, "no midnight")),
            (Value::DateTime(dt), Kind::Date) => Ok(Value::Date(dt.date())),
            (Value::Bytes(bytes), Kind::Text) => String::from_utf8(bytes)
                .map(Value::Text)
                .map_err(|e| CoercionError::new("<bytes>", kind, e.to_string())),
            (other, Kind::Text) => Ok(Value::Text(other.to_string())),
            (other, kind) => Err(CoercionError::new(
                format!("{other:?}"),
                kind,
                "no conversion available",
            )),
        }
    }
}

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Renders the value as text; `Null` renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Uuid(id) => write!(f, "{id}"),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMATS[0])),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

/// Conversion between a concrete field type and [`Value`].
///
/// Implemented for the scalar types the [`reflect!`](crate::reflect!) macro
/// accepts, and for `Option<T>` of each of them.
pub trait FieldValue: Sized {
    fn field_type() -> FieldType;

    fn to_value(&self) -> Value;

    /// Builds the field value, coercing `value` to this type's kind first.
    fn from_value(value: Value) -> Result<Self, CoercionError>;
}

/// Coerces a value that must not be null.
fn require(value: Value, kind: Kind) -> Result<Value, CoercionError> {
    if value.is_null() {
        return Err(CoercionError::new(
            "null",
            kind,
            "field is not nullable",
        ));
    }
    value.coerce(kind)
}

fn mismatch(value: Value, kind: Kind) -> CoercionError {
    CoercionError::new(format!("{value:?}"), kind, "unexpected kind after coercion")
}

macro_rules! int_field_value {
    ($($t:ty),* $(,)?) => {$(
        impl FieldValue for $t {
            fn field_type() -> FieldType {
                FieldType::required::<$t>(Kind::Int)
            }

            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }

            fn from_value(value: Value) -> Result<Self, CoercionError> {
                match require(value, Kind::Int)? {
                    Value::Int(i) => <$t>::try_from(i).map_err(|_| {
                        CoercionError::new(
                            i.to_string(),
                            Kind::Int,
                            concat!("out of range for ", stringify!($t)),
                        )
                    }),
                    other => Err(mismatch(other, Kind::Int)),
                }
            }
        }
    )*};
}

int_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl FieldValue for f64 {
    fn field_type() -> FieldType {
        FieldType::required::<f64>(Kind::Float)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match require(value, Kind::Float)? {
            Value::Float(f) => Ok(f),
            other => Err(mismatch(other, Kind::Float)),
        }
    }
}

impl FieldValue for f32 {
    fn field_type() -> FieldType {
        FieldType::required::<f32>(Kind::Float)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

/// Implements [`FieldValue`] for a type stored under a single `Value` variant.
macro_rules! variant_field_value {
    ($t:ty, $kind:ident, $variant:ident) => {
        impl FieldValue for $t {
            fn field_type() -> FieldType {
                FieldType::required::<$t>(Kind::$kind)
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Result<Self, CoercionError> {
                match require(value, Kind::$kind)? {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(mismatch(other, Kind::$kind)),
                }
            }
        }
    };
}

variant_field_value!(bool, Bool, Bool);
variant_field_value!(String, Text, Text);
variant_field_value!(Uuid, Uuid, Uuid);
variant_field_value!(NaiveDate, Date, Date);
variant_field_value!(NaiveDateTime, DateTime, DateTime);
variant_field_value!(Vec<u8>, Bytes, Bytes);

impl<T: FieldValue> FieldValue for Option<T> {
    fn field_type() -> FieldType {
        T::field_type().nullable::<Option<T>>()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Value::Uuid(id)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_strings() {
        assert_eq!(Value::parse_as("7", Kind::Int).unwrap(), Value::Int(7));
        assert_eq!(Value::parse_as(" -12 ", Kind::Int).unwrap(), Value::Int(-12));
        assert_eq!(
            Value::parse_as("2.5", Kind::Float).unwrap(),
            Value::Float(2.5)
        );
        assert!(Value::parse_as("seven", Kind::Int).is_err());
    }

    #[test]
    fn test_parse_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            Value::parse_as("2024-03-01", Kind::Date).unwrap(),
            Value::Date(date)
        );

        let expected = date.and_hms_opt(10, 30, 0).unwrap();
        for text in [
            "2024-03-01T10:30:00",
            "2024-03-01 10:30:00",
            "2024-03-01T10:30:00Z",
            "2024-03-01T12:30:00+02:00",
        ] {
            assert_eq!(
                Value::parse_as(text, Kind::DateTime).unwrap(),
                Value::DateTime(expected),
                "{text}"
            );
        }

        assert!(Value::parse_as("03/01/2024", Kind::Date).is_err());
    }

    #[test]
    fn test_parse_uuid_and_bool() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            Value::parse_as("67e55044-10b1-426f-9247-bb680e5fe0c8", Kind::Uuid).unwrap(),
            Value::Uuid(id)
        );
        assert_eq!(Value::parse_as("TRUE", Kind::Bool).unwrap(), Value::Bool(true));
        assert!(Value::parse_as("yes", Kind::Bool).is_err());
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(Value::Int(3).coerce(Kind::Float).unwrap(), Value::Float(3.0));
        assert_eq!(Value::Float(4.0).coerce(Kind::Int).unwrap(), Value::Int(4));
        assert!(Value::Float(4.5).coerce(Kind::Int).is_err());
        assert_eq!(
            Value::Int(42).coerce(Kind::Text).unwrap(),
            Value::Text("42".into())
        );
    }

    #[test]
    fn test_coerce_null_passes_through() {
        assert_eq!(Value::Null.coerce(Kind::Int).unwrap(), Value::Null);
    }

    #[test]
    fn test_coerce_incompatible_kinds() {
        let err = Value::Bool(true).coerce(Kind::Date).unwrap_err();
        assert_eq!(err.expected(), Kind::Date);
    }

    #[test]
    fn test_int_field_range_check() {
        assert_eq!(u8::from_value(Value::Int(200)).unwrap(), 200);
        assert!(u8::from_value(Value::Int(300)).is_err());
        assert_eq!(i32::from_value(Value::Text("7".into())).unwrap(), 7);
    }

    #[test]
    fn test_option_field_value() {
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Int(5)).unwrap(), Some(5));
        assert!(i32::from_value(Value::Null).is_err());

        let ty = Option::<String>::field_type();
        assert!(ty.is_nullable());
        assert_eq!(ty.kind(), Kind::Text);
    }

    #[test]
    fn test_field_type_coerce() {
        let required = i32::field_type();
        let optional = Option::<i32>::field_type();

        assert_eq!(required.coerce(Value::from("12")).unwrap(), Value::Int(12));
        assert!(required.coerce(Value::Null).is_err());
        assert_eq!(optional.coerce(Value::Null).unwrap(), Value::Null);
        assert!(optional.coerce(Value::from("twelve")).is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let dt = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        let rendered = Value::DateTime(dt).to_string();
        assert_eq!(
            Value::parse_as(&rendered, Kind::DateTime).unwrap(),
            Value::DateTime(dt)
        );
        assert_eq!(Value::Null.to_string(), "");
    }
}
