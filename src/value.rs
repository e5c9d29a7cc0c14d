//! Dynamic value representation.
//!
//! [`Value`] is the object graph a serializer walks: scalars, enum values,
//! class references, arrays, collections, maps and typed objects. Every
//! [`Object`] carries the [`TypeInfo`] it was built from, so its fields can be
//! filtered with the field filter and read with
//! [`field_value`](crate::field_value).
//!
//! ## Examples
//!
//! ```rust
//! use refjson::{to_value, Value, ValueKind};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! enum Role { Admin }
//!
//! #[derive(Serialize)]
//! struct User { name: String, role: Role, tags: Vec<String> }
//!
//! let user = to_value(&User {
//!     name: "Alice".to_string(),
//!     role: Role::Admin,
//!     tags: vec!["ops".to_string()],
//! })
//! .unwrap();
//!
//! assert_eq!(user.kind(), ValueKind::Composite);
//! let object = user.as_object().unwrap();
//! assert_eq!(object.type_info().name(), "User");
//! assert_eq!(object.get("role").unwrap().kind(), ValueKind::Enum);
//! assert_eq!(object.get("tags").unwrap().kind(), ValueKind::CollectionOrArray);
//! ```

use crate::classify::{classify, ValueKind};
use crate::map::FieldMap;
use crate::types::{any_type, null_type, TypeInfo, Typed};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A dynamically-typed value in an object graph.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    Number(Number),
    String(String),
    Enum(EnumValue),
    /// A reference to a type, written as the type's name
    ClassRef(Arc<TypeInfo>),
    /// A fixed-size sequence
    Array(Vec<Value>),
    /// A growable grouping of elements (list, set, queue)
    Collection(Vec<Value>),
    Map(FieldMap),
    Object(Object),
}

/// A numeric value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    /// Unsigned values that do not fit in `i64`
    Unsigned(u64),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::Unsigned(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Returns the value as `i64` if it is an integer that fits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use refjson::Number;
    ///
    /// assert_eq!(Number::Integer(42).as_i64(), Some(42));
    /// assert_eq!(Number::Unsigned(u64::MAX).as_i64(), None);
    /// assert_eq!(Number::Float(1.5).as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Integer(i) => Some(i),
            Number::Unsigned(u) => i64::try_from(u).ok(),
            Number::Float(_) => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Unsigned(u) => u as f64,
            Number::Float(f) => f,
        }
    }

    /// Returns `false` for NaN and the infinities, which JSON cannot represent.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match *self {
            Number::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    fn type_info(&self) -> Arc<TypeInfo> {
        match self {
            Number::Integer(_) => i64::type_info(),
            Number::Unsigned(_) => u64::type_info(),
            Number::Float(_) => f64::type_info(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Unsigned(u) => write!(f, "{}", u),
            Number::Float(fl) => write!(f, "{}", fl),
        }
    }
}

macro_rules! impl_number_from {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::$variant(value.into())
                }
            }
        )*
    };
}

impl_number_from!(Integer: i8, i16, i32, i64, u8, u16, u32);
impl_number_from!(Float: f32, f64);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Number::Integer(i),
            Err(_) => Number::Unsigned(value),
        }
    }
}

/// A value of an enumeration.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    type_info: Arc<TypeInfo>,
    variant: Cow<'static, str>,
}

impl EnumValue {
    pub fn new(type_info: Arc<TypeInfo>, variant: impl Into<Cow<'static, str>>) -> Self {
        EnumValue {
            type_info,
            variant: variant.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.type_info
    }

    #[inline]
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }
}

/// An instance of a composite type.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    type_info: Arc<TypeInfo>,
    fields: FieldMap,
}

impl Object {
    pub fn new(type_info: Arc<TypeInfo>, fields: FieldMap) -> Self {
        Object { type_info, fields }
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.type_info
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Value {
    /// Returns the serialization category of this value. `Null` is a scalar.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        classify(self)
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Returns the elements of an array or collection.
    #[must_use]
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::Collection(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the type this value is an instance of.
    ///
    /// Arrays, collections and maps have no precise element type and report
    /// generic descriptors.
    #[must_use]
    pub fn runtime_type(&self) -> Arc<TypeInfo> {
        match self {
            Value::Null => null_type(),
            Value::Bool(_) => bool::type_info(),
            Value::Char(_) => char::type_info(),
            Value::Number(n) => n.type_info(),
            Value::String(_) => String::type_info(),
            Value::Enum(e) => e.type_info.clone(),
            Value::ClassRef(_) => TypeInfo::type_info(),
            Value::Array(_) => <[Value]>::type_info(),
            Value::Collection(_) => Vec::<Value>::type_info(),
            Value::Map(_) => std::collections::HashMap::<String, Value>::type_info(),
            Value::Object(object) => object.type_info.clone(),
        }
    }

    /// Returns the name of [`Value::runtime_type`].
    #[must_use]
    pub fn type_name(&self) -> String {
        self.runtime_type().name().to_string()
    }
}

// Dynamic values have no static type of their own.
impl Typed for Value {
    fn type_info() -> Arc<TypeInfo> {
        any_type()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Enum(e) => write!(f, "{}", e.variant),
            Value::ClassRef(info) => write!(f, "{}", info.name()),
            Value::Array(items) | Value::Collection(items) => {
                write!(
                    f,
                    "[{}]",
                    items
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                )
            }
            Value::Map(_) => write!(f, "{{map}}"),
            Value::Object(object) => write!(f, "{{{}}}", object.type_info.name()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Unsigned(u)) => serializer.serialize_u64(*u),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Enum(e) => serializer.serialize_str(&e.variant),
            Value::ClassRef(info) => serializer.serialize_str(info.name()),
            Value::Array(items) | Value::Collection(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(fields) | Value::Object(Object { fields, .. }) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

macro_rules! impl_value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Collection(values.into_iter().map(Into::into).collect())
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Enum(value)
    }
}
