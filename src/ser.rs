//! Bridging serde types into the descriptor model.
//!
//! [`ValueSerializer`] turns any `T: Serialize` into a [`Value`] graph. It is
//! the derivation step for types that have no hand-written [`TypeInfo`]: each
//! struct becomes an [`Object`] whose type is a composite named after the
//! struct, with one public field per serialized field.
//!
//! | serde shape | Value |
//! |-------------|-------|
//! | bool, integers, floats, char, str | scalar |
//! | `None`, `()` | `Null` |
//! | unit variant | `Enum` |
//! | seq | `Collection` |
//! | tuple, tuple struct, bytes | `Array` |
//! | map | `Map` |
//! | struct, unit struct | `Object` |
//! | newtype, tuple and struct variants | `Object` with a single field named after the variant |
//!
//! A derived field is typed by the Rust type it was serialized from when that
//! type is a scalar, so an `i32` field is an `i32` field even though its value
//! is stored as a 64-bit [`Number`]. Absent optionals are typed as `null`,
//! which is basic like every other scalar. Other fields are typed by their value.
//!
//! 128-bit integers are accepted while they fit in 64 bits.
//!
//! [`write_basic_value`] writes a basic value as one JSON token.
//!
//! ## Examples
//!
//! ```rust
//! use refjson::{to_value, write_basic_value, Value};
//!
//! let value = to_value(&"tab\there").unwrap();
//! let mut buf = String::new();
//! write_basic_value(&value, &mut buf).unwrap();
//! assert_eq!(buf, r#""tab\there""#);
//! ```

use crate::escape::escape_json_string_into;
use crate::field::{FieldDescriptor, Modifiers};
use crate::map::FieldMap;
use crate::types::{null_type, TypeDescriptor, TypeInfo, Typed};
use crate::value::{EnumValue, Number, Object, Value};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{ser, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

/// Serializer producing a [`Value`].
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    collection: bool,
    variant: Option<(&'static str, &'static str)>,
}

pub struct SerializeMap {
    map: FieldMap,
    current_key: Option<String>,
}

pub struct SerializeStruct {
    name: &'static str,
    variant: Option<&'static str>,
    fields: FieldMap,
    declared: IndexMap<String, Arc<TypeInfo>>,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStruct;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        if let Ok(i) = i64::try_from(v) {
            return Ok(Value::Number(Number::Integer(i)));
        }
        u64::try_from(v)
            .map(|u| Value::Number(Number::Unsigned(u)))
            .map_err(|_| Error::type_mismatch("integer within 64 bits", "i128"))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        u64::try_from(v)
            .map(|u| Value::Number(Number::from(u)))
            .map_err(|_| Error::type_mismatch("integer within 64 bits", "u128"))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let vec = v.iter().map(|&b| Value::Number(Number::from(b))).collect();
        Ok(Value::Array(vec))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Ok(derive_object(Cow::Borrowed(name), FieldMap::new(), &IndexMap::new()))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        let info = Arc::new(TypeInfo::enumeration(name, [variant]));
        Ok(Value::Enum(EnumValue::new(info, variant)))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(wrap_variant(name, variant, to_value(value)?, declared_type(value)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), true, None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, false, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, false, None))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, false, Some((name, variant))))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            map: FieldMap::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            name,
            variant: None,
            fields: FieldMap::with_capacity(len),
            declared: IndexMap::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            name,
            variant: Some(variant),
            fields: FieldMap::with_capacity(len),
            declared: IndexMap::with_capacity(len),
        })
    }
}

impl SerializeVec {
    fn new(len: usize, collection: bool, variant: Option<(&'static str, &'static str)>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len),
            collection,
            variant,
        }
    }

    fn finish(self) -> Value {
        let value = if self.collection {
            Value::Collection(self.vec)
        } else {
            Value::Array(self.vec)
        };
        match self.variant {
            Some((name, variant)) => wrap_variant(name, variant, value, None),
            None => value,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match to_value(key)? {
            Value::String(s) => s,
            Value::Char(c) => c.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Enum(e) => e.variant().to_string(),
            _ => return Err(Error::KeyMustBeString),
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Map(self.map))
    }
}

impl SerializeStruct {
    fn push_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.insert(key.to_string(), to_value(value)?);
        match declared_type(value) {
            Some(ty) => self.declared.insert(key.to_string(), ty),
            None => self.declared.shift_remove(key),
        };
        Ok(())
    }

    fn finish(self) -> Value {
        match self.variant {
            Some(variant) => {
                let inner = derive_object(
                    Cow::Owned(format!("{}::{}", self.name, variant)),
                    self.fields,
                    &self.declared,
                );
                wrap_variant(self.name, variant, inner, None)
            }
            None => derive_object(Cow::Borrowed(self.name), self.fields, &self.declared),
        }
    }
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push_field(key, value)
    }

    fn skip_field(&mut self, _key: &'static str) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeStruct {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push_field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

/// Converts any `T: Serialize` into a [`Value`].
///
/// # Errors
///
/// Returns an error if the value's `Serialize` impl fails or a map key does
/// not serialize as a string, character, number or unit variant.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Builds an object of a composite type derived from its serialized fields.
///
/// Fields missing from `declared` are typed by their value.
fn derive_object(
    name: Cow<'static, str>,
    fields: FieldMap,
    declared: &IndexMap<String, Arc<TypeInfo>>,
) -> Value {
    let descriptors = fields
        .iter()
        .map(|(key, value)| {
            let ty = declared
                .get(key.as_str())
                .cloned()
                .unwrap_or_else(|| value.runtime_type());
            FieldDescriptor::new(key.clone(), TypeDescriptor::Class(ty))
                .with_modifiers(Modifiers::PUBLIC)
        })
        .collect();
    let info = Arc::new(TypeInfo::composite(name, descriptors));
    Value::Object(Object::new(info, fields))
}

fn wrap_variant(
    name: &'static str,
    variant: &'static str,
    inner: Value,
    declared: Option<Arc<TypeInfo>>,
) -> Value {
    let mut fields = FieldMap::with_capacity(1);
    fields.insert(variant.to_string(), inner);
    let declared = declared
        .map(|ty| IndexMap::from([(variant.to_string(), ty)]))
        .unwrap_or_default();
    derive_object(Cow::Borrowed(name), fields, &declared)
}

/// Returns the scalar type `value` serializes as, or `None` if only its
/// value can tell.
fn declared_type<T>(value: &T) -> Option<Arc<TypeInfo>>
where
    T: ?Sized + Serialize,
{
    value.serialize(DeclaredType).ok()
}

/// Serializer reporting the static type of a scalar; it refuses everything else.
struct DeclaredType;

type NoCompound = ser::Impossible<Arc<TypeInfo>, Error>;

fn value_typed<T>() -> Result<T> {
    Err(Error::custom("type is only known from the value"))
}

macro_rules! declare_scalar {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<Arc<TypeInfo>> {
                Ok(<$ty>::type_info())
            }
        )*
    };
}

impl ser::Serializer for DeclaredType {
    type Ok = Arc<TypeInfo>;
    type Error = Error;

    type SerializeSeq = NoCompound;
    type SerializeTuple = NoCompound;
    type SerializeTupleStruct = NoCompound;
    type SerializeTupleVariant = NoCompound;
    type SerializeMap = NoCompound;
    type SerializeStruct = NoCompound;
    type SerializeStructVariant = NoCompound;

    declare_scalar! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
    }

    fn serialize_str(self, _v: &str) -> Result<Arc<TypeInfo>> {
        Ok(String::type_info())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Arc<TypeInfo>> {
        Ok(<[u8]>::type_info())
    }

    fn serialize_none(self) -> Result<Arc<TypeInfo>> {
        Ok(null_type())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Arc<TypeInfo>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Arc<TypeInfo>> {
        Ok(null_type())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Arc<TypeInfo>> {
        value_typed()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Arc<TypeInfo>> {
        value_typed()
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Arc<TypeInfo>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Arc<TypeInfo>>
    where
        T: ?Sized + Serialize,
    {
        value_typed()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<NoCompound> {
        value_typed()
    }

    fn serialize_tuple(self, _len: usize) -> Result<NoCompound> {
        value_typed()
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<NoCompound> {
        value_typed()
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<NoCompound> {
        value_typed()
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<NoCompound> {
        value_typed()
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<NoCompound> {
        value_typed()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<NoCompound> {
        value_typed()
    }
}

/// Appends `s` to `buf` as a quoted, escaped JSON string.
pub fn write_quoted(s: &str, buf: &mut String) {
    buf.push('"');
    escape_json_string_into(s, buf);
    buf.push('"');
}

/// Appends a basic value to `buf` as a single JSON token.
///
/// Non-finite floats are written as `null`. Enum values are written as their
/// variant name and class references as the type name, both quoted.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] for arrays, collections, maps and objects.
pub fn write_basic_value(value: &Value, buf: &mut String) -> Result<()> {
    match value {
        Value::Null => buf.push_str("null"),
        Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) if !n.is_finite() => buf.push_str("null"),
        Value::Number(n) => buf.push_str(&n.to_string()),
        Value::Char(c) => write_quoted(c.encode_utf8(&mut [0u8; 4]), buf),
        Value::String(s) => write_quoted(s, buf),
        Value::Enum(e) => write_quoted(e.variant(), buf),
        Value::ClassRef(info) => write_quoted(info.name(), buf),
        other => {
            return Err(Error::type_mismatch(
                "basic value",
                &other.kind().to_string(),
            ))
        }
    }
    Ok(())
}
