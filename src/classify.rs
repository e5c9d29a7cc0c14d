//! Classifying values and types for serialization.
//!
//! Every value falls in exactly one [`ValueKind`]. Scalars, enum values and
//! class references are *basic*: a serializer writes them as a single JSON
//! token. Arrays and collections become JSON arrays; everything else, maps
//! included, is a composite that is written field by field.
//!
//! ## Examples
//!
//! ```rust
//! use refjson::{is_basic_type, is_basic_value, is_collection_or_array, raw_type, TypeDescriptor, Typed, Value};
//!
//! assert!(is_basic_value(None));
//! assert!(is_basic_value(Some(&Value::from("text"))));
//! assert!(is_collection_or_array(&Value::Collection(Vec::new())));
//!
//! assert!(is_basic_type(Some(&u16::type_descriptor())));
//! assert!(!is_basic_type(Some(&Vec::<u16>::type_descriptor())));
//! assert!(!is_basic_type(None));
//!
//! assert_eq!(raw_type(&Vec::<u16>::type_descriptor()).unwrap().name(), "Vec");
//! assert!(raw_type(&TypeDescriptor::wildcard()).is_err());
//! ```

use crate::types::{TypeDescriptor, TypeInfo, Typed};
use crate::value::Value;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Serialization category of a value or type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Text, numbers, booleans and characters
    Scalar,
    Enum,
    ClassRef,
    CollectionOrArray,
    /// Objects and maps
    Composite,
}

impl ValueKind {
    /// Returns `true` for the kinds written as a single JSON token.
    #[inline]
    #[must_use]
    pub const fn is_basic(self) -> bool {
        matches!(self, ValueKind::Scalar | ValueKind::Enum | ValueKind::ClassRef)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Scalar => f.pad("Scalar"),
            ValueKind::Enum => f.pad("Enum"),
            ValueKind::ClassRef => f.pad("ClassRef"),
            ValueKind::CollectionOrArray => f.pad("CollectionOrArray"),
            ValueKind::Composite => f.pad("Composite"),
        }
    }
}

/// Returns the category of `value`. `Null` counts as a scalar.
#[must_use]
pub fn classify(value: &Value) -> ValueKind {
    match value {
        Value::Null | Value::Bool(_) | Value::Char(_) | Value::Number(_) | Value::String(_) => {
            ValueKind::Scalar
        }
        Value::Enum(_) => ValueKind::Enum,
        Value::ClassRef(_) => ValueKind::ClassRef,
        Value::Array(_) | Value::Collection(_) => ValueKind::CollectionOrArray,
        Value::Map(_) | Value::Object(_) => ValueKind::Composite,
    }
}

/// Returns `true` if `value` is absent, null, or of a basic value type.
#[must_use]
pub fn is_basic_value(value: Option<&Value>) -> bool {
    value.map_or(true, |value| classify(value).is_basic())
}

/// Returns `true` if `ty` is a basic value type.
///
/// Parameterized types are judged by their raw type. Type variables,
/// wildcards, generic arrays and an absent type are not basic.
#[must_use]
pub fn is_basic_type(ty: Option<&TypeDescriptor>) -> bool {
    match ty {
        Some(TypeDescriptor::Class(info)) => info.is_basic(),
        Some(TypeDescriptor::Parameterized { raw, .. }) => raw.is_basic(),
        _ => false,
    }
}

/// Returns `true` if `T` is a basic value type.
#[must_use]
pub fn is_basic<T: Typed + ?Sized>() -> bool {
    is_basic_type(Some(&T::type_descriptor()))
}

/// Returns `true` if `value` is an array or a collection of any element type.
#[inline]
#[must_use]
pub fn is_collection_or_array(value: &Value) -> bool {
    classify(value) == ValueKind::CollectionOrArray
}

/// Returns the raw (erased) type of `ty`.
///
/// # Errors
///
/// Returns [`Error::InvalidTypeKind`] for type variables, wildcards and
/// generic arrays.
pub fn raw_type(ty: &TypeDescriptor) -> Result<Arc<TypeInfo>> {
    match ty {
        TypeDescriptor::Class(info) => Ok(info.clone()),
        TypeDescriptor::Parameterized { raw, .. } => Ok(raw.clone()),
        other => Err(Error::invalid_type_kind(other)),
    }
}
