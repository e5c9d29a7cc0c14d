//! # refjson
//!
//! Support routines for a reference-aware JSON serializer: the building blocks
//! a graph-walking serializer calls to turn an arbitrary, possibly cyclic,
//! object graph into JSON text with back-reference markers.
//!
//! ## What is in the box?
//!
//! - **String escaping**: table-driven, with a fast path that copies text
//!   needing no escapes in one go ([`escape_json_string`])
//! - **Indentation**: cached indent strings composed for any depth ([`append_indent`])
//! - **Classification**: which values and types are basic tokens, arrays or
//!   collections, or composites ([`ValueKind`], [`is_basic_value`], [`raw_type`])
//! - **Field filtering**: which fields of a composite type to visit, unlocking
//!   restricted fields through the [`AccessResolver`] ([`field_is_serializable`])
//! - **Reference markers**: the `__ID` / `"[#id]"` vocabulary ([`markers`])
//!
//! Parsing JSON, walking object graphs and deciding which objects are shared
//! are left to the serializer built on top.
//!
//! ## Describing types
//!
//! Types are described ahead of time by a [`TypeInfo`]. Std scalars and
//! containers implement [`Typed`]; any `T: Serialize` can be turned into a
//! [`Value`] graph whose objects carry a derived `TypeInfo`:
//!
//! ```rust
//! use refjson::{field_value, to_value, SerializerConfig, Value, ValueKind};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     tags: Vec<String>,
//! }
//!
//! let user = to_value(&User {
//!     id: 7,
//!     name: "Alice \"Al\"".to_string(),
//!     tags: vec!["admin".to_string()],
//! })
//! .unwrap();
//!
//! let config = SerializerConfig::pretty();
//! let object = user.as_object().unwrap();
//! for field in config.serializable_fields(object.type_info()) {
//!     let value = field_value(&user, &field).unwrap();
//!     match value.kind() {
//!         ValueKind::CollectionOrArray => assert_eq!(field.name(), "tags"),
//!         kind => assert!(kind.is_basic()),
//!     }
//! }
//! ```
//!
//! ## Writing tokens
//!
//! ```rust
//! use refjson::{append_indent, escape_json_string, write_reference, ID_KEY};
//!
//! let mut out = String::from("{\n");
//! append_indent(1, 2, &mut out);
//! out.push_str(&format!("\"{}\": \"{}\",\n", ID_KEY, escape_json_string("a\tb")));
//! append_indent(1, 2, &mut out);
//! out.push_str("\"self\": ");
//! write_reference("1", &mut out);
//! out.push_str("\n}");
//!
//! assert_eq!(out, "{\n  \"__ID\": \"a\\tb\",\n  \"self\": \"[#1]\"\n}");
//! ```
//!
//! ## Concurrency
//!
//! The escape table, the indent cache and the process-wide access resolver are
//! built once and never mutated. Unlocking a field only ever sets its
//! accessibility flag, so concurrent callers may race on it safely.
//!
//! ## Logging
//!
//! Access attempts and field exclusions are reported through the [`log`]
//! facade at `trace` and `debug` level. No logger is installed by this crate.

pub mod access;
pub mod classify;
pub mod error;
pub mod escape;
pub mod field;
pub mod indent;
pub mod map;
pub mod markers;
pub mod options;
pub mod ser;
pub mod types;
pub mod value;

pub use access::{
    field_access, is_elevated, AccessResolver, AccessStrategy, Accessible, ElevatedScope,
    ForceAccessible, HostProfile, LegacyQuery, NoPrivileges, PrivilegedExecutor,
    TryForceAccessible,
};
pub use classify::{
    classify, is_basic, is_basic_type, is_basic_value, is_collection_or_array, raw_type,
    ValueKind,
};
pub use error::{Error, Result};
pub use escape::{
    escape_json_cow, escape_json_string, escape_json_string_into, escape_optional_into,
    needs_escaping, EscapeTable,
};
pub use field::{
    field_is_serializable, field_is_serializable_with, field_value, serializable_fields,
    FieldDescriptor, Modifiers, Restriction,
};
pub use indent::{append_indent, cached_indent, indent_string, MAX_CACHED_INDENT};
pub use map::FieldMap;
pub use markers::{parse_reference, reference_marker, write_reference, ID_KEY, ID_PREFIX, ID_SUFFIX};
pub use options::SerializerConfig;
pub use ser::{to_value, write_basic_value, write_quoted, ValueSerializer};
pub use types::{
    any_type, null_type, CollectionKind, ScalarKind, TypeDescriptor, TypeInfo, TypeKind, Typed,
};
pub use value::{EnumValue, Number, Object, Value};
