//! Serializer configuration.
//!
//! ## Examples
//!
//! ```rust
//! use refjson::SerializerConfig;
//!
//! let compact = SerializerConfig::new();
//! assert_eq!(compact.indent_width, 0);
//! assert!(!compact.public_fields_only);
//!
//! let config = SerializerConfig::pretty().with_public_fields_only(true);
//! let mut buf = String::new();
//! config.indent(2, &mut buf);
//! assert_eq!(buf, "    ");
//! ```

use crate::field::{field_is_serializable, serializable_fields, FieldDescriptor};
use crate::indent::append_indent;
use crate::types::TypeInfo;
use std::sync::Arc;

/// Configuration threaded through a serializer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Only visit fields declared public.
    pub public_fields_only: bool,
    /// Spaces per nesting level; `0` writes compact output.
    pub indent_width: usize,
}

impl SerializerConfig {
    /// Creates the default configuration: compact output, all fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with 2-space indentation.
    #[must_use]
    pub fn pretty() -> Self {
        SerializerConfig {
            indent_width: 2,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_public_fields_only(mut self, public_fields_only: bool) -> Self {
        self.public_fields_only = public_fields_only;
        self
    }

    #[must_use]
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    /// Returns `true` for pretty-printed output.
    #[inline]
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.indent_width > 0
    }

    /// Applies the field filter under this configuration.
    #[must_use]
    pub fn is_serializable(&self, field: &FieldDescriptor) -> bool {
        field_is_serializable(field, self.public_fields_only)
    }

    /// Returns the fields of `info` to visit, in declaration order.
    #[must_use]
    pub fn serializable_fields(&self, info: &TypeInfo) -> Vec<Arc<FieldDescriptor>> {
        serializable_fields(info, self.public_fields_only)
    }

    /// Appends the indentation for nesting level `depth`.
    pub fn indent(&self, depth: usize, buf: &mut String) {
        append_indent(depth, self.indent_width, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Modifiers;
    use crate::types::Typed;

    #[test]
    fn test_compact_indent_is_empty() {
        let mut buf = String::new();
        SerializerConfig::new().indent(10, &mut buf);
        assert!(buf.is_empty());
        assert!(!SerializerConfig::new().is_pretty());
    }

    #[test]
    fn test_public_fields_only() {
        let info = TypeInfo::composite(
            "app::Account",
            vec![
                FieldDescriptor::new("id", u64::type_descriptor()).with_modifiers(Modifiers::PUBLIC),
                FieldDescriptor::new("balance", f64::type_descriptor()),
            ],
        );

        let all = SerializerConfig::new().serializable_fields(&info);
        assert_eq!(all.len(), 2);

        let public = SerializerConfig::new()
            .with_public_fields_only(true)
            .serializable_fields(&info);
        let names: Vec<_> = public.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["id"]);
    }
}
