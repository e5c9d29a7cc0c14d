//! Field descriptors and the field filter.
//!
//! A serializer visits only the fields that pass [`field_is_serializable`]:
//! the field must be public when only public fields are requested, must not be
//! transient, final or synthetic, and must be unlockable by the
//! [`AccessResolver`]. Policy checks run first, so an excluded field is never
//! touched by the resolver.
//!
//! Final fields are excluded because the companion deserializer constructs an
//! object first and assigns its fields afterwards.
//!
//! ## Examples
//!
//! ```rust
//! use refjson::{field_is_serializable, FieldDescriptor, Modifiers, Typed};
//!
//! let name = FieldDescriptor::new("name", String::type_descriptor())
//!     .with_modifiers(Modifiers::PUBLIC);
//! let cache = FieldDescriptor::new("cache", String::type_descriptor())
//!     .with_modifiers(Modifiers::PUBLIC | Modifiers::TRANSIENT);
//!
//! assert!(field_is_serializable(&name, true));
//! assert!(!field_is_serializable(&cache, false));
//! ```

use crate::access::{field_access, AccessResolver, Accessible};
use crate::types::{TypeDescriptor, TypeInfo};
use crate::value::Value;
use crate::{Error, Result};
use bitflags::bitflags;
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

bitflags! {
    /// Declaration modifiers of a field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1 << 0;
        const TRANSIENT = 1 << 1;
        const FINAL = 1 << 2;
        /// Generated rather than written by the programmer.
        const SYNTHETIC = 1 << 3;
    }
}

/// What it takes to make a field readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Restriction {
    /// Any force-accessible request succeeds.
    #[default]
    Open,
    /// Only succeeds inside a privileged context.
    Privileged,
    /// Never succeeds.
    Sealed,
}

/// Static description of one field of a composite type.
///
/// The accessibility flag is the only mutable part. It starts cleared and,
/// once set by a successful unlock, stays set for the life of the process.
#[derive(Debug)]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    declaring_type: Cow<'static, str>,
    ty: TypeDescriptor,
    modifiers: Modifiers,
    restriction: Restriction,
    accessible: AtomicBool,
}

impl FieldDescriptor {
    /// Creates a non-public, unrestricted field with no modifiers.
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeDescriptor) -> Self {
        FieldDescriptor {
            name: name.into(),
            declaring_type: Cow::Borrowed(""),
            ty,
            modifiers: Modifiers::empty(),
            restriction: Restriction::Open,
            accessible: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restriction = restriction;
        self
    }

    /// Sets the initial accessibility flag.
    #[must_use]
    pub fn with_accessible(self, accessible: bool) -> Self {
        self.accessible.store(accessible, Ordering::Relaxed);
        self
    }

    pub(crate) fn declared_by(mut self, declaring_type: Cow<'static, str>) -> Self {
        self.declaring_type = declaring_type;
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the composite type this field belongs to.
    #[inline]
    #[must_use]
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    #[inline]
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    #[inline]
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    #[must_use]
    pub fn restriction(&self) -> Restriction {
        self.restriction
    }

    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.modifiers.contains(Modifiers::PUBLIC)
    }

    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.modifiers.contains(Modifiers::TRANSIENT)
    }

    #[inline]
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifiers::FINAL)
    }

    #[inline]
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.modifiers.contains(Modifiers::SYNTHETIC)
    }

    /// Returns `true` if the field may be read: it is public, or it has been unlocked.
    #[inline]
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.is_public() || self.accessible.load(Ordering::Acquire)
    }
}

impl Clone for FieldDescriptor {
    fn clone(&self) -> Self {
        FieldDescriptor {
            name: self.name.clone(),
            declaring_type: self.declaring_type.clone(),
            ty: self.ty.clone(),
            modifiers: self.modifiers,
            restriction: self.restriction,
            accessible: AtomicBool::new(self.accessible.load(Ordering::Acquire)),
        }
    }
}

impl Accessible for FieldDescriptor {
    fn member_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }

    fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    fn set_accessible(&self) -> Result<()> {
        match self.restriction {
            Restriction::Open => {}
            Restriction::Privileged if crate::access::is_elevated() => {}
            Restriction::Privileged => {
                return Err(Error::access_denied(
                    &self.member_name(),
                    "requires a privileged context",
                ))
            }
            Restriction::Sealed => {
                return Err(Error::access_denied(&self.member_name(), "field is sealed"))
            }
        }
        self.accessible.store(true, Ordering::Release);
        Ok(())
    }

    fn try_set_accessible(&self) -> bool {
        self.set_accessible().is_ok()
    }
}

/// Returns `true` if `field` should be visited during serialization.
///
/// Uses the process-wide resolver from [`field_access`].
#[must_use]
pub fn field_is_serializable(field: &FieldDescriptor, public_only: bool) -> bool {
    field_is_serializable_with(field, public_only, field_access())
}

/// Like [`field_is_serializable`], with an explicit resolver.
#[must_use]
pub fn field_is_serializable_with(
    field: &FieldDescriptor,
    public_only: bool,
    resolver: &AccessResolver<FieldDescriptor>,
) -> bool {
    if (public_only && !field.is_public())
        || field.is_transient()
        || field.is_final()
        || field.is_synthetic()
    {
        log::trace!(
            "excluding field {}.{} by policy ({:?})",
            field.declaring_type(),
            field.name(),
            field.modifiers()
        );
        return false;
    }
    resolver.ensure_accessible(field)
}

/// Returns the serializable fields of `info` in declaration order.
#[must_use]
pub fn serializable_fields(info: &TypeInfo, public_only: bool) -> Vec<Arc<FieldDescriptor>> {
    info.fields()
        .iter()
        .filter(|field| field_is_serializable(field, public_only))
        .cloned()
        .collect()
}

/// Reads the value of `field` from `object`.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] if `object` is not an instance of the
/// field's declaring type, and [`Error::IllegalAccess`] if the field is neither
/// public nor unlocked.
///
/// # Examples
///
/// ```rust
/// use refjson::{field_value, to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = to_value(&Point { x: 1, y: 2 }).unwrap();
/// let Value::Object(object) = &point else { unreachable!() };
/// let y = object.type_info().field("y").unwrap();
/// assert_eq!(field_value(&point, y).unwrap().as_i64(), Some(2));
/// ```
pub fn field_value<'v>(object: &'v Value, field: &FieldDescriptor) -> Result<&'v Value> {
    let instance = match object {
        Value::Object(instance) => instance,
        other => {
            return Err(Error::type_mismatch(
                field.declaring_type(),
                &other.type_name(),
            ))
        }
    };
    if instance.type_info().name() != field.declaring_type() {
        return Err(Error::type_mismatch(
            field.declaring_type(),
            instance.type_info().name(),
        ));
    }
    if !field.is_readable() {
        return Err(Error::illegal_access(field.declaring_type(), field.name()));
    }
    instance.get(field.name()).ok_or_else(|| {
        Error::type_mismatch(
            &format!("object with field {}", field.name()),
            instance.type_info().name(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::HostProfile;
    use crate::types::Typed;

    fn field(modifiers: Modifiers) -> FieldDescriptor {
        FieldDescriptor::new("f", i32::type_descriptor()).with_modifiers(modifiers)
    }

    #[test]
    fn test_excluded_modifiers_regardless_of_public_only() {
        for excluded in [Modifiers::TRANSIENT, Modifiers::FINAL, Modifiers::SYNTHETIC] {
            let f = field(Modifiers::PUBLIC | excluded);
            assert!(!field_is_serializable(&f, false));
            assert!(!field_is_serializable(&f, true));
        }
    }

    #[test]
    fn test_public_only_policy() {
        let private = field(Modifiers::empty());
        assert!(!field_is_serializable(&private, true));
        assert!(field_is_serializable(&private, false));
        assert!(field_is_serializable(&field(Modifiers::PUBLIC), true));
    }

    #[test]
    fn test_policy_short_circuits_resolver() {
        let resolver = AccessResolver::probe(HostProfile::full());
        let f = field(Modifiers::TRANSIENT);
        assert!(!field_is_serializable_with(&f, false, &resolver));
        assert!(!f.is_accessible());
    }

    #[test]
    fn test_sealed_field_is_excluded() {
        let f = field(Modifiers::PUBLIC).with_restriction(Restriction::Sealed);
        assert!(!field_is_serializable(&f, false));
    }

    #[test]
    fn test_privileged_field_unlocks_through_elevated_retry() {
        let f = field(Modifiers::empty()).with_restriction(Restriction::Privileged);
        let resolver = AccessResolver::probe(HostProfile::full());
        assert!(field_is_serializable_with(&f, false, &resolver));
        assert!(f.is_accessible());
        assert!(!crate::access::is_elevated());
    }

    #[test]
    fn test_clone_keeps_accessibility() {
        let f = field(Modifiers::empty()).with_accessible(true);
        assert!(f.clone().is_accessible());
    }
}
