//! Error types for the serializer support routines.
//!
//! Most routines in this crate cannot fail. The ones that can are usage errors
//! that the calling serializer is expected to propagate:
//!
//! - **Invalid type kind**: [`raw_type`](crate::raw_type) was handed a type
//!   variable, wildcard or generic array that has no erasure
//! - **Illegal access**: a restricted field was read before it was unlocked
//! - **Type mismatch**: a field was read from an object of another type, or a
//!   composite value was emitted as a basic JSON token
//!
//! Accessibility failures are deliberately absent from the public surface: the
//! [`AccessResolver`](crate::AccessResolver) collapses every one of them into
//! `false`. [`Error::AccessDenied`] only travels between an
//! [`AccessStrategy`](crate::AccessStrategy) and the resolver.
//!
//! ## Examples
//!
//! ```rust
//! use refjson::{raw_type, Error, TypeDescriptor};
//!
//! let result = raw_type(&TypeDescriptor::variable("T"));
//! assert!(matches!(result, Err(Error::InvalidTypeKind { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by the support routines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The type descriptor has no raw (erased) type
    #[error("Illegal type: {descriptor}")]
    InvalidTypeKind { descriptor: String },

    /// A restricted field was read without being made accessible first
    #[error("Cannot access field {declaring_type}.{field}: field is not accessible")]
    IllegalAccess {
        declaring_type: String,
        field: String,
    },

    /// A value did not have the type the operation required
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// An access strategy refused to unlock a member
    #[error("Access to {member} denied: {reason}")]
    AccessDenied { member: String, reason: String },

    /// Map keys must serialize as strings
    #[error("Map keys must be strings")]
    KeyMustBeString,

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an invalid type kind error for a descriptor that cannot be erased.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use refjson::Error;
    ///
    /// let err = Error::invalid_type_kind("T");
    /// assert_eq!(err.to_string(), "Illegal type: T");
    /// ```
    pub fn invalid_type_kind<T: fmt::Display>(descriptor: T) -> Self {
        Error::InvalidTypeKind {
            descriptor: descriptor.to_string(),
        }
    }

    /// Creates an illegal access error for a field of the given declaring type.
    pub fn illegal_access(declaring_type: &str, field: &str) -> Self {
        Error::IllegalAccess {
            declaring_type: declaring_type.to_string(),
            field: field.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use refjson::Error;
    ///
    /// let err = Error::type_mismatch("app::User", "app::Order");
    /// assert!(err.to_string().contains("expected app::User"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an access denied error, used by access strategies to report a refusal.
    pub fn access_denied(member: &str, reason: &str) -> Self {
        Error::AccessDenied {
            member: member.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
