//! Serialization descriptors for types.
//!
//! Instead of querying types at run time, every serializable type is described
//! ahead of time by a [`TypeInfo`]: its name plus a [`TypeKind`] that says how a
//! serializer should treat it. Field-bearing types list their fields as
//! [`FieldDescriptor`]s.
//!
//! A use site of a type is a [`TypeDescriptor`]. Besides a direct reference to a
//! `TypeInfo`, a descriptor can be a parameterized type such as `Vec<String>`, a
//! type variable, a wildcard or a generic array. Only the first two have a raw
//! (erased) type; see [`raw_type`](crate::raw_type).
//!
//! ## Examples
//!
//! ```rust
//! use refjson::{FieldDescriptor, Modifiers, TypeDescriptor, TypeInfo, Typed};
//!
//! let user = TypeInfo::composite(
//!     "app::User",
//!     vec![
//!         FieldDescriptor::new("name", String::type_descriptor()).with_modifiers(Modifiers::PUBLIC),
//!         FieldDescriptor::new("tags", Vec::<String>::type_descriptor()),
//!     ],
//! );
//!
//! assert_eq!(user.fields().len(), 2);
//! assert_eq!(user.field("tags").unwrap().declaring_type(), "app::User");
//! assert_eq!(Vec::<String>::type_descriptor().to_string(), "Vec<String>");
//! ```

use crate::classify::ValueKind;
use crate::field::FieldDescriptor;
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Name of the type that class-reference values belong to.
pub const CLASS_TYPE_NAME: &str = "Type";

/// Name of the catch-all composite type used for values of unknown type.
pub const ANY_TYPE_NAME: &str = "Object";

/// Name of the type of the `null` value.
pub const NULL_TYPE_NAME: &str = "null";

/// The scalar types a serializer can write directly as a JSON token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    String,
    /// The type of `null`; it has no other value.
    Null,
}

impl ScalarKind {
    /// Returns `true` for the integer and floating-point kinds.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(
            self,
            ScalarKind::Bool | ScalarKind::Char | ScalarKind::String | ScalarKind::Null
        )
    }
}

/// The flavours of element grouping a collection type may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Set,
    Queue,
}

/// How a type is laid out, as far as serialization is concerned.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Scalar(ScalarKind),
    Enum { variants: Vec<Cow<'static, str>> },
    ClassRef,
    Array { element: TypeDescriptor },
    Collection(CollectionKind),
    Map,
    Composite { fields: Vec<Arc<FieldDescriptor>> },
}

/// Static description of one serializable type.
///
/// Two `TypeInfo`s are equal when their names are equal.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    name: Cow<'static, str>,
    kind: TypeKind,
}

impl TypeInfo {
    pub fn scalar(name: impl Into<Cow<'static, str>>, kind: ScalarKind) -> Self {
        TypeInfo {
            name: name.into(),
            kind: TypeKind::Scalar(kind),
        }
    }

    /// Describes an enumeration with the given variant names.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use refjson::TypeInfo;
    ///
    /// let color = TypeInfo::enumeration("Color", ["Red", "Green"]);
    /// assert!(color.is_enum());
    /// assert_eq!(color.variants(), ["Red", "Green"]);
    /// ```
    pub fn enumeration<I, S>(name: impl Into<Cow<'static, str>>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        TypeInfo {
            name: name.into(),
            kind: TypeKind::Enum {
                variants: variants.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Describes the type of class-reference values.
    pub fn class_ref() -> Self {
        TypeInfo {
            name: Cow::Borrowed(CLASS_TYPE_NAME),
            kind: TypeKind::ClassRef,
        }
    }

    /// Describes an array type; the name is derived from the element type.
    pub fn array(element: TypeDescriptor) -> Self {
        TypeInfo {
            name: Cow::Owned(format!("{}[]", element)),
            kind: TypeKind::Array { element },
        }
    }

    pub fn collection(name: impl Into<Cow<'static, str>>, kind: CollectionKind) -> Self {
        TypeInfo {
            name: name.into(),
            kind: TypeKind::Collection(kind),
        }
    }

    pub fn map(name: impl Into<Cow<'static, str>>) -> Self {
        TypeInfo {
            name: name.into(),
            kind: TypeKind::Map,
        }
    }

    /// Describes a field-bearing type. Each field is stamped with `name` as its
    /// declaring type; declaration order is preserved.
    pub fn composite(name: impl Into<Cow<'static, str>>, fields: Vec<FieldDescriptor>) -> Self {
        let name = name.into();
        let fields = fields
            .into_iter()
            .map(|field| Arc::new(field.declared_by(name.clone())))
            .collect();
        TypeInfo {
            name,
            kind: TypeKind::Composite { fields },
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Returns the serialization category of values of this type.
    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        match self.kind {
            TypeKind::Scalar(_) => ValueKind::Scalar,
            TypeKind::Enum { .. } => ValueKind::Enum,
            TypeKind::ClassRef => ValueKind::ClassRef,
            TypeKind::Array { .. } | TypeKind::Collection(_) => ValueKind::CollectionOrArray,
            TypeKind::Map | TypeKind::Composite { .. } => ValueKind::Composite,
        }
    }

    /// Returns `true` if values of this type are scalars, enum values or class references.
    #[inline]
    #[must_use]
    pub fn is_basic(&self) -> bool {
        self.value_kind().is_basic()
    }

    #[inline]
    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array { .. })
    }

    #[inline]
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Collection(_))
    }

    /// Returns the fields of a composite type, or an empty slice.
    #[must_use]
    pub fn fields(&self) -> &[Arc<FieldDescriptor>] {
        match &self.kind {
            TypeKind::Composite { fields } => fields,
            _ => &[],
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields().iter().find(|field| field.name() == name)
    }

    /// Returns the variant names of an enumeration, or an empty slice.
    #[must_use]
    pub fn variants(&self) -> &[Cow<'static, str>] {
        match &self.kind {
            TypeKind::Enum { variants } => variants,
            _ => &[],
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeInfo {}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.name)
    }
}

/// A use site of a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// A direct reference to a described type
    Class(Arc<TypeInfo>),
    /// A generic type applied to arguments, e.g. `Vec<String>`
    Parameterized {
        raw: Arc<TypeInfo>,
        arguments: Vec<TypeDescriptor>,
    },
    /// An unresolved type variable, e.g. `T`
    Variable(Cow<'static, str>),
    /// A wildcard, optionally bounded above
    Wildcard {
        upper_bound: Option<Box<TypeDescriptor>>,
    },
    /// An array whose component type is not a plain class, e.g. `T[]`
    GenericArray { component: Box<TypeDescriptor> },
}

impl TypeDescriptor {
    /// Returns the descriptor of a `Typed` type.
    #[must_use]
    pub fn of<T: Typed + ?Sized>() -> Self {
        T::type_descriptor()
    }

    pub fn class(info: Arc<TypeInfo>) -> Self {
        TypeDescriptor::Class(info)
    }

    pub fn parameterized(raw: Arc<TypeInfo>, arguments: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Parameterized { raw, arguments }
    }

    pub fn variable(name: impl Into<Cow<'static, str>>) -> Self {
        TypeDescriptor::Variable(name.into())
    }

    pub fn wildcard() -> Self {
        TypeDescriptor::Wildcard { upper_bound: None }
    }

    pub fn wildcard_bounded(upper_bound: TypeDescriptor) -> Self {
        TypeDescriptor::Wildcard {
            upper_bound: Some(Box::new(upper_bound)),
        }
    }

    pub fn generic_array(component: TypeDescriptor) -> Self {
        TypeDescriptor::GenericArray {
            component: Box::new(component),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Class(info) => write!(f, "{}", info.name()),
            TypeDescriptor::Parameterized { raw, arguments } => {
                write!(f, "{}<", raw.name())?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(">")
            }
            TypeDescriptor::Variable(name) => f.write_str(name),
            TypeDescriptor::Wildcard { upper_bound: None } => f.write_str("?"),
            TypeDescriptor::Wildcard {
                upper_bound: Some(bound),
            } => write!(f, "? extends {}", bound),
            TypeDescriptor::GenericArray { component } => write!(f, "{}[]", component),
        }
    }
}

impl From<Arc<TypeInfo>> for TypeDescriptor {
    fn from(info: Arc<TypeInfo>) -> Self {
        TypeDescriptor::Class(info)
    }
}

/// Types with a static serialization descriptor.
///
/// Generic containers report their raw type from [`Typed::type_info`] and the
/// applied type from [`Typed::type_descriptor`].
pub trait Typed {
    fn type_info() -> Arc<TypeInfo>;

    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Class(Self::type_info())
    }
}

macro_rules! impl_typed_scalar {
    ($($ty:ty => $kind:ident, $name:literal;)*) => {
        $(
            impl Typed for $ty {
                fn type_info() -> Arc<TypeInfo> {
                    static INFO: Lazy<Arc<TypeInfo>> =
                        Lazy::new(|| Arc::new(TypeInfo::scalar($name, ScalarKind::$kind)));
                    INFO.clone()
                }
            }
        )*
    };
}

impl_typed_scalar! {
    bool => Bool, "bool";
    char => Char, "char";
    i8 => I8, "i8";
    i16 => I16, "i16";
    i32 => I32, "i32";
    i64 => I64, "i64";
    i128 => I128, "i128";
    isize => Isize, "isize";
    u8 => U8, "u8";
    u16 => U16, "u16";
    u32 => U32, "u32";
    u64 => U64, "u64";
    u128 => U128, "u128";
    usize => Usize, "usize";
    f32 => F32, "f32";
    f64 => F64, "f64";
    String => String, "String";
}

impl Typed for str {
    fn type_info() -> Arc<TypeInfo> {
        String::type_info()
    }
}

impl Typed for TypeInfo {
    fn type_info() -> Arc<TypeInfo> {
        static INFO: Lazy<Arc<TypeInfo>> = Lazy::new(|| Arc::new(TypeInfo::class_ref()));
        INFO.clone()
    }
}

/// Returns the scalar type of `null`.
///
/// A field that currently holds `null` is still a basic field, so `null` gets
/// a type of its own instead of the catch-all [`any_type`].
#[must_use]
pub fn null_type() -> Arc<TypeInfo> {
    static INFO: Lazy<Arc<TypeInfo>> =
        Lazy::new(|| Arc::new(TypeInfo::scalar(NULL_TYPE_NAME, ScalarKind::Null)));
    INFO.clone()
}

impl Typed for () {
    fn type_info() -> Arc<TypeInfo> {
        null_type()
    }
}

/// Returns the catch-all composite type with no declared fields.
#[must_use]
pub fn any_type() -> Arc<TypeInfo> {
    static INFO: Lazy<Arc<TypeInfo>> =
        Lazy::new(|| Arc::new(TypeInfo::composite(ANY_TYPE_NAME, Vec::new())));
    INFO.clone()
}

impl<T: Typed + ?Sized> Typed for &T {
    fn type_info() -> Arc<TypeInfo> {
        T::type_info()
    }

    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

impl<T: Typed + ?Sized> Typed for Box<T> {
    fn type_info() -> Arc<TypeInfo> {
        T::type_info()
    }

    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

// An absent value serializes as `null`; the declared type is the inner one.
impl<T: Typed> Typed for Option<T> {
    fn type_info() -> Arc<TypeInfo> {
        T::type_info()
    }

    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

// A static inside a generic impl is shared by every `T`, so array types are
// interned by name instead.
static ARRAY_TYPES: Lazy<Mutex<HashMap<String, Arc<TypeInfo>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn interned_array(element: TypeDescriptor) -> Arc<TypeInfo> {
    let info = TypeInfo::array(element);
    let mut types = ARRAY_TYPES.lock().unwrap_or_else(PoisonError::into_inner);
    types
        .entry(info.name().to_string())
        .or_insert_with(|| Arc::new(info))
        .clone()
}

impl<T: Typed> Typed for [T] {
    fn type_info() -> Arc<TypeInfo> {
        interned_array(T::type_descriptor())
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn type_info() -> Arc<TypeInfo> {
        <[T]>::type_info()
    }
}

macro_rules! impl_typed_collection {
    ($($ty:ident => $kind:ident, $name:literal;)*) => {
        $(
            impl<T: Typed> Typed for $ty<T> {
                fn type_info() -> Arc<TypeInfo> {
                    static INFO: Lazy<Arc<TypeInfo>> =
                        Lazy::new(|| Arc::new(TypeInfo::collection($name, CollectionKind::$kind)));
                    INFO.clone()
                }

                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::parameterized(Self::type_info(), vec![T::type_descriptor()])
                }
            }
        )*
    };
}

impl_typed_collection! {
    Vec => List, "Vec";
    LinkedList => List, "LinkedList";
    VecDeque => Queue, "VecDeque";
    BinaryHeap => Queue, "BinaryHeap";
    HashSet => Set, "HashSet";
    BTreeSet => Set, "BTreeSet";
}

macro_rules! impl_typed_map {
    ($($ty:ident => $name:literal;)*) => {
        $(
            impl<K: Typed, V: Typed> Typed for $ty<K, V> {
                fn type_info() -> Arc<TypeInfo> {
                    static INFO: Lazy<Arc<TypeInfo>> = Lazy::new(|| Arc::new(TypeInfo::map($name)));
                    INFO.clone()
                }

                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::parameterized(
                        Self::type_info(),
                        vec![K::type_descriptor(), V::type_descriptor()],
                    )
                }
            }
        )*
    };
}

impl_typed_map! {
    HashMap => "HashMap";
    BTreeMap => "BTreeMap";
}
