//! Method handles
//!
//! The capability a host type system must provide for a method to be
//! introspected. Native reflection layers implement [`MethodHandle`]
//! directly; hosts without one can register methods by hand with
//! [`MethodDef`].

use std::fmt;
use std::sync::Arc;

use crate::annotation::Annotation;

/// Resolved (erased) type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    name: Arc<str>,
}

impl TypeRef {
    /// Name used for erased type variables and wildcards
    pub const OBJECT_NAME: &'static str = "Object";

    /// Create a type descriptor from a fully qualified name
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// The root object type
    pub fn object() -> Self {
        Self::new(Self::OBJECT_NAME)
    }

    /// The `void` return type
    pub fn void() -> Self {
        Self::new("void")
    }

    /// Fully qualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Array type with this type as its element
    pub fn array_of(&self) -> Self {
        Self::new(format!("{}[]", self.name))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Diagnostic label of a method: `Type#name(n params)`
pub fn method_label(declaring_type: &TypeRef, name: &str, param_count: usize) -> String {
    format!("{}#{}({} params)", declaring_type, name, param_count)
}

/// Generic-aware type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericType {
    /// A plain type with no type arguments
    Concrete(TypeRef),
    /// `Raw<A, B, ...>`
    Parameterized {
        /// The erased type
        raw: TypeRef,
        /// Type arguments
        args: Vec<GenericType>,
    },
    /// A type variable such as `T`
    Variable(String),
    /// `T[]`
    Array(Box<GenericType>),
    /// `?`
    Wildcard,
}

impl GenericType {
    /// The resolved type this descriptor erases to
    pub fn erasure(&self) -> TypeRef {
        match self {
            GenericType::Concrete(t) => t.clone(),
            GenericType::Parameterized { raw, .. } => raw.clone(),
            GenericType::Variable(_) | GenericType::Wildcard => TypeRef::object(),
            GenericType::Array(elem) => elem.erasure().array_of(),
        }
    }
}

impl From<TypeRef> for GenericType {
    fn from(t: TypeRef) -> Self {
        GenericType::Concrete(t)
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericType::Concrete(t) => write!(f, "{}", t),
            GenericType::Parameterized { raw, args } => {
                write!(f, "{}<", raw)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            GenericType::Variable(name) => f.write_str(name),
            GenericType::Array(elem) => write!(f, "{}[]", elem),
            GenericType::Wildcard => f.write_str("?"),
        }
    }
}

/// Raw member modifier flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    /// No modifiers (package-private)
    pub const NONE: Self = Self(0x0000);
    /// Public visibility
    pub const PUBLIC: Self = Self(0x0001);
    /// Private visibility
    pub const PRIVATE: Self = Self(0x0002);
    /// Protected visibility
    pub const PROTECTED: Self = Self(0x0004);
    /// Static member
    pub const STATIC: Self = Self(0x0008);
    /// Final member
    pub const FINAL: Self = Self(0x0010);
    /// Synchronized method
    pub const SYNCHRONIZED: Self = Self(0x0020);
    /// Compiler-generated bridge method
    pub const BRIDGE: Self = Self(0x0040);
    /// Abstract method
    pub const ABSTRACT: Self = Self(0x0400);
    /// Compiler-generated member
    pub const SYNTHETIC: Self = Self(0x1000);

    /// Create from raw bits
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Check if all flags in `other` are set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of flags
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the member is declared public
    pub const fn is_public(&self) -> bool {
        self.contains(Self::PUBLIC)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Reflection capability for a single method
///
/// Implementations are owned by the host type system and must not change
/// while any `AnnotatedMethod` wraps them.
pub trait MethodHandle {
    /// Simple method name
    fn name(&self) -> &str;

    /// Type that declares this method
    fn declaring_type(&self) -> &TypeRef;

    /// Raw modifier flags
    fn modifiers(&self) -> Modifiers;

    /// Resolved parameter types, in declaration order
    ///
    /// May be expensive: hosts typically resolve descriptors on every call.
    fn parameter_types(&self) -> Vec<TypeRef>;

    /// Generic parameter types, in declaration order
    fn generic_parameter_types(&self) -> Vec<GenericType>;

    /// Resolved return type
    fn return_type(&self) -> TypeRef;

    /// Generic return type
    fn generic_return_type(&self) -> GenericType;

    /// Annotations declared directly on this method (inherited ones excluded)
    fn declared_annotations(&self) -> &[Annotation];
}

impl<H: MethodHandle + ?Sized> MethodHandle for Arc<H> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn declaring_type(&self) -> &TypeRef {
        (**self).declaring_type()
    }

    fn modifiers(&self) -> Modifiers {
        (**self).modifiers()
    }

    fn parameter_types(&self) -> Vec<TypeRef> {
        (**self).parameter_types()
    }

    fn generic_parameter_types(&self) -> Vec<GenericType> {
        (**self).generic_parameter_types()
    }

    fn return_type(&self) -> TypeRef {
        (**self).return_type()
    }

    fn generic_return_type(&self) -> GenericType {
        (**self).generic_return_type()
    }

    fn declared_annotations(&self) -> &[Annotation] {
        (**self).declared_annotations()
    }
}

impl<H: MethodHandle + ?Sized> MethodHandle for &H {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn declaring_type(&self) -> &TypeRef {
        (**self).declaring_type()
    }

    fn modifiers(&self) -> Modifiers {
        (**self).modifiers()
    }

    fn parameter_types(&self) -> Vec<TypeRef> {
        (**self).parameter_types()
    }

    fn generic_parameter_types(&self) -> Vec<GenericType> {
        (**self).generic_parameter_types()
    }

    fn return_type(&self) -> TypeRef {
        (**self).return_type()
    }

    fn generic_return_type(&self) -> GenericType {
        (**self).generic_return_type()
    }

    fn declared_annotations(&self) -> &[Annotation] {
        (**self).declared_annotations()
    }
}

/// Hand-registered method description
///
/// Lets hosts without a reflection layer describe methods explicitly.
/// Defaults to a public, parameterless method returning `void`.
#[derive(Debug, Clone)]
pub struct MethodDef {
    declaring_type: TypeRef,
    name: String,
    modifiers: Modifiers,
    params: Vec<GenericType>,
    return_type: GenericType,
    annotations: Vec<Annotation>,
}

impl MethodDef {
    /// Start describing `declaring_type#name`
    pub fn new(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            modifiers: Modifiers::PUBLIC,
            params: Vec::new(),
            return_type: GenericType::Concrete(TypeRef::void()),
            annotations: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn param(mut self, ty: impl Into<GenericType>) -> Self {
        self.params.push(ty.into());
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: impl Into<GenericType>) -> Self {
        self.return_type = ty.into();
        self
    }

    /// Replace the modifier flags
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Declare an annotation on the method
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl MethodHandle for MethodDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &TypeRef {
        &self.declaring_type
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn parameter_types(&self) -> Vec<TypeRef> {
        self.params.iter().map(GenericType::erasure).collect()
    }

    fn generic_parameter_types(&self) -> Vec<GenericType> {
        self.params.clone()
    }

    fn return_type(&self) -> TypeRef {
        self.return_type.erasure()
    }

    fn generic_return_type(&self) -> GenericType {
        self.return_type.clone()
    }

    fn declared_annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}
