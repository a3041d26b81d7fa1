//! Annotation items
//!
//! Annotations are modeled as a kind identity plus a tagged payload rather
//! than host-native annotation types, so any registration mechanism can
//! produce them.

use std::borrow::Cow;
use std::fmt;

/// Identity of an annotation kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationKind(Cow<'static, str>);

impl AnnotationKind {
    /// Whether members holding a null value are still written out
    pub const WRITE_NULL_PROPERTIES: Self = Self::from_static("JsonWriteNullProperties");
    /// Member is excluded from mapping
    pub const IGNORE: Self = Self::from_static("JsonIgnore");
    /// Explicit property name for a member
    pub const PROPERTY: Self = Self::from_static("JsonProperty");
    /// Marks a method as a property getter
    pub const GETTER: Self = Self::from_static("JsonGetter");
    /// Marks a method as a property setter
    pub const SETTER: Self = Self::from_static("JsonSetter");

    /// Create a kind from a static name
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a kind from an owned name
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Kind name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Annotation payload
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// No payload
    Marker,
    /// Boolean payload
    Bool(bool),
    /// Integer payload
    Int(i64),
    /// String payload
    Str(String),
    /// List payload
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    /// Boolean payload, if this is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String payload, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Marker => Ok(()),
            AnnotationValue::Bool(b) => write!(f, "{}", b),
            AnnotationValue::Int(n) => write!(f, "{}", n),
            AnnotationValue::Str(s) => write!(f, "{:?}", s),
            AnnotationValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A single declared annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Annotation kind
    pub kind: AnnotationKind,
    /// Carried value
    pub value: AnnotationValue,
}

impl Annotation {
    /// Annotation with an arbitrary payload
    pub fn with_value(kind: AnnotationKind, value: AnnotationValue) -> Self {
        Self { kind, value }
    }

    /// Annotation without a payload
    pub fn marker(kind: AnnotationKind) -> Self {
        Self::with_value(kind, AnnotationValue::Marker)
    }

    /// Annotation carrying a boolean
    pub fn flag(kind: AnnotationKind, value: bool) -> Self {
        Self::with_value(kind, AnnotationValue::Bool(value))
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            AnnotationValue::Marker => write!(f, "@{}", self.kind),
            ref value => write!(f, "@{}({})", self.kind, value),
        }
    }
}
