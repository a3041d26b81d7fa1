//! Beanmap Introspection
//!
//! Annotated member metadata for the beanmap object mapper:
//! - **handle**: the reflection capability a host type system provides
//! - **annotation**: metadata items and the kind-keyed collection that owns them
//! - **classify**: the authority deciding which kinds the mapper tracks
//! - **access**: visibility relaxation before reflective invocation
//! - **method**: `AnnotatedMethod`, the per-method metadata carrier
//! - **collector**: merging declarations found across a type hierarchy
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use beanmap_introspect::{Annotation, AnnotatedMethod, AnnotationKind, KindTable, MethodDef, TypeRef};
//!
//! let getter = MethodDef::new(TypeRef::new("com.acme.Widget"), "getName")
//!     .returns(TypeRef::new("java.lang.String"))
//!     .annotate(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, false));
//!
//! let method = AnnotatedMethod::new(getter, Arc::new(KindTable::framework_defaults()));
//! assert_eq!(method.full_name(), "com.acme.Widget#getName(0 params)");
//! assert!(!method.will_write_null_properties(true));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod access;
pub mod annotation;
pub mod annotation_map;
pub mod classify;
pub mod collector;
pub mod config;
pub mod error;
pub mod handle;
pub mod method;

pub use access::{AccessControl, AccessPolicy, AllowAll, InvokePermission, TypeAccessRule};
pub use annotation::{Annotation, AnnotationKind, AnnotationValue};
pub use annotation_map::AnnotationMap;
pub use classify::{AnnotationClassifier, KindTable};
pub use collector::{AnnotatedMethodSet, MethodCollector, MethodKey};
pub use config::IntrospectConfig;
pub use error::{IntrospectError, IntrospectResult};
pub use handle::{method_label, GenericType, MethodDef, MethodHandle, Modifiers, TypeRef};
pub use method::{Annotated, AnnotatedMethod};
