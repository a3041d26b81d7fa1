//! Annotated methods
//!
//! [`AnnotatedMethod`] wraps one method handle together with the annotations
//! the classifier considers relevant. Annotations are collected when the
//! method is created and may be supplemented with those found on other
//! declarations of the same logical method (overridden or bridge methods).
//!
//! ## Merge order
//!
//! The first annotation recorded for a kind is kept; later ones are ignored.
//! Declarations must therefore be merged most-derived first, so that the
//! override's annotations take precedence over inherited ones.
//! [`MethodCollector`](crate::collector::MethodCollector) sorts declarations
//! by hierarchy depth before merging and is the preferred way to build these.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::access::AccessControl;
use crate::annotation::{Annotation, AnnotationKind};
use crate::annotation_map::AnnotationMap;
use crate::classify::AnnotationClassifier;
use crate::error::IntrospectResult;
use crate::handle::{method_label, GenericType, MethodHandle, Modifiers, TypeRef};

/// Common surface of annotated members
pub trait Annotated {
    /// Member name
    fn name(&self) -> &str;

    /// Raw modifier flags
    fn modifiers(&self) -> Modifiers;

    /// Annotation of the given kind, if recorded
    fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation>;

    /// Whether an annotation of the given kind is recorded
    fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.annotation(kind).is_some()
    }

    /// Whether the member is declared public
    fn is_public(&self) -> bool {
        self.modifiers().is_public()
    }
}

/// A method plus the annotations relevant to the mapper
pub struct AnnotatedMethod<H: MethodHandle> {
    method: H,
    classifier: Arc<dyn AnnotationClassifier>,
    annotations: AnnotationMap,
    param_types: OnceCell<Vec<TypeRef>>,
}

impl<H: MethodHandle> AnnotatedMethod<H> {
    /// Wrap `method`, recording its directly declared relevant annotations
    pub fn new(method: H, classifier: Arc<dyn AnnotationClassifier>) -> Self {
        let mut annotations = AnnotationMap::new();
        for annotation in method.declared_annotations() {
            if classifier.is_handled(annotation) {
                annotations.add(annotation.clone());
            } else {
                tracing::trace!(method = method.name(), kind = %annotation.kind, "annotation not handled");
            }
        }
        tracing::debug!(
            declaring = %method.declaring_type(),
            method = method.name(),
            annotations = annotations.len(),
            "annotated method created"
        );

        Self {
            method,
            classifier,
            annotations,
            param_types: OnceCell::new(),
        }
    }

    /// Add annotations from another declaration of the same logical method
    ///
    /// Kinds already present are left untouched. Call in most-derived-first
    /// order.
    pub fn merge_annotations_from<O: MethodHandle + ?Sized>(&mut self, other: &O) {
        let mut added = 0usize;
        for annotation in other.declared_annotations() {
            if self.classifier.is_handled(annotation)
                && self.annotations.add_if_not_present(annotation.clone())
            {
                added += 1;
            }
        }
        tracing::debug!(
            declaring = %self.declaring_type(),
            method = self.name(),
            from = %other.declaring_type(),
            added,
            "merged annotations"
        );
    }

    /// The wrapped method handle
    pub fn handle(&self) -> &H {
        &self.method
    }

    /// Simple method name
    pub fn name(&self) -> &str {
        self.method.name()
    }

    /// Type declaring the wrapped method
    pub fn declaring_type(&self) -> &TypeRef {
        self.method.declaring_type()
    }

    /// Raw modifier flags of the wrapped method
    pub fn modifiers(&self) -> Modifiers {
        self.method.modifiers()
    }

    /// `Type#name(n params)`, for diagnostics
    pub fn full_name(&self) -> String {
        method_label(self.declaring_type(), self.name(), self.parameter_count())
    }

    /// Resolved parameter types, computed on first use
    pub fn parameter_types(&self) -> &[TypeRef] {
        self.param_types.get_or_init(|| {
            let types = self.method.parameter_types();
            tracing::trace!(method = self.method.name(), count = types.len(), "parameter types resolved");
            types
        })
    }

    /// Number of parameters
    pub fn parameter_count(&self) -> usize {
        self.parameter_types().len()
    }

    /// Generic parameter types (not cached)
    pub fn generic_parameter_types(&self) -> Vec<GenericType> {
        self.method.generic_parameter_types()
    }

    /// Generic return type (not cached)
    pub fn generic_return_type(&self) -> GenericType {
        self.method.generic_return_type()
    }

    /// Resolved return type (not cached)
    pub fn return_type(&self) -> TypeRef {
        self.method.return_type()
    }

    /// Number of recorded annotations
    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// All recorded annotations
    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    /// Annotation of the given kind, if recorded
    pub fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.annotations.get(kind)
    }

    /// Whether an annotation of the given kind is recorded
    pub fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.annotations.contains(kind)
    }

    /// Ask `access` to make the method invocable regardless of visibility
    ///
    /// Must be requested once per handle before reflective invocation; the
    /// method does not remember earlier requests.
    pub fn fix_access(&self, access: &dyn AccessControl) -> IntrospectResult<()> {
        access.relax(&self.method)
    }

    /// Boolean carried by the `kind` annotation, or `default` if absent
    ///
    /// Annotations of that kind without a boolean payload count as absent.
    pub fn flag_or(&self, kind: &AnnotationKind, default: bool) -> bool {
        self.annotation(kind)
            .and_then(|a| a.value.as_bool())
            .unwrap_or(default)
    }

    /// Whether null-valued properties behind this method are still written
    pub fn will_write_null_properties(&self, default: bool) -> bool {
        self.flag_or(&AnnotationKind::WRITE_NULL_PROPERTIES, default)
    }
}

impl<H: MethodHandle> Annotated for AnnotatedMethod<H> {
    fn name(&self) -> &str {
        AnnotatedMethod::name(self)
    }

    fn modifiers(&self) -> Modifiers {
        AnnotatedMethod::modifiers(self)
    }

    fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        AnnotatedMethod::annotation(self, kind)
    }
}

impl<H: MethodHandle> fmt::Display for AnnotatedMethod<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[method {}, annotations: {}]", self.name(), self.annotations)
    }
}

impl<H: MethodHandle> fmt::Debug for AnnotatedMethod<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedMethod")
            .field("method", &self.full_name())
            .field("annotations", &self.annotations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::access::{AccessPolicy, AllowAll, InvokePermission};
    use crate::annotation::AnnotationValue;
    use crate::classify::KindTable;
    use crate::error::IntrospectError;
    use crate::handle::MethodDef;

    fn defaults() -> Arc<dyn AnnotationClassifier> {
        Arc::new(KindTable::framework_defaults())
    }

    fn widget() -> TypeRef {
        TypeRef::new("com.acme.Widget")
    }

    /// Handle that counts how often parameter types are resolved
    struct CountingHandle {
        def: MethodDef,
        resolutions: AtomicUsize,
    }

    impl MethodHandle for CountingHandle {
        fn name(&self) -> &str {
            self.def.name()
        }

        fn declaring_type(&self) -> &TypeRef {
            self.def.declaring_type()
        }

        fn modifiers(&self) -> Modifiers {
            MethodHandle::modifiers(&self.def)
        }

        fn parameter_types(&self) -> Vec<TypeRef> {
            self.resolutions.fetch_add(1, Ordering::SeqCst);
            self.def.parameter_types()
        }

        fn generic_parameter_types(&self) -> Vec<GenericType> {
            self.def.generic_parameter_types()
        }

        fn return_type(&self) -> TypeRef {
            self.def.return_type()
        }

        fn generic_return_type(&self) -> GenericType {
            self.def.generic_return_type()
        }

        fn declared_annotations(&self) -> &[Annotation] {
            self.def.declared_annotations()
        }
    }

    /// Subscriber that enables every event, so log fields are evaluated
    struct EnableAll;

    impl tracing::Subscriber for EnableAll {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, _: &tracing::Event<'_>) {}

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn test_only_handled_annotations_recorded() {
        let def = MethodDef::new(widget(), "getName")
            .annotate(Annotation::marker(AnnotationKind::PROPERTY))
            .annotate(Annotation::marker(AnnotationKind::new("Deprecated")))
            .annotate(Annotation::marker(AnnotationKind::IGNORE))
            .annotate(Annotation::marker(AnnotationKind::new("Override")));

        let method = AnnotatedMethod::new(def, defaults());
        assert_eq!(method.annotation_count(), 2);
        assert!(method.has_annotation(&AnnotationKind::PROPERTY));
        assert!(method.has_annotation(&AnnotationKind::IGNORE));
        assert!(method.annotation(&AnnotationKind::new("Deprecated")).is_none());
    }

    #[test]
    fn test_duplicate_declared_kind_keeps_first() {
        let def = MethodDef::new(widget(), "getName")
            .annotate(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, false))
            .annotate(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, true));

        let method = AnnotatedMethod::new(def, defaults());
        assert_eq!(method.annotation_count(), 1);
        assert!(!method.will_write_null_properties(true));
    }

    #[test]
    fn test_merge_keeps_existing_and_adds_new() {
        let own = MethodDef::new(widget(), "getName").annotate(Annotation::with_value(
            AnnotationKind::PROPERTY,
            AnnotationValue::Str("name".to_string()),
        ));
        let inherited = MethodDef::new(TypeRef::new("com.acme.Named"), "getName")
            .annotate(Annotation::with_value(
                AnnotationKind::PROPERTY,
                AnnotationValue::Str("label".to_string()),
            ))
            .annotate(Annotation::marker(AnnotationKind::GETTER))
            .annotate(Annotation::marker(AnnotationKind::new("Override")));

        let mut method = AnnotatedMethod::new(own, defaults());
        method.merge_annotations_from(&inherited);

        assert_eq!(method.annotation_count(), 2);
        assert_eq!(
            method.annotation(&AnnotationKind::PROPERTY).map(|a| &a.value),
            Some(&AnnotationValue::Str("name".to_string()))
        );
        assert!(method.has_annotation(&AnnotationKind::GETTER));
        // Identity still belongs to the original handle
        assert_eq!(method.declaring_type(), &widget());
    }

    #[test]
    fn test_repeated_merges_earliest_wins() {
        let mut method = AnnotatedMethod::new(MethodDef::new(widget(), "getName"), defaults());
        let first = MethodDef::new(TypeRef::new("a.First"), "getName")
            .annotate(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, false));
        let second = MethodDef::new(TypeRef::new("a.Second"), "getName")
            .annotate(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, true));

        method.merge_annotations_from(&first);
        method.merge_annotations_from(&second);
        assert!(!method.will_write_null_properties(true));
    }

    #[test]
    fn test_parameter_types_cached() {
        let handle = CountingHandle {
            def: MethodDef::new(widget(), "setSize")
                .param(TypeRef::new("int"))
                .param(TypeRef::new("int")),
            resolutions: AtomicUsize::new(0),
        };
        let method = AnnotatedMethod::new(handle, defaults());

        let first = method.parameter_types().to_vec();
        let second = method.parameter_types();
        assert_eq!(first, second);
        assert_eq!(first, vec![TypeRef::new("int"), TypeRef::new("int")]);
        assert_eq!(method.parameter_count(), 2);
        assert_eq!(method.full_name(), "com.acme.Widget#setSize(2 params)");
        assert_eq!(method.handle().resolutions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_merge_leaves_parameter_cache_untouched() {
        let handle = CountingHandle {
            def: MethodDef::new(widget(), "setName").param(TypeRef::new("String")),
            resolutions: AtomicUsize::new(0),
        };
        let mut method = AnnotatedMethod::new(handle, defaults());
        let inherited = MethodDef::new(TypeRef::new("com.acme.Named"), "setName")
            .param(TypeRef::new("String"))
            .annotate(Annotation::marker(AnnotationKind::SETTER));

        tracing::subscriber::with_default(EnableAll, || {
            method.merge_annotations_from(&inherited);
        });

        assert!(method.has_annotation(&AnnotationKind::SETTER));
        assert_eq!(method.handle().resolutions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_first_access() {
        let handle = CountingHandle {
            def: MethodDef::new(widget(), "setTags").param(TypeRef::new("java.util.List")),
            resolutions: AtomicUsize::new(0),
        };
        let method = AnnotatedMethod::new(handle, defaults());

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| method.parameter_types().to_vec()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), vec![TypeRef::new("java.util.List")]);
            }
        });
        assert_eq!(method.handle().resolutions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_full_name_is_stable() {
        let method = AnnotatedMethod::new(MethodDef::new(widget(), "getName"), defaults());
        let name = method.full_name();
        assert_eq!(name, "com.acme.Widget#getName(0 params)");
        assert_eq!(method.full_name(), name);
    }

    #[test]
    fn test_pass_through_queries() {
        let list = GenericType::Parameterized {
            raw: TypeRef::new("java.util.List"),
            args: vec![TypeRef::new("String").into()],
        };
        let def = MethodDef::new(widget(), "getTags")
            .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
            .returns(list.clone());

        let method = AnnotatedMethod::new(def, defaults());
        assert_eq!(method.name(), "getTags");
        assert_eq!(method.modifiers(), Modifiers::PUBLIC | Modifiers::FINAL);
        assert_eq!(method.return_type(), TypeRef::new("java.util.List"));
        assert_eq!(method.generic_return_type(), list);
        assert!(method.generic_parameter_types().is_empty());
        assert!(method.is_public());
    }

    #[test]
    fn test_will_write_null_properties() {
        let plain = AnnotatedMethod::new(MethodDef::new(widget(), "getName"), defaults());
        assert!(plain.will_write_null_properties(true));
        assert!(!plain.will_write_null_properties(false));

        for carried in [true, false] {
            let def = MethodDef::new(widget(), "getName")
                .annotate(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, carried));
            let method = AnnotatedMethod::new(def, defaults());
            assert_eq!(method.will_write_null_properties(true), carried);
            assert_eq!(method.will_write_null_properties(false), carried);
        }
    }

    #[test]
    fn test_unhandled_flag_falls_back_to_default() {
        let only_ignore: Arc<dyn AnnotationClassifier> =
            Arc::new(|a: &Annotation| a.kind == AnnotationKind::IGNORE);
        let def = MethodDef::new(widget(), "getName")
            .annotate(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, false));

        let method = AnnotatedMethod::new(def, only_ignore);
        assert_eq!(method.annotation_count(), 0);
        assert!(method.will_write_null_properties(true));
    }

    #[test]
    fn test_fix_access() {
        let private = MethodDef::new(widget(), "secret").with_modifiers(Modifiers::PRIVATE);
        let method = AnnotatedMethod::new(private, defaults());

        assert!(method.fix_access(&AllowAll).is_ok());

        let mut policy = AccessPolicy::new();
        policy.set_type("com.acme.Widget", InvokePermission::INVOKE_PUBLIC);
        assert!(matches!(
            method.fix_access(&policy),
            Err(IntrospectError::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_display() {
        let def = MethodDef::new(widget(), "getName")
            .annotate(Annotation::marker(AnnotationKind::GETTER))
            .annotate(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, true));
        let method = AnnotatedMethod::new(def, defaults());
        assert_eq!(
            method.to_string(),
            "[method getName, annotations: {@JsonGetter, @JsonWriteNullProperties(true)}]"
        );
    }
}
