//! Annotation classification
//!
//! Decides which annotation kinds the mapper tracks. Anything the
//! classifier rejects is never stored on an annotated member.

use rustc_hash::FxHashSet;

use crate::annotation::{Annotation, AnnotationKind};

/// Authority deciding whether an annotation is relevant to the mapper
pub trait AnnotationClassifier: Send + Sync {
    /// Whether `annotation` should be recorded
    fn is_handled(&self, annotation: &Annotation) -> bool;
}

impl<F> AnnotationClassifier for F
where
    F: Fn(&Annotation) -> bool + Send + Sync,
{
    fn is_handled(&self, annotation: &Annotation) -> bool {
        self(annotation)
    }
}

/// Lookup table of handled annotation kinds
#[derive(Debug, Clone, Default)]
pub struct KindTable {
    kinds: FxHashSet<AnnotationKind>,
}

impl KindTable {
    /// Create an empty table (handles nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the kinds the mapper ships with
    pub fn framework_defaults() -> Self {
        [
            AnnotationKind::WRITE_NULL_PROPERTIES,
            AnnotationKind::IGNORE,
            AnnotationKind::PROPERTY,
            AnnotationKind::GETTER,
            AnnotationKind::SETTER,
        ]
        .into_iter()
        .collect()
    }

    /// Add a handled kind
    pub fn insert(&mut self, kind: AnnotationKind) -> bool {
        self.kinds.insert(kind)
    }

    /// Check if a kind is handled
    pub fn handles(&self, kind: &AnnotationKind) -> bool {
        self.kinds.contains(kind)
    }

    /// Number of handled kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl FromIterator<AnnotationKind> for KindTable {
    fn from_iter<I: IntoIterator<Item = AnnotationKind>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

impl AnnotationClassifier for KindTable {
    fn is_handled(&self, annotation: &Annotation) -> bool {
        self.handles(&annotation.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_defaults() {
        let table = KindTable::framework_defaults();
        assert_eq!(table.len(), 5);
        assert!(table.is_handled(&Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, true)));
        assert!(table.is_handled(&Annotation::marker(AnnotationKind::IGNORE)));
        assert!(!table.is_handled(&Annotation::marker(AnnotationKind::new("Deprecated"))));
    }

    #[test]
    fn test_custom_table() {
        let mut table = KindTable::new();
        assert!(table.is_empty());
        assert!(table.insert(AnnotationKind::new("XmlElement")));
        assert!(!table.insert(AnnotationKind::new("XmlElement")));
        assert!(table.handles(&AnnotationKind::new("XmlElement")));
        assert!(!table.handles(&AnnotationKind::IGNORE));
    }

    #[test]
    fn test_closure_classifier() {
        let json_only = |a: &Annotation| a.kind.as_str().starts_with("Json");
        assert!(json_only.is_handled(&Annotation::marker(AnnotationKind::GETTER)));
        assert!(!json_only.is_handled(&Annotation::marker(AnnotationKind::new("Override"))));
    }
}
