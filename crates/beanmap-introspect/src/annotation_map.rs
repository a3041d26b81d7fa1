//! Kind-keyed annotation collection
//!
//! Keeps at most one annotation per kind, in first-insertion order. Once a
//! kind is present it is never replaced.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::annotation::{Annotation, AnnotationKind};

/// Annotations owned by a single member
#[derive(Debug, Clone, Default)]
pub struct AnnotationMap {
    /// Annotations in insertion order
    items: Vec<Annotation>,
    /// Kind to position in `items`
    index: FxHashMap<AnnotationKind, usize>,
}

impl AnnotationMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an annotation unless one of the same kind is already present
    ///
    /// Returns true if the annotation was stored.
    pub fn add(&mut self, annotation: Annotation) -> bool {
        if self.index.contains_key(&annotation.kind) {
            return false;
        }
        self.index.insert(annotation.kind.clone(), self.items.len());
        self.items.push(annotation);
        true
    }

    /// Insert an annotation found on another declaration of the same member
    pub fn add_if_not_present(&mut self, annotation: Annotation) -> bool {
        self.add(annotation)
    }

    /// Look up the annotation of a kind
    pub fn get(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.index.get(kind).map(|&i| &self.items[i])
    }

    /// Check if an annotation of a kind is present
    pub fn contains(&self, kind: &AnnotationKind) -> bool {
        self.index.contains_key(kind)
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Annotations in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }
}

impl fmt::Display for AnnotationMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, annotation) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", annotation)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationValue;

    #[test]
    fn test_add_and_get() {
        let mut map = AnnotationMap::new();
        assert!(map.is_empty());

        assert!(map.add(Annotation::marker(AnnotationKind::IGNORE)));
        assert_eq!(map.len(), 1);
        assert!(map.contains(&AnnotationKind::IGNORE));
        assert_eq!(
            map.get(&AnnotationKind::IGNORE),
            Some(&Annotation::marker(AnnotationKind::IGNORE))
        );
        assert_eq!(map.get(&AnnotationKind::PROPERTY), None);
    }

    #[test]
    fn test_first_writer_wins() {
        let mut map = AnnotationMap::new();
        map.add(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, true));

        assert!(!map.add(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, false)));
        assert!(!map.add_if_not_present(Annotation::flag(
            AnnotationKind::WRITE_NULL_PROPERTIES,
            false
        )));

        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get(&AnnotationKind::WRITE_NULL_PROPERTIES).map(|a| &a.value),
            Some(&AnnotationValue::Bool(true))
        );
    }

    #[test]
    fn test_insertion_order() {
        let mut map = AnnotationMap::new();
        map.add(Annotation::marker(AnnotationKind::SETTER));
        map.add(Annotation::marker(AnnotationKind::IGNORE));
        map.add(Annotation::marker(AnnotationKind::SETTER));
        map.add(Annotation::marker(AnnotationKind::GETTER));

        let kinds: Vec<_> = map.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["JsonSetter", "JsonIgnore", "JsonGetter"]);
    }

    #[test]
    fn test_display() {
        let mut map = AnnotationMap::new();
        assert_eq!(map.to_string(), "{}");
        map.add(Annotation::marker(AnnotationKind::IGNORE));
        map.add(Annotation::flag(AnnotationKind::WRITE_NULL_PROPERTIES, true));
        assert_eq!(map.to_string(), "{@JsonIgnore, @JsonWriteNullProperties(true)}");
    }
}
