//! Hierarchy-wide method collection
//!
//! Groups the declarations of each logical method found while walking a type
//! hierarchy into one [`AnnotatedMethod`]. Every batch of declarations is
//! tagged with its depth in the hierarchy (0 = the type being introspected,
//! 1 = its direct supertypes, ...). Batches are processed shallowest first
//! regardless of the order they were added in, so annotations on an override
//! always win over those on the declaration it overrides.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::classify::AnnotationClassifier;
use crate::handle::{MethodHandle, TypeRef};
use crate::method::AnnotatedMethod;

/// Identity of a logical method: name plus resolved parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    name: String,
    params: Vec<TypeRef>,
}

impl MethodKey {
    /// Create a key from a name and parameter types
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Key of a method handle
    pub fn of<H: MethodHandle + ?Sized>(method: &H) -> Self {
        Self::new(method.name(), method.parameter_types())
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter types
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}

/// Collects declarations level by level, then builds the method set
pub struct MethodCollector<H: MethodHandle> {
    classifier: Arc<dyn AnnotationClassifier>,
    levels: Vec<(u32, Vec<H>)>,
}

impl<H: MethodHandle> MethodCollector<H> {
    /// Create an empty collector
    pub fn new(classifier: Arc<dyn AnnotationClassifier>) -> Self {
        Self {
            classifier,
            levels: Vec::new(),
        }
    }

    /// Add the methods declared by a type at `depth` in the hierarchy
    pub fn add_level(&mut self, depth: u32, methods: impl IntoIterator<Item = H>) -> &mut Self {
        self.levels.push((depth, methods.into_iter().collect()));
        self
    }

    /// Build one annotated method per logical method
    ///
    /// The shallowest declaration of each method becomes its identity; deeper
    /// declarations only contribute annotation kinds not yet present. Within
    /// one depth, declarations are processed in the order they were added.
    pub fn collect(self) -> AnnotatedMethodSet<H> {
        let Self {
            classifier,
            mut levels,
        } = self;
        levels.sort_by_key(|(depth, _)| *depth);

        let mut set = AnnotatedMethodSet::new();
        for (depth, methods) in levels {
            for method in methods {
                let key = MethodKey::of(&method);
                match set.index.get(&key) {
                    Some(&i) => {
                        tracing::trace!(%key, depth, "merging inherited declaration");
                        set.methods[i].merge_annotations_from(&method);
                    }
                    None => {
                        tracing::trace!(%key, depth, "new logical method");
                        set.index.insert(key, set.methods.len());
                        set.methods
                            .push(AnnotatedMethod::new(method, Arc::clone(&classifier)));
                    }
                }
            }
        }

        tracing::debug!(methods = set.len(), "collected annotated methods");
        set
    }
}

/// Annotated methods keyed by logical identity, in first-seen order
pub struct AnnotatedMethodSet<H: MethodHandle> {
    methods: Vec<AnnotatedMethod<H>>,
    index: FxHashMap<MethodKey, usize>,
}

impl<H: MethodHandle> AnnotatedMethodSet<H> {
    fn new() -> Self {
        Self {
            methods: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Look up a method by key
    pub fn get(&self, key: &MethodKey) -> Option<&AnnotatedMethod<H>> {
        self.index.get(key).map(|&i| &self.methods[i])
    }

    /// Look up a method by name and parameter types
    pub fn find(&self, name: &str, params: &[TypeRef]) -> Option<&AnnotatedMethod<H>> {
        self.get(&MethodKey::new(name, params.to_vec()))
    }

    /// Number of logical methods
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Methods in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedMethod<H>> {
        self.methods.iter()
    }
}
