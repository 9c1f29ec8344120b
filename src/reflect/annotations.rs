use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use super::{FieldDescriptor, Introspector, Marker, MarkerId, Reflect, TypeDescriptor};

/// Memoized lookup of fields by marker.
///
/// Results follow descriptor order: the most-derived type's own fields
/// first, then inherited fields.
#[derive(Debug, Default)]
pub struct AnnotationIndex {
    storage: DashMap<(TypeId, MarkerId), Arc<[FieldDescriptor]>>,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields_by_marker(
        &self,
        descriptor: &TypeDescriptor,
        marker: MarkerId,
    ) -> Arc<[FieldDescriptor]> {
        let key = (descriptor.type_id(), marker);
        if let Some(hit) = self.storage.get(&key) {
            return Arc::clone(hit.value());
        }

        let matched: Arc<[FieldDescriptor]> = descriptor
            .fields()
            .iter()
            .filter(|field| field.has_marker(marker))
            .cloned()
            .collect();
        Arc::clone(self.storage.entry(key).or_insert(matched).value())
    }

    pub fn clear(&self) {
        self.storage.clear();
    }
}

impl Introspector {
    /// Fields of `T` tagged with `M`; empty when none are.
    pub fn fields_by_annotation<T: Reflect, M: Marker>(&self) -> Vec<FieldDescriptor> {
        self.fields_by_marker::<T>(MarkerId::of::<M>())
    }

    pub fn fields_by_marker<T: Reflect>(&self, marker: MarkerId) -> Vec<FieldDescriptor> {
        let descriptor = self.reflection_storage::<T>();
        self.annotations
            .fields_by_marker(&descriptor, marker)
            .to_vec()
    }

    /// First field of `T` tagged with `M`.
    pub fn field_by_annotation<T: Reflect, M: Marker>(&self) -> Option<FieldDescriptor> {
        let descriptor = self.reflection_storage::<T>();
        self.annotations
            .fields_by_marker(&descriptor, MarkerId::of::<M>())
            .first()
            .cloned()
    }

    /// The field called `name` (when non-empty and present) together with
    /// every field carrying any of `markers`.
    pub fn fields<T: Reflect>(&self, name: &str, markers: &[MarkerId]) -> HashSet<FieldDescriptor> {
        let descriptor = self.reflection_storage::<T>();
        let mut result = HashSet::new();

        if !name.is_empty() {
            if let Some(field) = descriptor.field(name) {
                result.insert(field.clone());
            }
        }
        for &marker in markers {
            result.extend(
                self.annotations
                    .fields_by_marker(&descriptor, marker)
                    .iter()
                    .cloned(),
            );
        }
        result
    }
}
