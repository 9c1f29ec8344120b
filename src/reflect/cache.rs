use std::any::{type_name, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use log::trace;

use super::{FieldDescriptor, Reflect, TypeDescriptor};

/// Memoized per-type field metadata.
///
/// Descriptors are computed lazily on first request and shared as
/// `Arc<TypeDescriptor>`. A descriptor is a pure function of its type, so two
/// threads racing on the first computation build equal values; the map entry
/// decides which one is kept and every caller gets that one.
#[derive(Debug, Default)]
pub struct MetadataCache {
    storage: DashMap<TypeId, Arc<TypeDescriptor>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reflection_storage<T: Reflect>(&self) -> Arc<TypeDescriptor> {
        let key = TypeId::of::<T>();
        if let Some(hit) = self.storage.get(&key) {
            return Arc::clone(hit.value());
        }

        // Built outside the shard lock; describe() may be slow for wide types.
        let computed = Arc::new(TypeDescriptor::build::<T>());
        trace!(
            "computed descriptor for {} ({} fields)",
            type_name::<T>(),
            computed.len()
        );

        Arc::clone(self.storage.entry(key).or_insert(computed).value())
    }

    /// The field reached when accessing `name` on a `T`.
    pub fn field<T: Reflect>(&self, name: &str) -> Option<FieldDescriptor> {
        self.reflection_storage::<T>().field(name).cloned()
    }

    /// Drops the cached descriptor of `T`. Returns whether one was cached.
    pub fn evict<T: Reflect>(&self) -> bool {
        self.storage.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn clear(&self) {
        self.storage.clear();
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::reflect::fixtures::{Account, Person, User};
    use crate::reflect::Kind;

    fn names(descriptor: &TypeDescriptor) -> Vec<&'static str> {
        descriptor.fields().iter().map(|f| f.name()).collect()
    }

    #[test]
    fn test_declared_fields_in_order() {
        let cache = MetadataCache::new();
        let descriptor = cache.reflection_storage::<Person>();

        assert_eq!(names(&descriptor), ["id", "name", "age", "born", "token"]);
        assert_eq!(descriptor.field("age").unwrap().field_type().kind(), Kind::Int);
        assert!(!descriptor.field("age").unwrap().field_type().is_nullable());
        assert!(descriptor.field("born").unwrap().field_type().is_nullable());
    }

    #[test]
    fn test_inherited_fields_follow_own_fields() {
        let cache = MetadataCache::new();
        let descriptor = cache.reflection_storage::<Account>();

        assert_eq!(names(&descriptor), ["login", "balance", "id", "created_at"]);
        assert!(descriptor
            .field("id")
            .unwrap()
            .declaring_type()
            .ends_with("Entity"));
    }

    #[test]
    fn test_second_call_returns_cached_instance() {
        let cache = MetadataCache::new();
        let first = cache.reflection_storage::<User>();
        let second = cache.reflection_storage::<User>();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(names(&first), names(&second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_first_computation() {
        let cache = Arc::new(MetadataCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.reflection_storage::<Person>())
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = cache.reflection_storage::<Person>();
        for result in &results {
            assert!(Arc::ptr_eq(result, &cached));
        }
    }

    #[test]
    fn test_evict_and_clear() {
        let cache = MetadataCache::new();
        let before = cache.reflection_storage::<User>();
        cache.reflection_storage::<Person>();

        assert!(cache.evict::<User>());
        assert!(!cache.evict::<User>());
        let after = cache.reflection_storage::<User>();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(names(&before), names(&after));

        cache.clear();
        assert!(cache.is_empty());
    }
}
