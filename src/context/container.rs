use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use super::ContextError;
use crate::reflect::simple_name;

/// A type-erased singleton instance.
pub type SharedBean = Arc<dyn Any + Send + Sync>;

/// An object-graph container: holds singletons by type and exposes
/// configuration properties.
pub trait Container: Send + Sync {
    /// The singleton registered for `type_id`, if any.
    fn lookup(&self, type_id: TypeId) -> Option<SharedBean>;

    fn register_singleton(&self, registration: Registration) -> Result<(), ContextError>;

    fn contains_singleton(&self, type_id: TypeId) -> bool {
        self.lookup(type_id).is_some()
    }

    /// A configuration property by dotted name.
    fn property(&self, name: &str) -> Option<toml::Value>;
}

/// How a container treats a registration whose name or type is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverridePolicy {
    /// The new singleton displaces the old one.
    #[default]
    Replace,
    /// The registration fails with [`ContextError::DuplicateBean`].
    Reject,
}

/// A singleton handed to [`Container::register_singleton`].
#[derive(Debug, Clone)]
pub struct Registration {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    instance: SharedBean,
}

impl Registration {
    /// Registers `instance` under the default bean name of `T`.
    pub fn new<T: Any + Send + Sync>(instance: Arc<T>) -> Self {
        Self {
            name: default_bean_name::<T>(),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            instance,
        }
    }

    /// Builds the instance with `supplier`.
    pub fn from_supplier<T, F>(supplier: F) -> Self
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        Self::new(Arc::new(supplier()))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn instance(&self) -> &SharedBean {
        &self.instance
    }
}

/// Simple type name with a lower-case first letter: `ObjectMapper` becomes
/// `objectMapper`.
pub fn default_bean_name<T: ?Sized>() -> String {
    let simple = simple_name(type_name::<T>());
    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
