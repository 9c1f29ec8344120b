//! Cached field-level introspection.
//!
//! Rust has no runtime reflection, so each participating type carries a
//! generated accessor table: the [`reflect!`](crate::reflect!) macro implements
//! [`Reflect`] for a struct, listing its fields, their declared types and
//! their annotation markers. An [`Introspector`] memoizes the resulting
//! [`TypeDescriptor`]s and builds field access, copy/merge and annotation
//! queries on top of them.
//!
//! ## Example
//!
//! ```
//! use dragon_beans::{marker, reflect, Introspector, Value};
//!
//! marker!(pub Column);
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     name: Option<String>,
//!     age: Option<i32>,
//! }
//!
//! reflect! {
//!     User {
//!         #[mark(Column)] name: Option<String>,
//!         age: Option<i32>,
//!     }
//! }
//!
//! let introspector = Introspector::new();
//! let mut user = User::default();
//! introspector.set_value(&mut user, "age", "7")?;
//! assert_eq!(user.age, Some(7));
//! assert_eq!(introspector.get_value(&user, "name")?, Value::Null);
//! # Ok::<(), dragon_beans::ReflectError>(())
//! ```

mod accessor;
mod annotations;
mod cache;
mod descriptor;
mod error;
mod macros;
mod mapper;
mod value;

#[cfg(test)]
pub(crate) mod fixtures;

pub use annotations::AnnotationIndex;
pub use cache::MetadataCache;
pub use descriptor::{FieldDescriptor, Marker, MarkerId, TypeDescriptor};
pub use error::{CoercionError, ReflectError};
pub use value::{FieldType, FieldValue, Kind, Value};

/// Field access capability for a type, normally implemented by
/// [`reflect!`](crate::reflect!).
///
/// `get` and `set` return `None` when the type has no field of that name.
/// Fields of an embedded parent are reachable through the child.
pub trait Reflect: Send + Sync + 'static {
    /// Lists own fields in declaration order, followed by inherited ones.
    fn describe() -> Vec<FieldDescriptor>
    where
        Self: Sized;

    fn get(&self, name: &str) -> Option<Value>;

    fn set(&mut self, name: &str, value: Value) -> Option<Result<(), CoercionError>>;
}

/// Entry point for reflective operations.
///
/// Owns the descriptor cache and the annotation index. Construct one at
/// startup and share it (it is `Send + Sync`); drop it, or call
/// [`MetadataCache::clear`], to reset.
#[derive(Debug, Default)]
pub struct Introspector {
    cache: MetadataCache,
    annotations: AnnotationIndex,
}

impl Introspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn annotations(&self) -> &AnnotationIndex {
        &self.annotations
    }

    /// Returns the cached descriptor of `T`, computing it on first use.
    pub fn reflection_storage<T: Reflect>(&self) -> std::sync::Arc<TypeDescriptor> {
        self.cache.reflection_storage::<T>()
    }
}

/// Last path segment of a type name with generic arguments removed,
/// e.g. `my_app::repo::UserRepo<Pg>` becomes `UserRepo`.
pub(crate) fn simple_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("alloc::string::String"), "String");
        assert_eq!(simple_name("app::Repo<alloc::string::String>"), "Repo");
        assert_eq!(simple_name("User"), "User");
    }
}
