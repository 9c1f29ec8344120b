//! Deferred singleton registry.
//!
//! [`Beans`] resolves typed singletons from a container that is bound
//! later, by bootstrap code, possibly on another thread. Lookups made before
//! the container is bound wait for it for a bounded time, and lookups of a
//! bean not yet registered wait for that bean the same way. Resolved beans
//! are memoized, so the container is asked at most once per type.
//!
//! ```
//! use std::sync::Arc;
//!
//! use dragon_beans::{AppContext, Beans};
//!
//! struct Clock;
//!
//! let beans = Beans::new();
//! beans.bind(Arc::new(AppContext::builder().build()))?;
//! let clock = beans.register(Clock)?;
//! assert!(Arc::ptr_eq(&clock, &beans.of::<Clock>()?));
//! # Ok::<(), dragon_beans::BeanError>(())
//! ```

mod error;
mod handle;
mod settings;

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, trace, warn};
use serde::de::DeserializeOwned;

use crate::config::{scalar_to_string, ConfigError};
use crate::context::{default_bean_name, Container, Registration, SharedBean};
use crate::reflect::{Introspector, Reflect, Value};
use crate::scan::{self, ClassScan};

pub use error::BeanError;
pub use handle::ContainerHandle;
pub use settings::{BeansSettings, WaitPolicy};

pub struct Beans {
    handle: ContainerHandle,
    cache: DashMap<TypeId, SharedBean>,
    introspector: Arc<Introspector>,
    settings: BeansSettings,
}

impl Beans {
    pub fn new() -> Self {
        Self::with_settings(BeansSettings::default())
    }

    pub fn with_settings(settings: BeansSettings) -> Self {
        Self {
            handle: ContainerHandle::new(),
            cache: DashMap::new(),
            introspector: Arc::new(Introspector::new()),
            settings,
        }
    }

    /// Shares an existing [`Introspector`] for [`register_with`](Self::register_with).
    pub fn with_introspector(mut self, introspector: Arc<Introspector>) -> Self {
        self.introspector = introspector;
        self
    }

    pub fn settings(&self) -> &BeansSettings {
        &self.settings
    }

    pub fn introspector(&self) -> &Introspector {
        &self.introspector
    }

    /// Binds the container. Allowed once; wakes every waiting lookup.
    pub fn bind(&self, container: Arc<dyn Container>) -> Result<(), BeanError> {
        self.handle.bind(container)
    }

    pub fn is_ready(&self) -> bool {
        self.handle.is_ready()
    }

    /// The bound container, waiting up to the context window for it.
    pub fn container(&self) -> Result<Arc<dyn Container>, BeanError> {
        if let Some(container) = self.handle.current() {
            return Ok(container);
        }
        let policy = self.settings.context_wait();
        self.handle
            .wait_for(policy, || self.handle.current())
            .ok_or_else(|| {
                warn!("container not bound after {:?}", policy.window());
                BeanError::ContainerNotReady {
                    waited: policy.window(),
                }
            })
    }

    /// The singleton of type `T`.
    ///
    /// Served from the cache when present. Otherwise waits for the container
    /// and then for a `T` to be registered in it, each for its own bounded
    /// window. A resolved bean is cached for later calls.
    pub fn of<T: Any + Send + Sync>(&self) -> Result<Arc<T>, BeanError> {
        let type_id = TypeId::of::<T>();
        if let Some(bean) = self.cache.get(&type_id) {
            trace!("bean cache hit for {}", type_name::<T>());
            return downcast(bean.value().clone());
        }

        let container = self.container()?;
        let policy = self.settings.bean_wait();
        let bean = self
            .handle
            .wait_for(policy, || container.lookup(type_id))
            .ok_or_else(|| {
                warn!(
                    "no bean of type {} after {:?}",
                    type_name::<T>(),
                    policy.window()
                );
                BeanError::BeanNotFound {
                    type_name: type_name::<T>(),
                    waited: policy.window(),
                }
            })?;

        debug!("resolved bean {}", type_name::<T>());
        let bean = self.cache.entry(type_id).or_insert(bean).value().clone();
        downcast(bean)
    }

    /// Like [`of`](Self::of) but never waits.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let type_id = TypeId::of::<T>();
        if let Some(bean) = self.cache.get(&type_id) {
            return downcast(bean.value().clone()).ok();
        }
        let bean = self.handle.current()?.lookup(type_id)?;
        let bean = self.cache.entry(type_id).or_insert(bean).value().clone();
        downcast(bean).ok()
    }

    /// Caches `instance` without registering it in the container. An
    /// already cached `T` wins and is returned instead.
    pub fn add<T: Any + Send + Sync>(&self, instance: T) -> Result<Arc<T>, BeanError> {
        let bean = self
            .cache
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(instance) as SharedBean)
            .value()
            .clone();
        downcast(bean)
    }

    /// Registers `instance` in the container under its default bean name
    /// and caches it.
    pub fn register<T: Any + Send + Sync>(&self, instance: T) -> Result<Arc<T>, BeanError> {
        self.register_named(default_bean_name::<T>(), instance)
    }

    /// Registers `instance` in the container under `name`.
    ///
    /// The cache is write-once per type: if a `T` was already resolved, that
    /// instance stays cached and is returned.
    pub fn register_named<T: Any + Send + Sync>(
        &self,
        name: impl Into<String>,
        instance: T,
    ) -> Result<Arc<T>, BeanError> {
        let container = self.container()?;
        let bean = Arc::new(instance);
        container.register_singleton(Registration::new(Arc::clone(&bean)).named(name))?;
        let cached = self
            .cache
            .entry(TypeId::of::<T>())
            .or_insert(bean as SharedBean)
            .value()
            .clone();
        debug!("registered bean {}", type_name::<T>());
        self.handle.notify();
        downcast(cached)
    }

    /// Builds a `T` from its default, sets each named field, then registers it.
    pub fn register_with<T, I, K, V>(&self, properties: I) -> Result<Arc<T>, BeanError>
    where
        T: Reflect + Default + Send + Sync + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut instance = T::default();
        for (name, value) in properties {
            self.introspector
                .set_value(&mut instance, name.as_ref(), value)?;
        }
        self.register(instance)
    }

    /// Text form of the property `name`, empty when absent.
    pub fn get_property(&self, name: &str) -> Result<String, BeanError> {
        self.get_property_or(name, "")
    }

    pub fn get_property_or(&self, name: &str, default: &str) -> Result<String, BeanError> {
        Ok(self
            .property(name)?
            .as_ref()
            .and_then(scalar_to_string)
            .unwrap_or_else(|| default.to_string()))
    }

    /// Deserializes the property `name`, if present.
    pub fn get_property_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, BeanError> {
        let Some(value) = self.property(name)? else {
            return Ok(None);
        };
        let typed = value.try_into().map_err(|source| ConfigError::PropertyType {
            name: name.to_string(),
            source,
        })?;
        Ok(Some(typed))
    }

    pub fn get_property_as_or<T: DeserializeOwned>(
        &self,
        name: &str,
        default: T,
    ) -> Result<T, BeanError> {
        Ok(self.get_property_as(name)?.unwrap_or(default))
    }

    /// Discoverable types under `namespace` that the bound container does
    /// not already hold.
    pub fn find_classes(&self, namespace: &str) -> Result<ClassScan, BeanError> {
        Ok(scan::find_classes(namespace, self.container()?))
    }

    /// Like [`find_classes`](Self::find_classes), scanning the module that
    /// declares `T`.
    pub fn find_classes_near<T: ?Sized>(&self) -> Result<ClassScan, BeanError> {
        Ok(scan::find_classes_near::<T>(self.container()?))
    }

    /// Forgets every memoized bean. The container is untouched.
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("bean cache cleared");
    }

    fn property(&self, name: &str) -> Result<Option<toml::Value>, BeanError> {
        self.container()?;
        Ok(self
            .handle
            .with_container(|container| container.property(name))
            .flatten())
    }
}

impl Default for Beans {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Beans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Beans")
            .field("handle", &self.handle)
            .field("cached", &self.cache.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn downcast<T: Any + Send + Sync>(bean: SharedBean) -> Result<Arc<T>, BeanError> {
    bean.downcast::<T>().map_err(|_| BeanError::TypeMismatch {
        type_name: type_name::<T>(),
    })
}
