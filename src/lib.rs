//! Field-level reflection, layered configuration and a deferred singleton
//! registry.
//!
//! - [`reflect`]: cached field metadata, get/set by name, object mapping and
//!   marker-based field lookup for types implementing [`Reflect`].
//! - [`config`]: file, inline and environment sources merged into an
//!   [`Environment`] of dotted properties.
//! - [`context`]: [`AppContext`], the default [`Container`].
//! - [`beans`]: [`Beans`], typed singletons from a container bound later.
//! - [`scan`]: link-time type discovery by module namespace.

pub mod beans;
pub mod config;
pub mod context;
mod error;
pub mod reflect;
pub mod scan;

pub use beans::{BeanError, Beans, BeansSettings, ContainerHandle, WaitPolicy};
pub use config::{Config, ConfigError, Environment};
pub use context::{
    AppContext, AppContextBuilder, Container, ContextError, OverridePolicy, Registration, SharedBean,
};
pub use error::Error;
pub use reflect::{
    AnnotationIndex, CoercionError, FieldDescriptor, FieldType, FieldValue, Introspector, Kind, Marker,
    MarkerId, MetadataCache, Reflect, ReflectError, TypeDescriptor, Value,
};
pub use scan::{find_classes, find_classes_near, ClassScan, Discoverable};

#[doc(hidden)]
pub use inventory;
