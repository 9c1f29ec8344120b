//! Application context: the singleton container and its environment.

mod container;
mod error;

use std::any::TypeId;

use dashmap::DashMap;
use log::debug;

use crate::config::Environment;

pub use container::{default_bean_name, Container, OverridePolicy, Registration, SharedBean};
pub use error::ContextError;

/// Central application context holding configuration, the property
/// environment and registered singletons.
///
/// Generic over a typed configuration `C`, deserialized once at build time
/// and read via [`config()`](Self::config).
///
/// ## Example
///
/// ```
/// use std::any::TypeId;
/// use std::sync::Arc;
///
/// use dragon_beans::{AppContext, Config, Container, Registration};
///
/// struct Mailer;
///
/// let ctx = AppContext::builder()
///     .with_environment(Config::builder().with_toml("[mail]\nhost = \"smtp\"").load()?)
///     .build();
///
/// ctx.register_singleton(Registration::new(Arc::new(Mailer)))?;
/// assert!(ctx.contains_singleton(TypeId::of::<Mailer>()));
/// assert_eq!(ctx.environment().property_string("mail.host").as_deref(), Some("smtp"));
/// # Ok::<(), dragon_beans::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext<C = ()> {
    config: C,
    environment: Environment,
    singletons: DashMap<TypeId, Registration>,
    names: DashMap<String, TypeId>,
    policy: OverridePolicy,
}

impl<C> AppContext<C> {
    /// Returns a reference to the typed configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn override_policy(&self) -> OverridePolicy {
        self.policy
    }

    /// The singleton registered under `name`.
    pub fn lookup_named(&self, name: &str) -> Option<SharedBean> {
        let type_id = *self.names.get(name)?.value();
        self.singletons
            .get(&type_id)
            .map(|entry| entry.value().instance().clone())
    }

    /// Names of all registered singletons, sorted.
    pub fn bean_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl AppContext<()> {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder<()> {
        AppContextBuilder {
            config: (),
            environment: Environment::default(),
            policy: OverridePolicy::default(),
        }
    }
}

impl<C: Send + Sync> Container for AppContext<C> {
    fn lookup(&self, type_id: TypeId) -> Option<SharedBean> {
        self.singletons
            .get(&type_id)
            .map(|entry| entry.value().instance().clone())
    }

    fn register_singleton(&self, registration: Registration) -> Result<(), ContextError> {
        let name = registration.name().to_string();
        let type_id = registration.type_id();

        if self.policy == OverridePolicy::Reject
            && (self.names.contains_key(&name) || self.singletons.contains_key(&type_id))
        {
            return Err(ContextError::DuplicateBean(name));
        }

        debug!("registering singleton '{}' ({})", name, registration.type_name());

        if let Some(previous) = self.singletons.insert(type_id, registration) {
            if previous.name() != name {
                self.names.remove(previous.name());
            }
        }
        if let Some(displaced) = self.names.insert(name, type_id) {
            if displaced != type_id {
                self.singletons.remove(&displaced);
            }
        }
        Ok(())
    }

    fn contains_singleton(&self, type_id: TypeId) -> bool {
        self.singletons.contains_key(&type_id)
    }

    fn property(&self, name: &str) -> Option<toml::Value> {
        self.environment.property(name).cloned()
    }
}

/// Builder for constructing an [`AppContext`].
///
/// The builder starts with the unit config (`AppContextBuilder<()>`) and
/// transitions to `AppContextBuilder<C>` when
/// [`with_config`](Self::with_config) is called.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder<C> {
    config: C,
    environment: Environment,
    policy: OverridePolicy,
}

impl AppContextBuilder<()> {
    /// Attaches a typed configuration, usually the result of
    /// [`Config::build`](crate::Config::build) or
    /// [`Environment::deserialize`].
    pub fn with_config<C>(self, config: C) -> AppContextBuilder<C> {
        AppContextBuilder {
            config,
            environment: self.environment,
            policy: self.policy,
        }
    }
}

impl<C> AppContextBuilder<C> {
    /// Sets the environment serving [`Container::property`].
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn override_policy(mut self, policy: OverridePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> AppContext<C> {
        AppContext {
            config: self.config,
            environment: self.environment,
            singletons: DashMap::new(),
            names: DashMap::new(),
            policy: self.policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Repo(u32);

    #[derive(Debug)]
    struct Cache;

    #[test]
    fn test_register_and_lookup() {
        let ctx = AppContext::builder().build();
        ctx.register_singleton(Registration::new(Arc::new(Repo(1))))
            .unwrap();

        let bean = ctx.lookup(TypeId::of::<Repo>()).unwrap();
        assert_eq!(*bean.downcast::<Repo>().unwrap(), Repo(1));
        assert!(ctx.contains_singleton(TypeId::of::<Repo>()));
        assert!(!ctx.contains_singleton(TypeId::of::<Cache>()));
        assert!(ctx.lookup_named("repo").is_some());
    }

    #[test]
    fn test_replace_policy_overrides() {
        let ctx = AppContext::builder().build();
        ctx.register_singleton(Registration::new(Arc::new(Repo(1))))
            .unwrap();
        ctx.register_singleton(Registration::new(Arc::new(Repo(2))).named("primaryRepo"))
            .unwrap();

        let bean = ctx.lookup(TypeId::of::<Repo>()).unwrap();
        assert_eq!(*bean.downcast::<Repo>().unwrap(), Repo(2));
        assert_eq!(ctx.bean_names(), ["primaryRepo"]);
    }

    #[test]
    fn test_name_taken_by_other_type_is_displaced() {
        let ctx = AppContext::builder().build();
        ctx.register_singleton(Registration::new(Arc::new(Repo(1))).named("store"))
            .unwrap();
        ctx.register_singleton(Registration::new(Arc::new(Cache)).named("store"))
            .unwrap();

        assert!(!ctx.contains_singleton(TypeId::of::<Repo>()));
        assert!(ctx.contains_singleton(TypeId::of::<Cache>()));
    }

    #[test]
    fn test_reject_policy() {
        let ctx = AppContext::builder()
            .override_policy(OverridePolicy::Reject)
            .build();
        ctx.register_singleton(Registration::new(Arc::new(Repo(1))))
            .unwrap();

        let by_type = ctx.register_singleton(Registration::new(Arc::new(Repo(2))).named("other"));
        assert!(matches!(by_type, Err(ContextError::DuplicateBean(_))));

        let by_name = ctx.register_singleton(Registration::new(Arc::new(Cache)).named("repo"));
        assert!(matches!(by_name, Err(ContextError::DuplicateBean(ref n)) if n == "repo"));

        let bean = ctx.lookup(TypeId::of::<Repo>()).unwrap();
        assert_eq!(*bean.downcast::<Repo>().unwrap(), Repo(1));
    }

    #[test]
    fn test_typed_config_and_properties() {
        #[derive(Debug, Deserialize)]
        struct AppConfig {
            name: String,
        }

        let environment = Environment::from_toml("name = \"demo\"\n[server]\nport = 80").unwrap();
        let config: AppConfig = environment.deserialize().unwrap();
        let ctx = AppContext::builder()
            .with_config(config)
            .with_environment(environment)
            .build();

        assert_eq!(ctx.config().name, "demo");
        assert_eq!(ctx.property("server.port"), Some(toml::Value::Integer(80)));
        assert_eq!(ctx.property("server.host"), None);
    }
}
