use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::context::ContextError;
use crate::reflect::ReflectError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BeanError {
    #[error("container not ready after waiting {waited:?}")]
    ContainerNotReady { waited: Duration },

    #[error("no bean of type '{type_name}' after waiting {waited:?}")]
    BeanNotFound {
        type_name: &'static str,
        waited: Duration,
    },

    #[error("a container is already bound")]
    AlreadyBound,

    #[error("bean registered for '{type_name}' has a different type")]
    TypeMismatch { type_name: &'static str },

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
