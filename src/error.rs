use thiserror::Error;

use crate::beans::BeanError;
use crate::config::ConfigError;
use crate::context::ContextError;
use crate::reflect::{CoercionError, ReflectError};

/// Top-level error type for the dragon-beans library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("context error: {0}")]
    Context(#[from] ContextError),

    #[error("reflection error: {0}")]
    Reflect(#[from] ReflectError),

    #[error("coercion error: {0}")]
    Coercion(#[from] CoercionError),

    #[error("bean error: {0}")]
    Bean(#[from] BeanError),
}
