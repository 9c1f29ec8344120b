//! Configuration loading and property lookup.

mod builder;
mod env;
mod environment;
mod error;
mod file;
mod resolve;
mod source;

pub use builder::Config;
pub use env::EnvSource;
pub use environment::Environment;
pub use error::ConfigError;
pub use file::{FileSource, InlineSource};
pub use source::{ConfigEntry, ConfigSource};

pub(crate) use resolve::scalar_to_string;
