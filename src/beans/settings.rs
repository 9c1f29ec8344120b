use std::time::Duration;

use serde::Deserialize;

use crate::config::{ConfigError, Environment};

/// Bounded-wait settings, read from the `[beans]` table.
///
/// ```toml
/// [beans]
/// poll_interval_ms = 100
/// context_retries = 100   # ~10 s for the container to come up
/// bean_retries = 50       # ~5 s for a bean to be registered
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeansSettings {
    pub poll_interval_ms: u64,
    pub context_retries: u32,
    pub bean_retries: u32,
}

impl Default for BeansSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            context_retries: 100,
            bean_retries: 50,
        }
    }
}

impl BeansSettings {
    /// Reads the `[beans]` table, falling back to defaults when absent.
    pub fn from_environment(environment: &Environment) -> Result<Self, ConfigError> {
        Ok(environment.get("beans")?.unwrap_or_default())
    }

    /// How long to wait for the container to be bound.
    pub fn context_wait(&self) -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(self.poll_interval_ms), self.context_retries)
    }

    /// How long to wait for a bean to appear in a bound container.
    pub fn bean_wait(&self) -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(self.poll_interval_ms), self.bean_retries)
    }
}

/// A fixed poll interval and a maximum number of polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    interval: Duration,
    retries: u32,
}

impl WaitPolicy {
    pub fn new(interval: Duration, retries: u32) -> Self {
        Self { interval, retries }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Total time a wait may take: `interval × retries`.
    pub fn window(&self) -> Duration {
        self.interval.saturating_mul(self.retries)
    }
}
