use std::path::Path;

use serde::de::DeserializeOwned;

use super::env::EnvSource;
use super::file::{FileSource, InlineSource};
use super::resolve::resolve_references;
use super::source::{apply_entry, ConfigSource};
use super::{ConfigError, Environment};

/// Builder for layered configuration.
///
/// Sources are applied in registration order, later ones overriding earlier
/// ones. Nested tables are merged recursively; other values (including
/// arrays) are replaced entirely.
///
/// ## Placeholders
///
/// String values can reference other values using `${path.to.field}`, with an
/// optional fallback after a colon:
///
/// ```toml
/// [server]
/// host = "localhost"
/// port = 8080
/// url = "http://${server.host}:${server.port}/api"
/// admin = "${server.admin_url:http://localhost:9090}"
/// ```
///
/// Use `$$` to escape a literal `$` (e.g., `$${VAR}` becomes `${VAR}`).
///
/// ## Example
///
/// ```no_run
/// use dragon_beans::Config;
///
/// // defaults -> env overrides -> local file overrides env
/// let env = Config::builder()
///     .with_file("config/default.toml", true)
///     .with_env("MYAPP", "__")
///     .with_file("config/local.toml", false)
///     .load()?;
///
/// let port: Option<u16> = env.get("server.port")?;
/// # Ok::<(), dragon_beans::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .load() or .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl Config {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a TOML file. A missing file fails the build only if `required`.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds environment variables: `PREFIX<sep>DATABASE<sep>HOST` sets
    /// `database.host`.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds TOML text, typically compiled-in defaults.
    pub fn with_toml(self, contents: impl Into<String>) -> Self {
        self.with_source(InlineSource::new(contents))
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Loads, merges and resolves every source.
    pub fn load(self) -> Result<Environment, ConfigError> {
        let mut merged = toml::Table::new();

        for source in &self.sources {
            for entry in source.entries()? {
                apply_entry(&mut merged, entry);
            }
        }

        resolve_references(&mut merged)?;
        Ok(Environment::new(merged))
    }

    /// Loads the configuration and deserializes it into `T`.
    pub fn build<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        self.load()?.deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Deserialize;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct AppConfig {
        name: String,
        database: Database,
    }

    #[derive(Debug, Deserialize)]
    struct Database {
        host: String,
        port: u16,
        url: String,
    }

    const DEFAULTS: &str = r#"
        name = "demo"

        [database]
        host = "localhost"
        port = 5432
        url = "postgres://${database.host}:${database.port}"
    "#;

    #[test]
    fn test_later_sources_override() {
        let mut local = NamedTempFile::new().unwrap();
        writeln!(local, "[database]\nhost = \"db.internal\"").unwrap();

        let config: AppConfig = Config::builder()
            .with_toml(DEFAULTS)
            .with_file(local.path(), true)
            .build()
            .unwrap();

        assert_eq!(config.name, "demo");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.url, "postgres://db.internal:5432");
    }

    #[test]
    fn test_env_layer_between_files() {
        let env = Config::builder()
            .with_toml(DEFAULTS)
            .with_source(EnvSource::new("APP", "__").with_vars([("APP__DATABASE__PORT", "6543")]))
            .load()
            .unwrap();

        assert_eq!(env.get::<u16>("database.port").unwrap(), Some(6543));
        assert_eq!(
            env.property_string("database.url").unwrap(),
            "postgres://localhost:6543"
        );
    }

    #[test]
    fn test_optional_missing_file_is_skipped() {
        let env = Config::builder()
            .with_toml(DEFAULTS)
            .with_file("/nonexistent/local.toml", false)
            .load()
            .unwrap();

        assert_eq!(env.property_string("name").unwrap(), "demo");
    }

    #[test]
    fn test_required_missing_file_fails() {
        let result = Config::builder()
            .with_file("/nonexistent/default.toml", true)
            .load();

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
