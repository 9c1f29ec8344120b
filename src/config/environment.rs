//! Resolved configuration exposed as named properties.

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::resolve::{lookup, resolve_references, scalar_to_string};
use super::ConfigError;

/// The merged, placeholder-resolved configuration of an application.
///
/// Properties are addressed by dotted names (`server.port`). A root key that
/// itself contains dots (`"spring.main.mode" = ...`) is found too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    table: Table,
}

impl Environment {
    /// Wraps an already resolved table.
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Parses and resolves TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let mut table: Table = toml::from_str(contents).map_err(ConfigError::InlineParseError)?;
        resolve_references(&mut table)?;
        Ok(Self::new(table))
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        lookup(&self.table, name).or_else(|| self.table.get(name))
    }

    /// Text form of a scalar property.
    pub fn property_string(&self, name: &str) -> Option<String> {
        self.property(name).and_then(scalar_to_string)
    }

    /// Deserializes the property `name`, if present.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        self.property(name)
            .map(|value| {
                value
                    .clone()
                    .try_into()
                    .map_err(|source| ConfigError::PropertyType {
                        name: name.to_string(),
                        source,
                    })
            })
            .transpose()
    }

    /// Deserializes the whole environment.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Value::Table(self.table.clone())
            .try_into()
            .map_err(ConfigError::DeserializeError)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn contains(&self, name: &str) -> bool {
        self.property(name).is_some()
    }
}
