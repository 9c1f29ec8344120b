//! TOML text sources: files on disk and embedded strings.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use toml::Table;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// A TOML file merged at the root of the configuration.
///
/// An absent optional file contributes nothing; an absent required one is
/// [`ConfigError::FileNotFound`].
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    fn read(&self) -> Result<Option<String>, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound && !self.required => {
                debug!("optional config file {} not found", self.path.display());
                Ok(None)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ConfigError::FileNotFound(self.path.clone()))
            }
            Err(source) => Err(ConfigError::ReadError {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl ConfigSource for FileSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let Some(contents) = self.read()? else {
            return Ok(Vec::new());
        };
        let table: Table = toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: self.path.clone(),
            source,
        })?;
        Ok(vec![ConfigEntry::root(table)])
    }
}

/// TOML text embedded in the program, e.g. built-in defaults.
#[derive(Debug, Clone)]
pub struct InlineSource {
    contents: String,
}

impl InlineSource {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }
}

impl ConfigSource for InlineSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let table = toml::from_str(&self.contents).map_err(ConfigError::InlineParseError)?;
        Ok(vec![ConfigEntry::root(table)])
    }
}
