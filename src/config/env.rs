//! Environment variable source.

use toml::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Maps `PREFIX<sep>A<sep>B=value` variables to the config path `a.b`.
///
/// Values are coerced to the most specific scalar: boolean, integer, float,
/// then string.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
    // Fixed variable set; `None` reads the process environment.
    vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
            vars: None,
        }
    }

    /// Reads from `vars` instead of the process environment.
    pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    fn entry_for(&self, key: &str, value: &str) -> Option<ConfigEntry> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let path_str = key.strip_prefix(&prefix_with_sep)?;
        if path_str.is_empty() {
            return None;
        }

        let path = path_str
            .split(&self.separator)
            .map(str::to_lowercase)
            .collect();
        Some(ConfigEntry::at_path(path, coerce_value(value)))
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let mut entries: Vec<ConfigEntry> = match &self.vars {
            Some(vars) => vars
                .iter()
                .filter_map(|(k, v)| self.entry_for(k, v))
                .collect(),
            None => std::env::vars()
                .filter_map(|(k, v)| self.entry_for(&k, &v))
                .collect(),
        };
        // Deterministic layering when two variables address overlapping paths.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
