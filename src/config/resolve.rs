//! Placeholder resolution for configuration values.
//!
//! String values can embed `${section.field}` placeholders referring to other
//! values of the merged configuration. `${section.field:fallback}` substitutes
//! `fallback` when the path is absent. `$$` produces a literal `$`, and the
//! result of an escape is never expanded again.

use std::iter::Peekable;
use std::str::Chars;

use super::ConfigError;
use toml::{Table, Value};

/// Expands every placeholder in `table`, following chains of references.
pub fn resolve_references(table: &mut Table) -> Result<(), ConfigError> {
    let root = table.clone();
    let mut resolver = Resolver {
        root: &root,
        stack: Vec::new(),
    };
    resolver.resolve_table(table)
}

/// Looks up a dotted path, e.g. `server.port`.
pub fn lookup<'a>(root: &'a Table, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

/// Text form of a scalar value; `None` for arrays and tables.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(dt) => Some(dt.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

struct Resolver<'a> {
    root: &'a Table,
    // Paths being expanded, innermost last.
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn resolve_table(&mut self, table: &mut Table) -> Result<(), ConfigError> {
        for (_key, value) in table.iter_mut() {
            self.resolve_value(value)?;
        }
        Ok(())
    }

    fn resolve_value(&mut self, value: &mut Value) -> Result<(), ConfigError> {
        match value {
            Value::String(s) => {
                *s = self.expand(s)?;
                Ok(())
            }
            Value::Table(t) => self.resolve_table(t),
            Value::Array(items) => items.iter_mut().try_for_each(|item| self.resolve_value(item)),
            _ => Ok(()),
        }
    }

    fn expand(&mut self, input: &str) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '$' {
                result.push(ch);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let body =
                        consume_until(&mut chars, '}').ok_or(ConfigError::UnclosedReference)?;
                    let (path, fallback) = match body.split_once(':') {
                        Some((path, fallback)) => (path, Some(fallback)),
                        None => (body.as_str(), None),
                    };
                    result.push_str(&self.substitute(path, fallback)?);
                }
                _ => result.push('$'),
            }
        }

        Ok(result)
    }

    fn substitute(&mut self, path: &str, fallback: Option<&str>) -> Result<String, ConfigError> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(ConfigError::InvalidReferencePath(path.to_string()));
        }

        let root = self.root;
        let Some(target) = lookup(root, path) else {
            return match fallback {
                Some(fallback) => self.expand(fallback),
                None => Err(ConfigError::ReferenceNotFound(path.to_string())),
            };
        };

        match target {
            Value::String(s) => {
                if self.stack.iter().any(|p| p == path) {
                    return Err(ConfigError::CircularReference);
                }
                self.stack.push(path.to_string());
                let expanded = self.expand(s);
                self.stack.pop();
                expanded
            }
            other => scalar_to_string(other)
                .ok_or_else(|| ConfigError::NonScalarReference(path.to_string())),
        }
    }
}

fn consume_until(chars: &mut Peekable<Chars>, delim: char) -> Option<String> {
    let mut result = String::new();
    for ch in chars.by_ref() {
        if ch == delim {
            return Some(result);
        }
        result.push(ch);
    }
    None
}
