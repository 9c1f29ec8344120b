use thiserror::Error;

use super::Kind;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReflectError {
    #[error("type '{type_name}' has no field '{field}'")]
    FieldNotFound {
        type_name: &'static str,
        field: String,
    },

    #[error("cannot assign field '{field}' of '{type_name}': {source}")]
    Coercion {
        type_name: &'static str,
        field: String,
        source: CoercionError,
    },

    #[error("key field '{field}' of '{type_name}' is null")]
    NullKey {
        type_name: &'static str,
        field: String,
    },
}

impl ReflectError {
    pub(crate) fn field_not_found<T: ?Sized>(field: &str) -> Self {
        Self::FieldNotFound {
            type_name: std::any::type_name::<T>(),
            field: field.to_string(),
        }
    }

    pub(crate) fn coercion<T: ?Sized>(field: &str, source: CoercionError) -> Self {
        Self::Coercion {
            type_name: std::any::type_name::<T>(),
            field: field.to_string(),
            source,
        }
    }
}

/// A value could not be converted to a field's declared kind.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value} to {expected}: {reason}")]
pub struct CoercionError {
    value: String,
    expected: Kind,
    reason: String,
}

impl CoercionError {
    pub fn new(value: impl Into<String>, expected: Kind, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expected,
            reason: reason.into(),
        }
    }

    /// Rendering of the rejected value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expected(&self) -> Kind {
        self.expected
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
