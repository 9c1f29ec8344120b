//! Copy, merge and flatten reflected objects.
//!
//! Fields are matched by name between source and target. Values pass through
//! [`Introspector::set_value`], so a field declared with a different type on
//! each side is coerced on the way in. A copy either writes every accepted
//! field or leaves the target as it was.

use std::any::type_name;
use std::collections::HashMap;

use indexmap::IndexMap;

use super::{Introspector, Reflect, ReflectError, Value};

impl Introspector {
    /// Overwrites every target field that also exists on `source`, nulls
    /// included.
    pub fn copy<S, T>(&self, source: &S, target: &mut T) -> Result<(), ReflectError>
    where
        S: Reflect + ?Sized,
        T: Reflect,
    {
        self.merge(source, target, |_, _| true)
    }

    /// Like [`copy`](Self::copy), but null source values leave the target
    /// field untouched.
    pub fn copy_not_null<S, T>(&self, source: &S, target: &mut T) -> Result<(), ReflectError>
    where
        S: Reflect + ?Sized,
        T: Reflect,
    {
        self.merge(source, target, |incoming, _| !incoming.is_null())
    }

    /// Fills only the target fields that are currently null.
    pub fn copy_is_null<S, T>(&self, source: &S, target: &mut T) -> Result<(), ReflectError>
    where
        S: Reflect + ?Sized,
        T: Reflect,
    {
        self.merge(source, target, |_, current| current.is_null())
    }

    /// Builds a fresh `T` from `primary`, then copies each of `additional`
    /// over it in order. Later sources win on the fields they share.
    pub fn clone<T>(&self, primary: &T, additional: &[&dyn Reflect]) -> Result<T, ReflectError>
    where
        T: Reflect + Default,
    {
        let mut clone = T::default();
        self.copy(primary, &mut clone)?;
        for source in additional {
            self.copy(*source, &mut clone)?;
        }
        Ok(clone)
    }

    /// All fields of `instance` in declaration order, nulls included.
    pub fn object_to_map<T: Reflect>(&self, instance: &T) -> IndexMap<String, Value> {
        self.reflection_storage::<T>()
            .accessible()
            .map(|field| {
                let value = instance.get(field.name()).unwrap_or(Value::Null);
                (field.name().to_string(), value)
            })
            .collect()
    }

    /// Maps the text of each item's `key_field` to its `value_field`. On
    /// duplicate keys the later item wins. A null key is
    /// [`ReflectError::NullKey`], so it never collides with an empty text key.
    pub fn objects_to_map<'a, T, I>(
        &self,
        items: I,
        key_field: &str,
        value_field: &str,
    ) -> Result<HashMap<String, Value>, ReflectError>
    where
        T: Reflect + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut map = HashMap::new();
        for item in items {
            let key = self.get_value(item, key_field)?;
            if key.is_null() {
                return Err(ReflectError::NullKey {
                    type_name: type_name::<T>(),
                    field: key_field.to_string(),
                });
            }
            let value = self.get_value(item, value_field)?;
            map.insert(key.to_string(), value);
        }
        Ok(map)
    }

    fn merge<S, T, F>(&self, source: &S, target: &mut T, accept: F) -> Result<(), ReflectError>
    where
        S: Reflect + ?Sized,
        T: Reflect,
        F: Fn(&Value, &Value) -> bool,
    {
        let descriptor = self.reflection_storage::<T>();
        let mut staged = Vec::new();
        for field in descriptor.accessible() {
            let Some(incoming) = source.get(field.name()) else {
                continue;
            };
            let current = target.get(field.name()).unwrap_or(Value::Null);
            if !accept(&incoming, &current) {
                continue;
            }
            let value = field
                .field_type()
                .coerce(incoming)
                .map_err(|source| ReflectError::coercion::<T>(field.name(), source))?;
            staged.push((field.name(), value, current));
        }

        // Range checks only happen on write, so undo partial writes on failure.
        let mut written = Vec::with_capacity(staged.len());
        for (name, value, previous) in staged {
            if let Err(err) = self.set_value(target, name, value) {
                for (name, previous) in written.into_iter().rev() {
                    // Read back from the same field, so it always fits.
                    let _ = target.set(name, previous);
                }
                return Err(err);
            }
            written.push((name, previous));
        }
        Ok(())
    }
}
