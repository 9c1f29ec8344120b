//! Get and set fields by name.

use super::{FieldDescriptor, FieldValue, Introspector, Reflect, ReflectError, Value};

impl Introspector {
    /// Reads field `name` of `instance`.
    pub fn get_value<T: Reflect>(&self, instance: &T, name: &str) -> Result<Value, ReflectError> {
        self.require::<T>(name)?;
        instance
            .get(name)
            .ok_or_else(|| ReflectError::field_not_found::<T>(name))
    }

    /// Reads field `name` of `instance` converted to `V`, with the same
    /// coercions [`set_value`](Self::set_value) applies.
    pub fn get_value_as<T: Reflect, V: FieldValue>(&self, instance: &T, name: &str) -> Result<V, ReflectError> {
        let value = self.get_value(instance, name)?;
        V::from_value(value).map_err(|source| ReflectError::coercion::<T>(name, source))
    }

    /// Writes field `name` of `instance`, coercing `value` to the field's
    /// declared type when the kinds differ.
    pub fn set_value<T: Reflect>(
        &self,
        instance: &mut T,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), ReflectError> {
        self.require::<T>(name)?;
        match instance.set(name, value.into()) {
            Some(result) => result.map_err(|source| ReflectError::coercion::<T>(name, source)),
            None => Err(ReflectError::field_not_found::<T>(name)),
        }
    }

    /// Applies every `(name, value)` pair whose name is a field of `T`.
    /// Unknown names are skipped. Returns the number of fields written.
    pub fn set_values<T, I, K>(&self, instance: &mut T, values: I) -> Result<usize, ReflectError>
    where
        T: Reflect,
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let descriptor = self.reflection_storage::<T>();
        let mut written = 0;
        for (name, value) in values {
            let name = name.as_ref();
            if descriptor.contains(name) {
                self.set_value(instance, name, value)?;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Whether `T` has a field called `name`.
    pub fn has<T: Reflect>(&self, name: &str) -> bool {
        self.reflection_storage::<T>().contains(name)
    }

    /// Like [`has`](Self::has), inferring the type from an instance.
    pub fn has_field<T: Reflect>(&self, _instance: &T, name: &str) -> bool {
        self.has::<T>(name)
    }

    pub fn field<T: Reflect>(&self, name: &str) -> Option<FieldDescriptor> {
        self.cache.field::<T>(name)
    }

    fn require<T: Reflect>(&self, name: &str) -> Result<(), ReflectError> {
        if self.has::<T>(name) {
            Ok(())
        } else {
            Err(ReflectError::field_not_found::<T>(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::reflect::fixtures::{Account, Person, Ticket, User};
    use crate::reflect::Kind;

    #[test]
    fn test_get_value() {
        let introspector = Introspector::new();
        let user = User::new("Slava", 32);

        assert_eq!(
            introspector.get_value(&user, "name").unwrap(),
            Value::Text("Slava".into())
        );
        assert_eq!(introspector.get_value(&user, "age").unwrap(), Value::Int(32));
    }

    #[test]
    fn test_get_value_as() {
        let introspector = Introspector::new();
        let user = User::new("42", 32);

        assert_eq!(introspector.get_value_as::<_, i64>(&user, "age").unwrap(), 32);
        assert_eq!(introspector.get_value_as::<_, String>(&user, "age").unwrap(), "32");
        assert_eq!(introspector.get_value_as::<_, i32>(&user, "name").unwrap(), 42);
        assert_eq!(
            introspector.get_value_as::<_, Option<i32>>(&User::default(), "age").unwrap(),
            None
        );
    }

    #[test]
    fn test_get_value_as_failures() {
        let introspector = Introspector::new();
        let user = User::new("Slava", 32);

        assert!(matches!(
            introspector.get_value_as::<_, i32>(&user, "name"),
            Err(ReflectError::Coercion { ref field, .. }) if field == "name"
        ));
        assert!(matches!(
            introspector.get_value_as::<_, i32>(&User::default(), "age"),
            Err(ReflectError::Coercion { .. })
        ));
        assert!(matches!(
            introspector.get_value_as::<_, i32>(&user, "email"),
            Err(ReflectError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_get_missing_field() {
        let introspector = Introspector::new();
        let err = introspector.get_value(&User::default(), "email").unwrap_err();

        assert!(matches!(
            err,
            ReflectError::FieldNotFound { ref field, .. } if field == "email"
        ));
    }

    #[test]
    fn test_set_value_parses_numeric_string() {
        let introspector = Introspector::new();
        let mut user = User::new("S", 1);

        introspector.set_value(&mut user, "age", "7").unwrap();
        assert_eq!(user.age, Some(7));
    }

    #[test]
    fn test_set_value_parses_date_string() {
        let introspector = Introspector::new();
        let mut person = Person::default();

        introspector.set_value(&mut person, "born", "1990-05-17").unwrap();
        assert_eq!(person.born, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[test]
    fn test_set_value_coercion_error() {
        let introspector = Introspector::new();
        let mut person = Person::default();

        let err = introspector
            .set_value(&mut person, "age", "seven")
            .unwrap_err();
        match err {
            ReflectError::Coercion { field, source, .. } => {
                assert_eq!(field, "age");
                assert_eq!(source.expected(), Kind::Int);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(person.age, 0);
    }

    #[test]
    fn test_set_null_on_required_field() {
        let introspector = Introspector::new();
        let mut person = Person::default();

        assert!(matches!(
            introspector.set_value(&mut person, "name", Value::Null),
            Err(ReflectError::Coercion { .. })
        ));
        introspector.set_value(&mut person, "born", Value::Null).unwrap();
        assert_eq!(person.born, None);
    }

    #[test]
    fn test_inherited_field_access() {
        let introspector = Introspector::new();
        let mut account = Account::default();

        introspector.set_value(&mut account, "id", 42i64).unwrap();
        introspector
            .set_value(&mut account, "created_at", "2024-01-02 03:04:05")
            .unwrap();

        assert_eq!(account.base.id, 42);
        assert!(account.base.created_at.is_some());
        assert_eq!(introspector.get_value(&account, "id").unwrap(), Value::Int(42));
    }

    #[test]
    fn test_child_field_shadows_parent() {
        let introspector = Introspector::new();
        let mut ticket = Ticket::default();

        introspector.set_value(&mut ticket, "id", "T-1").unwrap();
        assert_eq!(ticket.id, "T-1");
        assert_eq!(ticket.base.id, 0);
    }

    #[test]
    fn test_has() {
        let introspector = Introspector::new();
        let user = User::default();

        assert!(introspector.has::<User>("age"));
        assert!(introspector.has_field(&user, "name"));
        assert!(!introspector.has::<User>("email"));
        assert!(introspector.has::<Account>("created_at"));
    }

    #[test]
    fn test_field_descriptor_lookup() {
        let introspector = Introspector::new();
        let field = introspector.field::<Person>("token").unwrap();

        assert_eq!(field.name(), "token");
        assert_eq!(field.field_type().kind(), Kind::Uuid);
        assert!(introspector.field::<Person>("missing").is_none());
    }

    #[test]
    fn test_set_values_skips_unknown_names() {
        let introspector = Introspector::new();
        let mut user = User::new("S", 1);

        let written = introspector
            .set_values(
                &mut user,
                [
                    ("age", Value::Int(7)),
                    ("name", Value::from("Slava")),
                    ("email", Value::from("s@example.com")),
                ],
            )
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(user, User::new("Slava", 7));
    }
}
