use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use super::{simple_name, FieldType, FieldValue, Reflect};

/// A zero-sized tag attached to fields, declared with [`marker!`](crate::marker).
pub trait Marker: 'static {}

/// Identity of a [`Marker`] type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId {
    id: TypeId,
    name: &'static str,
}

impl MarkerId {
    pub fn of<M: Marker>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: simple_name(type_name::<M>()),
        }
    }

    /// Simple name of the marker type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// One field of a reflected type.
///
/// Two descriptors are equal when they name the same field of the same
/// declaring type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    declaring_type: &'static str,
    declaring_id: TypeId,
    field_type: FieldType,
    markers: Vec<MarkerId>,
}

impl FieldDescriptor {
    /// Describes field `name` of type `F`, declared on `Owner`.
    pub fn new<Owner: 'static, F: FieldValue>(name: &'static str, markers: Vec<MarkerId>) -> Self {
        Self {
            name,
            declaring_type: type_name::<Owner>(),
            declaring_id: TypeId::of::<Owner>(),
            field_type: F::field_type(),
            markers,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Full name of the type that declares this field.
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn markers(&self) -> &[MarkerId] {
        &self.markers
    }

    pub fn has_marker(&self, marker: MarkerId) -> bool {
        self.markers.contains(&marker)
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_id == other.declaring_id && self.name == other.name
    }
}

impl Eq for FieldDescriptor {}

impl Hash for FieldDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaring_id.hash(state);
        self.name.hash(state);
    }
}

/// Structural summary of a reflected type. Immutable once built.
#[derive(Debug)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    // First occurrence of each name; a child field shadows a parent's.
    index: HashMap<&'static str, usize>,
}

impl TypeDescriptor {
    pub(crate) fn build<T: Reflect>() -> Self {
        let fields = T::describe();
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            index.entry(field.name).or_insert(position);
        }

        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            fields,
            index,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All fields: own fields in declaration order, then inherited ones.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The field reached when accessing `name` on an instance.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fields reachable by name, skipping parent fields shadowed by the child.
    pub fn accessible(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(position, field)| self.index.get(field.name) == Some(position))
            .map(|(_, field)| field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
