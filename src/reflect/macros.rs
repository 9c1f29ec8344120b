//! Declarative generators for accessor tables and markers.

/// Implements [`Reflect`](crate::Reflect) for a struct.
///
/// List every field that should be visible to reflection with its type.
/// Fields may carry markers with `#[mark(A, B)]`. A struct embedding a
/// parent by composition declares it with `extends field: Parent`; the
/// parent's fields are then inherited and listed after the child's own.
///
/// ```
/// use dragon_beans::{marker, reflect, Introspector};
///
/// marker!(pub Id);
///
/// #[derive(Default)]
/// struct Entity { id: i64 }
///
/// #[derive(Default)]
/// struct Account { base: Entity, login: String }
///
/// reflect! { Entity { #[mark(Id)] id: i64 } }
/// reflect! { Account extends base: Entity { login: String } }
///
/// let introspector = Introspector::new();
/// let names: Vec<_> = introspector
///     .reflection_storage::<Account>()
///     .fields()
///     .iter()
///     .map(|f| f.name())
///     .collect();
/// assert_eq!(names, ["login", "id"]);
/// ```
#[macro_export]
macro_rules! reflect {
    (
        $ty:ident $(extends $parent:ident : $parent_ty:ty)? {
            $(
                $(#[mark($($marker:ty),+ $(,)?)])?
                $field:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        impl $crate::Reflect for $ty {
            fn describe() -> ::std::vec::Vec<$crate::FieldDescriptor> {
                #[allow(unused_mut)]
                let mut fields: ::std::vec::Vec<$crate::FieldDescriptor> = ::std::vec![
                    $(
                        $crate::FieldDescriptor::new::<Self, $field_ty>(
                            ::std::stringify!($field),
                            ::std::vec![$($($crate::MarkerId::of::<$marker>()),+)?],
                        )
                    ),*
                ];
                $( fields.extend(<$parent_ty as $crate::Reflect>::describe()); )?
                fields
            }

            fn get(&self, name: &str) -> ::std::option::Option<$crate::Value> {
                match name {
                    $(
                        ::std::stringify!($field) => ::std::option::Option::Some(
                            $crate::FieldValue::to_value(&self.$field),
                        ),
                    )*
                    _ => $crate::reflect!(@get self, name; $($parent)?),
                }
            }

            #[allow(unused_variables)]
            fn set(
                &mut self,
                name: &str,
                value: $crate::Value,
            ) -> ::std::option::Option<::std::result::Result<(), $crate::CoercionError>> {
                match name {
                    $(
                        ::std::stringify!($field) => ::std::option::Option::Some(
                            $crate::FieldValue::from_value(value).map(|v| self.$field = v),
                        ),
                    )*
                    _ => $crate::reflect!(@set self, name, value; $($parent)?),
                }
            }
        }
    };

    (@get $this:expr, $name:expr;) => { ::std::option::Option::None };
    (@get $this:expr, $name:expr; $parent:ident) => {
        $crate::Reflect::get(&$this.$parent, $name)
    };
    (@set $this:expr, $name:expr, $value:expr;) => { ::std::option::Option::None };
    (@set $this:expr, $name:expr, $value:expr; $parent:ident) => {
        $crate::Reflect::set(&mut $this.$parent, $name, $value)
    };
}

/// Declares a zero-sized [`Marker`](crate::Marker) type.
///
/// ```
/// dragon_beans::marker!(
///     /// Primary key column.
///     pub Id
/// );
/// ```
#[macro_export]
macro_rules! marker {
    ($(#[$meta:meta])* $vis:vis $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::Marker for $name {}
    };
}
