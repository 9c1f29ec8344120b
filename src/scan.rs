//! Link-time discovery of types by module namespace.
//!
//! A type opts in with [`discoverable!`](crate::discoverable), which submits a
//! [`Discoverable`] entry through `inventory`. Every entry submitted by any
//! crate linked into the binary is visible to [`find_classes`].
//!
//! ```
//! mod shop {
//!     pub struct Cart;
//!     pub struct Till;
//!     dragon_beans::discoverable!(Cart, Till);
//! }
//! ```

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::context::Container;

/// A type registered for discovery.
#[derive(Debug, Clone, Copy)]
pub struct Discoverable {
    namespace: &'static str,
    type_name: &'static str,
    type_id: fn() -> TypeId,
}

inventory::collect!(Discoverable);

impl Discoverable {
    pub const fn new(namespace: &'static str, type_name: &'static str, type_id: fn() -> TypeId) -> Self {
        Self {
            namespace,
            type_name,
            type_id,
        }
    }

    /// Module path the type was registered from.
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// `namespace::TypeName`.
    pub fn path(&self) -> String {
        format!("{}::{}", self.namespace, self.type_name)
    }

    /// Whether this entry lives in `namespace` or a module nested under it.
    /// An empty namespace contains everything.
    pub fn is_within(&self, namespace: &str) -> bool {
        if namespace.is_empty() {
            return true;
        }
        match self.namespace.strip_prefix(namespace) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        }
    }
}

#[doc(hidden)]
pub fn type_id_of<T: 'static>() -> TypeId {
    TypeId::of::<T>()
}

/// Registers types for [`find_classes`] under the current module path.
#[macro_export]
macro_rules! discoverable {
    ($($ty:ident),+ $(,)?) => {
        $(
            $crate::inventory::submit! {
                $crate::Discoverable::new(
                    ::core::module_path!(),
                    ::core::stringify!($ty),
                    $crate::scan::type_id_of::<$ty>,
                )
            }
        )+
    };
}

/// Discoverable types under a namespace, minus those a container already
/// holds as singletons.
///
/// Nothing is evaluated until [`iter`](Self::iter) is called, and each call
/// starts a fresh pass, so the result reflects the container at that time.
pub struct ClassScan {
    namespace: String,
    container: Arc<dyn Container>,
}

impl ClassScan {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Discoverable> + '_ {
        inventory::iter::<Discoverable>
            .into_iter()
            .filter(move |entry| {
                entry.is_within(&self.namespace)
                    && !self.container.contains_singleton(entry.type_id())
            })
    }
}

impl<'a> IntoIterator for &'a ClassScan {
    type Item = &'static Discoverable;
    type IntoIter = Box<dyn Iterator<Item = &'static Discoverable> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Debug for ClassScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassScan")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

pub fn find_classes(namespace: impl Into<String>, container: Arc<dyn Container>) -> ClassScan {
    ClassScan {
        namespace: namespace.into(),
        container,
    }
}

/// Scans the module that declares `T`, and the modules nested under it.
pub fn find_classes_near<T: ?Sized>(container: Arc<dyn Container>) -> ClassScan {
    find_classes(namespace_of::<T>(), container)
}

/// Module path of `T`: its type name without generics or the last segment.
pub fn namespace_of<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit_once("::").map_or("", |(namespace, _)| namespace)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::context::Registration;
    use crate::AppContext;

    mod shop {
        pub struct Cart;
        pub struct Till;
        crate::discoverable!(Cart, Till);

        pub mod billing {
            pub struct Invoice;
            crate::discoverable!(Invoice);
        }
    }

    mod shopping {
        pub struct Basket;
        crate::discoverable!(Basket);
    }

    fn names(scan: &ClassScan) -> BTreeSet<&'static str> {
        scan.iter().map(Discoverable::type_name).collect()
    }

    fn shop_namespace() -> String {
        format!("{}::shop", module_path!())
    }

    #[test]
    fn test_is_within() {
        let entry = Discoverable::new("app::shop::billing", "Invoice", type_id_of::<u8>);

        assert!(entry.is_within("app::shop"));
        assert!(entry.is_within("app::shop::billing"));
        assert!(entry.is_within(""));
        assert!(!entry.is_within("app::sho"));
        assert!(!entry.is_within("app::shop::billing::tax"));
        assert_eq!(entry.path(), "app::shop::billing::Invoice");
        assert_eq!(entry.type_id(), TypeId::of::<u8>());
    }

    #[test]
    fn test_finds_nested_modules() {
        let scan = find_classes(shop_namespace(), Arc::new(AppContext::builder().build()));

        assert_eq!(
            names(&scan),
            BTreeSet::from(["Cart", "Invoice", "Till"])
        );
    }

    #[test]
    fn test_excludes_registered_singletons() {
        let ctx = Arc::new(AppContext::builder().build());
        ctx.register_singleton(Registration::new(Arc::new(shop::Cart)))
            .unwrap();

        let scan = find_classes(shop_namespace(), ctx);

        assert_eq!(names(&scan), BTreeSet::from(["Invoice", "Till"]));
    }

    #[test]
    fn test_namespace_of() {
        assert_eq!(namespace_of::<String>(), "alloc::string");
        assert_eq!(namespace_of::<Vec<shop::Cart>>(), "alloc::vec");
        assert_eq!(namespace_of::<u8>(), "");
        assert_eq!(namespace_of::<shop::Cart>(), shop_namespace());
    }

    #[test]
    fn test_find_classes_near_type() {
        let ctx = Arc::new(AppContext::builder().build());

        let near_invoice = find_classes_near::<shop::billing::Invoice>(ctx.clone());
        assert_eq!(names(&near_invoice), BTreeSet::from(["Invoice"]));

        let near_cart = find_classes_near::<shop::Cart>(ctx);
        assert_eq!(near_cart.namespace(), shop_namespace());
        assert_eq!(names(&near_cart), BTreeSet::from(["Cart", "Invoice", "Till"]));
    }

    #[test]
    fn test_restartable() {
        let ctx = Arc::new(AppContext::builder().build());
        let scan = find_classes(shop_namespace(), ctx.clone());

        assert_eq!(scan.iter().count(), 3);
        assert_eq!(scan.iter().count(), 3);

        ctx.register_singleton(Registration::new(Arc::new(shop::billing::Invoice)))
            .unwrap();
        assert_eq!((&scan).into_iter().count(), 2);
    }
}
