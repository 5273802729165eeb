//! Catalog of types taking part in injection.
//!
//! A [`Catalog`] describes every type the resolver may meet: injectable types,
//! with their constructor and injected fields, as well as the interfaces and
//! abstract types that must be rejected when something asks for them.

use std::collections::HashMap;
use std::marker::PhantomData;

use pocket_core::TypeKey;

use crate::constructor::{Constructor, ConstructorInfo};
use crate::inject::{FieldInfo, Inject};

/// [`Injectable`] is implemented by types that the resolver builds.
///
/// The implementation declares how the type is built and which of its fields are
/// injected. Every declared dependency is a type the resolver builds too, and it
/// is shared: each type has at most one instance per resolver.
///
/// ```
/// use std::sync::Arc;
///
/// use pocket::{Declaration, Injectable};
///
/// struct Config;
///
/// impl Injectable for Config {
///     fn declare(decl: &mut Declaration<Self>) {
///         decl.constructor(|| Config);
///     }
/// }
///
/// struct Database {
///     config: Arc<Config>,
/// }
///
/// impl Injectable for Database {
///     fn declare(decl: &mut Declaration<Self>) {
///         decl.constructor(|config: Arc<Config>| Database { config });
///     }
/// }
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Declares the constructor, injected fields, and markers of `Self`.
    fn declare(decl: &mut Declaration<Self>);
}

/// The shape of a type described in a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A type implementing [`Injectable`].
    Concrete,
    /// A type that has no instance of its own.
    Abstract,
    /// A trait object type (`dyn Trait`).
    Interface,
}

/// Collects the declarations of an [`Injectable`] type.
pub struct Declaration<T> {
    bypassed: bool,
    constructors: Vec<ConstructorInfo>,
    fields: Vec<FieldInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Declaration<T>
where
    T: Injectable,
{
    fn new() -> Self {
        Self {
            bypassed: false,
            constructors: Vec::new(),
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declares a constructor of `T`.
    ///
    /// A type must declare exactly one constructor to be built. Declaring more
    /// than one makes bootstrap fail with
    /// [`AmbiguousConstructor`](pocket_core::ResolutionError::AmbiguousConstructor).
    ///
    /// There is no implicit default constructor either: a type declaring none
    /// fails with [`NoConstructor`](pocket_core::ResolutionError::NoConstructor).
    /// For a type with no dependencies, declare a constructor taking no
    /// arguments, such as `|| Config::default()`.
    pub fn constructor<C, A>(&mut self, constructor: C) -> &mut Self
    where
        C: Constructor<T, A>,
    {
        self.constructors.push(ConstructorInfo::new(constructor));
        self
    }

    /// Marks a field of `T` for injection.
    ///
    /// After `T` is built, the resolver fills the slot returned by `slot` with the
    /// instance of `U`. Fields are injected in declaration order.
    pub fn field<U>(&mut self, name: &'static str, slot: fn(&T) -> &Inject<U>) -> &mut Self
    where
        U: ?Sized + Send + Sync + 'static,
    {
        self.fields.push(FieldInfo::new(name, slot));
        self
    }

    /// Marks `T` as bypassing injection.
    ///
    /// A bypassed type is never built, never injected anywhere, and may not have
    /// injected fields.
    pub fn bypass(&mut self) -> &mut Self {
        self.bypassed = true;
        self
    }
}

/// Describes one type of a [`Catalog`].
pub struct TypeInfo {
    key: TypeKey,
    kind: TypeKind,
    bypassed: bool,
    constructors: Vec<ConstructorInfo>,
    fields: Vec<FieldInfo>,
}

impl TypeInfo {
    fn of<T>() -> Self
    where
        T: Injectable,
    {
        let mut decl = Declaration::<T>::new();
        T::declare(&mut decl);

        let Declaration {
            bypassed,
            constructors,
            fields,
            ..
        } = decl;

        Self {
            key: TypeKey::of::<T>(),
            kind: TypeKind::Concrete,
            bypassed,
            constructors,
            fields,
        }
    }

    const fn opaque(key: TypeKey, kind: TypeKind) -> Self {
        Self {
            key,
            kind,
            bypassed: false,
            constructors: Vec::new(),
            fields: Vec::new(),
        }
    }

    #[inline]
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub const fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Returns `true` if the resolver may build this type: it is concrete and
    /// does not bypass injection.
    #[inline]
    pub fn is_injectable(&self) -> bool {
        self.kind == TypeKind::Concrete && !self.bypassed
    }

    /// Returns every declared constructor.
    #[inline]
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    /// Returns the fields marked for injection, in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("bypassed", &self.bypassed)
            .field("constructors", &self.constructors)
            .field("fields", &self.fields)
            .finish()
    }
}

/// [`Catalog`] records the types known to a resolver, in registration order.
///
/// Types are added explicitly, or collected from registrars submitted to
/// [`CATALOG`](crate::discover::CATALOG) with [`Catalog::discover`].
///
/// Registering a type twice replaces its description but keeps its position.
#[derive(Debug, Default)]
pub struct Catalog {
    types: HashMap<TypeKey, TypeInfo>,
    order: Vec<TypeKey>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an injectable type.
    pub fn register<T>(&mut self) -> &mut Self
    where
        T: Injectable,
    {
        self.insert(TypeInfo::of::<T>());
        self
    }

    /// Registers an injectable type, builder style.
    #[must_use]
    pub fn with<T>(mut self) -> Self
    where
        T: Injectable,
    {
        self.register::<T>();
        self
    }

    /// Describes `T` as an interface, usually a `dyn Trait`.
    pub fn interface<T>(&mut self) -> &mut Self
    where
        T: ?Sized + 'static,
    {
        self.insert(TypeInfo::opaque(TypeKey::of::<T>(), TypeKind::Interface));
        self
    }

    /// Describes `T` as an interface, builder style.
    #[must_use]
    pub fn with_interface<T>(mut self) -> Self
    where
        T: ?Sized + 'static,
    {
        self.interface::<T>();
        self
    }

    /// Describes `T` as an abstract type.
    pub fn abstract_type<T>(&mut self) -> &mut Self
    where
        T: ?Sized + 'static,
    {
        self.insert(TypeInfo::opaque(TypeKey::of::<T>(), TypeKind::Abstract));
        self
    }

    /// Describes `T` as an abstract type, builder style.
    #[must_use]
    pub fn with_abstract<T>(mut self) -> Self
    where
        T: ?Sized + 'static,
    {
        self.abstract_type::<T>();
        self
    }

    fn insert(&mut self, info: TypeInfo) {
        let key = info.key();
        if self.types.insert(key, info).is_none() {
            self.order.push(key);
        } else {
            debug!("type" = %key, "replaced type description");
        }
    }

    /// Returns the description of the type identified by `key`.
    #[inline]
    pub fn get(&self, key: TypeKey) -> Option<&TypeInfo> {
        self.types.get(&key)
    }

    #[inline]
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.types.contains_key(&TypeKey::of::<T>())
    }

    /// Iterates over every described type in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> + '_ {
        self.order.iter().filter_map(|key| self.types.get(key))
    }

    /// Returns the keys of the types to build, in registration order.
    ///
    /// Interfaces, abstract types and bypassed types are left out.
    pub fn roots(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.iter()
            .filter(|info| info.is_injectable())
            .map(TypeInfo::key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    trait Greeter: Send + Sync {}

    struct Base;

    struct Name;

    impl Injectable for Name {
        fn declare(decl: &mut Declaration<Self>) {
            decl.constructor(|| Name);
        }
    }

    struct Hello {
        name: Arc<Name>,
        greeter: Inject<dyn Greeter>,
    }

    impl Injectable for Hello {
        fn declare(decl: &mut Declaration<Self>) {
            decl.constructor(|name: Arc<Name>| Hello {
                name,
                greeter: Inject::new(),
            })
            .field("greeter", |this| &this.greeter);
        }
    }

    struct Hidden;

    impl Injectable for Hidden {
        fn declare(decl: &mut Declaration<Self>) {
            decl.constructor(|| Hidden).bypass();
        }
    }

    #[test]
    fn test_declaration() {
        let catalog = Catalog::new().with::<Hello>();
        let info = catalog.get(TypeKey::of::<Hello>()).unwrap();

        assert_eq!(info.kind(), TypeKind::Concrete);
        assert!(info.is_injectable());
        assert_eq!(info.constructors().len(), 1);
        assert_eq!(info.constructors()[0].parameters(), &[TypeKey::of::<Name>()]);
        assert_eq!(info.fields().len(), 1);
        assert_eq!(info.fields()[0].name(), "greeter");
        assert_eq!(info.fields()[0].ty(), TypeKey::of::<dyn Greeter>());
    }

    #[test]
    fn test_roots_skip_non_injectable() {
        let catalog = Catalog::new()
            .with_interface::<dyn Greeter>()
            .with::<Hello>()
            .with_abstract::<Base>()
            .with::<Hidden>()
            .with::<Name>();

        assert_eq!(catalog.len(), 5);
        let roots: Vec<_> = catalog.roots().collect();
        assert_eq!(roots, vec![TypeKey::of::<Hello>(), TypeKey::of::<Name>()]);
    }

    #[test]
    fn test_register_twice_keeps_position() {
        let mut catalog = Catalog::new();
        catalog.register::<Name>().register::<Hello>().register::<Name>();

        assert_eq!(catalog.len(), 2);
        let keys: Vec<_> = catalog.iter().map(TypeInfo::key).collect();
        assert_eq!(keys, vec![TypeKey::of::<Name>(), TypeKey::of::<Hello>()]);
    }

    #[test]
    fn test_bypassed() {
        let catalog = Catalog::new().with::<Hidden>();
        let info = catalog.get(TypeKey::of::<Hidden>()).unwrap();
        assert!(info.is_bypassed());
        assert!(!info.is_injectable());
        assert!(catalog.contains::<Hidden>());
        assert!(!catalog.contains::<Name>());
    }
}
