//! [`Resolver`] and the bootstrap pass building its instances.

use std::sync::Arc;

use pocket_core::{Edge, Erased, LookupError, NotFound, ResolutionError, Result, TypeKey};

use crate::catalog::{Catalog, TypeInfo, TypeKind};
use crate::constructor::ConstructorInfo;
use crate::store::Store;

/// [`Resolver`] holds one instance of every injectable type of a [`Catalog`].
///
/// A resolver only exists once bootstrap has succeeded: every instance is built,
/// every injected field is filled, and the resolver is read-only from then on.
/// It can be shared between threads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use pocket::{Catalog, Declaration, Injectable, Resolver};
///
/// struct Config;
///
/// impl Injectable for Config {
///     fn declare(decl: &mut Declaration<Self>) {
///         decl.constructor(|| Config);
///     }
/// }
///
/// struct Users {
///     config: Arc<Config>,
/// }
///
/// impl Injectable for Users {
///     fn declare(decl: &mut Declaration<Self>) {
///         decl.constructor(|config: Arc<Config>| Users { config });
///     }
/// }
///
/// struct Orders {
///     config: Arc<Config>,
///     users: Arc<Users>,
/// }
///
/// impl Injectable for Orders {
///     fn declare(decl: &mut Declaration<Self>) {
///         decl.constructor(|config: Arc<Config>, users: Arc<Users>| Orders { config, users });
///     }
/// }
///
/// let catalog = Catalog::new()
///     .with::<Orders>()
///     .with::<Users>()
///     .with::<Config>();
/// let resolver = Resolver::bootstrap(catalog)?;
///
/// // `Config` is built once and shared by everyone depending on it.
/// let orders = resolver.get::<Orders>()?;
/// assert!(Arc::ptr_eq(&orders.config, &orders.users.config));
/// assert!(Arc::ptr_eq(&orders.config, &resolver.get::<Config>()?));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Resolver {
    catalog: Catalog,
    store: Store,
}

impl Resolver {
    /// Builds every root of `catalog`, in registration order.
    ///
    /// See [`Catalog::roots`] for which types are roots.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolutionError`] met anywhere in the dependency graph.
    /// Nothing built so far is kept.
    pub fn bootstrap(catalog: Catalog) -> Result<Self> {
        let roots: Vec<TypeKey> = catalog.roots().collect();
        Self::bootstrap_with(catalog, roots)
    }

    /// Builds the given `roots` of `catalog`, in order, along with everything they
    /// depend on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolutionError`] met anywhere in the dependency graph.
    /// Nothing built so far is kept.
    pub fn bootstrap_with<I>(catalog: Catalog, roots: I) -> Result<Self>
    where
        I: IntoIterator<Item = TypeKey>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("bootstrap", types = catalog.len()).entered();

        let mut bootstrap = Bootstrap::new(&catalog);
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        bootstrap
            .run(roots)
            .inspect_err(|error| debug!(%error, "bootstrap failed"))?;

        let store = bootstrap.store;
        info!(instances = store.len(), "bootstrap finished");

        Ok(Self { catalog, store })
    }

    /// Returns the instance of `T`.
    ///
    /// This never builds anything: it only reads the instances made during
    /// bootstrap.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] telling why there is no instance of `T`.
    pub fn get<T>(&self) -> Result<Arc<T>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if let Some(instance) = self.store.get::<T>() {
            return Ok(instance);
        }

        let key = TypeKey::of::<T>();
        let reason = match self.catalog.get(key) {
            Some(info) if info.is_bypassed() => NotFound::Bypassed,
            Some(info) => match info.kind() {
                TypeKind::Abstract => NotFound::Abstract,
                TypeKind::Interface => NotFound::Interface,
                TypeKind::Concrete => NotFound::NeverInjected,
            },
            None => NotFound::NeverInjected,
        };
        trace!("type" = %key, ?reason, "lookup missed");

        Err(LookupError::new(key, reason))
    }

    /// Returns `true` if the resolver holds an instance of `T`.
    #[inline]
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.store.contains::<T>()
    }

    /// Returns the number of instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the catalog the resolver was built from.
    #[inline]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the instance cache.
    #[inline]
    pub const fn store(&self) -> &Store {
        &self.store
    }
}

/// State of a single bootstrap pass.
struct Bootstrap<'a> {
    catalog: &'a Catalog,
    store: Store,
    /// Types being resolved, outermost first.
    resolving: Vec<TypeKey>,
}

impl<'a> Bootstrap<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            store: Store::new(),
            resolving: Vec::new(),
        }
    }

    fn run<I>(&mut self, roots: I) -> Result<()>
    where
        I: IntoIterator<Item = TypeKey>,
    {
        self.check_bypassed()?;

        for root in roots {
            if self.store.contains_key(root) {
                trace!("type" = %root, "root already resolved");
                continue;
            }
            self.resolve(root)?;
        }

        Ok(())
    }

    /// Bypassed types are never roots, so their injected fields must be rejected
    /// up front.
    fn check_bypassed(&self) -> Result<()> {
        for info in self.catalog.iter().filter(|info| info.is_bypassed()) {
            if let Some(field) = info.fields().first() {
                return Err(ResolutionError::Bypassed {
                    ty: info.key(),
                    injected_field: Some(field.name()),
                });
            }
        }

        Ok(())
    }

    /// Returns the instance of `key`, building it and its dependencies first if
    /// needed.
    fn resolve(&mut self, key: TypeKey) -> Result<Erased> {
        if let Some(start) = self.resolving.iter().position(|k| *k == key) {
            let mut path = self.resolving[start..].to_vec();
            path.push(key);
            return Err(ResolutionError::CircularDependency { path });
        }

        if let Some(instance) = self.store.get_by_key(key) {
            trace!("type" = %key, "cache hit");
            return Ok(instance.clone());
        }

        let info = self.admit(key)?;
        let constructor = match info.constructors() {
            [] => return Err(ResolutionError::NoConstructor { ty: key }),
            [constructor] => constructor,
            constructors => {
                return Err(ResolutionError::AmbiguousConstructor {
                    ty: key,
                    count: constructors.len(),
                });
            }
        };

        for (position, dependency) in constructor.parameters().iter().enumerate() {
            self.check_edge(key, *dependency, Edge::Constructor { position })?;
        }
        for field in info.fields() {
            self.check_edge(key, field.ty(), Edge::Field { name: field.name() })?;
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("resolve", "type" = %key).entered();

        self.resolving.push(key);
        let result = self.build(key, info, constructor);
        self.resolving.pop();

        result
    }

    /// Looks up the description of a type the resolver was asked to build.
    ///
    /// Dependencies are checked by [`check_edge`](Self::check_edge) before they
    /// are resolved, so the failures here are only met by roots.
    fn admit(&self, key: TypeKey) -> Result<&'a TypeInfo> {
        let Some(info) = self.catalog.get(key) else {
            return Err(ResolutionError::NotInjectable {
                ty: key,
                dependency: key,
                edge: Edge::Root,
            });
        };

        if info.is_bypassed() {
            return Err(ResolutionError::Bypassed {
                ty: key,
                injected_field: info.fields().first().map(|field| field.name()),
            });
        }

        match info.kind() {
            TypeKind::Concrete => Ok(info),
            TypeKind::Abstract => Err(ResolutionError::AbstractDependency {
                ty: key,
                dependency: key,
                edge: Edge::Root,
            }),
            TypeKind::Interface => Err(ResolutionError::InterfaceDependency {
                ty: key,
                dependency: key,
                edge: Edge::Root,
            }),
        }
    }

    /// Checks that `ty` may depend on `dependency` through `edge`.
    fn check_edge(&self, ty: TypeKey, dependency: TypeKey, edge: Edge) -> Result<()> {
        if dependency == ty {
            return Err(ResolutionError::SelfInjection { ty, edge });
        }

        let Some(info) = self.catalog.get(dependency) else {
            return Err(ResolutionError::NotInjectable {
                ty,
                dependency,
                edge,
            });
        };

        if info.is_bypassed() {
            return Err(ResolutionError::BypassedDependency {
                ty,
                dependency,
                edge,
            });
        }

        match info.kind() {
            TypeKind::Concrete => Ok(()),
            TypeKind::Abstract => Err(ResolutionError::AbstractDependency {
                ty,
                dependency,
                edge,
            }),
            TypeKind::Interface => Err(ResolutionError::InterfaceDependency {
                ty,
                dependency,
                edge,
            }),
        }
    }

    fn build(
        &mut self,
        key: TypeKey,
        info: &'a TypeInfo,
        constructor: &'a ConstructorInfo,
    ) -> Result<Erased> {
        let mut args = Vec::with_capacity(constructor.parameters().len());
        for dependency in constructor.parameters() {
            args.push(self.resolve(*dependency)?);
        }

        let instance = constructor
            .construct(&args)
            .map_err(|err| ResolutionError::construction_failed(key, err))?;
        debug!("type" = %key, "constructed");

        // `key` is on the resolving stack, so no dependency can have built it.
        // Should that change, the first instance wins and fields are not injected twice.
        if let Err(existing) = self.store.insert_erased(key, instance.clone()) {
            return Ok(existing);
        }

        for field in info.fields() {
            let value = self.resolve(field.ty())?;
            field
                .assign(&instance, &value)
                .map_err(|err| ResolutionError::construction_failed(key, err))?;
            trace!("type" = %key, field = field.name(), "field injected");
        }

        Ok(instance)
    }
}
