//! Error types.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::key::TypeKey;

/// A boxed error returned by fallible constructors.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// [`Edge`] tells through which declaration a type asked for a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The type was handed to the resolver as a root of the catalog.
    Root,
    /// The dependency is the constructor parameter at `position` (zero based).
    Constructor { position: usize },
    /// The dependency is the injected field `name`.
    Field { name: &'static str },
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => f.write_str("catalog root"),
            Self::Constructor { position } => {
                write!(f, "constructor parameter #{}", position + 1)
            }
            Self::Field { name } => write!(f, "field `{name}`"),
        }
    }
}

/// [`ResolutionError`] is raised while bootstrapping a resolver.
///
/// Every variant is terminal: once returned, the bootstrap that raised it is
/// abandoned and no resolver is produced.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ResolutionError {
    #[error("`{ty}` injects itself through its {edge}")]
    SelfInjection { ty: TypeKey, edge: Edge },

    #[error("`{ty}` cannot inject `{dependency}` through its {edge}: the type bypasses injection")]
    BypassedDependency {
        ty: TypeKey,
        dependency: TypeKey,
        edge: Edge,
    },

    #[error("{}", bypassed_message(.ty, .injected_field))]
    Bypassed {
        ty: TypeKey,
        injected_field: Option<&'static str>,
    },

    #[error("`{ty}` cannot inject `{dependency}` through its {edge}: abstract types have no instance")]
    AbstractDependency {
        ty: TypeKey,
        dependency: TypeKey,
        edge: Edge,
    },

    #[error("`{ty}` cannot inject `{dependency}` through its {edge}: interfaces have no instance")]
    InterfaceDependency {
        ty: TypeKey,
        dependency: TypeKey,
        edge: Edge,
    },

    #[error("`{ty}` cannot inject `{dependency}` through its {edge}: the type is not injectable")]
    NotInjectable {
        ty: TypeKey,
        dependency: TypeKey,
        edge: Edge,
    },

    #[error("`{ty}` declares {count} constructors, only one or none is allowed")]
    AmbiguousConstructor { ty: TypeKey, count: usize },

    #[error("`{ty}` declares no constructor")]
    NoConstructor { ty: TypeKey },

    #[error("circular dependency: {}", join_path(.path))]
    CircularDependency { path: Vec<TypeKey> },

    #[error("failed to construct `{ty}`")]
    ConstructionFailed {
        ty: TypeKey,
        #[source]
        source: Arc<dyn StdError + Send + Sync + 'static>,
    },
}

fn bypassed_message(ty: &TypeKey, injected_field: &Option<&'static str>) -> String {
    match injected_field {
        Some(field) => format!(
            "`{ty}` bypasses injection but marks field `{field}` as injected; \
             bypassed types cannot have their fields injected"
        ),
        None => format!("`{ty}` bypasses injection, it is not injected"),
    }
}

fn join_path(path: &[TypeKey]) -> String {
    path.iter()
        .map(TypeKey::name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ResolutionError {
    pub fn construction_failed(ty: TypeKey, err: impl Into<BoxError>) -> Self {
        let err: BoxError = err.into();
        Self::ConstructionFailed {
            ty,
            source: Arc::from(err),
        }
    }

    /// Returns the type whose resolution failed.
    ///
    /// For [`CircularDependency`](Self::CircularDependency) this is the type that
    /// closes the cycle.
    pub fn ty(&self) -> Option<TypeKey> {
        match self {
            Self::SelfInjection { ty, .. }
            | Self::BypassedDependency { ty, .. }
            | Self::Bypassed { ty, .. }
            | Self::AbstractDependency { ty, .. }
            | Self::InterfaceDependency { ty, .. }
            | Self::NotInjectable { ty, .. }
            | Self::AmbiguousConstructor { ty, .. }
            | Self::NoConstructor { ty }
            | Self::ConstructionFailed { ty, .. } => Some(*ty),
            Self::CircularDependency { path } => path.last().copied(),
        }
    }

    /// Returns the rejected dependency, for errors raised on a dependency edge.
    pub const fn dependency(&self) -> Option<TypeKey> {
        match self {
            Self::BypassedDependency { dependency, .. }
            | Self::AbstractDependency { dependency, .. }
            | Self::InterfaceDependency { dependency, .. }
            | Self::NotInjectable { dependency, .. } => Some(*dependency),
            _ => None,
        }
    }

    pub const fn is_self_injection(&self) -> bool {
        matches!(self, Self::SelfInjection { .. })
    }

    /// Returns `true` if the error comes from a type marked as bypassed.
    pub const fn is_bypass_related(&self) -> bool {
        matches!(
            self,
            Self::BypassedDependency { .. } | Self::Bypassed { .. }
        )
    }

    pub const fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

/// Why a type has no instance in a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    Bypassed,
    Abstract,
    Interface,
    NeverInjected,
}

/// [`LookupError`] is returned when asking a resolver for a type it holds no
/// instance of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{}", lookup_message(.ty, .reason))]
pub struct LookupError {
    pub ty: TypeKey,
    pub reason: NotFound,
}

fn lookup_message(ty: &TypeKey, reason: &NotFound) -> String {
    match reason {
        NotFound::Bypassed => {
            format!("`{ty}` bypasses injection, it cannot be returned as it was not injected")
        }
        NotFound::Abstract => {
            format!("`{ty}` is an abstract type, it cannot be injected nor returned")
        }
        NotFound::Interface => {
            format!("`{ty}` is an interface, it cannot be injected nor returned")
        }
        NotFound::NeverInjected => {
            format!("`{ty}` has not been injected, it needs to be registered as injectable")
        }
    }
}

impl LookupError {
    pub const fn new(ty: TypeKey, reason: NotFound) -> Self {
        Self { ty, reason }
    }
}

/// [`Result`] is an alias to [`core::result::Result`] with [`ResolutionError`] as the
/// default error type.
pub type Result<T, E = ResolutionError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Foo;
    struct Bar;

    #[test]
    fn test_edge_display() {
        assert_eq!(Edge::Root.to_string(), "catalog root");
        assert_eq!(
            Edge::Constructor { position: 0 }.to_string(),
            "constructor parameter #1"
        );
        assert_eq!(Edge::Field { name: "bar" }.to_string(), "field `bar`");
    }

    #[test]
    fn test_accessors() {
        let err = ResolutionError::InterfaceDependency {
            ty: TypeKey::of::<Foo>(),
            dependency: TypeKey::of::<Bar>(),
            edge: Edge::Field { name: "bar" },
        };
        assert_eq!(err.ty(), Some(TypeKey::of::<Foo>()));
        assert_eq!(err.dependency(), Some(TypeKey::of::<Bar>()));
        assert!(!err.is_bypass_related());

        let err = ResolutionError::Bypassed {
            ty: TypeKey::of::<Foo>(),
            injected_field: Some("bar"),
        };
        assert!(err.is_bypass_related());
        assert!(err.to_string().contains("field `bar`"));
    }

    #[test]
    fn test_circular_message() {
        let err = ResolutionError::CircularDependency {
            path: vec![
                TypeKey::of::<Foo>(),
                TypeKey::of::<Bar>(),
                TypeKey::of::<Foo>(),
            ],
        };
        assert!(err.is_circular());
        assert_eq!(err.ty(), Some(TypeKey::of::<Foo>()));
        assert!(err.to_string().contains(" -> "));
    }

    #[test]
    fn test_construction_failed_source() {
        let err = ResolutionError::construction_failed(TypeKey::of::<Foo>(), "refused");
        let source = StdError::source(&err).unwrap();
        assert_eq!(source.to_string(), "refused");

        let cloned = err.clone();
        assert_eq!(cloned.ty(), Some(TypeKey::of::<Foo>()));
    }

    #[test]
    fn test_lookup_message() {
        let err = LookupError::new(TypeKey::of::<Foo>(), NotFound::Interface);
        assert!(err.to_string().contains("interface"));
    }
}
