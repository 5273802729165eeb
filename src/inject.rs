//! Injected fields.

use std::any::type_name;
use std::sync::{Arc, OnceLock};

use pocket_core::{BoxError, Erased, TypeKey};

/// [`Inject`] is a field slot filled by the resolver after its owner is built.
///
/// Declare the field with [`Declaration::field`](crate::catalog::Declaration::field)
/// and build the owner with [`Inject::new`]. Once bootstrap succeeds, the slot holds
/// the singleton instance of `T`.
///
/// ```
/// use std::sync::Arc;
///
/// use pocket::{Catalog, Declaration, Inject, Injectable, Resolver};
///
/// struct Clock;
///
/// impl Injectable for Clock {
///     fn declare(decl: &mut Declaration<Self>) {
///         decl.constructor(|| Clock);
///     }
/// }
///
/// struct Scheduler {
///     clock: Inject<Clock>,
/// }
///
/// impl Injectable for Scheduler {
///     fn declare(decl: &mut Declaration<Self>) {
///         decl.constructor(|| Scheduler { clock: Inject::new() })
///             .field("clock", |this| &this.clock);
///     }
/// }
///
/// let resolver = Resolver::bootstrap(Catalog::new().with::<Scheduler>().with::<Clock>())?;
///
/// let scheduler = resolver.get::<Scheduler>()?;
/// let clock = resolver.get::<Clock>()?;
/// assert!(Arc::ptr_eq(scheduler.clock.get().unwrap(), &clock));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Inject<T: ?Sized>(OnceLock<Arc<T>>);

impl<T: ?Sized> Inject<T> {
    /// Creates an empty slot.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the injected instance, or `None` if the slot has not been filled yet.
    #[inline]
    pub fn get(&self) -> Option<&Arc<T>> {
        self.0.get()
    }

    #[inline]
    pub fn is_injected(&self) -> bool {
        self.0.get().is_some()
    }

    /// Fills the slot. Returns the value back if the slot was already filled.
    pub(crate) fn set(&self, value: Arc<T>) -> Result<(), Arc<T>> {
        self.0.set(value)
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inject")
            .field("type", &type_name::<T>())
            .field("injected", &self.is_injected())
            .finish()
    }
}

/// A field of an injectable type marked for injection.
pub struct FieldInfo {
    name: &'static str,
    ty: TypeKey,
    #[allow(clippy::type_complexity)]
    assign: Box<dyn Fn(&Erased, &Erased) -> Result<(), BoxError> + Send + Sync>,
}

impl FieldInfo {
    pub(crate) fn new<O, T>(name: &'static str, slot: fn(&O) -> &Inject<T>) -> Self
    where
        O: Send + Sync + 'static,
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            name,
            ty: TypeKey::of::<T>(),
            assign: Box::new(move |owner, value| {
                let owner = owner.downcast_ref::<Arc<O>>().ok_or_else(|| {
                    format!(
                        "field `{name}` belongs to `{}`, not `{}`",
                        type_name::<O>(),
                        owner.type_name()
                    )
                })?;
                let value = value.downcast_ref::<Arc<T>>().ok_or_else(|| {
                    format!(
                        "field `{name}` expects `{}`, got `{}`",
                        type_name::<Arc<T>>(),
                        value.type_name()
                    )
                })?;

                slot(owner)
                    .set(Arc::clone(value))
                    .map_err(|_| format!("field `{name}` is already injected").into())
            }),
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the key of the field's declared type.
    #[inline]
    pub const fn ty(&self) -> TypeKey {
        self.ty
    }

    /// Stores `value` (an `Arc` of the field type) into the field of `owner`
    /// (an `Arc` of the owning type).
    pub(crate) fn assign(&self, owner: &Erased, value: &Erased) -> Result<(), BoxError> {
        (self.assign)(owner, value)
    }
}

impl std::fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Engine;

    struct Car {
        engine: Inject<Engine>,
    }

    fn engine_slot(car: &Car) -> &Inject<Engine> {
        &car.engine
    }

    #[test]
    fn test_empty_slot() {
        let slot = Inject::<Engine>::new();
        assert!(!slot.is_injected());
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_assign() {
        let field = FieldInfo::new("engine", engine_slot);
        assert_eq!(field.name(), "engine");
        assert_eq!(field.ty(), TypeKey::of::<Engine>());

        let car = Arc::new(Car {
            engine: Inject::new(),
        });
        let engine = Arc::new(Engine);

        field
            .assign(
                &Erased::new(Arc::clone(&car)),
                &Erased::new(Arc::clone(&engine)),
            )
            .unwrap();
        assert!(Arc::ptr_eq(car.engine.get().unwrap(), &engine));
    }

    #[test]
    fn test_assign_twice() {
        let field = FieldInfo::new("engine", engine_slot);
        let car = Erased::new(Arc::new(Car {
            engine: Inject::new(),
        }));
        let engine = Erased::new(Arc::new(Engine));

        field.assign(&car, &engine).unwrap();
        let err = field.assign(&car, &engine).unwrap_err();
        assert!(err.to_string().contains("already injected"));
    }

    #[test]
    fn test_assign_wrong_value() {
        let field = FieldInfo::new("engine", engine_slot);
        let car = Erased::new(Arc::new(Car {
            engine: Inject::new(),
        }));

        let err = field.assign(&car, &Erased::new(Arc::new(0_u8))).unwrap_err();
        assert!(err.to_string().contains("expects"));
    }
}
