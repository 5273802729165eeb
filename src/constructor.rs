//! Constructor functions and types.

use std::any::type_name;
use std::sync::Arc;

use pocket_core::{BoxError, Erased, TypeKey};

/// [`Constructor`] is a trait to describe how to build an injectable type.
///
/// In most cases, you don't need to implement this trait manually, as
/// [`Constructor`] is automatically implemented on the following types:
///
/// - Functions that take up to twelve [`Arc`] parameters and return `T`.
/// - Functions that take up to twelve [`Arc`] parameters and return `Result<T, E>`,
///   where `E` can be turned into a [`BoxError`].
///
/// Each parameter type is a dependency of `T`, resolved before the function is called.
pub trait Constructor<T, Args>: Send + Sync + 'static {
    /// Returns the keys of the parameter types, in declaration order.
    fn parameters() -> Vec<TypeKey>;

    /// Calls the constructor with resolved arguments.
    ///
    /// `args` must hold one `Arc` per parameter, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not match the parameters, or if a
    /// fallible constructor fails.
    fn construct(&self, args: &[Erased]) -> Result<T, BoxError>;
}

/// Marks [`Constructor`] implementations of functions returning [`Result`].
#[doc(hidden)]
#[derive(Debug)]
pub struct Fallible;

fn argument<'a, P>(args: &mut impl Iterator<Item = &'a Erased>) -> Result<Arc<P>, BoxError>
where
    P: ?Sized + Send + Sync + 'static,
{
    let erased = args.next().ok_or("missing constructor argument")?;
    erased.downcast_ref::<Arc<P>>().cloned().ok_or_else(|| {
        format!(
            "expected argument of type `{}`, got `{}`",
            type_name::<Arc<P>>(),
            erased.type_name()
        )
        .into()
    })
}

macro_rules! impl_constructor_fn {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, T, $($ty,)*> Constructor<T, fn($(Arc<$ty>,)*)> for F
        where
            F: Fn($(Arc<$ty>,)*) -> T + Send + Sync + 'static,
            $( $ty: ?Sized + Send + Sync + 'static, )*
        {
            fn parameters() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$ty>(),)*]
            }

            fn construct(&self, args: &[Erased]) -> Result<T, BoxError> {
                let mut args = args.iter();
                $( let $ty = argument::<$ty>(&mut args)?; )*
                Ok(self($($ty,)*))
            }
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, T, E, $($ty,)*> Constructor<T, (Fallible, fn($(Arc<$ty>,)*))> for F
        where
            F: Fn($(Arc<$ty>,)*) -> Result<T, E> + Send + Sync + 'static,
            E: Into<BoxError>,
            $( $ty: ?Sized + Send + Sync + 'static, )*
        {
            fn parameters() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$ty>(),)*]
            }

            fn construct(&self, args: &[Erased]) -> Result<T, BoxError> {
                let mut args = args.iter();
                $( let $ty = argument::<$ty>(&mut args)?; )*
                self($($ty,)*).map_err(Into::into)
            }
        }
    };
}

impl_constructor_fn!();
apply_tuples!(impl_constructor_fn);

/// The single constructor kept for a type, with its parameters resolved to keys.
pub struct ConstructorInfo {
    parameters: Vec<TypeKey>,
    #[allow(clippy::type_complexity)]
    build: Box<dyn Fn(&[Erased]) -> Result<Erased, BoxError> + Send + Sync>,
}

impl ConstructorInfo {
    pub(crate) fn new<T, C, A>(constructor: C) -> Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, A>,
    {
        Self {
            parameters: C::parameters(),
            build: Box::new(move |args| {
                constructor
                    .construct(args)
                    .map(|value| Erased::new(Arc::new(value)))
            }),
        }
    }

    /// Returns the keys of the parameter types, in declaration order.
    #[inline]
    pub fn parameters(&self) -> &[TypeKey] {
        &self.parameters
    }

    /// Builds a new instance from resolved arguments.
    ///
    /// The returned [`Erased`] holds an `Arc<T>`.
    pub(crate) fn construct(&self, args: &[Erased]) -> Result<Erased, BoxError> {
        (self.build)(args)
    }
}

impl std::fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
