//! Opaque instance handles with erased type information.

use std::any::{Any, type_name};

/// [`CloneBoxed`] is a trait to clone a reference to an `?Sized` type into a [`Box`].
///
/// This trait is used to work around [`Sized`] bound on [`Clone`].
trait CloneBoxed: Any + Send + Sync {
    fn clone_boxed(&self) -> Box<dyn CloneBoxed + Send + Sync>;
}

impl<T> CloneBoxed for T
where
    T: Any + Clone + Send + Sync,
{
    fn clone_boxed(&self) -> Box<dyn CloneBoxed + Send + Sync> {
        Box::new(self.clone())
    }
}

/// [`Erased`] holds a value of an arbitrary type, as long as it implements
/// [`Clone`], [`Send`], and [`Sync`] and is `'static`.
///
/// The resolver keeps every built instance as an `Erased` wrapping an
/// [`Arc`](std::sync::Arc), so cloning an `Erased` shares the instance instead of
/// copying it.
pub struct Erased {
    value: Box<dyn CloneBoxed + Send + Sync>,
    type_name: &'static str,
}

impl Erased {
    /// Creates a new `Erased` with the provided `value` of type `T`.
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the name of the type of the held value.
    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the held value is of type `T`.
    #[inline]
    pub fn is<T>(&self) -> bool
    where
        T: 'static,
    {
        self.as_any().is::<T>()
    }

    /// Returns a reference to the held value if it is of type `T`.
    #[inline]
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: 'static,
    {
        self.as_any().downcast_ref()
    }

    /// Tries to downcast `self` into type `T`.
    ///
    /// # Errors
    ///
    /// If the underlying value is not of type `T`, this method will return
    /// itself as error.
    pub fn downcast<T>(self) -> Result<T, Self>
    where
        T: Clone + Send + Sync + 'static,
    {
        match self.downcast_ref::<T>() {
            Some(value) => Ok(value.clone()),
            None => Err(self),
        }
    }

    #[inline]
    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        &*self.value
    }
}

impl Clone for Erased {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone_boxed(),
            type_name: self.type_name,
        }
    }
}

impl std::fmt::Debug for Erased {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Erased")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Erased;

    #[allow(dead_code)]
    fn test_implements_send_and_sync() -> impl Send + Sync {
        Erased::new(Arc::new("Hello".to_string()))
    }

    #[test]
    fn test_downcast() {
        let erased = Erased::new(Arc::new("Hello".to_string()));
        let got = erased.downcast::<Arc<String>>().unwrap();
        assert_eq!(*got, "Hello");
    }

    #[test]
    fn test_downcast_err() {
        let erased = Erased::new(Arc::new("Hello".to_string()));
        let err = erased.downcast::<Arc<i32>>().unwrap_err();

        let got = err.downcast::<Arc<String>>().unwrap();
        assert_eq!(*got, "Hello");
    }

    #[test]
    fn test_downcast_ref() {
        let erased = Erased::new(Arc::new(7_u32));
        assert!(erased.is::<Arc<u32>>());
        assert_eq!(**erased.downcast_ref::<Arc<u32>>().unwrap(), 7);
        assert!(erased.downcast_ref::<Arc<u64>>().is_none());
    }

    #[test]
    fn test_clone_shares_arc() {
        let a = Arc::new(100);
        let erased = Erased::new(Arc::clone(&a));
        assert_eq!(Arc::strong_count(&a), 2);

        let cloned = erased.clone();
        assert_eq!(Arc::strong_count(&a), 3);
        assert!(Arc::ptr_eq(
            cloned.downcast_ref::<Arc<i32>>().unwrap(),
            erased.downcast_ref::<Arc<i32>>().unwrap(),
        ));

        drop(cloned);
        drop(erased);
        assert_eq!(Arc::strong_count(&a), 1);
    }

    #[test]
    fn test_type_name() {
        let erased = Erased::new(Arc::new(1_u8));
        assert!(erased.type_name().contains("Arc<u8>"));
    }
}
