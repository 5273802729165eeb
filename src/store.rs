//! Instance cache of a resolver.

use std::collections::HashMap;
use std::sync::Arc;

use pocket_core::{Erased, TypeKey};

/// Index of an instance inside a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(usize);

/// [`Store`] holds at most one instance per type.
///
/// Instances live in an append-only arena; a map from [`TypeKey`] to [`Slot`]
/// finds them. An instance is never replaced nor removed once inserted.
///
/// Every instance is an [`Erased`] `Arc<T>` where `T` is the type of its key.
#[derive(Debug, Clone, Default)]
pub struct Store {
    slots: HashMap<TypeKey, Slot>,
    instances: Vec<(TypeKey, Erased)>,
}

impl Store {
    /// Creates a new, empty [`Store`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an [`Erased`] instance under `key`.
    ///
    /// `instance` must hold an `Arc` of the type identified by `key`.
    ///
    /// # Errors
    ///
    /// If the store already holds an instance for `key`, nothing is inserted and
    /// a clone of the existing instance is returned.
    pub(crate) fn insert_erased(&mut self, key: TypeKey, instance: Erased) -> Result<Slot, Erased> {
        if let Some(existing) = self.get_by_key(key) {
            return Err(existing.clone());
        }

        Ok(self.push(key, instance))
    }

    fn push(&mut self, key: TypeKey, instance: Erased) -> Slot {
        let slot = Slot(self.instances.len());
        self.instances.push((key, instance));
        self.slots.insert(key, slot);
        slot
    }

    /// Returns the instance of `T`.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_by_key(TypeKey::of::<T>())
            .and_then(|instance| instance.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Returns the [`Erased`] instance stored under `key`.
    #[inline]
    pub fn get_by_key(&self, key: TypeKey) -> Option<&Erased> {
        self.slot(key).and_then(|slot| self.get_by_slot(slot))
    }

    /// Returns the slot of the instance stored under `key`.
    #[inline]
    pub fn slot(&self, key: TypeKey) -> Option<Slot> {
        self.slots.get(&key).copied()
    }

    #[inline]
    pub fn get_by_slot(&self, slot: Slot) -> Option<&Erased> {
        self.instances.get(slot.0).map(|(_, instance)| instance)
    }

    #[inline]
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.contains_key(TypeKey::of::<T>())
    }

    #[inline]
    pub fn contains_key(&self, key: TypeKey) -> bool {
        self.slots.contains_key(&key)
    }

    /// Returns the keys of the stored instances, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.instances.iter().map(|(key, _)| *key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Foo(u32);

    trait Named: Send + Sync {}

    fn insert<T>(store: &mut Store, value: T) -> Result<Slot, Erased>
    where
        T: Send + Sync + 'static,
    {
        store.insert_erased(TypeKey::of::<T>(), Erased::new(Arc::new(value)))
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = Store::new();
        let slot = insert(&mut store, Foo(1)).unwrap();
        assert_eq!(store.slot(TypeKey::of::<Foo>()), Some(slot));

        let got = store.get::<Foo>().unwrap();
        assert_eq!(got.0, 1);
        assert!(Arc::ptr_eq(&got, &store.get::<Foo>().unwrap()));
        assert!(store.get::<String>().is_none());
    }

    #[test]
    fn test_insert_is_append_only() {
        let mut store = Store::new();
        insert(&mut store, Foo(1)).unwrap();
        let first = store.get::<Foo>().unwrap();

        let existing = insert(&mut store, Foo(2)).unwrap_err();
        let existing = existing.downcast::<Arc<Foo>>().unwrap();
        assert!(Arc::ptr_eq(&existing, &first));
        assert_eq!(store.get::<Foo>().unwrap().0, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_in_insertion_order() {
        let mut store = Store::new();
        insert(&mut store, String::from("b")).unwrap();
        insert(&mut store, Foo(0)).unwrap();

        let keys: Vec<_> = store.keys().collect();
        assert_eq!(keys, vec![TypeKey::of::<String>(), TypeKey::of::<Foo>()]);
        assert!(store.contains::<Foo>());
        assert!(!store.contains::<u8>());
    }

    #[test]
    fn test_unsized_lookup_misses() {
        let store = Store::new();
        assert!(store.get::<dyn Named>().is_none());
        assert!(store.is_empty());
    }
}
