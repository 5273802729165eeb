//! Stable identifiers for types taking part in injection.

use std::any::{TypeId, type_name};
use std::hash::{Hash, Hasher};

/// [`TypeKey`] identifies a type inside a catalog or an instance cache.
///
/// Unlike a bare [`TypeId`], a key also carries the type's name, so errors can
/// tell which type they are about. Equality, ordering and hashing only look at
/// the [`TypeId`].
///
/// Keys can be made for unsized types too, which is how trait objects
/// (`dyn Trait`) are described as interfaces.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key of `T`.
    #[inline]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this is the key of `T`.
    #[inline]
    pub fn is<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    trait Greeter {}

    #[test]
    fn test_same_type_same_key() {
        assert_eq!(TypeKey::of::<String>(), TypeKey::of::<String>());
        assert_ne!(TypeKey::of::<String>(), TypeKey::of::<&'static str>());
    }

    #[test]
    fn test_unsized_key() {
        let key = TypeKey::of::<dyn Greeter>();
        assert!(key.is::<dyn Greeter>());
        assert!(!key.is::<Box<dyn Greeter>>());
        assert!(key.name().contains("Greeter"));
    }

    #[test]
    fn test_hash_ignores_name() {
        let mut set = HashSet::new();
        set.insert(TypeKey::of::<u32>());
        assert!(set.contains(&TypeKey::of::<u32>()));
        assert!(!set.contains(&TypeKey::of::<u64>()));
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeKey::of::<u8>().to_string(), "u8");
    }
}
