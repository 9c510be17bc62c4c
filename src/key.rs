//! Service keys for container storage and lookup.

use std::any::TypeId;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Key identifying a registration in the container.
///
/// Concrete types are keyed by `TypeId` (the name rides along for error
/// messages). Trait objects have no `TypeId`, so they are keyed by the
/// trait's type name; multi-bound traits additionally carry the index of
/// the implementation within the binding list.
#[derive(Debug, Clone)]
pub enum Key {
    /// Concrete type, keyed by `TypeId`.
    Type(TypeId, &'static str),
    /// Single trait binding, keyed by trait name.
    Trait(&'static str),
    /// One implementation in a multi-binding list, keyed by trait name
    /// and position.
    MultiTrait(&'static str, usize),
}

impl Key {
    /// The type or trait name, for diagnostics and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
            Key::MultiTrait(name, _) => name,
        }
    }
}

// Concrete types compare by TypeId only; the name is display-only.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            (Key::MultiTrait(a, i), Key::MultiTrait(b, j)) => a == b && i == j,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a.cmp(b),
            (Key::Type(_, _), _) => Ordering::Less,
            (_, Key::Type(_, _)) => Ordering::Greater,
            (Key::Trait(a), Key::Trait(b)) => a.cmp(b),
            (Key::Trait(_), _) => Ordering::Less,
            (_, Key::Trait(_)) => Ordering::Greater,
            (Key::MultiTrait(a, i), Key::MultiTrait(b, j)) => {
                a.cmp(b).then_with(|| i.cmp(j))
            }
        }
    }
}

impl Hash for Key {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            Key::MultiTrait(name, index) => {
                2u8.hash(state);
                name.hash(state);
                index.hash(state);
            }
        }
    }
}

/// Builds the key for a concrete type.
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}
