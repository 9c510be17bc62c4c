//! Registration storage for the container.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;

pub(crate) use crate::provider::ResolverContext;

/// Type-erased instance as stored in the container.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased constructor closure.
pub(crate) type Ctor =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// One registered service: its lifetime, its factory, and the runtime
/// cells resolution caches into.
pub(crate) struct Registration {
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Ctor,
    /// Singleton cache. Lock-free reads after first initialization.
    pub(crate) single_cell: Option<OnceCell<AnyArc>>,
    /// Slot index into a scope's cell array, assigned by `finalize`.
    pub(crate) scoped_slot: Option<usize>,
}

impl Registration {
    pub(crate) fn new(lifetime: Lifetime, ctor: Ctor) -> Self {
        let single_cell = match lifetime {
            Lifetime::Singleton => Some(OnceCell::new()),
            _ => None,
        };
        Self {
            lifetime,
            ctor,
            single_cell,
            scoped_slot: None,
        }
    }
}

// Linear scan beats hashing below this many registrations.
const INLINE_MAX: usize = 16;

/// All registrations, in hybrid storage: a small sorted Vec scanned
/// linearly, spilling into a HashMap once it fills up. Multi-bindings
/// live in a separate append-only list per trait name.
pub(crate) struct Registry {
    pub(crate) inline: Vec<(Key, Registration)>,
    pub(crate) spill: HashMap<Key, Registration>,
    pub(crate) many: HashMap<&'static str, Vec<Registration>>,
    /// Number of scoped slots a fresh scope must allocate.
    pub(crate) scoped_count: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            inline: Vec::new(),
            spill: HashMap::new(),
            many: HashMap::new(),
            scoped_count: 0,
        }
    }

    /// Inserts a registration, replacing any existing one for the key.
    pub(crate) fn insert(&mut self, key: Key, registration: Registration) {
        if let Some(pos) = self.inline.iter().position(|(k, _)| k == &key) {
            self.inline[pos] = (key, registration);
        } else if self.inline.len() < INLINE_MAX && !self.spill.contains_key(&key) {
            self.inline.push((key, registration));
        } else {
            self.spill.insert(key, registration);
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        for (k, reg) in &self.inline {
            if k == key {
                return Some(reg);
            }
        }
        self.spill.get(key)
    }

    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.inline
            .iter()
            .map(|(k, r)| (k, r))
            .chain(self.spill.iter())
    }

    /// Assigns scoped slot indices and sorts the inline Vec. Called once
    /// by `ServiceCollection::build`; slots are stable afterwards.
    pub(crate) fn finalize(&mut self) {
        self.inline.sort_by(|a, b| a.0.cmp(&b.0));

        let mut next_slot = 0;
        for (_, reg) in &mut self.inline {
            if reg.lifetime == Lifetime::Scoped {
                reg.scoped_slot = Some(next_slot);
                next_slot += 1;
            }
        }
        for reg in self.spill.values_mut() {
            if reg.lifetime == Lifetime::Scoped {
                reg.scoped_slot = Some(next_slot);
                next_slot += 1;
            }
        }
        for regs in self.many.values_mut() {
            for reg in regs.iter_mut() {
                if reg.lifetime == Lifetime::Scoped {
                    reg.scoped_slot = Some(next_slot);
                    next_slot += 1;
                }
            }
        }
        self.scoped_count = next_slot;
    }
}
