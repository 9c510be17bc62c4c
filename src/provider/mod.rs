//! Root service provider.
//!
//! The `ServiceProvider` resolves registered services according to their
//! lifetimes and owns the singleton caches plus the root disposal hooks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::internal::{with_circular_catch, BoxFutureUnit, DisposeBag};
use crate::registration::{AnyArc, Registration, Registry};
use crate::traits::{Resolver, ResolverCore};
use crate::{DiError, DiResult, Key, Lifetime};

pub mod context;
pub mod scope;
pub use context::ResolverContext;
pub use scope::{Scope, ScopedResolver};

/// Resolution root built from a [`ServiceCollection`](crate::ServiceCollection).
///
/// Singletons are created on first request and cached for the life of the
/// provider. Scoped services must be resolved through a [`Scope`]; asking
/// the root for one returns [`DiError::WrongLifetime`]. The provider is
/// cheap to clone and safe to share across threads.
///
/// # Examples
///
/// ```
/// use fnboot::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Pool { url: String }
/// struct Repo { pool: Arc<Pool> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Pool { url: "postgres://localhost".to_string() });
/// services.add_transient_factory::<Repo, _>(|r| Repo {
///     pool: r.get_required::<Pool>(),
/// });
///
/// let provider = services.build();
/// let repo = provider.get_required::<Repo>();
/// assert_eq!(repo.pool.url, "postgres://localhost");
/// ```
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub(crate) registry: Registry,
    /// Cache for singleton multi-bindings, which have no embedded cell.
    pub(crate) multi_singletons: Mutex<HashMap<Key, AnyArc>>,
    pub(crate) root_disposers: Mutex<DisposeBag>,
}

impl Drop for ProviderInner {
    fn drop(&mut self) {
        if !self.root_disposers.get_mut().is_empty() {
            tracing::warn!(
                "provider dropped with undisposed singletons; call dispose_all().await before dropping"
            );
        }
    }
}

impl Clone for ServiceProvider {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl ServiceProvider {
    pub(crate) fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                multi_singletons: Mutex::new(HashMap::new()),
                root_disposers: Mutex::new(DisposeBag::default()),
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    /// Opens a new scope for resolving scoped services.
    ///
    /// Each scope carries its own cache of scoped instances and its own
    /// disposal hooks; singletons stay shared with the root. In a function
    /// app one scope corresponds to one invocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use fnboot::{ServiceCollection, Resolver};
    /// use std::sync::{Arc, Mutex};
    ///
    /// struct InvocationId(String);
    ///
    /// let counter = Arc::new(Mutex::new(0));
    /// let c = counter.clone();
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_factory::<InvocationId, _>(move |_| {
    ///     let mut n = c.lock().unwrap();
    ///     *n += 1;
    ///     InvocationId(format!("inv-{}", *n))
    /// });
    ///
    /// let provider = services.build();
    /// let scope1 = provider.create_scope();
    /// let scope2 = provider.create_scope();
    ///
    /// let a = scope1.get_required::<InvocationId>();
    /// let b = scope1.get_required::<InvocationId>();
    /// let c = scope2.get_required::<InvocationId>();
    /// assert!(Arc::ptr_eq(&a, &b));
    /// assert!(!Arc::ptr_eq(&a, &c));
    /// ```
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    /// Runs all root disposal hooks: async hooks first, then sync hooks,
    /// each set in LIFO order. This is the shutdown path for singletons;
    /// calling it twice is harmless because the hooks are drained.
    pub async fn dispose_all(&self) {
        // Take the bag so no guard is held across await points.
        let mut bag = std::mem::take(&mut *self.inner.root_disposers.lock());
        bag.run_all_async_reverse().await;
        bag.run_all_sync_reverse();
        tracing::debug!("root provider disposed");
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Service Provider ===\n");
        s.push_str("Single bindings:\n");
        for (k, r) in self.inner.registry.iter() {
            s.push_str(&format!("  {:?}: {:?}\n", k, r.lifetime));
        }
        s.push_str("Multi bindings:\n");
        for (k, rs) in &self.inner.registry.many {
            for (i, r) in rs.iter().enumerate() {
                s.push_str(&format!("  {} [{}]: {:?}\n", k, i, r.lifetime));
            }
        }
        s
    }

    /// Singleton resolution through the registration's embedded cell.
    /// Lock-free after first initialization.
    #[inline(always)]
    pub(crate) fn resolve_singleton(&self, reg: &Registration) -> DiResult<AnyArc> {
        if let Some(cell) = &reg.single_cell {
            if let Some(value) = cell.get() {
                return Ok(value.clone());
            }
            let ctx = ResolverContext::new(self);
            let v = (reg.ctor)(&ctx)?;
            return Ok(cell.get_or_init(|| v.clone()).clone());
        }
        // Registrations built by ServiceCollection always carry a cell for
        // singletons; this path is unreachable in practice.
        let ctx = ResolverContext::new(self);
        (reg.ctor)(&ctx)
    }

    fn resolve_any_impl(&self, key: &Key) -> DiResult<AnyArc> {
        let name = key.display_name();

        if let Some(reg) = self.inner.registry.get(key) {
            return match reg.lifetime {
                Lifetime::Singleton => self.resolve_singleton(reg),
                Lifetime::Scoped => Err(DiError::WrongLifetime(
                    "cannot resolve scoped service from root provider",
                )),
                Lifetime::Transient => {
                    let ctx = ResolverContext::new(self);
                    (reg.ctor)(&ctx)
                }
            };
        }

        if let Key::Trait(trait_name) = key {
            // A trait with only multi-bindings resolves to the last one.
            if let Some(last) = self.inner.registry.many.get(trait_name).and_then(|r| r.last()) {
                let ctx = ResolverContext::new(self);
                return (last.ctor)(&ctx);
            }
        }

        Err(DiError::NotFound(name))
    }

    fn resolve_many_impl(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        let Key::Trait(trait_name) = key else {
            return Ok(Vec::new());
        };
        let Some(regs) = self.inner.registry.many.get(trait_name) else {
            return Ok(Vec::new());
        };

        let mut results = Vec::with_capacity(regs.len());
        for (i, reg) in regs.iter().enumerate() {
            let multi_key = Key::MultiTrait(trait_name, i);
            let value = match reg.lifetime {
                Lifetime::Singleton => {
                    // Never hold the cache lock while a factory runs.
                    {
                        let cache = self.inner.multi_singletons.lock();
                        if let Some(cached) = cache.get(&multi_key) {
                            results.push(cached.clone());
                            continue;
                        }
                    }
                    let ctx = ResolverContext::new(self);
                    let value = (reg.ctor)(&ctx)?;
                    let mut cache = self.inner.multi_singletons.lock();
                    cache.entry(multi_key).or_insert(value).clone()
                }
                Lifetime::Scoped => {
                    return Err(DiError::WrongLifetime(
                        "cannot resolve scoped service from root provider",
                    ));
                }
                Lifetime::Transient => {
                    let ctx = ResolverContext::new(self);
                    (reg.ctor)(&ctx)?
                }
            };
            results.push(value);
        }
        Ok(results)
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        with_circular_catch(key.display_name(), || self.resolve_any_impl(key))
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        if matches!(key, Key::Trait(_)) {
            with_circular_catch(key.display_name(), || self.resolve_many_impl(key))
        } else {
            Ok(Vec::new())
        }
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.inner.root_disposers.lock().push_sync(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.inner.root_disposers.lock().push_async(f);
    }
}

impl Resolver for ServiceProvider {}
