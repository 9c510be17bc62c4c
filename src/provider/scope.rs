//! Scoped resolution and the per-invocation lifecycle.

use std::future::Future;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use super::{ResolverContext, ServiceProvider};
use crate::internal::{with_circular_catch, BoxFutureUnit, DisposeBag};
use crate::registration::{AnyArc, Registration};
use crate::traits::{AsyncDispose, Dispose, Resolver, ResolverCore};
use crate::{DiError, DiResult, Key, Lifetime};

/// Per-invocation resolution context.
///
/// A scope caches scoped services in slot-indexed cells while singletons
/// stay shared with the root provider. Transients are always fresh. The
/// scope also collects disposal hooks for everything constructed inside
/// it; [`dispose_all`](Scope::dispose_all) runs them when the invocation
/// ends.
///
/// Cloning a `Scope` is cheap and shares state: clones see the same
/// cached instances and feed the same disposal hooks.
///
/// # Examples
///
/// ```
/// use fnboot::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct DbSession(String);
/// struct Handler { session: Arc<DbSession> }
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_factory::<DbSession, _>(|_| DbSession("sess-1".to_string()));
/// services.add_transient_factory::<Handler, _>(|r| Handler {
///     session: r.get_required::<DbSession>(),
/// });
///
/// let provider = services.build();
/// let scope = provider.create_scope();
///
/// let h1 = scope.get_required::<Handler>();
/// let h2 = scope.get_required::<Handler>();
/// assert!(Arc::ptr_eq(&h1.session, &h2.session)); // one session per scope
/// ```
pub struct Scope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    root: ServiceProvider,
    cells: Box<[OnceCell<AnyArc>]>,
    disposers: Mutex<DisposeBag>,
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        if !self.disposers.get_mut().is_empty() {
            tracing::warn!(
                "scope dropped with undisposed services; call dispose_all().await before dropping"
            );
        }
    }
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider) -> Self {
        let count = root.inner().registry.scoped_count;
        let cells: Box<[OnceCell<AnyArc>]> =
            (0..count).map(|_| OnceCell::new()).collect::<Vec<_>>().into_boxed_slice();
        Self {
            inner: Arc::new(ScopeInner {
                root,
                cells,
                disposers: Mutex::new(DisposeBag::default()),
            }),
        }
    }

    /// The root provider this scope was created from.
    pub fn provider(&self) -> &ServiceProvider {
        &self.inner.root
    }

    /// Slot-based scoped resolution. Slots are assigned at build time so
    /// lookup is an index, not a hash.
    #[inline(always)]
    fn resolve_scoped(&self, reg: &Registration) -> DiResult<AnyArc> {
        let Some(slot) = reg.scoped_slot else {
            // Slots are assigned for every scoped registration in finalize.
            let ctx = ResolverContext::new(self);
            return (reg.ctor)(&ctx);
        };
        let cell = &self.inner.cells[slot];
        if let Some(value) = cell.get() {
            return Ok(value.clone());
        }
        let ctx = ResolverContext::new(self);
        let v = (reg.ctor)(&ctx)?;
        Ok(cell.get_or_init(|| v.clone()).clone())
    }

    fn resolve_any_impl(&self, key: &Key) -> DiResult<AnyArc> {
        let name = key.display_name();
        let registry = &self.inner.root.inner().registry;

        if let Some(reg) = registry.get(key) {
            return match reg.lifetime {
                Lifetime::Singleton => self.inner.root.resolve_singleton(reg),
                Lifetime::Scoped => self.resolve_scoped(reg),
                Lifetime::Transient => {
                    // The scope is the resolver so nested scoped
                    // dependencies land in this scope's cells.
                    let ctx = ResolverContext::new(self);
                    (reg.ctor)(&ctx)
                }
            };
        }

        if let Key::Trait(trait_name) = key {
            if let Some(last) = registry.many.get(trait_name).and_then(|r| r.last()) {
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
        let registry = &self.inner.root.inner().registry;
        let Some(regs) = registry.many.get(trait_name) else {
            return Ok(Vec::new());
        };

        let mut results = Vec::with_capacity(regs.len());
        for (i, reg) in regs.iter().enumerate() {
            let multi_key = Key::MultiTrait(trait_name, i);
            let value = match reg.lifetime {
                Lifetime::Singleton => {
                    {
                        let cache = self.inner.root.inner().multi_singletons.lock();
                        if let Some(cached) = cache.get(&multi_key) {
                            results.push(cached.clone());
                            continue;
                        }
                    }
                    let ctx = ResolverContext::new(self);
                    let value = (reg.ctor)(&ctx)?;
                    let mut cache = self.inner.root.inner().multi_singletons.lock();
                    cache.entry(multi_key).or_insert(value).clone()
                }
                Lifetime::Scoped => {
                    if let Some(slot) = reg.scoped_slot {
                        let cell = &self.inner.cells[slot];
                        if let Some(value) = cell.get() {
                            value.clone()
                        } else {
                            let ctx = ResolverContext::new(self);
                            let v = (reg.ctor)(&ctx)?;
                            cell.get_or_init(|| v.clone()).clone()
                        }
                    } else {
                        let ctx = ResolverContext::new(self);
                        (reg.ctor)(&ctx)?
                    }
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

    /// Runs this scope's disposal hooks: async hooks first, then sync
    /// hooks, each set in LIFO order. Each hook runs at most once; a
    /// second call finds the bag already drained.
    pub async fn dispose_all(&self) {
        let mut bag = std::mem::take(&mut *self.inner.disposers.lock());
        bag.run_all_async_reverse().await;
        bag.run_all_sync_reverse();
        tracing::debug!("scope disposed");
    }

    /// Runs an async block against this scope, disposing everything the
    /// block resolved through the `*_disposable` methods when it exits,
    /// whether it succeeded or failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use fnboot::{ServiceCollection, Dispose, DiError};
    ///
    /// struct Session;
    /// impl Dispose for Session {
    ///     fn dispose(&self) { /* close */ }
    /// }
    ///
    /// # async fn example() -> Result<(), DiError> {
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_factory::<Session, _>(|_| Session);
    ///
    /// let provider = services.build();
    /// let scope = provider.create_scope();
    ///
    /// let out = scope.using(|r| async move {
    ///     let _session = r.get_disposable::<Session>()?;
    ///     Ok::<&str, DiError>("done")
    /// }).await?;
    /// // session disposed here
    /// assert_eq!(out, "done");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn using<F, Fut, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(ScopedResolver) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<DiError>,
    {
        let resolver = ScopedResolver::new(self);
        let bag_handle = resolver.bag.clone();

        let result = f(resolver).await;

        // Dispose even on error: async then sync, LIFO.
        let mut bag = std::mem::take(&mut *bag_handle.lock());
        bag.run_all_async_reverse().await;
        bag.run_all_sync_reverse();

        result
    }

    /// Synchronous variant of [`using`](Self::using). Only sync disposal
    /// hooks run; a block that registered async hooks should use `using`.
    pub fn using_sync<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(ScopedResolver) -> Result<R, E>,
        E: From<DiError>,
    {
        let resolver = ScopedResolver::new(self);
        let bag_handle = resolver.bag.clone();

        let result = f(resolver);

        let mut bag = std::mem::take(&mut *bag_handle.lock());
        bag.run_all_sync_reverse();

        result
    }
}

impl ResolverCore for Scope {
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
        self.inner.disposers.lock().push_sync(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.inner.disposers.lock().push_async(f);
    }
}

impl Resolver for Scope {}

/// Resolver handed to [`Scope::using`] blocks.
///
/// The `*_disposable` methods resolve a service and queue its disposal
/// for the end of the block; the plain methods resolve without queueing.
/// Cloneable so it can move into async closures.
#[derive(Clone)]
pub struct ScopedResolver {
    scope: Scope,
    pub(crate) bag: Arc<Mutex<DisposeBag>>,
}

impl ScopedResolver {
    pub(crate) fn new(scope: &Scope) -> Self {
        Self {
            scope: scope.clone(),
            bag: Arc::new(Mutex::new(DisposeBag::default())),
        }
    }

    /// Resolves a concrete type without queueing disposal.
    pub fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.scope.get::<T>()
    }

    /// Resolves a trait implementation without queueing disposal.
    pub fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.scope.get_trait::<T>()
    }

    /// Resolves all implementations of a trait without queueing disposal.
    pub fn get_all_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        self.scope.get_all_trait::<T>()
    }

    /// Resolves a concrete type and queues its sync disposal for block
    /// exit.
    pub fn get_disposable<T>(&self) -> DiResult<Arc<T>>
    where
        T: Dispose + 'static,
    {
        let s = self.scope.get::<T>()?;
        let hook = s.clone();
        self.bag.lock().push_sync(Box::new(move || hook.dispose()));
        Ok(s)
    }

    /// Resolves a concrete type and queues its async disposal for block
    /// exit. Async hooks run before sync hooks.
    pub fn get_async_disposable<T>(&self) -> DiResult<Arc<T>>
    where
        T: AsyncDispose + 'static,
    {
        let s = self.scope.get::<T>()?;
        let hook = s.clone();
        self.bag.lock().push_async(move || async move { hook.dispose().await });
        Ok(s)
    }

    /// Resolves a trait implementation and queues its sync disposal.
    pub fn get_trait_disposable<T>(&self) -> DiResult<Arc<T>>
    where
        T: ?Sized + Dispose + 'static + Send + Sync,
    {
        let s = self.scope.get_trait::<T>()?;
        let hook = s.clone();
        self.bag.lock().push_sync(Box::new(move || hook.dispose()));
        Ok(s)
    }

    /// Resolves a trait implementation and queues its async disposal.
    pub fn get_trait_async_disposable<T>(&self) -> DiResult<Arc<T>>
    where
        T: ?Sized + AsyncDispose + 'static + Send + Sync,
    {
        let s = self.scope.get_trait::<T>()?;
        let hook = s.clone();
        self.bag.lock().push_async(move || async move { hook.dispose().await });
        Ok(s)
    }
}
