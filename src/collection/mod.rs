//! Service registration surface.
//!
//! `ServiceCollection` gathers registrations and builds the immutable
//! `ServiceProvider`. Factories receive a [`ResolverContext`] so they can
//! resolve their own dependencies; that recursion is how constructor
//! injection works here.

use std::sync::Arc;

use crate::key::key_of_type;
use crate::provider::ResolverContext;
use crate::registration::{AnyArc, Registration, Registry};
use crate::traits::{AsyncDispose, Dispose, Resolver};
use crate::{DiResult, Key, Lifetime, ServiceProvider};

pub mod modules;
pub use modules::*;

/// Mutable set of service registrations.
///
/// # Examples
///
/// ```rust
/// use fnboot::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Settings { region: String }
/// struct Uploader { region: String }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Settings { region: "eu-west-1".to_string() });
/// services.add_scoped_factory::<Uploader, _>(|r| {
///     let settings = r.get_required::<Settings>();
///     Uploader { region: settings.region.clone() }
/// });
///
/// let provider = services.build();
/// let scope = provider.create_scope();
/// assert_eq!(scope.get_required::<Uploader>().region, "eu-west-1");
/// ```
pub struct ServiceCollection {
    registry: Registry,
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self { registry: Registry::new() }
    }

    // ----- Concrete type registrations -----

    /// Registers an existing value as a singleton.
    ///
    /// The value is wrapped in an `Arc` immediately; every resolution
    /// returns the same instance.
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        let arc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(arc.clone()) };
        self.registry
            .insert(key_of_type::<T>(), Registration::new(Lifetime::Singleton, Arc::new(ctor)));
        self
    }

    /// Registers a singleton created lazily by `factory` on first
    /// resolution, then cached.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Singleton, factory)
    }

    /// Registers a factory producing one instance per scope.
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Scoped, factory)
    }

    /// Registers a factory called on every resolution.
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Transient, factory)
    }

    fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        self.registry
            .insert(key_of_type::<T>(), Registration::new(lifetime, Arc::new(ctor)));
        self
    }

    // ----- Disposable registrations -----
    //
    // These wire the disposal hook at construction time, so a resolved
    // instance is disposed exactly once when its owner (the scope for
    // scoped services, the root for singletons) is disposed.

    /// Registers a scoped service whose `Dispose` hook runs when the
    /// scope is disposed.
    pub fn add_scoped_disposable_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Dispose,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_disposable(Lifetime::Scoped, factory)
    }

    /// Registers a scoped service whose `AsyncDispose` hook runs when the
    /// scope is disposed.
    pub fn add_scoped_async_disposable_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: AsyncDispose,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_async_disposable(Lifetime::Scoped, factory)
    }

    /// Registers a singleton whose `Dispose` hook runs at provider
    /// shutdown.
    pub fn add_singleton_disposable_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Dispose,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_disposable(Lifetime::Singleton, factory)
    }

    /// Registers a singleton whose `AsyncDispose` hook runs at provider
    /// shutdown.
    pub fn add_singleton_async_disposable_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: AsyncDispose,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_async_disposable(Lifetime::Singleton, factory)
    }

    fn add_disposable<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: Dispose,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> {
            let value = Arc::new(factory(r));
            r.register_disposer(value.clone());
            Ok(value as AnyArc)
        };
        self.registry
            .insert(key_of_type::<T>(), Registration::new(lifetime, Arc::new(ctor)));
        self
    }

    fn add_async_disposable<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: AsyncDispose,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> {
            let value = Arc::new(factory(r));
            r.register_async_disposer(value.clone());
            Ok(value as AnyArc)
        };
        self.registry
            .insert(key_of_type::<T>(), Registration::new(lifetime, Arc::new(ctor)));
        self
    }

    // ----- Trait single-binding registrations -----

    /// Binds an existing implementation to a trait as a singleton.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fnboot::{ServiceCollection, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Clock: Send + Sync {
    ///     fn now(&self) -> u64;
    /// }
    ///
    /// struct FixedClock;
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> u64 { 0 }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_trait(Arc::new(FixedClock) as Arc<dyn Clock>);
    /// ```
    pub fn add_singleton_trait<T>(&mut self, value: Arc<T>) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        let key = Key::Trait(std::any::type_name::<T>());
        // Stored double-wrapped: Arc<Arc<dyn Trait>> inside the Any.
        let any_arc: AnyArc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(any_arc.clone()) };
        self.registry.insert(key, Registration::new(Lifetime::Singleton, Arc::new(ctor)));
        self
    }

    /// Binds a trait to a lazily created singleton implementation.
    pub fn add_singleton_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Singleton, factory)
    }

    /// Binds a trait to a per-scope implementation.
    pub fn add_scoped_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Scoped, factory)
    }

    /// Binds a trait to a fresh implementation per resolution.
    pub fn add_transient_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Transient, factory)
    }

    fn add_trait_factory_impl<Trait, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        let key = Key::Trait(std::any::type_name::<Trait>());
        let factory = Arc::new(factory);
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        self.registry.insert(key, Registration::new(lifetime, Arc::new(ctor)));
        self
    }

    // ----- Trait multi-binding registrations -----

    /// Appends an implementation to a trait's multi-binding list.
    ///
    /// All implementations registered this way come back together from
    /// `get_all_trait`, in registration order; resolving the single form
    /// returns the last one.
    pub fn add_trait_implementation<T>(&mut self, value: Arc<T>, lifetime: Lifetime) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        let name = std::any::type_name::<T>();
        let any_arc: AnyArc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(any_arc.clone()) };
        self.registry
            .many
            .entry(name)
            .or_default()
            .push(Registration::new(lifetime, Arc::new(ctor)));
        self
    }

    /// Appends a factory to a trait's multi-binding list.
    pub fn add_trait_factory<Trait, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        let name = std::any::type_name::<Trait>();
        let factory = Arc::new(factory);
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        self.registry
            .many
            .entry(name)
            .or_default()
            .push(Registration::new(lifetime, Arc::new(ctor)));
        self
    }

    // ----- Introspection -----

    /// Whether a registration exists for the concrete type `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.registry.contains_key(&key_of_type::<T>())
    }

    /// Number of single-binding registrations.
    pub fn len(&self) -> usize {
        self.registry.iter().count()
    }

    /// Whether the collection has no registrations at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.registry.many.is_empty()
    }

    // ----- Build -----

    /// Finalizes the registrations into an immutable provider.
    ///
    /// Scoped slot indices are assigned here; the collection cannot be
    /// modified afterwards.
    pub fn build(mut self) -> ServiceProvider {
        self.registry.finalize();
        ServiceProvider::new(self.registry)
    }
}
