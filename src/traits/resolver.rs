//! Resolver traits for service resolution.

use std::any::TypeId;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::internal::BoxFutureUnit;
use crate::key::Key;
use crate::traits::{AsyncDispose, Dispose};

/// Object-safe core of service resolution.
///
/// Handles the low-level mechanics: type-erased lookup, circular
/// dependency detection, and disposal hook registration. Most callers
/// want [`Resolver`] instead, which layers type-safe generics on top.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single service by key under cycle detection.
    fn resolve_any(&self, key: &Key) -> DiResult<Arc<dyn std::any::Any + Send + Sync>>;

    /// Resolves every implementation in a trait's multi-binding list, in
    /// registration order. Non-trait keys yield an empty vector.
    fn resolve_many(&self, key: &Key) -> DiResult<Vec<Arc<dyn std::any::Any + Send + Sync>>>;

    /// Registers a synchronous disposal hook with the owning scope or
    /// provider.
    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>);

    /// Registers an asynchronous disposal hook with the owning scope or
    /// provider.
    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>);
}

/// Type-safe resolution interface.
///
/// Implemented by `ServiceProvider`, `Scope`, and the `ResolverContext`
/// handed to factories, so the same factory code works at the root and
/// inside scopes.
///
/// # Examples
///
/// ```
/// use fnboot::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".to_string() }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(8080u16);
/// services.add_singleton_trait(Arc::new(English) as Arc<dyn Greeter>);
///
/// let provider = services.build();
/// assert_eq!(*provider.get_required::<u16>(), 8080);
/// assert_eq!(provider.get_required_trait::<dyn Greeter>().greet(), "hello");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let key = Key::Type(TypeId::of::<T>(), std::any::type_name::<T>());
        let any = self.resolve_any(&key)?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a single trait implementation.
    ///
    /// If the trait has multiple registrations, the most recent one wins.
    /// Use [`get_all_trait`](Self::get_all_trait) for the full list.
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>>
    where
        Arc<T>: 'static,
    {
        let key = Key::Trait(std::any::type_name::<T>());
        let any = self.resolve_any(&key)?;
        // Trait objects are stored double-wrapped: Arc<Arc<dyn Trait>>
        any.downcast::<Arc<T>>()
            .map(|outer| (*outer).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves all registered implementations of a trait, in
    /// registration order. This is the list-injection form for traits
    /// registered multiple times under the same key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fnboot::{ServiceCollection, Resolver, Lifetime};
    /// use std::sync::Arc;
    ///
    /// trait Validator: Send + Sync {
    ///     fn name(&self) -> &str;
    /// }
    ///
    /// struct Length;
    /// impl Validator for Length {
    ///     fn name(&self) -> &str { "length" }
    /// }
    ///
    /// struct Charset;
    /// impl Validator for Charset {
    ///     fn name(&self) -> &str { "charset" }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_trait_implementation(Arc::new(Length) as Arc<dyn Validator>, Lifetime::Singleton);
    /// services.add_trait_implementation(Arc::new(Charset) as Arc<dyn Validator>, Lifetime::Singleton);
    ///
    /// let provider = services.build();
    /// let validators = provider.get_all_trait::<dyn Validator>().unwrap();
    /// assert_eq!(validators.len(), 2);
    /// assert_eq!(validators[0].name(), "length");
    /// ```
    fn get_all_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>>
    where
        Arc<T>: 'static,
    {
        let key = Key::Trait(std::any::type_name::<T>());
        let anys = self.resolve_many(&key)?;

        let mut results = Vec::with_capacity(anys.len());
        for any in anys {
            let arc = any
                .downcast::<Arc<T>>()
                .map(|outer| (*outer).clone())
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
            results.push(arc);
        }
        Ok(results)
    }

    /// Resolves a concrete service type, panicking on failure.
    ///
    /// Use when the registration is part of the app's wiring contract and
    /// absence is a programming error.
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("failed to resolve {}: {:?}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait implementation, panicking on failure.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T>
    where
        Arc<T>: 'static,
    {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("failed to resolve trait {}: {:?}", std::any::type_name::<T>(), e))
    }

    /// Registers a service for synchronous disposal when the owning scope
    /// or provider is disposed. Hooks run in LIFO order.
    fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        self.push_sync_disposer(Box::new(move || service.dispose()));
    }

    /// Registers a service for asynchronous disposal. Async hooks run
    /// before sync hooks, in LIFO order.
    fn register_async_disposer<T: AsyncDispose>(&self, service: Arc<T>) {
        self.push_async_disposer(Box::new(move || {
            Box::pin(async move {
                service.dispose().await;
            })
        }));
    }
}
