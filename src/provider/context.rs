//! Resolver context handed to factories.

use crate::traits::{Resolver, ResolverCore};

/// Context passed to factory closures for resolving dependencies.
///
/// Wraps whichever resolver is active (root provider or scope) so a
/// factory works unchanged in both, and so disposal hooks registered by
/// the factory land with the right owner.
///
/// # Examples
///
/// ```
/// use fnboot::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Client { url: String }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Config { url: "https://api".to_string() });
/// services.add_transient_factory::<Client, _>(|r| {
///     // `r` is a ResolverContext
///     let config = r.get_required::<Config>();
///     Client { url: config.url.clone() }
/// });
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new<T>(resolver: &'a T) -> Self
    where
        T: ResolverCore,
    {
        Self { resolver }
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_any(&self, key: &crate::Key) -> crate::DiResult<crate::registration::AnyArc> {
        self.resolver.resolve_any(key)
    }

    fn resolve_many(&self, key: &crate::Key) -> crate::DiResult<Vec<crate::registration::AnyArc>> {
        self.resolver.resolve_many(key)
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.resolver.push_sync_disposer(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> crate::internal::BoxFutureUnit + Send>) {
        self.resolver.push_async_disposer(f);
    }
}

impl<'a> Resolver for ResolverContext<'a> {}
