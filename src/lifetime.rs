//! Service lifetime definitions.

/// Service lifetimes controlling instance caching behavior.
///
/// A lifetime decides when the container calls a service's factory and
/// where the produced instance is cached.
///
/// # Examples
///
/// ```rust
/// use fnboot::{ServiceCollection, Resolver};
///
/// struct Connection { url: String }
/// struct UnitOfWork { url: String }
/// struct Command;
///
/// let mut services = ServiceCollection::new();
///
/// // Singleton: one instance for the whole process
/// services.add_singleton(Connection {
///     url: "postgres://localhost".to_string(),
/// });
///
/// // Scoped: one instance per scope (per invocation in a function app)
/// services.add_scoped_factory::<UnitOfWork, _>(|r| {
///     let conn = r.get_required::<Connection>();
///     UnitOfWork { url: conn.url.clone() }
/// });
///
/// // Transient: a fresh instance on every resolution
/// services.add_transient_factory::<Command, _>(|_| Command);
///
/// let provider = services.build();
///
/// let c1 = provider.get_required::<Connection>();
/// let scope = provider.create_scope();
/// let c2 = scope.get_required::<Connection>();
/// assert!(std::ptr::eq(&*c1, &*c2)); // same singleton everywhere
///
/// let u1 = scope.get_required::<UnitOfWork>();
/// let u2 = scope.get_required::<UnitOfWork>();
/// assert!(std::ptr::eq(&*u1, &*u2)); // same within the scope
///
/// let other = provider.create_scope();
/// let u3 = other.get_required::<UnitOfWork>();
/// assert!(!std::ptr::eq(&*u1, &*u3)); // different across scopes
///
/// let t1 = scope.get_required::<Command>();
/// let t2 = scope.get_required::<Command>();
/// assert!(!std::ptr::eq(&*t1, &*t2)); // always fresh
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance per root provider, created on first resolution and
    /// cached for the lifetime of the process.
    Singleton,
    /// One instance per scope. Requests within the same scope share the
    /// instance; a new scope starts fresh. Resolving a scoped service
    /// from the root provider is an error.
    Scoped,
    /// A new instance on every resolution, never cached.
    Transient,
}
