//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors.
///
/// Covers the failure modes of registration and resolution: a key that was
/// never registered, a downcast that does not match the stored type, a
/// circular factory chain, and lifetime misuse such as resolving a scoped
/// service from the root provider.
///
/// # Examples
///
/// ```rust
/// use fnboot::{DiError, ServiceCollection, Resolver};
///
/// let provider = ServiceCollection::new().build();
/// match provider.get::<String>() {
///     Err(DiError::NotFound(name)) => assert_eq!(name, "alloc::string::String"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No registration exists for the requested key.
    #[error("service not found: {0}")]
    NotFound(&'static str),
    /// The stored value could not be downcast to the requested type.
    #[error("type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// A factory chain resolved back into itself. Carries the full path.
    #[error("circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Lifetime misuse, e.g. a scoped service requested from the root.
    #[error("lifetime error: {0}")]
    WrongLifetime(&'static str),
    /// The factory chain exceeded the maximum resolution depth.
    #[error("max resolution depth {0} exceeded")]
    DepthExceeded(usize),
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
