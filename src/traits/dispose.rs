//! Disposal traits for resource cleanup.

/// Synchronous resource disposal.
///
/// Implement for services that need structured teardown (flushing caches,
/// closing file handles). Hooks run in LIFO order when the owning scope or
/// provider is disposed.
///
/// # Examples
///
/// ```
/// use fnboot::{Dispose, ServiceCollection};
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("flushing {}", self.name);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// // The container wires the disposal hook automatically.
/// services.add_scoped_disposable_factory::<Cache, _>(|_| Cache {
///     name: "request_cache".to_string(),
/// });
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup.
    fn dispose(&self);
}

/// Asynchronous resource disposal.
///
/// Implement for services with async teardown (graceful connection
/// shutdown, async I/O flush). Async hooks run before sync hooks, in
/// LIFO order.
///
/// # Examples
///
/// ```
/// use fnboot::{AsyncDispose, ServiceCollection};
/// use async_trait::async_trait;
///
/// struct HttpClient {
///     endpoint: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for HttpClient {
///     async fn dispose(&self) {
///         println!("draining client for {}", self.endpoint);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_async_disposable_factory::<HttpClient, _>(|_| HttpClient {
///     endpoint: "https://api.internal".to_string(),
/// });
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup.
    async fn dispose(&self);
}
