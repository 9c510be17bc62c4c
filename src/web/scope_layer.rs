//! Per-request scope middleware and extractor.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::{DiResult, Scope, ServiceProvider};

/// Tower layer that opens a DI scope around every request.
///
/// The scope is created before the inner service runs, stored in the
/// request extensions for [`DiScope`] to pick up, and disposed after the
/// response is produced. Disposal runs on the error path too, and a
/// panicking handler is caught, disposed after, and resumed, so scoped
/// resources are cleaned up exactly once per request regardless of
/// outcome.
#[derive(Clone)]
pub struct ScopeLayer {
    provider: Arc<ServiceProvider>,
}

impl ScopeLayer {
    pub fn new(provider: Arc<ServiceProvider>) -> Self {
        Self { provider }
    }
}

impl<S> Layer<S> for ScopeLayer {
    type Service = ScopeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ScopeService {
            inner,
            provider: self.provider.clone(),
        }
    }
}

/// Service produced by [`ScopeLayer`].
#[derive(Clone)]
pub struct ScopeService<S> {
    inner: S,
    provider: Arc<ServiceProvider>,
}

impl<S> Service<Request> for ScopeService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let provider = self.provider.clone();
        // Take the ready inner service, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let scope = provider.create_scope();
            req.extensions_mut().insert(scope.clone());

            // Catch unwinds at the poll level so a panicking handler
            // still reaches disposal; the panic resumes afterwards.
            let mut call = Box::pin(inner.call(req));
            let result = std::future::poll_fn(|cx| {
                match catch_unwind(AssertUnwindSafe(|| call.as_mut().poll(cx))) {
                    Ok(poll) => poll.map(Ok),
                    Err(payload) => Poll::Ready(Err(payload)),
                }
            })
            .await;

            scope.dispose_all().await;

            match result {
                Ok(result) => result,
                Err(payload) => std::panic::resume_unwind(payload),
            }
        })
    }
}

/// Extractor for the request's DI scope.
///
/// Pulls the scope that [`ScopeLayer`] stored in the request extensions.
/// Scoped services resolved through it are shared with anything else in
/// the same request and disposed when the request ends.
///
/// ```rust,no_run
/// use fnboot::web::DiScope;
/// use std::sync::Arc;
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// async fn hello(scope: DiScope) -> String {
///     let greeter = scope.get_required::<Greeter>();
///     greeter.greeting.clone()
/// }
/// ```
pub struct DiScope {
    scope: Scope,
}

impl DiScope {
    /// Resolves a required service, panicking if unregistered.
    pub fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        use crate::Resolver;
        self.scope.get_required()
    }

    /// Resolves an optional service.
    pub fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        use crate::Resolver;
        self.scope.get()
    }

    /// Resolves a trait implementation.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        use crate::Resolver;
        self.scope.get_trait()
    }

    /// Resolves all implementations in a trait's multi-binding list.
    pub fn get_all_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        use crate::Resolver;
        self.scope.get_all_trait()
    }

    /// The underlying scope, for advanced usage.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for DiScope
where
    S: Send + Sync,
{
    type Rejection = DiRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let scope = parts
            .extensions
            .get::<Scope>()
            .cloned()
            .ok_or(DiRejection::MissingScopeLayer)?;
        Ok(DiScope { scope })
    }
}

/// Rejection for DI extraction failures.
#[derive(Debug)]
pub enum DiRejection {
    /// No scope in the request extensions; the router was built without
    /// `ScopeLayer` (use `AppBuilder` or add the layer manually).
    MissingScopeLayer,
}

impl IntoResponse for DiRejection {
    fn into_response(self) -> Response {
        match self {
            DiRejection::MissingScopeLayer => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "request scope not available; router is missing ScopeLayer",
            )
                .into_response(),
        }
    }
}
