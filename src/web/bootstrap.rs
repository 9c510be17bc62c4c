//! App factory: modules + controllers -> running router.

use std::sync::Arc;

use axum::{Extension, Router};

use super::controller::Controller;
use super::scope_layer::ScopeLayer;
use crate::collection::modules::ServiceModule;
use crate::{DiResult, ServiceCollection, ServiceProvider};

type ModuleApplier = Box<dyn FnOnce(&mut ServiceCollection) -> DiResult<()> + Send>;
type ControllerFactory = Box<dyn FnOnce(&ServiceProvider) -> DiResult<Arc<dyn Controller>> + Send>;
type PreHook = Box<dyn FnOnce(&mut ServiceCollection) + Send>;
type PostHook = Box<dyn FnOnce(&ServiceProvider) -> DiResult<()> + Send>;

/// Builds a [`FunctionApp`] from modules, controllers, and setup hooks.
///
/// Startup order: pre-setup hooks run against the empty collection,
/// modules register their services, the provider is built, controllers
/// are constructed and mount their routes, post-setup hooks run against
/// the provider. A controller factory error aborts the build; no partial
/// route set is served.
///
/// # Examples
///
/// ```rust,no_run
/// use fnboot::web::{AppBuilder, Controller};
/// use fnboot::{DiResult, ServiceCollection, ServiceModule, Settings};
/// use axum::{routing::get, Router};
/// use std::sync::Arc;
///
/// struct CoreModule;
/// impl ServiceModule for CoreModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_singleton(Settings::from_env());
///         Ok(())
///     }
/// }
///
/// struct HealthController;
/// impl Controller for HealthController {
///     fn register_routes(self: Arc<Self>, router: Router) -> Router {
///         router.route("/health", get(|| async { "ok" }))
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let app = AppBuilder::new()
///     .with_module(CoreModule)
///     .with_controller(|_| Ok(HealthController))
///     .build()?;
///
/// let _router = app.into_router();
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct AppBuilder {
    pre_hooks: Vec<PreHook>,
    modules: Vec<ModuleApplier>,
    controllers: Vec<ControllerFactory>,
    post_hooks: Vec<PostHook>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `hook` against the collection before any module registers.
    /// Useful for test overrides and environment-specific wiring.
    pub fn pre_setup<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut ServiceCollection) + Send + 'static,
    {
        self.pre_hooks.push(Box::new(hook));
        self
    }

    /// Adds a service module. Modules apply in the order given.
    pub fn with_module<M>(mut self, module: M) -> Self
    where
        M: ServiceModule + Send + 'static,
    {
        self.modules
            .push(Box::new(move |services| module.register_services(services)));
        self
    }

    /// Adds a controller. The factory receives the built provider, so
    /// singleton dependencies inject through the constructor.
    pub fn with_controller<C, F>(mut self, factory: F) -> Self
    where
        C: Controller + 'static,
        F: FnOnce(&ServiceProvider) -> DiResult<C> + Send + 'static,
    {
        self.controllers.push(Box::new(move |provider| {
            factory(provider).map(|c| Arc::new(c) as Arc<dyn Controller>)
        }));
        self
    }

    /// Runs `hook` against the provider after controllers mount, before
    /// the app is returned. Useful for warmup and startup validation.
    pub fn post_setup<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&ServiceProvider) -> DiResult<()> + Send + 'static,
    {
        self.post_hooks.push(Box::new(hook));
        self
    }

    /// Wires everything into a [`FunctionApp`].
    pub fn build(self) -> DiResult<FunctionApp> {
        let mut services = ServiceCollection::new();

        for hook in self.pre_hooks {
            hook(&mut services);
        }
        for apply in self.modules {
            apply(&mut services)?;
        }

        let provider = Arc::new(services.build());

        let mut router = Router::new();
        let controller_count = self.controllers.len();
        for factory in self.controllers {
            let controller = factory(&provider)?;
            tracing::info!(controller = controller.name(), "registering controller routes");
            router = controller.register_routes(router);
        }

        for hook in self.post_hooks {
            hook(&provider)?;
        }

        let router = router
            .layer(ScopeLayer::new(provider.clone()))
            .layer(Extension(provider.clone()));

        tracing::info!(controllers = controller_count, "function app built");
        Ok(FunctionApp { router, provider })
    }
}

/// A built app: the routed axum `Router` plus the provider behind it.
pub struct FunctionApp {
    router: Router,
    provider: Arc<ServiceProvider>,
}

impl FunctionApp {
    /// A clone of the router, ready to serve.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Consumes the app, returning the router.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// The root provider backing the app.
    pub fn provider(&self) -> Arc<ServiceProvider> {
        self.provider.clone()
    }

    /// Graceful shutdown: disposes singleton services registered with
    /// disposal hooks.
    pub async fn shutdown(&self) {
        tracing::info!("shutting down function app");
        self.provider.dispose_all().await;
    }
}
