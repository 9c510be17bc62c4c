//! Axum integration: per-request scopes, controllers, and app bootstrap.
//!
//! The pieces fit together like this: [`AppBuilder`] collects modules and
//! controllers, builds the provider, asks every controller to register its
//! routes, and wraps the router in [`ScopeLayer`] so each request runs in
//! its own DI scope. Handlers reach that scope through the [`DiScope`]
//! extractor; when the response is ready the layer disposes the scope.

mod bootstrap;
mod controller;
mod scope_layer;

pub use bootstrap::{AppBuilder, FunctionApp};
pub use controller::{error_response, json_response, Controller};
pub use scope_layer::{DiRejection, DiScope, ScopeLayer};
