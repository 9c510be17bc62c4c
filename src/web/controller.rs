//! Controller abstraction for route registration.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

/// A group of related routes constructed with container access.
///
/// Controllers are instantiated once at startup by a factory that
/// receives the built [`ServiceProvider`](crate::ServiceProvider), so
/// singleton dependencies are injected through the constructor. The
/// builder then calls [`register_routes`](Controller::register_routes)
/// to mount the controller's routes. Scoped services are resolved inside
/// handlers via the [`DiScope`](crate::web::DiScope) extractor, since
/// they belong to the request, not the controller.
///
/// # Examples
///
/// ```rust,no_run
/// use fnboot::web::{Controller, DiScope, json_response};
/// use axum::{routing::get, http::StatusCode, response::Response, Router};
/// use std::sync::Arc;
///
/// struct OrderService;
/// impl OrderService {
///     fn pending(&self) -> Vec<String> { vec!["order-1".to_string()] }
/// }
///
/// struct OrdersController;
///
/// impl Controller for OrdersController {
///     fn register_routes(self: Arc<Self>, router: Router) -> Router {
///         router.route("/orders", get(list_orders))
///     }
/// }
///
/// async fn list_orders(scope: DiScope) -> Response {
///     let service = scope.get_required::<OrderService>();
///     json_response(StatusCode::OK, service.pending())
/// }
/// ```
pub trait Controller: Send + Sync {
    /// Mounts this controller's routes. Called once at startup.
    fn register_routes(self: Arc<Self>, router: Router) -> Router;

    /// Name used in startup logging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Serializes `body` as a JSON response with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

/// Standard error payload: `{"error": "<message>"}`.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    #[derive(Serialize)]
    struct ErrorBody<'a> {
        error: &'a str,
    }
    (status, Json(ErrorBody { error: message })).into_response()
}
