//! Route configuration.

use crate::error::ApiError;
use crate::handlers;
use crate::metrics::{metrics_handler, register_metrics};
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use leadline_core::config::StorageConfig;
use leadline_storage::PUBLIC_MOUNT;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let api_routes = Router::new()
        .route(
            "/contacts",
            get(handlers::list_contacts).post(handlers::create_contact),
        )
        .route(
            "/contacts/{id}",
            get(handlers::show_contact)
                .put(handlers::update_contact)
                .patch(handlers::update_contact)
                .post(handlers::update_contact_override)
                .delete(handlers::delete_contact),
        )
        // Health check (unauthenticated for load balancers)
        .route("/health", get(handlers::health_check))
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(config.server.body_limit()));

    let mut router = if config.server.api_prefix.is_empty() {
        Router::new().merge(api_routes)
    } else {
        Router::new().nest(&config.server.api_prefix, api_routes)
    };

    // Attachments are public; serve the filesystem root read-only.
    let StorageConfig::Filesystem { path, .. } = &config.storage;
    router = router.nest_service(PUBLIC_MOUNT, ServeDir::new(path));

    if config.server.metrics_enabled {
        register_metrics();
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(cors_layer(&config.server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}

/// Build the CORS layer; `"*"` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
