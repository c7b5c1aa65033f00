//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    cancel_registration_handler, check_in_handler, download_ticket_handler,
    event_notifications_handler, event_participants_handler, get_registration_handler,
    health_handler, inbox_handler, mark_read_handler, my_registrations_handler,
    notify_event_handler, register_handler, send_notification_handler, toggle_check_in_handler,
    unread_count_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let jwt_service = deps.jwt_service.clone();
    let app_state = AppState {
        deps: Arc::new(deps),
    };

    Router::new()
        // Registrations
        .route("/events/:id/registrations", post(register_handler))
        .route("/events/:id/participants", get(event_participants_handler))
        .route("/registrations/:id", get(get_registration_handler))
        .route("/registrations/:id/ticket", get(download_ticket_handler))
        .route("/registrations/:id/cancel", post(cancel_registration_handler))
        .route("/me/registrations", get(my_registrations_handler))
        // Check-in
        .route("/check-in", post(check_in_handler))
        .route(
            "/registrations/:id/check-in/toggle",
            post(toggle_check_in_handler),
        )
        // Notifications
        .route(
            "/events/:id/notifications",
            post(notify_event_handler).get(event_notifications_handler),
        )
        .route(
            "/notifications",
            post(send_notification_handler).get(inbox_handler),
        )
        .route("/notifications/unread-count", get(unread_count_handler))
        .route("/notifications/:id/read", post(mark_read_handler))
        // Health check
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
