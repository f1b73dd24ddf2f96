use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::events::handlers;
use crate::features::events::services::EventService;

/// Public discovery routes. Callers may be anonymous.
pub fn routes(service: Arc<EventService>) -> Router {
    Router::new()
        .route("/api/events", get(handlers::list_events))
        .route("/api/events/nearby", get(handlers::list_nearby_events))
        .route("/api/events/{slug}", get(handlers::get_event))
        .with_state(service)
}

/// Moderation routes, nested under `/api/admin`
pub fn admin_routes(service: Arc<EventService>) -> Router {
    Router::new()
        .route("/events/{id}/status", patch(handlers::update_event_status))
        .with_state(service)
}
