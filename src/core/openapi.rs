use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::events::{dtos as events_dtos, handlers as events_handlers, models as events_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Events (public, optional auth)
        events_handlers::list_events,
        events_handlers::list_nearby_events,
        events_handlers::get_event,
        // Events (admin)
        events_handlers::update_event_status,
        // Categories (public)
        categories_handlers::list_categories,
        categories_handlers::get_category,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Events
            events_models::EventApprovalStatus,
            events_models::EventPhase,
            events_dtos::EventDto,
            events_dtos::EventListDto,
            events_dtos::EventCategoryDto,
            events_dtos::EventImageDto,
            events_dtos::UpdateEventStatusDto,
            ApiResponse<events_dtos::EventDto>,
            ApiResponse<events_dtos::EventListDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
        )
    ),
    tags(
        (name = "events", description = "Upcoming event discovery (public)"),
        (name = "admin-events", description = "Event moderation (admin only)"),
        (name = "categories", description = "Event categories (public)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Acara API",
        version = "0.1.0",
        description = "API documentation for Acara event discovery",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_discovery_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/events",
            "/api/events/nearby",
            "/api/events/{slug}",
            "/api/admin/events/{id}/status",
            "/api/categories",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Staging".to_string(),
            version: "9.9.9".to_string(),
            description: "staging build".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Staging");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
