use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::events::dtos::{EventDto, EventListDto, EventsQuery, LocationQuery};
use crate::features::events::services::EventService;
use crate::shared::types::{ApiResponse, Meta};

/// List upcoming events near the requester
#[utoipa::path(
    get,
    path = "/api/events/nearby",
    params(EventsQuery),
    responses(
        (status = 200, description = "Upcoming events, newest first", body = ApiResponse<EventListDto>),
        (status = 400, description = "Invalid query parameter"),
        (status = 401, description = "Invalid bearer token"),
        (status = 403, description = "Pending events requested without admin role")
    ),
    tag = "events",
    security((), ("bearer_auth" = []))
)]
pub async fn list_nearby_events(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<EventService>>,
    AppQuery(query): AppQuery<EventsQuery>,
) -> Result<Json<ApiResponse<EventListDto>>> {
    respond_with_list(service.query_nearby(user.as_ref(), &query).await?)
}

/// List upcoming events
#[utoipa::path(
    get,
    path = "/api/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Upcoming events, newest first", body = ApiResponse<EventListDto>),
        (status = 400, description = "Invalid query parameter"),
        (status = 401, description = "Invalid bearer token"),
        (status = 403, description = "Pending events requested without admin role")
    ),
    tag = "events",
    security((), ("bearer_auth" = []))
)]
pub async fn list_events(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<EventService>>,
    AppQuery(query): AppQuery<EventsQuery>,
) -> Result<Json<ApiResponse<EventListDto>>> {
    respond_with_list(service.query_nearby(user.as_ref(), &query).await?)
}

/// Get an event by slug
#[utoipa::path(
    get,
    path = "/api/events/{slug}",
    params(
        ("slug" = String, Path, description = "Event slug"),
        LocationQuery
    ),
    responses(
        (status = 200, description = "Event details", body = ApiResponse<EventDto>),
        (status = 400, description = "Invalid query parameter"),
        (status = 404, description = "Event not found")
    ),
    tag = "events",
    security((), ("bearer_auth" = []))
)]
pub async fn get_event(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<EventService>>,
    Path(slug): Path<String>,
    AppQuery(location): AppQuery<LocationQuery>,
) -> Result<Json<ApiResponse<EventDto>>> {
    let event = service.get_by_slug(user.as_ref(), &slug, &location).await?;
    Ok(Json(ApiResponse::success(Some(event), None, None)))
}

fn respond_with_list(list: EventListDto) -> Result<Json<ApiResponse<EventListDto>>> {
    let meta = Meta { total: list.total };
    Ok(Json(ApiResponse::success(Some(list), None, Some(meta))))
}
