use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::events::dtos::{EventDto, UpdateEventStatusDto};
use crate::features::events::services::EventService;
use crate::shared::types::ApiResponse;

/// Approve, reject or re-queue an event
#[utoipa::path(
    patch,
    path = "/api/admin/events/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventStatusDto,
    responses(
        (status = 200, description = "Event moderated", body = ApiResponse<EventDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "Event not found")
    ),
    tag = "admin-events",
    security(("bearer_auth" = []))
)]
pub async fn update_event_status(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<EventService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateEventStatusDto>,
) -> Result<Json<ApiResponse<EventDto>>> {
    let event = service.update_status(&admin, id, dto).await?;
    let message = format!("Event marked as {}", event.approval_status);
    Ok(Json(ApiResponse::success(Some(event), Some(message), None)))
}
