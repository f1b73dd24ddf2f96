use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::core::config::DiscoveryConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::events::dtos::{
    EventCategoryDto, EventDto, EventImageDto, EventListDto, EventSearch, EventsQuery,
    LocationQuery, StatusScope, UpdateEventStatusDto,
};
use crate::features::events::models::{Event, EventApprovalStatus};
use crate::features::events::repositories::{EventFilter, EventRepository, StatusChange};
use crate::features::events::services::geo::{distance_between, BoundingBox, GeoPoint};
use crate::shared::clock::{start_of_day, Clock, SystemClock};

/// Service for event discovery and moderation
pub struct EventService {
    repo: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
    utc_offset: FixedOffset,
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>, discovery: &DiscoveryConfig) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock), discovery.utc_offset)
    }

    pub fn with_clock(
        repo: Arc<dyn EventRepository>,
        clock: Arc<dyn Clock>,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            repo,
            clock,
            utc_offset,
        }
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Upcoming events matching the query, annotated with distance from the
    /// requester. `total` counts every event that survived the filters,
    /// before pagination.
    pub async fn query_nearby(
        &self,
        caller: Option<&AuthenticatedUser>,
        query: &EventsQuery,
    ) -> Result<EventListDto> {
        let search = EventSearch::try_from(query)?;
        let status = resolve_status(search.scope, caller)?;

        let now = self.clock.now();
        let filter = EventFilter {
            status,
            starts_from: start_of_day(now, self.utc_offset),
            category_ids: search.category_ids.clone(),
            bounds: match (search.origin, search.radius_km) {
                (Some(origin), Some(radius)) => Some(BoundingBox::around(origin, radius)),
                _ => None,
            },
        };

        let candidates = self.repo.find_matching(&filter).await?;
        let fetched = candidates.len();

        let matched = within_radius(candidates, search.origin, search.radius_km);
        let (page, total) = paginate(matched, search.offset, search.limit);

        tracing::debug!(
            status = %status,
            fetched,
            total,
            returned = page.len(),
            "Event search"
        );

        let events = self.annotate(page, now).await?;
        Ok(EventListDto { events, total })
    }

    /// Single event by slug.
    ///
    /// Events that are not approved are only visible to admins and their
    /// organizer; everyone else gets a 404.
    pub async fn get_by_slug(
        &self,
        caller: Option<&AuthenticatedUser>,
        slug: &str,
        location: &LocationQuery,
    ) -> Result<EventDto> {
        let origin = location.origin()?;

        let event = self
            .repo
            .find_by_slug(slug)
            .await?
            .filter(|e| can_view(e, caller))
            .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", slug)))?;

        let distance = distance_between(origin, event.location());
        self.annotate_one(event, distance).await
    }

    // ========================================================================
    // Moderation
    // ========================================================================

    pub async fn update_status(
        &self,
        admin: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateEventStatusDto,
    ) -> Result<EventDto> {
        dto.validate()?;

        if dto.reason.is_some() && dto.status != EventApprovalStatus::Rejected {
            return Err(AppError::Validation(
                "reason is only accepted when rejecting an event".to_string(),
            ));
        }

        let change = match dto.status {
            EventApprovalStatus::Approved => StatusChange {
                status: dto.status,
                approved_by: Some(admin.sub.clone()),
                approved_at: Some(self.clock.now()),
                rejection_reason: None,
            },
            EventApprovalStatus::Rejected => StatusChange {
                status: dto.status,
                approved_by: None,
                approved_at: None,
                rejection_reason: dto.reason,
            },
            EventApprovalStatus::Pending => StatusChange {
                status: dto.status,
                approved_by: None,
                approved_at: None,
                rejection_reason: None,
            },
        };

        let event = self
            .repo
            .update_status(id, &change)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

        tracing::info!(event_id = %id, status = %change.status, admin = %admin.sub, "Event moderated");

        self.annotate_one(event, None).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn annotate_one(&self, event: Event, distance_km: Option<f64>) -> Result<EventDto> {
        let now = self.clock.now();
        let mut dtos = self.annotate(vec![(event, distance_km)], now).await?;
        dtos.pop()
            .ok_or_else(|| AppError::Internal("Event vanished while annotating".to_string()))
    }

    /// Attach categories, images and timeline phase to a page of events
    async fn annotate(
        &self,
        page: Vec<(Event, Option<f64>)>,
        now: DateTime<Utc>,
    ) -> Result<Vec<EventDto>> {
        if page.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = page.iter().map(|(e, _)| e.id).collect();
        let (categories, images) = tokio::try_join!(
            self.repo.categories_for(&ids),
            self.repo.images_for(&ids)
        )?;

        let mut categories_by_event: HashMap<Uuid, Vec<EventCategoryDto>> = HashMap::new();
        for category in categories {
            categories_by_event
                .entry(category.event_id)
                .or_default()
                .push(category.into());
        }

        let mut images_by_event: HashMap<Uuid, Vec<EventImageDto>> = HashMap::new();
        for image in images {
            images_by_event
                .entry(image.event_id)
                .or_default()
                .push(image.into());
        }

        Ok(page
            .into_iter()
            .map(|(event, distance)| {
                let categories = categories_by_event.remove(&event.id).unwrap_or_default();
                let images = images_by_event.remove(&event.id).unwrap_or_default();
                EventDto::build(event, distance, now, categories, images)
            })
            .collect())
    }
}

fn resolve_status(
    scope: StatusScope,
    caller: Option<&AuthenticatedUser>,
) -> Result<EventApprovalStatus> {
    match scope {
        StatusScope::Approved => Ok(EventApprovalStatus::Approved),
        StatusScope::Pending if caller.is_some_and(AuthenticatedUser::is_admin) => {
            Ok(EventApprovalStatus::Pending)
        }
        StatusScope::Pending => Err(AppError::Forbidden(
            "Admin access required to list pending events".to_string(),
        )),
    }
}

fn can_view(event: &Event, caller: Option<&AuthenticatedUser>) -> bool {
    event.status == EventApprovalStatus::Approved
        || caller.is_some_and(|u| u.is_admin() || u.sub == event.organizer_id)
}

/// Annotate each event with its distance from `origin` and, when a radius
/// is given, keep only events known to lie within it. Order is preserved.
pub(crate) fn within_radius(
    events: Vec<Event>,
    origin: Option<GeoPoint>,
    radius_km: Option<f64>,
) -> Vec<(Event, Option<f64>)> {
    events
        .into_iter()
        .map(|event| {
            let distance = distance_between(origin, event.location());
            (event, distance)
        })
        .filter(|(_, distance)| match radius_km {
            Some(radius) => distance.is_some_and(|d| d <= radius),
            None => true,
        })
        .collect()
}

/// Slice `[offset, offset + limit)` and report the pre-slice length
pub(crate) fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let page = items.into_iter().skip(offset).take(limit).collect();
    (page, total)
}
