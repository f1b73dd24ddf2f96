use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::events::models::{
    Event, EventApprovalStatus, EventCategory, EventImage, EventPhase,
};
use crate::features::events::services::geo::GeoPoint;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// ============================================================================
// Query parameters
// ============================================================================

/// Raw query string for event listings.
///
/// Everything arrives as text so malformed numbers can be reported as
/// parameter errors instead of generic deserialization failures.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// `pending` lists the moderation queue (admin only); anything else lists approved events
    pub status: Option<String>,
    /// Page size (default: 10, max: 100)
    pub limit: Option<String>,
    /// Number of events to skip (default: 0)
    pub offset: Option<String>,
    /// Requester latitude; requires `lng`
    pub lat: Option<String>,
    /// Requester longitude; requires `lat`
    pub lng: Option<String>,
    /// Search radius in kilometres; requires `lat` and `lng`
    pub radius: Option<String>,
    /// Comma-separated category ids, matched if the event has any of them
    pub categories: Option<String>,
}

/// Optional requester location for single-event lookups
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Which approval state the caller asked to browse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScope {
    Approved,
    Pending,
}

/// Validated form of [`EventsQuery`]
#[derive(Debug, Clone, PartialEq)]
pub struct EventSearch {
    pub scope: StatusScope,
    pub limit: usize,
    pub offset: usize,
    pub origin: Option<GeoPoint>,
    pub radius_km: Option<f64>,
    pub category_ids: Vec<Uuid>,
}

impl TryFrom<&EventsQuery> for EventSearch {
    type Error = AppError;

    fn try_from(query: &EventsQuery) -> Result<Self, Self::Error> {
        let scope = match present(&query.status) {
            Some(s) if s.eq_ignore_ascii_case("pending") => StatusScope::Pending,
            _ => StatusScope::Approved,
        };

        let limit = parse_integer("limit", &query.limit)?
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE) as usize;
        let offset = parse_integer("offset", &query.offset)?.unwrap_or(0).max(0) as usize;

        let origin = parse_origin(&query.lat, &query.lng)?;

        let radius_km = match present(&query.radius) {
            None => None,
            Some(raw) => {
                let radius = parse_number("radius", raw)?;
                if radius <= 0.0 {
                    return Err(AppError::InvalidParameter(
                        "radius must be a positive number of kilometres".to_string(),
                    ));
                }
                if origin.is_none() {
                    return Err(AppError::InvalidParameter(
                        "radius requires lat and lng".to_string(),
                    ));
                }
                Some(radius)
            }
        };

        let category_ids = parse_category_ids(&query.categories)?;

        Ok(Self {
            scope,
            limit,
            offset,
            origin,
            radius_km,
            category_ids,
        })
    }
}

impl LocationQuery {
    pub fn origin(&self) -> Result<Option<GeoPoint>, AppError> {
        parse_origin(&self.lat, &self.lng)
    }
}

/// Blank values are treated as absent
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_integer(name: &str, value: &Option<String>) -> Result<Option<i64>, AppError> {
    present(value)
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| {
                AppError::InvalidParameter(format!("{} must be an integer, got '{}'", name, raw))
            })
        })
        .transpose()
}

fn parse_number(name: &str, raw: &str) -> Result<f64, AppError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::InvalidParameter(format!("{} must be a number, got '{}'", name, raw)))
}

fn parse_origin(lat: &Option<String>, lng: &Option<String>) -> Result<Option<GeoPoint>, AppError> {
    match (present(lat), present(lng)) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            let lat = parse_number("lat", lat)?;
            let lng = parse_number("lng", lng)?;
            if !(-90.0..=90.0).contains(&lat) {
                return Err(AppError::InvalidParameter(
                    "lat must be between -90 and 90".to_string(),
                ));
            }
            if !(-180.0..=180.0).contains(&lng) {
                return Err(AppError::InvalidParameter(
                    "lng must be between -180 and 180".to_string(),
                ));
            }
            Ok(Some(GeoPoint::new(lat, lng)))
        }
        _ => Err(AppError::InvalidParameter(
            "lat and lng must be provided together".to_string(),
        )),
    }
}

fn parse_category_ids(value: &Option<String>) -> Result<Vec<Uuid>, AppError> {
    let mut ids: Vec<Uuid> = Vec::new();

    for raw in present(value).into_iter().flat_map(|s| s.split(',')) {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let id = Uuid::parse_str(raw).map_err(|_| {
            AppError::InvalidParameter(format!("'{}' is not a valid category id", raw))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

// ============================================================================
// Responses
// ============================================================================

/// Category as embedded in an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventCategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<EventCategory> for EventCategoryDto {
    fn from(c: EventCategory) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventImageDto {
    pub id: Uuid,
    pub url: String,
    pub position: i32,
}

impl From<EventImage> for EventImageDto {
    fn from(i: EventImage) -> Self {
        Self {
            id: i.id,
            url: i.url,
            position: i.position,
        }
    }
}

/// Event annotated for the requester
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub venue_name: Option<String>,
    pub address: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Moderation state
    pub approval_status: EventApprovalStatus,
    /// Set only while rejected. Rejected events are visible to admins and
    /// their organizer only.
    pub rejection_reason: Option<String>,
    /// Kilometres from the requester; null when either location is unknown
    pub distance_km: Option<f64>,
    /// Timeline position at the time of the request
    pub status: EventPhase,
    pub categories: Vec<EventCategoryDto>,
    pub images: Vec<EventImageDto>,
}

impl EventDto {
    pub fn build(
        event: Event,
        distance_km: Option<f64>,
        now: DateTime<Utc>,
        categories: Vec<EventCategoryDto>,
        images: Vec<EventImageDto>,
    ) -> Self {
        let status = event.phase_at(now);
        Self {
            id: event.id,
            slug: event.slug,
            title: event.title,
            description: event.description,
            venue_name: event.venue_name,
            address: event.address,
            start_date: event.start_date,
            end_date: event.end_date,
            created_at: event.created_at,
            latitude: event.latitude,
            longitude: event.longitude,
            approval_status: event.status,
            rejection_reason: event.rejection_reason,
            distance_km,
            status,
            categories,
            images,
        }
    }
}

/// One page of events plus the size of the whole filtered set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventListDto {
    pub events: Vec<EventDto>,
    pub total: i64,
}

// ============================================================================
// Moderation
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateEventStatusDto {
    pub status: EventApprovalStatus,
    /// Stored with a rejection and returned to the organizer as `rejection_reason`
    #[validate(length(min = 1, max = 500))]
    pub reason: Option<String>,
}
