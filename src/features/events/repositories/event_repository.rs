use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::events::models::{Event, EventApprovalStatus, EventCategory, EventImage};
use crate::features::events::services::geo::BoundingBox;

/// Store-side predicate for event discovery
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub status: EventApprovalStatus,
    /// Events starting before this instant are excluded
    pub starts_from: DateTime<Utc>,
    /// Match events in at least one of these categories (empty = any)
    pub category_ids: Vec<Uuid>,
    /// Optional coarse location pre-filter
    pub bounds: Option<BoundingBox>,
}

/// Moderation update applied to a single event
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: EventApprovalStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Data access for events
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events matching `filter`, newest first (`created_at DESC, id DESC`).
    /// Never truncated.
    async fn find_matching(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>>;

    /// Categories of the given events, in display order
    async fn categories_for(&self, event_ids: &[Uuid]) -> Result<Vec<EventCategory>>;

    /// Images of the given events, ordered by position
    async fn images_for(&self, event_ids: &[Uuid]) -> Result<Vec<EventImage>>;

    /// Returns the updated event, or `None` if no event has this id
    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Option<Event>>;
}
