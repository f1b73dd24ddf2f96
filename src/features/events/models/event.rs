use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::events::services::geo::GeoPoint;

/// Moderation state of an event, matching the database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "event_approval_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for EventApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventApprovalStatus::Pending => write!(f, "pending"),
            EventApprovalStatus::Approved => write!(f, "approved"),
            EventApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Where an event sits on the timeline relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    Coming,
    Ongoing,
    Ended,
}

impl EventPhase {
    pub fn at(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            EventPhase::Coming
        } else if now <= end {
            EventPhase::Ongoing
        } else {
            EventPhase::Ended
        }
    }
}

/// Database model for event
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct Event {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub venue_name: Option<String>,
    pub address: Option<String>,
    pub organizer_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: EventApprovalStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Both coordinates, or nothing
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }

    pub fn phase_at(&self, now: DateTime<Utc>) -> EventPhase {
        EventPhase::at(self.start_date, self.end_date, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_phase_boundaries() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 5, 1, 17, 0, 0).unwrap();

        assert_eq!(
            EventPhase::at(start, end, start - Duration::seconds(1)),
            EventPhase::Coming
        );
        assert_eq!(EventPhase::at(start, end, start), EventPhase::Ongoing);
        assert_eq!(EventPhase::at(start, end, end), EventPhase::Ongoing);
        assert_eq!(
            EventPhase::at(start, end, end + Duration::seconds(1)),
            EventPhase::Ended
        );
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(EventPhase::Ongoing).unwrap(),
            serde_json::json!("ongoing")
        );
        assert_eq!(
            serde_json::to_value(EventApprovalStatus::Approved).unwrap(),
            serde_json::json!("approved")
        );
    }
}
