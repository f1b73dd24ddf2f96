use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an event image. The URL points into object storage
/// and is passed through untouched.
#[derive(Debug, Clone, FromRow)]
pub struct EventImage {
    pub id: Uuid,
    pub event_id: Uuid,
    pub url: String,
    pub position: i32,
}
