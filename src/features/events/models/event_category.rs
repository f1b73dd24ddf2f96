use sqlx::FromRow;
use uuid::Uuid;

/// A category attached to an event, as read through the join table
#[derive(Debug, Clone, FromRow)]
pub struct EventCategory {
    pub event_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}
