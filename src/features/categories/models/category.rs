use sqlx::FromRow;
use uuid::Uuid;

/// Active category joined with the number of discoverable events in it
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub display_order: i32,
    pub upcoming_events: i64,
}
