use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::categories::models::Category;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub display_order: i32,
    /// Approved events in this category starting today or later
    pub upcoming_events: i64,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            icon: c.icon,
            color: c.color,
            display_order: c.display_order,
            upcoming_events: c.upcoming_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_count_and_nullable_fields() {
        let dto = CategoryResponseDto::from(Category {
            id: Uuid::nil(),
            name: "Music".to_string(),
            slug: "music".to_string(),
            description: None,
            icon: Some("music-note".to_string()),
            color: None,
            display_order: 1,
            upcoming_events: 4,
        });

        let value = serde_json::to_value(dto).unwrap();
        assert_eq!(value["upcoming_events"], json!(4));
        assert_eq!(value["description"], json!(null));
        assert_eq!(value["icon"], json!("music-note"));
    }
}
