use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::events::models::{Event, EventCategory, EventImage};
use crate::features::events::repositories::{EventFilter, EventRepository, StatusChange};

const EVENT_COLUMNS: &str = r#"
    e.id, e.slug, e.title, e.description, e.venue_name, e.address, e.organizer_id,
    e.start_date, e.end_date, e.latitude, e.longitude, e.status,
    e.approved_by, e.approved_at, e.rejection_reason, e.created_at, e.updated_at
"#;

/// Postgres-backed event repository
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build the discovery query for `filter`
fn matching_query(filter: &EventFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(EVENT_COLUMNS);
    qb.push(" FROM events e WHERE e.status = ");
    qb.push_bind(filter.status);
    qb.push(" AND e.start_date >= ");
    qb.push_bind(filter.starts_from);

    if !filter.category_ids.is_empty() {
        qb.push(
            " AND EXISTS (SELECT 1 FROM event_categories ec \
             WHERE ec.event_id = e.id AND ec.category_id = ANY(",
        );
        qb.push_bind(filter.category_ids.clone());
        qb.push("))");
    }

    if let Some(bounds) = filter.bounds {
        qb.push(" AND e.latitude BETWEEN ");
        qb.push_bind(bounds.min_lat);
        qb.push(" AND ");
        qb.push_bind(bounds.max_lat);

        if let Some((min_lng, max_lng)) = bounds.lng {
            qb.push(" AND e.longitude BETWEEN ");
            qb.push_bind(min_lng);
            qb.push(" AND ");
            qb.push_bind(max_lng);
        }
    }

    qb.push(" ORDER BY e.created_at DESC, e.id DESC");
    qb
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn find_matching(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut qb = matching_query(filter);
        qb.build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query events: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        let sql = format!("SELECT {} FROM events e WHERE e.slug = $1", EVENT_COLUMNS);

        sqlx::query_as::<_, Event>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get event by slug: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn categories_for(&self, event_ids: &[Uuid]) -> Result<Vec<EventCategory>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, EventCategory>(
            r#"
            SELECT ec.event_id, c.id, c.name, c.slug
            FROM event_categories ec
            JOIN categories c ON c.id = ec.category_id
            WHERE ec.event_id = ANY($1)
            ORDER BY c.display_order, c.name
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load event categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn images_for(&self, event_ids: &[Uuid]) -> Result<Vec<EventImage>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, EventImage>(
            r#"
            SELECT id, event_id, url, position
            FROM event_images
            WHERE event_id = ANY($1)
            ORDER BY position, id
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load event images: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Option<Event>> {
        let sql = format!(
            r#"
            UPDATE events e
            SET status = $2,
                approved_by = $3,
                approved_at = $4,
                rejection_reason = $5,
                updated_at = NOW()
            WHERE e.id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(change.status)
            .bind(change.approved_by.as_deref())
            .bind(change.approved_at)
            .bind(change.rejection_reason.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update event status: {:?}", e);
                AppError::Database(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::events::models::EventApprovalStatus;
    use crate::features::events::services::geo::BoundingBox;
    use chrono::Utc;

    fn filter() -> EventFilter {
        EventFilter {
            status: EventApprovalStatus::Approved,
            starts_from: Utc::now(),
            category_ids: Vec::new(),
            bounds: None,
        }
    }

    #[test]
    fn test_base_query_has_status_date_and_order() {
        let sql = matching_query(&filter()).into_sql();
        assert!(sql.contains("e.status = $1"));
        assert!(sql.contains("e.start_date >= $2"));
        assert!(!sql.contains("event_categories"));
        assert!(!sql.contains("LIMIT"));
        assert!(sql.ends_with("ORDER BY e.created_at DESC, e.id DESC"));
    }

    #[test]
    fn test_category_and_bounds_predicates() {
        let mut f = filter();
        f.category_ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        f.bounds = Some(BoundingBox {
            min_lat: -6.3,
            max_lat: -6.1,
            lng: Some((106.7, 106.9)),
        });

        let sql = matching_query(&f).into_sql();
        assert!(sql.contains("ec.category_id = ANY($3)"));
        assert!(sql.contains("e.latitude BETWEEN $4 AND $5"));
        assert!(sql.contains("e.longitude BETWEEN $6 AND $7"));
    }

    #[test]
    fn test_bounds_without_longitude() {
        let mut f = filter();
        f.bounds = Some(BoundingBox {
            min_lat: 89.0,
            max_lat: 90.0,
            lng: None,
        });

        let sql = matching_query(&f).into_sql();
        assert!(sql.contains("e.latitude BETWEEN"));
        assert!(!sql.contains("e.longitude BETWEEN"));
    }
}
