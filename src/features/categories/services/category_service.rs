use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::config::DiscoveryConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::models::Category;
use crate::features::events::models::EventApprovalStatus;
use crate::shared::clock::{start_of_day, Clock, SystemClock};

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
    utc_offset: FixedOffset,
}

impl CategoryService {
    pub fn new(pool: PgPool, discovery: &DiscoveryConfig) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
            utc_offset: discovery.utc_offset,
        }
    }

    /// List all active categories, in display order
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let mut qb = self.category_query(None);
        let categories = qb
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Get an active category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let mut qb = self.category_query(Some(slug));
        let category = qb
            .build_query_as::<Category>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category by slug: {:?}", e);
                AppError::Database(e)
            })?;

        category
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    fn category_query(&self, slug: Option<&str>) -> QueryBuilder<'static, Postgres> {
        let starts_from = start_of_day(self.clock.now(), self.utc_offset);
        category_query(starts_from, slug)
    }
}

/// Active categories with the number of events discovery would list for them
fn category_query(
    starts_from: DateTime<Utc>,
    slug: Option<&str>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        r#"
        SELECT c.id, c.name, c.slug, c.description, c.icon, c.color, c.display_order,
               COUNT(e.id) AS upcoming_events
        FROM categories c
        LEFT JOIN event_categories ec ON ec.category_id = c.id
        LEFT JOIN events e ON e.id = ec.event_id AND e.status = "#,
    );
    qb.push_bind(EventApprovalStatus::Approved);
    qb.push(" AND e.start_date >= ");
    qb.push_bind(starts_from);
    qb.push(" WHERE c.is_active = TRUE");

    if let Some(slug) = slug {
        qb.push(" AND c.slug = ");
        qb.push_bind(slug.to_string());
    }

    qb.push(" GROUP BY c.id ORDER BY c.display_order, c.name");
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_category_query_shape() {
        let starts_from = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();

        let sql = category_query(starts_from, None).into_sql();
        assert!(sql.contains("e.status = $1 AND e.start_date >= $2"));
        assert!(sql.ends_with("GROUP BY c.id ORDER BY c.display_order, c.name"));

        let sql = category_query(starts_from, Some("music")).into_sql();
        assert!(sql.contains("AND c.slug = $3"));
    }

    #[test]
    fn test_event_filters_stay_in_join() {
        let starts_from = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();

        for slug in [None, Some("music")] {
            let sql = category_query(starts_from, slug).into_sql();
            let (join, filter) = sql
                .split_once(" WHERE c.is_active")
                .expect("query filters active categories");

            // Filtering events after the LEFT JOIN would drop categories with no upcoming events
            assert!(join.contains("LEFT JOIN events e ON e.id = ec.event_id AND e.status = $1"));
            assert!(join.contains("AND e.start_date >= $2"));
            assert!(!filter.contains("e."), "event predicate in WHERE: {filter}");
        }
    }
}
