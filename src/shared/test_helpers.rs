use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::{DateTime, Duration, Utc};
use fake::{faker::lorem::en::Sentence, Fake};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::events::models::{Event, EventApprovalStatus, EventCategory, EventImage};
use crate::features::events::repositories::{EventFilter, EventRepository, StatusChange};
use crate::features::events::services::geo::GeoPoint;
use crate::shared::clock::Clock;
use crate::shared::constants::{EARTH_RADIUS_KM, ROLE_ADMIN};

// ============================================================================
// Identities
// ============================================================================

pub fn admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "admin-1".to_string(),
        roles: vec![ROLE_ADMIN.to_string()],
    }
}

pub fn member_user(sub: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: sub.to_string(),
        roles: vec![],
    }
}

/// Inject `user` into every request, standing in for the auth middleware
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

pub fn with_admin(router: Router) -> Router {
    with_user(router, admin_user())
}

// ============================================================================
// Time & geometry
// ============================================================================

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Point `km` kilometres due north of `origin`
pub fn point_north_of(origin: GeoPoint, km: f64) -> GeoPoint {
    GeoPoint::new(origin.lat + (km / EARTH_RADIUS_KM).to_degrees(), origin.lng)
}

// ============================================================================
// Fixtures
// ============================================================================

/// Approved event starting a day after `now`, without coordinates
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    pub fn new(now: DateTime<Utc>) -> Self {
        let id = Uuid::now_v7();
        let start = now + Duration::days(1);
        Self {
            event: Event {
                id,
                slug: format!("event-{}", id.simple()),
                title: Sentence(2..5).fake(),
                description: Some(Sentence(5..12).fake()),
                venue_name: None,
                address: None,
                organizer_id: "organizer-1".to_string(),
                start_date: start,
                end_date: start + Duration::hours(3),
                latitude: None,
                longitude: None,
                status: EventApprovalStatus::Approved,
                approved_by: None,
                approved_at: None,
                rejection_reason: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.event.title = title.to_string();
        self
    }

    pub fn slug(mut self, slug: &str) -> Self {
        self.event.slug = slug.to_string();
        self
    }

    pub fn organizer(mut self, sub: &str) -> Self {
        self.event.organizer_id = sub.to_string();
        self
    }

    pub fn at(mut self, point: GeoPoint) -> Self {
        self.event.latitude = Some(point.lat);
        self.event.longitude = Some(point.lng);
        self
    }

    pub fn status(mut self, status: EventApprovalStatus) -> Self {
        self.event.status = status;
        self
    }

    /// Sets the start and a three hour duration
    pub fn starts(mut self, start: DateTime<Utc>) -> Self {
        self.event.start_date = start;
        self.event.end_date = start + Duration::hours(3);
        self
    }

    pub fn ends(mut self, end: DateTime<Utc>) -> Self {
        self.event.end_date = end;
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.event.created_at = at;
        self.event.updated_at = at;
        self
    }

    pub fn build(self) -> Event {
        self.event
    }
}

// ============================================================================
// In-memory repository
// ============================================================================

/// `EventRepository` over plain vectors, mirroring the SQL predicate
#[derive(Default)]
pub struct FakeEventRepository {
    events: Mutex<Vec<Event>>,
    categories: Mutex<Vec<EventCategory>>,
    images: Mutex<Vec<EventImage>>,
    pub find_calls: AtomicUsize,
    /// When set, every call fails like a dropped connection
    pub fail: AtomicBool,
}

impl FakeEventRepository {
    pub async fn insert(&self, event: Event) {
        self.events.lock().await.push(event);
    }

    pub async fn tag(&self, event_id: Uuid, category_id: Uuid, name: &str) {
        self.categories.lock().await.push(EventCategory {
            event_id,
            id: category_id,
            name: name.to_string(),
            slug: name.to_lowercase(),
        });
    }

    pub async fn attach_image(&self, event_id: Uuid, url: &str, position: i32) {
        self.images.lock().await.push(EventImage {
            id: Uuid::new_v4(),
            event_id,
            url: url.to_string(),
            position,
        });
    }

    pub async fn get(&self, id: Uuid) -> Option<Event> {
        self.events.lock().await.iter().find(|e| e.id == id).cloned()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for FakeEventRepository {
    async fn find_matching(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let categories = self.categories.lock().await;
        let in_category = |event: &Event| {
            filter.category_ids.is_empty()
                || categories
                    .iter()
                    .any(|c| c.event_id == event.id && filter.category_ids.contains(&c.id))
        };
        let in_bounds = |event: &Event| match filter.bounds {
            Some(bounds) => event.location().is_some_and(|p| bounds.contains(p)),
            None => true,
        };

        let mut matched: Vec<Event> = self
            .events
            .lock()
            .await
            .iter()
            .filter(|e| e.status == filter.status)
            .filter(|e| e.start_date >= filter.starts_from)
            .filter(|e| in_category(e))
            .filter(|e| in_bounds(e))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(matched)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        self.check()?;
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .find(|e| e.slug == slug)
            .cloned())
    }

    async fn categories_for(&self, event_ids: &[Uuid]) -> Result<Vec<EventCategory>> {
        self.check()?;
        Ok(self
            .categories
            .lock()
            .await
            .iter()
            .filter(|c| event_ids.contains(&c.event_id))
            .cloned()
            .collect())
    }

    async fn images_for(&self, event_ids: &[Uuid]) -> Result<Vec<EventImage>> {
        self.check()?;
        let mut images: Vec<EventImage> = self
            .images
            .lock()
            .await
            .iter()
            .filter(|i| event_ids.contains(&i.event_id))
            .cloned()
            .collect();
        images.sort_by_key(|i| i.position);
        Ok(images)
    }

    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Option<Event>> {
        self.check()?;
        let mut events = self.events.lock().await;
        let Some(event) = events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };

        event.status = change.status;
        event.approved_by = change.approved_by.clone();
        event.approved_at = change.approved_at;
        event.rejection_reason = change.rejection_reason.clone();
        Ok(Some(event.clone()))
    }
}
