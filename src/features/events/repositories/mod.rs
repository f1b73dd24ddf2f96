mod event_repository;
mod pg_event_repository;

pub use event_repository::{EventFilter, EventRepository, StatusChange};
pub use pg_event_repository::PgEventRepository;
