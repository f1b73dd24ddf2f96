mod event_service;
pub mod geo;

pub use event_service::EventService;
