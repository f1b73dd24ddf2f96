mod event;
mod event_category;
mod event_image;

pub use event::{Event, EventApprovalStatus, EventPhase};
pub use event_category::EventCategory;
pub use event_image::EventImage;
