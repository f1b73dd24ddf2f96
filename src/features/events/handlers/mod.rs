mod event_handler;
mod moderation_handler;

pub use event_handler::*;
pub use moderation_handler::*;
