//! Application services: the timeline and image use-cases, written against
//! the ports in `domains` and free of any transport or storage detail.

pub mod events;
pub mod images;

pub use events::EventService;
pub use images::{content_name, ImageService};
