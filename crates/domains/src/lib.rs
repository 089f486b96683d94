//! The domain model and port definitions for the kxpage backend.

pub mod errors;
pub mod models;
pub mod ports;
pub mod timeline;

pub use errors::{DomainError, Result};
pub use models::*;
pub use ports::*;
