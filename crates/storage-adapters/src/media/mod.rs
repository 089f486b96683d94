//! Blob storage for uploaded images.

pub mod local;

pub use local::LocalImageStore;
