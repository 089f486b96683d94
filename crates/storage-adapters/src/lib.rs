//! Storage adapters implementing the `domains` ports.

#[cfg(feature = "db-sqlite")]
pub mod db;
#[cfg(feature = "media-local")]
pub mod media;

#[cfg(feature = "db-sqlite")]
pub use db::SqliteEventRepo;
#[cfg(feature = "media-local")]
pub use media::LocalImageStore;
