//! Relational persistence for timeline events.

pub mod sqlite;

pub use sqlite::SqliteEventRepo;
