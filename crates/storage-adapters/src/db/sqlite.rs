//! # SQLite event repository
//!
//! Maps the `events` table onto the domain `Event`. Every statement uses
//! bound parameters, including the dynamic column list of an update.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use domains::timeline::{format_storage, parse_storage};
use domains::{DomainError, Event, EventId, EventPatch, EventRepository, ImageName, Result};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Upper bound on bound parameters per `DELETE ... IN (...)` statement.
const DELETE_CHUNK: usize = 500;

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::backend(context, e)
}

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    /// Opens (creating if needed) the database at `url` and applies migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err("invalid database url"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(db_err("failed to open database"))?;
        Self::from_pool(pool).await
    }

    /// A private in-memory database. Pinned to a single connection that is
    /// never recycled, since each SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(db_err("failed to open in-memory database"))?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| DomainError::backend("migration failed", e))?;
        tracing::debug!("event schema is up to date");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    uuid: String,
    ev_time: String,
    ev_title: String,
    ev_href: Option<String>,
    ev_desc: String,
    image_hash: Option<String>,
}

impl TryFrom<EventRow> for Event {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self> {
        let corrupt = |e: DomainError| DomainError::Backend(format!("corrupt event row {}: {e}", row.uuid));
        Ok(Event {
            uuid: EventId::parse(&row.uuid).map_err(corrupt)?,
            time: parse_storage(&row.ev_time).map_err(corrupt)?,
            image_hash: row
                .image_hash
                .as_deref()
                .filter(|h| !h.is_empty())
                .map(ImageName::parse)
                .transpose()
                .map_err(corrupt)?,
            title: row.ev_title,
            href: row.ev_href.filter(|h| !h.is_empty()),
            description: row.ev_desc,
        })
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn list_between(&self, from: NaiveDateTime, until: NaiveDateTime) -> Result<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT uuid, ev_time, ev_title, ev_href, ev_desc, image_hash FROM events \
             WHERE ev_time >= ? AND ev_time < ? ORDER BY ev_time DESC",
        )
        .bind(format_storage(&from))
        .bind(format_storage(&until))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to list events"))?;

        rows.into_iter().map(Event::try_from).collect()
    }

    /// The whole batch goes in one transaction, so a duplicate uuid leaves
    /// the table untouched.
    async fn insert_many(&self, events: &[Event]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err("failed to begin transaction"))?;

        for event in events {
            sqlx::query(
                "INSERT INTO events (uuid, ev_time, ev_title, ev_href, show_image, image_hash, ev_desc) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(event.uuid.as_str())
            .bind(format_storage(&event.time))
            .bind(&event.title)
            .bind(event.href.as_deref())
            .bind(event.image_hash.is_some())
            .bind(event.image_hash.as_ref().map(ImageName::as_str))
            .bind(&event.description)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to insert event"))?;
        }

        tx.commit().await.map_err(db_err("failed to commit events"))?;
        Ok(())
    }

    async fn update(&self, uuid: &EventId, patch: &EventPatch) -> Result<u64> {
        if patch.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE events SET ");
        let mut columns = query.separated(", ");
        if let Some(time) = &patch.time {
            columns.push("ev_time = ").push_bind_unseparated(format_storage(time));
        }
        if let Some(title) = &patch.title {
            columns.push("ev_title = ").push_bind_unseparated(title.clone());
        }
        if let Some(href) = &patch.href {
            columns.push("ev_href = ").push_bind_unseparated(href.clone());
        }
        if let Some(description) = &patch.description {
            columns.push("ev_desc = ").push_bind_unseparated(description.clone());
        }
        if let Some(image) = &patch.image_hash {
            columns.push("image_hash = ").push_bind_unseparated(image.as_str().to_owned());
            columns.push("show_image = 1");
        }
        query.push(" WHERE uuid = ").push_bind(uuid.as_str().to_owned());

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_err("failed to update event"))?;
        Ok(result.rows_affected())
    }

    async fn delete_many(&self, uuids: &[EventId]) -> Result<u64> {
        let mut removed = 0;
        for chunk in uuids.chunks(DELETE_CHUNK) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM events WHERE uuid IN (");
            let mut ids = query.separated(", ");
            for id in chunk {
                ids.push_bind(id.as_str().to_owned());
            }
            ids.push_unseparated(")");

            removed += query
                .build()
                .execute(&self.pool)
                .await
                .map_err(db_err("failed to delete events"))?
                .rows_affected();
        }
        Ok(removed)
    }
}
