//! SQLite [`EventStore`] built on `sqlx`.
//!
//! Events live in a single `events` table keyed by `event_id`; the full
//! record is stored as JSON alongside the columns used for listing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db;
use crate::migrate;
use crate::models::Event;

use super::{sort_events, EventStore};

pub struct SqliteStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStore {
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let pool = db::connect(db_path)
            .await
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    fn location(&self, event: &Event) -> String {
        format!("{}#{}", self.db_path.display(), event.event_id)
    }

    async fn init(&self) -> Result<()> {
        migrate::run_migrations(&self.pool).await
    }

    async fn persist(&self, event: &Event) -> Result<()> {
        let body_json = serde_json::to_string(event)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO events (event_id, format, date, deck_count, body_json, ingested_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(event_id) DO UPDATE SET
                format = excluded.format,
                date = excluded.date,
                deck_count = excluded.deck_count,
                body_json = excluded.body_json,
                ingested_at = excluded.ingested_at
            "#,
        )
        .bind(&event.event_id)
        .bind(&event.format)
        .bind(event.date.format("%Y-%m-%d").to_string())
        .bind(event.decks.len() as i64)
        .bind(&body_json)
        .bind(now)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to store event {}", event.event_id))?;

        Ok(())
    }

    async fn known_event_ids(&self) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT event_id FROM events")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn load_events(&self) -> Result<Vec<Event>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT event_id, body_json FROM events ORDER BY date, event_id")
                .fetch_all(&self.pool)
                .await?;

        let mut events = Vec::with_capacity(rows.len());
        for (event_id, body) in rows {
            let event: Event = serde_json::from_str(&body)
                .with_context(|| format!("Stored event {} is not valid JSON", event_id))?;
            events.push(event);
        }
        sort_events(&mut events);
        Ok(events)
    }
}
