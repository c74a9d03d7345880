//! Storage abstraction for assembled events.
//!
//! The [`EventStore`] trait is the persistence gateway: the ingest
//! pipeline hands it fully assembled events and asks it which event IDs
//! are already known. Backends:
//!
//! | Backend | Module | Layout |
//! |---------|--------|--------|
//! | `json` | [`json`] | `<events_dir>/<format>/<event_id>.json` |
//! | `sqlite` | [`sqlite`] | `events` table keyed by `event_id` |
//! | memory | [`memory`] | in-process map, used by tests |

pub mod json;
pub mod memory;
pub mod sqlite;

use std::collections::HashSet;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::config::Config;
use crate::models::Event;

pub use json::JsonDirStore;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Durable storage for assembled events, keyed by format and event ID.
///
/// `persist` overwrites: writing the same event ID twice must leave exactly
/// one intact record.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Short name used in logs and `sync` output (e.g. `"json"`).
    fn backend_name(&self) -> &str;

    /// Prepare the backing storage. Safe to call repeatedly.
    async fn init(&self) -> Result<()>;

    /// Store one fully assembled event.
    async fn persist(&self, event: &Event) -> Result<()>;

    /// Where `event` is (or would be) stored, for run summaries.
    fn location(&self, event: &Event) -> String {
        format!("{}:{}", self.backend_name(), event.event_id)
    }

    /// IDs of every stored event.
    async fn known_event_ids(&self) -> Result<HashSet<String>>;

    /// Every stored event, ordered by date then ID.
    async fn load_events(&self) -> Result<Vec<Event>>;
}

/// Open the backend selected by `[storage].backend`.
pub async fn open_store(config: &Config) -> Result<Box<dyn EventStore>> {
    match config.storage.backend.as_str() {
        "json" => Ok(Box::new(JsonDirStore::new(&config.storage.events_dir))),
        "sqlite" => Ok(Box::new(SqliteStore::connect(&config.storage.db_path).await?)),
        other => bail!(
            "Unknown storage backend: '{}'. Must be json or sqlite.",
            other
        ),
    }
}

pub(crate) fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.event_id.cmp(&b.event_id)));
}
