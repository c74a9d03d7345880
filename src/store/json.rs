//! JSON-file [`EventStore`]: one pretty-printed file per event.
//!
//! Layout is `<events_dir>/<format>/<event_id>.json`, with both components
//! percent-encoded (`RTR Block Sealed` becomes `RTR%20Block%20Sealed`).
//! Each write goes to a
//! temporary sibling first and is renamed into place, so an interrupted
//! write never leaves a truncated record behind.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::models::Event;

use super::{sort_events, EventStore};

pub struct JsonDirStore {
    root: PathBuf,
}

/// Just enough of a stored file to learn its identity.
#[derive(Deserialize)]
struct StoredId {
    #[serde(rename = "eventID")]
    event_id: String,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `event` is (or would be) stored.
    pub fn event_path(&self, event: &Event) -> PathBuf {
        self.root
            .join(encode_component(&event.format))
            .join(format!("{}.json", encode_component(&event.event_id)))
    }

    fn stored_files(&self) -> Vec<PathBuf> {
        if !self.root.exists() {
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable store entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        files
    }
}

/// Percent-encode `raw` into a single path component.
///
/// The encoding is injective, so two different event IDs never share a
/// file. `.` and `..` have their dots escaped and the empty string becomes
/// a bare `%`, which the encoder never emits on its own.
pub fn encode_component(raw: &str) -> String {
    match raw {
        "" => "%".to_string(),
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => urlencoding::encode(raw).into_owned(),
    }
}

#[async_trait]
impl EventStore for JsonDirStore {
    fn backend_name(&self) -> &str {
        "json"
    }

    fn location(&self, event: &Event) -> String {
        self.event_path(event).display().to_string()
    }

    async fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create events dir: {}", self.root.display()))
    }

    async fn persist(&self, event: &Event) -> Result<()> {
        let path = self.event_path(event);
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let json = serde_json::to_string_pretty(event)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;

        debug!(path = %path.display(), "event written");
        Ok(())
    }

    async fn known_event_ids(&self) -> Result<HashSet<String>> {
        let mut ids = HashSet::new();
        for path in self.stored_files() {
            let parsed = std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| Ok(serde_json::from_str::<StoredId>(&s)?));
            match parsed {
                Ok(stored) => {
                    ids.insert(stored.event_id);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable event file, treating as unknown")
                }
            }
        }
        Ok(ids)
    }

    async fn load_events(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for path in self.stored_files() {
            let parsed = std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| Ok(serde_json::from_str::<Event>(&s)?));
            match parsed {
                Ok(event) => events.push(event),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable event file"),
            }
        }
        sort_events(&mut events);
        Ok(events)
    }
}
