//! In-memory [`EventStore`] for tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::Event;

use super::{sort_events, EventStore};

/// Events held in a map keyed by event ID.
pub struct InMemoryStore {
    events: RwLock<BTreeMap<String, Event>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(BTreeMap::new()),
        }
    }

    /// Pre-populated store, handy for seeding known IDs.
    pub fn with_events(events: impl IntoIterator<Item = Event>) -> Self {
        let map = events
            .into_iter()
            .map(|e| (e.event_id.clone(), e))
            .collect();
        Self {
            events: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn persist(&self, event: &Event) -> Result<()> {
        let mut events = self
            .events
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        events.insert(event.event_id.clone(), event.clone());
        Ok(())
    }

    async fn known_event_ids(&self) -> Result<HashSet<String>> {
        let events = self
            .events
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        Ok(events.keys().cloned().collect())
    }

    async fn load_events(&self) -> Result<Vec<Event>> {
        let events = self
            .events
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        let mut out: Vec<Event> = events.values().cloned().collect();
        sort_events(&mut out);
        Ok(out)
    }
}
