//! Incremental discovery: listing → events not seen before.
//!
//! The known-ID set is read-only here. Callers add an ID only after the
//! event has been persisted, so a run that dies midway simply rediscovers
//! the unpersisted events next time.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::assemble::assemble_event;
use crate::error::IngestError;
use crate::models::{Event, ListingEntry};
use crate::traits::EventSource;

/// Fetch the listing, mapping any failure to [`IngestError::ListingUnavailable`].
pub async fn fetch_listing(
    source: &dyn EventSource,
    lookback: u32,
) -> Result<Vec<ListingEntry>, IngestError> {
    source
        .fetch_listing(lookback)
        .await
        .map_err(|cause| IngestError::ListingUnavailable(Box::new(cause)))
}

/// Entries whose hyperlink is not in `known_ids`, in listing order.
///
/// Blank hyperlinks and hyperlinks repeated within the same listing are
/// dropped so a single run never assembles an event twice.
pub fn unseen_entries(entries: Vec<ListingEntry>, known_ids: &HashSet<String>) -> Vec<ListingEntry> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut unseen = Vec::new();

    for entry in entries {
        if entry.hyperlink.trim().is_empty() {
            warn!(name = %entry.name, "listing entry has no hyperlink, skipping");
            continue;
        }
        if known_ids.contains(&entry.hyperlink) {
            continue;
        }
        if !taken.insert(entry.hyperlink.clone()) {
            warn!(event_id = %entry.hyperlink, "duplicate listing entry, skipping");
            continue;
        }
        unseen.push(entry);
    }

    unseen
}

/// Lazily assembles unseen events one at a time, in listing order.
///
/// Dropping it early (a caller-imposed budget, a fatal persistence error)
/// simply discards the entries not yet assembled.
pub struct Discovery<'a> {
    source: &'a dyn EventSource,
    pending: std::vec::IntoIter<ListingEntry>,
    reference_year: i32,
    total: usize,
    position: usize,
}

impl<'a> Discovery<'a> {
    /// Fetch the listing and queue every entry not in `known_ids`.
    pub async fn start(
        source: &'a dyn EventSource,
        known_ids: &HashSet<String>,
        lookback: u32,
        reference_year: i32,
    ) -> Result<Discovery<'a>, IngestError> {
        let entries = fetch_listing(source, lookback).await?;
        let listed = entries.len();
        let pending = unseen_entries(entries, known_ids);
        info!(listed, new = pending.len(), "listing fetched");

        Ok(Discovery {
            source,
            total: pending.len(),
            pending: pending.into_iter(),
            reference_year,
            position: 0,
        })
    }

    /// Keep at most `limit` of the queued entries.
    pub fn limit(mut self, limit: usize) -> Self {
        let kept: Vec<ListingEntry> = self.pending.by_ref().take(limit).collect();
        self.total = kept.len();
        self.pending = kept.into_iter();
        self
    }

    /// Number of entries queued for assembly.
    pub fn total(&self) -> usize {
        self.total
    }

    /// 1-based index of the entry most recently handed out.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Assemble the next unseen entry. `None` once the queue is drained.
    pub async fn next_event(&mut self) -> Option<(ListingEntry, Result<Event, IngestError>)> {
        let entry = self.pending.next()?;
        self.position += 1;
        let outcome = assemble_event(&entry, self.source, self.reference_year).await;
        Some((entry, outcome))
    }
}

/// Discover and assemble every event in the listing that isn't already known.
///
/// Each element of the returned vector is one unseen entry's assembly
/// outcome, in listing order. The outer error is reserved for a listing
/// that could not be fetched or decoded at all.
pub async fn discover_new_events(
    source: &dyn EventSource,
    known_ids: &HashSet<String>,
    lookback: u32,
    reference_year: i32,
) -> Result<Vec<Result<Event, IngestError>>, IngestError> {
    let mut discovery = Discovery::start(source, known_ids, lookback, reference_year).await?;
    let mut results = Vec::with_capacity(discovery.total());
    while let Some((_, outcome)) = discovery.next_event().await {
        results.push(outcome);
    }
    Ok(results)
}
