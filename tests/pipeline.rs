//! Integration tests for discovery and the sync pipeline.
//!
//! A scripted `EventSource` stands in for the results service, so these
//! tests exercise discovery, assembly and every store backend without
//! touching the network.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use deck_harvest::discover::discover_new_events;
use deck_harvest::error::IngestError;
use deck_harvest::ingest::{sync_events, EventOutcome, SyncOptions};
use deck_harvest::models::{Card, Event, ListingEntry};
use deck_harvest::progress::NoProgress;
use deck_harvest::store::{EventStore, InMemoryStore, JsonDirStore, SqliteStore};
use deck_harvest::traits::EventSource;
use tempfile::TempDir;

// ─── Scripted source ────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedSource {
    /// `None` simulates an undecodable listing payload.
    listing: Option<Vec<ListingEntry>>,
    pages: HashMap<String, String>,
    decks: HashMap<(String, usize), String>,
    page_fetches: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            listing: Some(Vec::new()),
            ..Default::default()
        }
    }

    fn event(mut self, id: &str, date: &str, name: &str, decks: &[(&str, &str, Option<&str>)]) -> Self {
        self.listing.get_or_insert_with(Vec::new).push(ListingEntry {
            date: date.to_string(),
            hyperlink: id.to_string(),
            name: name.to_string(),
        });
        let page: String = decks
            .iter()
            .map(|(pilot, result, _)| format!("<heading>{} ({})</heading>\n", pilot, result))
            .collect();
        self.pages.insert(id.to_string(), format!("<html>{}</html>", page));
        for (i, (_, _, list)) in decks.iter().enumerate() {
            if let Some(list) = list {
                self.decks.insert((id.to_string(), i + 1), list.to_string());
            }
        }
        self
    }

    fn page_fetches(&self) -> Vec<String> {
        self.page_fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn fetch_listing(&self, _lookback: u32) -> Result<Vec<ListingEntry>, IngestError> {
        self.listing
            .clone()
            .ok_or_else(|| IngestError::Decode("expected value at line 1 column 1".to_string()))
    }

    async fn fetch_event_page(&self, event_id: &str) -> Result<String, IngestError> {
        self.page_fetches.lock().unwrap().push(event_id.to_string());
        self.pages
            .get(event_id)
            .cloned()
            .ok_or_else(|| IngestError::transport(format!("page/{}", event_id), "HTTP 404"))
    }

    async fn fetch_deck_list(
        &self,
        event_id: &str,
        deck_number: usize,
    ) -> Result<String, IngestError> {
        self.decks
            .get(&(event_id.to_string(), deck_number))
            .cloned()
            .ok_or_else(|| {
                IngestError::transport(format!("dek/{}/{}", event_id, deck_number), "timed out")
            })
    }
}

fn two_event_source() -> ScriptedSource {
    ScriptedSource::new()
        .event(
            "modern_100",
            "3/15",
            "Modern Daily #100",
            &[
                ("Alice", "4-0", Some("4 Lightning Bolt\r\n4 Opt\r\n\r\n2 Negate")),
                ("Bob", "3-1", Some("20 Mountain")),
            ],
        )
        .event(
            "pauper_200",
            "3/16",
            "Pauper Daily #200",
            &[("Cara", "4-0", Some("4 Ponder"))],
        )
}

fn opts() -> SyncOptions {
    SyncOptions {
        lookback: 1,
        reference_year: 2023,
        limit: None,
        dry_run: false,
    }
}

// ─── Discovery ──────────────────────────────────────────────────────

#[tokio::test]
async fn discovery_is_idempotent_once_known_ids_are_updated() {
    let source = two_event_source();
    let mut known = HashSet::new();

    let first = discover_new_events(&source, &known, 1, 2023).await.unwrap();
    assert_eq!(first.len(), 2);
    for result in &first {
        known.insert(result.as_ref().unwrap().event_id.clone());
    }

    let second = discover_new_events(&source, &known, 1, 2023).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(source.page_fetches(), vec!["modern_100", "pauper_200"]);
}

#[tokio::test]
async fn discovery_follows_listing_order_and_skips_known() {
    let source = two_event_source().event(
        "standard_300",
        "3/17",
        "Standard Daily",
        &[("Dan", "3-1", Some("4 Opt"))],
    );
    let known: HashSet<String> = ["pauper_200".to_string()].into_iter().collect();

    let results = discover_new_events(&source, &known, 1, 2023).await.unwrap();
    let ids: Vec<String> = results
        .into_iter()
        .map(|r| r.unwrap().event_id)
        .collect();
    assert_eq!(ids, vec!["modern_100", "standard_300"]);
}

#[tokio::test]
async fn undecodable_listing_fails_the_whole_call() {
    let source = ScriptedSource {
        listing: None,
        ..Default::default()
    };
    let err = discover_new_events(&source, &HashSet::new(), 1, 2023)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::ListingUnavailable(ref cause) if matches!(**cause, IngestError::Decode(_))));
}

#[tokio::test]
async fn per_event_failures_do_not_stop_discovery() {
    let mut source = two_event_source();
    source.pages.remove("modern_100");
    source.listing.as_mut().unwrap().push(ListingEntry {
        date: "someday".to_string(),
        hyperlink: "legacy_9".to_string(),
        name: "Legacy Challenge".to_string(),
    });

    let results = discover_new_events(&source, &HashSet::new(), 1, 2023)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], Err(IngestError::DetailFetchFailed { .. })));
    assert_eq!(results[1].as_ref().unwrap().event_id, "pauper_200");
    assert!(matches!(results[2], Err(IngestError::UnparseableDate(_))));
}

#[tokio::test]
async fn deck_fetch_failure_is_isolated_to_that_deck() {
    let source = ScriptedSource::new().event(
        "modern_1",
        "3/15",
        "Modern Daily",
        &[
            ("Alice", "4-0", Some("4 Lightning Bolt\r\n\r\n1 Negate")),
            ("Bob", "3-1", None),
            ("Cara", "3-1", Some("4 Opt")),
        ],
    );

    let results = discover_new_events(&source, &HashSet::new(), 1, 2023)
        .await
        .unwrap();
    let event = results.into_iter().next().unwrap().unwrap();

    assert_eq!(event.decks.len(), 3);
    assert_eq!(event.decks[0].main_deck, vec![Card::new(4, "Lightning Bolt")]);
    assert_eq!(event.decks[0].sideboard, vec![Card::new(1, "Negate")]);
    assert_eq!(event.decks[1].pilot, "Bob");
    assert!(event.decks[1].main_deck.is_empty() && event.decks[1].sideboard.is_empty());
    assert_eq!(event.decks[2].main_deck, vec![Card::new(4, "Opt")]);
}

// ─── Sync pipeline ──────────────────────────────────────────────────

#[tokio::test]
async fn sync_persists_to_json_and_second_run_finds_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = JsonDirStore::new(tmp.path().join("events"));
    let source = two_event_source();

    let first = sync_events(&source, &store, &opts(), &NoProgress).await.unwrap();
    assert_eq!(first.new_events, 2);
    assert_eq!(first.persisted(), 2);
    assert_eq!(first.known_after, 2);
    let modern = first
        .events
        .iter()
        .find(|e| e.event_id == "modern_100")
        .unwrap();
    let expected = tmp.path().join("events").join("Modern").join("modern_100.json");
    assert_eq!(
        modern.outcome,
        EventOutcome::Persisted {
            decks: 2,
            location: expected.display().to_string()
        }
    );
    assert!(tmp
        .path()
        .join("events")
        .join("Modern")
        .join("modern_100.json")
        .exists());
    assert!(tmp
        .path()
        .join("events")
        .join("Pauper")
        .join("pauper_200.json")
        .exists());

    let second = sync_events(&source, &store, &opts(), &NoProgress).await.unwrap();
    assert_eq!(second.known_before, 2);
    assert_eq!(second.new_events, 0);
    assert!(second.events.is_empty());

    let stored = store.load_events().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].date, NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
    assert_eq!(stored[0].decks[0].sideboard, vec![Card::new(2, "Negate")]);
}

#[tokio::test]
async fn sync_persists_to_sqlite() {
    let tmp = TempDir::new().unwrap();
    let store = SqliteStore::connect(&tmp.path().join("events.sqlite"))
        .await
        .unwrap();
    let source = two_event_source();

    let report = sync_events(&source, &store, &opts(), &NoProgress).await.unwrap();
    assert_eq!(report.persisted(), 2);

    let again = sync_events(&source, &store, &opts(), &NoProgress).await.unwrap();
    assert_eq!(again.new_events, 0);

    let events = store.load_events().await.unwrap();
    assert_eq!(events[1].format, "Pauper");
    assert_eq!(events[1].decks[0].main_deck, vec![Card::new(4, "Ponder")]);
    store.close().await;
}

#[tokio::test]
async fn event_without_decks_is_left_for_a_later_run() {
    let mut source = ScriptedSource::new().event("modern_5", "3/15", "Modern Daily", &[]);
    let store = InMemoryStore::new();

    let report = sync_events(&source, &store, &opts(), &NoProgress).await.unwrap();
    assert_eq!(report.events[0].outcome, EventOutcome::NoDecks);
    assert!(store.is_empty());

    source.pages.insert(
        "modern_5".to_string(),
        "<heading>Alice (4-0)</heading>".to_string(),
    );
    source
        .decks
        .insert(("modern_5".to_string(), 1), "4 Opt".to_string());

    let later = sync_events(&source, &store, &opts(), &NoProgress).await.unwrap();
    assert_eq!(
        later.events[0].outcome,
        EventOutcome::Persisted {
            decks: 1,
            location: "memory:modern_5".to_string()
        }
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn limit_stops_early_without_losing_the_rest() {
    let source = two_event_source();
    let store = InMemoryStore::new();
    let mut limited = opts();
    limited.limit = Some(1);

    let first = sync_events(&source, &store, &limited, &NoProgress).await.unwrap();
    assert_eq!(first.new_events, 1);
    assert_eq!(first.events[0].event_id, "modern_100");
    assert_eq!(source.page_fetches(), vec!["modern_100"]);

    let second = sync_events(&source, &store, &limited, &NoProgress).await.unwrap();
    assert_eq!(second.events[0].event_id, "pauper_200");
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn dry_run_assembles_without_persisting() {
    let source = two_event_source();
    let store = InMemoryStore::new();
    let mut dry = opts();
    dry.dry_run = true;

    let report = sync_events(&source, &store, &dry, &NoProgress).await.unwrap();
    assert_eq!(report.assembled(), 2);
    assert_eq!(report.persisted(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn listing_failure_fails_the_sync() {
    let source = ScriptedSource {
        listing: None,
        ..Default::default()
    };
    let store = InMemoryStore::new();

    let err = sync_events(&source, &store, &opts(), &NoProgress)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("event listing unavailable"));
}

/// Store whose writes always fail.
struct ReadOnlyStore;

#[async_trait]
impl EventStore for ReadOnlyStore {
    fn backend_name(&self) -> &str {
        "read-only"
    }

    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn persist(&self, _event: &Event) -> Result<()> {
        anyhow::bail!("disk full")
    }

    async fn known_event_ids(&self) -> Result<HashSet<String>> {
        Ok(HashSet::new())
    }

    async fn load_events(&self) -> Result<Vec<Event>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn persist_failure_is_reported_and_event_stays_unknown() {
    let source = two_event_source();

    let report = sync_events(&source, &ReadOnlyStore, &opts(), &NoProgress)
        .await
        .unwrap();
    assert_eq!(report.failed(), 2);
    assert_eq!(report.known_after, 0);
    match &report.events[0].outcome {
        EventOutcome::Failed { kind, reason } => {
            assert_eq!(kind, "persist");
            assert!(reason.contains("disk full"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
