//! Ingestion pipeline orchestration.
//!
//! Coordinates one sync pass: known IDs from the store → listing → unseen
//! entries → assembled events → store. Each event is persisted as soon as
//! it is assembled, and its ID joins the known set only after the write
//! succeeds, so an interrupted run loses nothing it already reported.

use anyhow::Result;
use chrono::Datelike;
use tracing::{info, warn};

use crate::config::Config;
use crate::connector_wotc::WotcSource;
use crate::discover::Discovery;
use crate::progress::{ProgressMode, SyncProgressEvent, SyncProgressReporter};
use crate::store::{open_store, EventStore};
use crate::traits::EventSource;

/// Knobs for a single sync pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Listing window in days.
    pub lookback: u32,
    /// Year stamped onto the listing's `M/D` dates.
    pub reference_year: i32,
    /// Stop after this many unseen events.
    pub limit: Option<usize>,
    /// Assemble but do not persist.
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            lookback: config.source.lookback_days,
            reference_year: chrono::Local::now().year(),
            limit: None,
            dry_run: false,
        }
    }
}

/// What happened to one unseen listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Persisted { decks: usize, location: String },
    /// Assembled, but not written because of `--dry-run`.
    Assembled { decks: usize },
    /// Results page had no deck headers yet; left for a later run.
    NoDecks,
    /// Assembly or persistence failed.
    Failed { kind: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    pub event_id: String,
    pub name: String,
    pub outcome: EventOutcome,
}

/// Summary of a sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub backend: String,
    pub known_before: usize,
    pub known_after: usize,
    pub new_events: usize,
    pub events: Vec<EventReport>,
}

impl SyncReport {
    pub fn persisted(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::Persisted { .. }))
    }

    pub fn assembled(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::Assembled { .. }))
    }

    pub fn no_decks(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::NoDecks))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&EventOutcome) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Run one sync pass against explicit collaborators.
///
/// Used by the CLI and by tests with fake sources. A listing that can't be
/// fetched or decoded fails the whole pass; everything else is recorded
/// per event in the returned [`SyncReport`].
pub async fn sync_events(
    source: &dyn EventSource,
    store: &dyn EventStore,
    opts: &SyncOptions,
    progress: &dyn SyncProgressReporter,
) -> Result<SyncReport> {
    store.init().await?;
    let mut known = store.known_event_ids().await?;

    progress.report(SyncProgressEvent::Discovering {
        lookback: opts.lookback,
    });
    let mut discovery = Discovery::start(source, &known, opts.lookback, opts.reference_year).await?;
    if let Some(limit) = opts.limit {
        discovery = discovery.limit(limit);
    }

    let mut report = SyncReport {
        backend: store.backend_name().to_string(),
        known_before: known.len(),
        known_after: known.len(),
        new_events: discovery.total(),
        events: Vec::with_capacity(discovery.total()),
    };
    let total = discovery.total() as u64;

    while let Some((entry, outcome)) = discovery.next_event().await {
        progress.report(SyncProgressEvent::Ingesting {
            event_id: entry.hyperlink.clone(),
            n: discovery.position() as u64,
            total,
        });

        let outcome = match outcome {
            Err(e) => {
                warn!(event_id = %entry.hyperlink, error = %e, "event assembly failed");
                EventOutcome::Failed {
                    kind: e.kind().to_string(),
                    reason: e.to_string(),
                }
            }
            Ok(event) if event.decks.is_empty() => {
                info!(event_id = %event.event_id, "no deck headers yet, leaving for a later run");
                EventOutcome::NoDecks
            }
            Ok(event) if opts.dry_run => EventOutcome::Assembled {
                decks: event.decks.len(),
            },
            Ok(event) => match store.persist(&event).await {
                Ok(()) => {
                    info!(
                        event_id = %event.event_id,
                        format = %event.format,
                        decks = event.decks.len(),
                        "event persisted"
                    );
                    known.insert(event.event_id.clone());
                    EventOutcome::Persisted {
                        decks: event.decks.len(),
                        location: store.location(&event),
                    }
                }
                Err(e) => {
                    warn!(event_id = %event.event_id, error = %e, "persist failed");
                    EventOutcome::Failed {
                        kind: "persist".to_string(),
                        reason: format!("{:#}", e),
                    }
                }
            },
        };

        report.events.push(EventReport {
            event_id: entry.hyperlink,
            name: entry.name,
            outcome,
        });
    }

    report.known_after = known.len();
    Ok(report)
}

/// CLI entry point for `deck-harvest sync`.
pub async fn run_sync(config: &Config, opts: &SyncOptions, progress: ProgressMode) -> Result<()> {
    let source = WotcSource::http(config.source.clone())?;
    let reporter = progress.reporter();

    let store = open_store(config).await?;
    let report = sync_events(&source, store.as_ref(), opts, reporter.as_ref()).await?;

    print_report(&report, opts.dry_run);
    Ok(())
}

fn print_report(report: &SyncReport, dry_run: bool) {
    if dry_run {
        println!("sync (dry-run)");
    } else {
        println!("sync {}", report.backend);
    }
    println!("  known events: {}", report.known_before);
    println!("  new events: {}", report.new_events);

    for ev in &report.events {
        match &ev.outcome {
            EventOutcome::Persisted { decks, location } => {
                println!("  + {}  {} decks  {}", ev.event_id, decks, location)
            }
            EventOutcome::Assembled { decks } => {
                println!("  ~ {}  {} decks  assembled", ev.event_id, decks)
            }
            EventOutcome::NoDecks => println!("  . {}  no decks yet", ev.event_id),
            EventOutcome::Failed { kind, reason } => {
                println!("  ! {}  {}: {}", ev.event_id, kind, reason)
            }
        }
    }

    if dry_run {
        println!("  assembled: {}", report.assembled());
    } else {
        println!("  persisted: {}", report.persisted());
    }
    println!("  no decks yet: {}", report.no_decks());
    println!("  failed: {}", report.failed());
    if !dry_run {
        println!("  known events now: {}", report.known_after);
    }
    println!("ok");
}
