//! Seams between the ingestion core and the outside world.
//!
//! ```text
//! ┌───────────┐   ┌─────────────┐   ┌────────────┐   ┌────────────┐
//! │ Transport │──▶│ EventSource │──▶│ discover + │──▶│ EventStore │
//! │  (HTTP)   │   │ (listing,   │   │  assemble  │   │ json/sqlite│
//! └───────────┘   │ pages, dek) │   └────────────┘   └────────────┘
//!                 └─────────────┘
//! ```
//!
//! The core only ever talks to these traits, so tests drive it with
//! in-process fakes and the CLI wires in [`HttpTransport`](crate::connector_wotc::HttpTransport),
//! [`WotcSource`](crate::connector_wotc::WotcSource) and one of the
//! [`EventStore`](crate::store::EventStore) backends.

use async_trait::async_trait;

use crate::error::IngestError;
use crate::models::ListingEntry;

/// A single GET, no retries.
///
/// Network failures, non-success statuses and timeouts all collapse to
/// [`IngestError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, IngestError>;
}

/// Where listings, results pages and card lists come from.
///
/// Implemented by [`WotcSource`](crate::connector_wotc::WotcSource) for
/// the live service.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch and decode the listing for the last `lookback` days.
    ///
    /// Fails with [`IngestError::Transport`] or [`IngestError::Decode`].
    async fn fetch_listing(&self, lookback: u32) -> Result<Vec<ListingEntry>, IngestError>;

    /// Fetch an event's results page as text.
    async fn fetch_event_page(&self, event_id: &str) -> Result<String, IngestError>;

    /// Fetch one deck's card list. `deck_number` is 1-based.
    async fn fetch_deck_list(&self, event_id: &str, deck_number: usize)
        -> Result<String, IngestError>;
}
