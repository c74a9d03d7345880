//! # deck-harvest
//!
//! Incremental ingestion of published Magic Online tournament results.
//!
//! deck-harvest polls the public event listing, skips events it has already
//! stored, fetches each new event's results page and every deck's card list,
//! and writes one structured record per event, keyed by format and event ID.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   ┌────────────┐
//! │  Listing    │──▶│  Discovery   │──▶│  Assembler   │──▶│   Store    │
//! │ (HTTP/JSON) │   │ unseen only  │   │ page + decks │   │ JSON/SQLite│
//! └─────────────┘   └──────────────┘   └──────┬───────┘   └────────────┘
//!                                             │
//!                                      ┌──────▼───────┐
//!                                      │  Extractors  │
//!                                      │ format, date,│
//!                                      │ headers, .dek│
//!                                      └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! deck-harvest init                   # create the events directory / schema
//! deck-harvest sync --lookback 3      # ingest the last three days
//! deck-harvest events --format Modern # list what is stored
//! deck-harvest export -o all.json     # dump everything as one JSON array
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`extract`] | Format, date, deck-header and card-list extraction |
//! | [`assemble`] | Listing entry → fully populated event |
//! | [`discover`] | Incremental discovery of unseen events |
//! | [`ingest`] | Sync pipeline: discover, assemble, persist, report |
//! | [`connector_wotc`] | HTTP transport and the results-service source |
//! | [`store`] | Event persistence (JSON directory, SQLite, memory) |
//! | [`traits`] | Transport and event-source seams |
//! | [`models`] | Events, decks, cards, listing entries |
//! | [`error`] | Ingestion error taxonomy |
//! | [`config`] | TOML configuration parsing |

pub mod assemble;
pub mod config;
pub mod connector_wotc;
pub mod db;
pub mod discover;
pub mod error;
pub mod export;
pub mod extract;
pub mod ingest;
pub mod inspect;
pub mod list;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod store;
pub mod traits;
