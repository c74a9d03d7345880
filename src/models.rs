//! Core data models used throughout deck-harvest.
//!
//! Listing entries come off the wire; events, decks, and cards are what the
//! pipeline assembles and hands to an [`EventStore`](crate::store::EventStore).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the remote event listing, before normalization.
///
/// Never persisted. `hyperlink` doubles as the event's identity and as the
/// locator for its results page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingEntry {
    /// Month/day text without a year, e.g. `"3/15"`.
    pub date: String,
    pub hyperlink: String,
    /// Free-text title carrying the format hint.
    pub name: String,
}

/// A `(pilot, result)` pair pulled from an event's results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckHeader {
    pub pilot: String,
    pub result: String,
}

/// One tournament instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub format: String,
    pub date: NaiveDate,
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub decks: Vec<Deck>,
}

/// One participant's submission. Carries copies of its parent event's
/// format, date, and ID so a flattened record is self-describing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub format: String,
    pub date: NaiveDate,
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub pilot: String,
    pub result: String,
    pub main_deck: Vec<Card>,
    pub sideboard: Vec<Card>,
}

/// One line item of a card list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub number: u32,
    pub name: String,
}

impl Card {
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
        }
    }
}

impl Event {
    /// Total card count across every deck's main deck and sideboard.
    pub fn card_count(&self) -> u64 {
        self.decks
            .iter()
            .flat_map(|d| d.main_deck.iter().chain(d.sideboard.iter()))
            .map(|c| c.number as u64)
            .sum()
    }
}
