//! Text extractors: listing titles, listing dates, results pages, and
//! `.dek` card lists.
//!
//! Everything here is pure. Source text is noisy, so line-level garbage is
//! dropped rather than reported; only [`parse_event_date`] can fail, because
//! a wrong date is worse than no event.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

use crate::error::IngestError;
use crate::models::{Card, DeckHeader};

/// Substring → canonical format label. Tested in order, so a pattern must
/// come before any pattern it contains.
pub const FORMAT_PATTERNS: &[(&str, &str)] = &[
    ("Standard", "Standard"),
    ("Modern", "Modern"),
    ("Pauper", "Pauper"),
    ("Classic", "Classic"),
    ("Sealed RTR Block", "RTR Block Sealed"),
    ("RTR Block", "RTR Block"),
];

/// Separator between lines of a `.dek` card list.
pub const LINE_SEPARATOR: &str = "\r\n";

static EVENT_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)/(\d+)").expect("event date pattern"));

// PILOT may not cross a tag, so a heading without a result cannot swallow
// the next heading. RESULT stops at the first `)</heading>` and may carry
// inline markup.
static DECK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<heading>([^\s<]+) \((.+?)\)</heading>").expect("deck header pattern")
});

static CARD_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+) (.+)$").expect("card line pattern"));

/// Map a free-text event title to a canonical format.
///
/// Unrecognized titles come back unchanged (and are logged) so ingestion
/// continues with a degraded but non-empty value.
pub fn classify_format(raw_name: &str) -> String {
    for (pattern, label) in FORMAT_PATTERNS {
        if raw_name.contains(pattern) {
            return (*label).to_string();
        }
    }
    warn!(name = raw_name, "unrecognized format");
    raw_name.to_string()
}

/// Parse a year-less `M/D` listing date, taking the year from the caller.
pub fn parse_event_date(raw_date: &str, reference_year: i32) -> Result<NaiveDate, IngestError> {
    let unparseable = || IngestError::UnparseableDate(raw_date.to_string());

    let caps = EVENT_DATE_RE.captures(raw_date).ok_or_else(unparseable)?;
    let month: u32 = caps[1].parse().map_err(|_| unparseable())?;
    let day: u32 = caps[2].parse().map_err(|_| unparseable())?;

    NaiveDate::from_ymd_opt(reference_year, month, day).ok_or_else(unparseable)
}

/// Pull every `<heading>PILOT (RESULT)</heading>` out of a results page,
/// in document order.
pub fn extract_deck_headers(page_html: &str) -> Vec<DeckHeader> {
    DECK_HEADER_RE
        .captures_iter(page_html)
        .filter_map(|caps| {
            let pilot = caps.get(1)?;
            let result = caps.get(2)?;
            Some(DeckHeader {
                pilot: pilot.as_str().to_string(),
                result: result.as_str().to_string(),
            })
        })
        .collect()
}

/// Split a `.dek` card list into `(main_deck, sideboard)`.
///
/// The first empty line switches to the sideboard for the rest of the
/// input; later empty lines do not switch back. Lines that are not
/// `COUNT NAME` are dropped.
pub fn parse_card_list(raw_text: &str) -> (Vec<Card>, Vec<Card>) {
    let mut main_deck = Vec::new();
    let mut sideboard = Vec::new();
    let mut in_sideboard = false;

    for line in raw_text.split(LINE_SEPARATOR) {
        if line.is_empty() {
            in_sideboard = true;
            continue;
        }

        let Some(card) = parse_card_line(line) else {
            continue;
        };
        if in_sideboard {
            sideboard.push(card);
        } else {
            main_deck.push(card);
        }
    }

    (main_deck, sideboard)
}

fn parse_card_line(line: &str) -> Option<Card> {
    let caps = CARD_LINE_RE.captures(line)?;
    let number: u32 = caps[1].parse().ok()?;
    if number == 0 {
        return None;
    }
    Some(Card::new(number, &caps[2]))
}
