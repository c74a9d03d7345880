//! Event assembly: listing entry → fully populated [`Event`].
//!
//! Failure is asymmetric. Losing the results page loses the event; losing
//! one deck's card list only empties that deck.

use tracing::{debug, warn};

use crate::error::IngestError;
use crate::extract::{classify_format, extract_deck_headers, parse_card_list, parse_event_date};
use crate::models::{Deck, Event, ListingEntry};
use crate::traits::EventSource;

/// Build the [`Event`] for one listing entry.
///
/// Deck numbers are the 1-based positions of the headers on the results
/// page; the card-list fetch for each deck is addressed by that number.
///
/// # Errors
///
/// - [`IngestError::UnparseableDate`] if the listing date has no `M/D`.
/// - [`IngestError::DetailFetchFailed`] if the results page can't be fetched.
pub async fn assemble_event(
    entry: &ListingEntry,
    source: &dyn EventSource,
    reference_year: i32,
) -> Result<Event, IngestError> {
    let format = classify_format(&entry.name);
    let date = parse_event_date(&entry.date, reference_year)?;
    let event_id = entry.hyperlink.clone();

    let page = source
        .fetch_event_page(&event_id)
        .await
        .map_err(|cause| IngestError::DetailFetchFailed {
            event_id: event_id.clone(),
            cause: Box::new(cause),
        })?;

    let headers = extract_deck_headers(&page);
    debug!(event_id = %event_id, headers = headers.len(), "found deck headers");

    let mut decks = Vec::with_capacity(headers.len());
    for (deck_number, header) in (1..).zip(headers) {
        let (main_deck, sideboard) = match source.fetch_deck_list(&event_id, deck_number).await {
            Ok(text) => parse_card_list(&text),
            Err(e) => {
                warn!(
                    event_id = %event_id,
                    deck_number,
                    pilot = %header.pilot,
                    error = %e,
                    "deck list unavailable, keeping deck with empty lists"
                );
                (Vec::new(), Vec::new())
            }
        };

        decks.push(Deck {
            format: format.clone(),
            date,
            event_id: event_id.clone(),
            pilot: header.pilot,
            result: header.result,
            main_deck,
            sideboard,
        });
    }

    Ok(Event {
        format,
        date,
        event_id,
        decks,
    })
}
