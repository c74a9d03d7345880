use anyhow::Result;

use crate::config::Config;
use crate::store::open_store;

/// Print stored events, optionally restricted to one format.
pub async fn run_list(config: &Config, format: Option<&str>) -> Result<()> {
    let store = open_store(config).await?;
    store.init().await?;
    let events = store.load_events().await?;

    println!(
        "{:<12} {:<20} {:>6} {:>6}  EVENT",
        "DATE", "FORMAT", "DECKS", "CARDS"
    );
    let mut shown = 0usize;
    for event in events
        .iter()
        .filter(|e| format.map_or(true, |f| e.format == f))
    {
        println!(
            "{:<12} {:<20} {:>6} {:>6}  {}",
            event.date.format("%Y-%m-%d").to_string(),
            event.format,
            event.decks.len(),
            event.card_count(),
            event.event_id
        );
        shown += 1;
    }
    println!("{} events ({} backend)", shown, store.backend_name());

    Ok(())
}
