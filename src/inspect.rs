//! Offline inspection of saved source text.

use anyhow::{Context, Result};
use std::path::Path;

use crate::extract::parse_card_list;

/// Run the card-list parser over a saved `.dek` file and print both lists.
pub fn run_parse_list(path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let (main_deck, sideboard) = parse_card_list(&text);

    println!("main deck ({} cards)", main_deck.iter().map(|c| c.number as u64).sum::<u64>());
    for card in &main_deck {
        println!("  {:>2} {}", card.number, card.name);
    }
    println!("sideboard ({} cards)", sideboard.iter().map(|c| c.number as u64).sum::<u64>());
    for card in &sideboard {
        println!("  {:>2} {}", card.number, card.name);
    }

    Ok(())
}
