//! Export every stored event as a single JSON array.
//!
//! Works against whichever backend `[storage]` selects, so it doubles as a
//! way to move a JSON-directory archive into another tool.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::store::open_store;

/// Export stored events as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let store = open_store(config).await?;
    store.init().await?;
    let events = store.load_events().await?;

    let deck_count: usize = events.iter().map(|e| e.decks.len()).sum();
    let json = serde_json::to_string_pretty(&events)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} events, {} decks to {}",
                events.len(),
                deck_count,
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
