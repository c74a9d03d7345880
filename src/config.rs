use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote listing service endpoints.
///
/// URL templates use `{lookback}`, `{event_id}` and `{deck_number}`
/// placeholders.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_listing_url")]
    pub listing_url: String,
    #[serde(default = "default_event_page_url")]
    pub event_page_url: String,
    #[serde(default = "default_deck_list_url")]
    pub deck_list_url: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            event_page_url: default_event_page_url(),
            deck_list_url: default_deck_list_url(),
            lookback_days: default_lookback_days(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_listing_url() -> String {
    "https://www.wizards.com/handlers/XMLListService.ashx?dir=mtgo&type=XMLFileInfo&start={lookback}"
        .to_string()
}
fn default_event_page_url() -> String {
    "https://www.wizards.com/Magic/Digital/MagicOnlineTourn.aspx?x=mtg/digital/magiconline/tourn/{event_id}"
        .to_string()
}
fn default_deck_list_url() -> String {
    "https://www.wizards.com/magic/.dek?x=mtg/digital/magiconline/tourn/{event_id}&decknum={deck_number}"
        .to_string()
}
fn default_lookback_days() -> u32 {
    1
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("deck-harvest/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_events_dir")]
    pub events_dir: PathBuf,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            events_dir: default_events_dir(),
            db_path: default_db_path(),
        }
    }
}

fn default_backend() -> String {
    "json".to_string()
}
fn default_events_dir() -> PathBuf {
    PathBuf::from("./events")
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./data/deck-harvest.sqlite")
}

/// Load and validate the config file.
///
/// A missing file yields the defaults; a file that exists but does not
/// parse or validate is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let source = &config.source;

    require_placeholders("source.listing_url", &source.listing_url, &["{lookback}"])?;
    require_placeholders(
        "source.event_page_url",
        &source.event_page_url,
        &["{event_id}"],
    )?;
    require_placeholders(
        "source.deck_list_url",
        &source.deck_list_url,
        &["{event_id}", "{deck_number}"],
    )?;

    if source.lookback_days == 0 {
        anyhow::bail!("source.lookback_days must be >= 1");
    }
    if source.timeout_secs == 0 {
        anyhow::bail!("source.timeout_secs must be >= 1");
    }

    match config.storage.backend.as_str() {
        "json" | "sqlite" => {}
        other => anyhow::bail!(
            "Unknown storage backend: '{}'. Must be json or sqlite.",
            other
        ),
    }

    Ok(())
}

fn require_placeholders(key: &str, template: &str, placeholders: &[&str]) -> Result<()> {
    for placeholder in placeholders {
        if !template.contains(placeholder) {
            anyhow::bail!("{} must contain the {} placeholder", key, placeholder);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("deck-harvest.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.storage.backend, "json");
        assert_eq!(cfg.source.lookback_days, 1);
        assert!(cfg.source.deck_list_url.contains("{deck_number}"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            r#"
[storage]
backend = "sqlite"
db_path = "/tmp/x.sqlite"
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.storage.backend, "sqlite");
        assert_eq!(cfg.storage.db_path, PathBuf::from("/tmp/x.sqlite"));
        assert_eq!(cfg.source.timeout_secs, 30);
    }

    #[test]
    fn rejects_unknown_backend() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "[storage]\nbackend = \"postgres\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Unknown storage backend"));
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "[source]\ndeck_list_url = \"http://x/{event_id}\"\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("{deck_number}"));
    }

    #[test]
    fn rejects_zero_lookback() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "[source]\nlookback_days = 0\n");
        assert!(load_config(&path).is_err());
    }
}
