//! Magic Online tournament results connector.
//!
//! Talks to the public results service over plain HTTP GETs:
//!
//! | Resource | Template key | Payload |
//! |----------|--------------|---------|
//! | Event listing | `source.listing_url` | JSON array of `{date, hyperlink, name}` |
//! | Results page | `source.event_page_url` | HTML with `<heading>` deck headers |
//! | Deck list | `source.deck_list_url` | `.dek` text, CRLF lines |
//!
//! # Configuration
//!
//! ```toml
//! [source]
//! listing_url = "https://www.wizards.com/handlers/XMLListService.ashx?dir=mtgo&type=XMLFileInfo&start={lookback}"
//! lookback_days = 1
//! timeout_secs = 30
//! ```
//!
//! No retries happen here. A timeout is reported exactly like any other
//! failed request.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::IngestError;
use crate::models::ListingEntry;
use crate::traits::{EventSource, Transport};

/// [`Transport`] backed by a `reqwest` client with a fixed timeout.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, IngestError> {
        debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IngestError::transport(url, format!("HTTP {}", status)));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| IngestError::transport(url, e))?;
        Ok(body.to_vec())
    }
}

/// [`EventSource`] that fills the configured URL templates and decodes
/// responses fetched through any [`Transport`].
pub struct WotcSource {
    transport: Box<dyn Transport>,
    config: SourceConfig,
}

impl WotcSource {
    pub fn new(transport: Box<dyn Transport>, config: SourceConfig) -> Self {
        Self { transport, config }
    }

    /// Live source over HTTP.
    pub fn http(config: SourceConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(Box::new(transport), config))
    }

    pub fn listing_url(&self, lookback: u32) -> String {
        self.config
            .listing_url
            .replace("{lookback}", &lookback.to_string())
    }

    pub fn event_page_url(&self, event_id: &str) -> String {
        self.config.event_page_url.replace("{event_id}", event_id)
    }

    pub fn deck_list_url(&self, event_id: &str, deck_number: usize) -> String {
        self.config
            .deck_list_url
            .replace("{event_id}", event_id)
            .replace("{deck_number}", &deck_number.to_string())
    }
}

#[async_trait]
impl EventSource for WotcSource {
    async fn fetch_listing(&self, lookback: u32) -> Result<Vec<ListingEntry>, IngestError> {
        let body = self.transport.fetch_bytes(&self.listing_url(lookback)).await?;
        decode_listing(&body)
    }

    async fn fetch_event_page(&self, event_id: &str) -> Result<String, IngestError> {
        let body = self
            .transport
            .fetch_bytes(&self.event_page_url(event_id))
            .await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn fetch_deck_list(
        &self,
        event_id: &str,
        deck_number: usize,
    ) -> Result<String, IngestError> {
        let body = self
            .transport
            .fetch_bytes(&self.deck_list_url(event_id, deck_number))
            .await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Decode a listing payload. Invalid UTF-8, invalid JSON, and records
/// missing a field are all [`IngestError::Decode`].
pub fn decode_listing(body: &[u8]) -> Result<Vec<ListingEntry>, IngestError> {
    serde_json::from_slice(body).map_err(|e| IngestError::Decode(e.to_string()))
}
