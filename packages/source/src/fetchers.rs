//! HTTP-backed [`IncidentFetcher`] implementations for the two ingestion
//! paths.
//!
//! Both fetchers share the same transport posture: explicit request and
//! connect timeouts, retry with backoff via [`crate::retry`], and a
//! timeout surfaced as an [`IngestionError::Fetch`] rather than a panic
//! or hang.

use std::time::Duration;

use async_trait::async_trait;
use crime_track_models::CrimeIncident;

use crate::bulletin::BulletinParser;
use crate::{IncidentFetcher, IngestionError, feed, retry};

/// Per-request timeout for source fetches.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout for source fetches.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the shared HTTP client for source fetches.
fn build_client() -> Result<reqwest::Client, IngestionError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(IngestionError::Fetch)
}

/// Fetches the geo-tagged open-data point feed and parses it as a
/// FeatureCollection document.
#[derive(Debug)]
pub struct StructuredFeedFetcher {
    url: String,
}

impl StructuredFeedFetcher {
    /// Creates a fetcher for the feed document at `url`.
    #[must_use]
    pub const fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl IncidentFetcher for StructuredFeedFetcher {
    fn id(&self) -> &str {
        "structured_feed"
    }

    fn name(&self) -> &str {
        "Structured open-data feed"
    }

    async fn fetch(&self) -> Result<String, IngestionError> {
        let client = build_client()?;
        log::info!("{}: fetching {}", self.name(), self.url);
        retry::send_text(|| client.get(&self.url)).await
    }

    fn parse(&self, raw: &str) -> Result<Vec<CrimeIncident>, IngestionError> {
        feed::parse_feed(raw)
    }
}

/// Fetches already-extracted bulletin text from the text-extraction
/// service and parses it line-by-line.
#[derive(Debug)]
pub struct BulletinFetcher {
    url: String,
    parser: BulletinParser,
}

impl BulletinFetcher {
    /// Creates a fetcher for the extracted bulletin text at `url`, using
    /// the default whitespace-column strategy.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self::with_parser(url, BulletinParser::default())
    }

    /// Creates a fetcher with a custom line strategy.
    #[must_use]
    pub const fn with_parser(url: String, parser: BulletinParser) -> Self {
        Self { url, parser }
    }
}

#[async_trait]
impl IncidentFetcher for BulletinFetcher {
    fn id(&self) -> &str {
        "bulletin"
    }

    fn name(&self) -> &str {
        "Crime bulletin"
    }

    async fn fetch(&self) -> Result<String, IngestionError> {
        let client = build_client()?;
        log::info!("{}: fetching {}", self.name(), self.url);
        retry::send_text(|| client.get(&self.url)).await
    }

    fn parse(&self, raw: &str) -> Result<Vec<CrimeIncident>, IngestionError> {
        Ok(self.parser.parse(raw))
    }
}
