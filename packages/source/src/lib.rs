#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime incident ingestion sources and normalization logic.
//!
//! Two ingestion paths converge on the canonical
//! [`CrimeIncident`](crime_track_models::CrimeIncident) shape:
//!
//! - [`feed`] parses the geo-tagged open-data point feed (a
//!   FeatureCollection document).
//! - [`bulletin`] parses loosely-columnar text recovered from a
//!   periodically published bulletin, line-by-line and fault-isolated.
//!
//! [`parsing`] holds the pure date/time normalizers shared by both, and
//! [`fetchers`] the HTTP implementations of the [`IncidentFetcher`] trait.

pub mod bulletin;
pub mod feed;
pub mod fetchers;
pub mod parsing;
pub mod retry;

use async_trait::async_trait;
use crime_track_models::CrimeIncident;

/// Errors surfaced by an ingestion pass.
///
/// Per-feature and per-line anomalies are absorbed locally (placeholders or
/// silent skip) and never become errors; only transport failures and a
/// structurally broken feed document reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    /// Network/transport failure, including timeouts.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The server answered with a non-retryable HTTP status.
    #[error("HTTP {status}")]
    Status {
        /// The offending status code.
        status: reqwest::StatusCode,
    },

    /// The structured feed's top-level shape is not a valid
    /// FeatureCollection. No partial emission occurs.
    #[error("structured feed is not a valid FeatureCollection: {message}")]
    StructuralParse {
        /// Description of what went wrong.
        message: String,
    },
}

/// Trait that both ingestion paths implement.
///
/// Each fetcher knows how to retrieve its raw payload (a JSON document or
/// already-extracted bulletin text) and how to parse that payload into
/// canonical incidents.
#[async_trait]
pub trait IncidentFetcher: Send + Sync {
    /// Unique identifier for this source (e.g. `"structured_feed"`).
    fn id(&self) -> &str;

    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Retrieves the raw payload from the source.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Fetch`] on network failure or timeout,
    /// [`IngestionError::Status`] on a non-retryable HTTP status.
    async fn fetch(&self) -> Result<String, IngestionError>;

    /// Parses a raw payload into canonical incidents.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::StructuralParse`] when the payload's
    /// top-level shape is broken. Best-effort parsers (the bulletin path)
    /// never error; malformed lines are skipped.
    fn parse(&self, raw: &str) -> Result<Vec<CrimeIncident>, IngestionError>;
}
