//! Location resolution
//!
//! Turns free-form text into a coordinate through an ordered fallback
//! chain that never fails: local cache, primary geocoder (Nominatim),
//! secondary geocoder (OpenCage, key-gated), fuzzy match against cache
//! keys, hard-coded Manila default.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod cache;
mod fuzzy;
mod nominatim;
mod normalize;
mod opencage;
mod resolver;

pub use cache::LocationCache;
pub use fuzzy::{closest_match, similarity, FUZZY_CUTOFF};
pub use nominatim::NominatimClient;
pub use normalize::normalize_location;
pub use opencage::OpenCageClient;
pub use resolver::{LocationResolver, DEFAULT_LOCATION};

/// Which stage of the fallback chain produced a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    Cache,
    PrimaryGeocoder,
    SecondaryGeocoder,
    FuzzyFallback,
    HardDefault,
}

impl LocationSource {
    pub fn label(&self) -> &'static str {
        match self {
            LocationSource::Cache => "cache",
            LocationSource::PrimaryGeocoder => "nominatim",
            LocationSource::SecondaryGeocoder => "opencage",
            LocationSource::FuzzyFallback => "fuzzy-fallback",
            LocationSource::HardDefault => "hard-default",
        }
    }
}

/// A resolved coordinate with provenance. Immutable once constructed.
///
/// For fuzzy and default fallbacks `name` is the canonical matched name
/// (not the raw input), so callers can disclose what was actually used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub source: LocationSource,
    /// True whenever the match is not an exact cache/geocoder hit on the
    /// literal input; must propagate into user-facing text
    pub approximate: bool,
}

/// Errors from a single geocoding collaborator.
///
/// Every variant is absorbed by the resolver as "try the next stage";
/// nothing here reaches the end user as an error.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("no results for query")]
    NoResults,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("source not configured")]
    NotConfigured,
}

/// A single geocoding collaborator, scoped to the target country.
#[async_trait]
pub trait GeocodeSource: Send + Sync {
    /// Short label for logs and provenance.
    fn name(&self) -> &'static str;

    /// Geocode a normalized location string to (lat, lon).
    async fn geocode(&self, query: &str) -> Result<(f64, f64), GeocodeError>;
}
