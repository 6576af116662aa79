//! External data-source collaborators
//!
//! Rainfall (PAGASA primary, Open-Meteo secondary) and flood
//! susceptibility (MGB). Each source fails independently; failures are
//! degraded by the assessor, never propagated to the end user.

use async_trait::async_trait;
use thiserror::Error;

use crate::risk::SusceptibilityTier;

mod mgb;
mod openmeteo;
mod pagasa;

pub use mgb::MgbClient;
pub use openmeteo::OpenMeteoClient;
pub use pagasa::PagasaClient;

/// Errors from a single data collaborator. Local to that input:
/// one failing source never aborts the whole assessment.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("no data at coordinate")]
    NoData,

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// A rainfall forecast: total millimeters over the forward window.
#[derive(Debug, Clone)]
pub struct RainfallTotal {
    pub millimeters: f64,
    /// Extra provenance appended to the WHY detail line
    pub detail: String,
}

/// A rainfall forecast collaborator.
#[async_trait]
pub trait RainfallSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Forecast rainfall total at (lat, lon) over `window_hours`.
    async fn forecast(&self, lat: f64, lon: f64, window_hours: u32) -> Result<RainfallTotal, SourceError>;
}

/// A flood-susceptibility lookup collaborator (point-in-polygon query).
#[async_trait]
pub trait SusceptibilitySource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, lat: f64, lon: f64) -> Result<SusceptibilityTier, SourceError>;
}
