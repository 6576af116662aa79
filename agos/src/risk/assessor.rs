//! Risk assessment over independently-failing sources
//!
//! Susceptibility, primary rainfall, and secondary rainfall are queried
//! concurrently, each under its own timeout. A failed or slow source
//! degrades that one input; the assessment itself always completes.
//! There are no retries: one timeout is terminal for that stage.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::data::{RainfallSource, RainfallTotal, SourceError, SusceptibilitySource};
use crate::geo::Location;

use super::engine::{classify_rainfall, compute_assessment};
use super::{RainfallProvider, RainfallReading, RiskAssessment, SusceptibilityRating};

/// Timeouts and windowing for one assessment.
#[derive(Debug, Clone)]
pub struct AssessorConfig {
    /// Per-source timeout; a slow source is abandoned, not retried
    pub source_timeout: Duration,
    /// Forward forecast window in hours
    pub window_hours: u32,
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(10),
            window_hours: 24,
        }
    }
}

/// Aggregates rainfall and susceptibility into a [`RiskAssessment`].
pub struct RiskAssessor {
    primary_rain: Arc<dyn RainfallSource>,
    secondary_rain: Option<Arc<dyn RainfallSource>>,
    susceptibility: Arc<dyn SusceptibilitySource>,
    config: AssessorConfig,
}

impl RiskAssessor {
    /// Wire the production sources from config.
    pub fn from_config(config: &crate::config::Config) -> eyre::Result<Self> {
        let primary = crate::data::PagasaClient::from_config(&config.rainfall)
            .map_err(|e| eyre::eyre!("failed to build PAGASA client: {e}"))?;
        let secondary = crate::data::OpenMeteoClient::from_config(&config.rainfall)
            .map_err(|e| eyre::eyre!("failed to build Open-Meteo client: {e}"))?;
        let susceptibility = crate::data::MgbClient::from_config(&config.susceptibility)
            .map_err(|e| eyre::eyre!("failed to build MGB client: {e}"))?;

        Ok(Self::new(
            Arc::new(primary),
            Some(Arc::new(secondary) as Arc<dyn RainfallSource>),
            Arc::new(susceptibility),
            AssessorConfig {
                source_timeout: Duration::from_millis(config.rainfall.timeout_ms),
                window_hours: config.rainfall.window_hours,
            },
        ))
    }

    pub fn new(
        primary_rain: Arc<dyn RainfallSource>,
        secondary_rain: Option<Arc<dyn RainfallSource>>,
        susceptibility: Arc<dyn SusceptibilitySource>,
        config: AssessorConfig,
    ) -> Self {
        Self {
            primary_rain,
            secondary_rain,
            susceptibility,
            config,
        }
    }

    /// Assess flood risk at a resolved location. Infallible: every
    /// source failure degrades to the corresponding default.
    pub async fn assess(&self, location: Location) -> RiskAssessment {
        debug!(name = %location.name, lat = location.lat, lon = location.lon, "RiskAssessor::assess: called");

        let (lat, lon) = (location.lat, location.lon);
        let window = self.config.window_hours;
        let deadline = self.config.source_timeout;

        let primary_fut = timeout(deadline, self.primary_rain.forecast(lat, lon, window));
        let secondary_fut = async {
            match &self.secondary_rain {
                Some(source) => Some(timeout(deadline, source.forecast(lat, lon, window)).await),
                None => None,
            }
        };
        let suscept_fut = timeout(deadline, self.susceptibility.lookup(lat, lon));

        let (primary, secondary, suscept) = tokio::join!(primary_fut, secondary_fut, suscept_fut);

        let primary = flatten(primary, self.primary_rain.name());
        let secondary = secondary.and_then(|r| {
            flatten(r, self.secondary_rain.as_ref().map(|s| s.name()).unwrap_or("secondary"))
        });

        let rainfall = self.resolve_rainfall(primary, secondary);

        let susceptibility = match flatten_suscept(suscept) {
            Some(tier) => SusceptibilityRating {
                tier,
                source: self.susceptibility.name().to_uppercase(),
                available: true,
            },
            None => {
                warn!("RiskAssessor::assess: susceptibility unavailable, defaulting to Low");
                SusceptibilityRating::unavailable()
            }
        };

        let assessment = compute_assessment(location, rainfall, susceptibility);
        info!(
            name = %assessment.location.name,
            tier = assessment.tier.label(),
            score = assessment.score,
            rain_available = assessment.rainfall.available,
            suscept_available = assessment.susceptibility.available,
            "RiskAssessor::assess: completed"
        );
        assessment
    }

    /// Prefer the primary (official) source; fall back to the secondary
    /// aggregated over the same window; mark unavailable when both fail.
    fn resolve_rainfall(&self, primary: Option<RainfallTotal>, secondary: Option<RainfallTotal>) -> RainfallReading {
        match (primary, secondary) {
            (Some(p), secondary) => {
                let mut detail = p.detail;
                if let Some(s) = secondary {
                    detail = format!("{detail} | {}", s.detail);
                }
                RainfallReading {
                    millimeters: p.millimeters,
                    classification: classify_rainfall(p.millimeters),
                    source: RainfallProvider::Pagasa,
                    available: true,
                    detail,
                }
            }
            (None, Some(s)) => RainfallReading {
                millimeters: s.millimeters,
                classification: classify_rainfall(s.millimeters),
                source: RainfallProvider::OpenMeteo,
                available: true,
                detail: s.detail,
            },
            (None, None) => RainfallReading::unavailable(),
        }
    }
}

fn flatten(
    result: Result<Result<RainfallTotal, SourceError>, tokio::time::error::Elapsed>,
    source: &str,
) -> Option<RainfallTotal> {
    match result {
        Ok(Ok(total)) => Some(total),
        Ok(Err(e)) => {
            warn!(%source, error = %e, "rainfall source failed");
            None
        }
        Err(_) => {
            warn!(%source, "rainfall source timed out");
            None
        }
    }
}

fn flatten_suscept(
    result: Result<Result<crate::risk::SusceptibilityTier, SourceError>, tokio::time::error::Elapsed>,
) -> Option<crate::risk::SusceptibilityTier> {
    match result {
        Ok(Ok(tier)) => Some(tier),
        Ok(Err(e)) => {
            warn!(error = %e, "susceptibility source failed");
            None
        }
        Err(_) => {
            warn!("susceptibility source timed out");
            None
        }
    }
}
