//! Risk domain types
//!
//! The assessment produced here is an auditable heuristic, not a
//! hydrological model: susceptibility tier (1-4) times rain trigger (0-3)
//! mapped through fixed thresholds to a four-level risk tier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Location;

mod assessor;
mod engine;

pub use assessor::{AssessorConfig, RiskAssessor};
pub use engine::{classify_rainfall, compute_assessment, tier_for_score, MIN_BIAS_TRIGGER};

/// Rainfall classification over the forward forecast window.
///
/// Ordinal value doubles as the rain trigger in the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RainClass {
    Light,
    Moderate,
    Heavy,
    Intense,
}

impl RainClass {
    /// Rain trigger value (0-3) used in the score arithmetic.
    pub fn trigger(&self) -> u8 {
        match self {
            RainClass::Light => 0,
            RainClass::Moderate => 1,
            RainClass::Heavy => 2,
            RainClass::Intense => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RainClass::Light => "Light",
            RainClass::Moderate => "Moderate",
            RainClass::Heavy => "Heavy",
            RainClass::Intense => "Intense",
        }
    }
}

/// Which collaborator produced the rainfall figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RainfallProvider {
    /// PAGASA Rainfall Forecast raster (primary, official PH source)
    Pagasa,
    /// Open-Meteo hourly forecast (secondary, finer granularity)
    OpenMeteo,
    /// Both sources failed
    None,
}

impl RainfallProvider {
    pub fn label(&self) -> &'static str {
        match self {
            RainfallProvider::Pagasa => "PAGASA",
            RainfallProvider::OpenMeteo => "Open-Meteo",
            RainfallProvider::None => "N/A",
        }
    }
}

/// Aggregated rainfall over the forward window, with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainfallReading {
    /// Forecast total in millimeters (non-negative)
    pub millimeters: f64,
    pub classification: RainClass,
    pub source: RainfallProvider,
    /// False when both rainfall collaborators failed
    pub available: bool,
    /// Human-readable provenance line for the WHY view
    pub detail: String,
}

impl RainfallReading {
    /// Reading used when every rainfall source failed.
    pub fn unavailable() -> Self {
        Self {
            millimeters: 0.0,
            classification: RainClass::Light,
            source: RainfallProvider::None,
            available: false,
            detail: "No forecast data available".to_string(),
        }
    }
}

/// Intrinsic flood-prone classification of a location, independent of
/// current weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SusceptibilityTier {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl SusceptibilityTier {
    /// Ordinal 1-4 used in the score arithmetic.
    pub fn value(&self) -> u8 {
        match self {
            SusceptibilityTier::Low => 1,
            SusceptibilityTier::Medium => 2,
            SusceptibilityTier::High => 3,
            SusceptibilityTier::VeryHigh => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SusceptibilityTier::Low => "Low",
            SusceptibilityTier::Medium => "Moderate",
            SusceptibilityTier::High => "High",
            SusceptibilityTier::VeryHigh => "Very High",
        }
    }
}

/// Flood susceptibility for a coordinate, with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SusceptibilityRating {
    pub tier: SusceptibilityTier,
    /// Source label, e.g. "MGB"
    pub source: String,
    /// False when the susceptibility collaborator failed; the tier is
    /// then the Low default and must be disclosed as unknown
    pub available: bool,
}

impl SusceptibilityRating {
    /// Rating used when the susceptibility source failed: lowest tier,
    /// flagged so the formatter discloses "susceptibility unknown"
    /// instead of asserting low risk with full confidence.
    pub fn unavailable() -> Self {
        Self {
            tier: SusceptibilityTier::Low,
            source: "default".to_string(),
            available: false,
        }
    }
}

/// Final risk tier, derived from the score through fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Safe,
    Watch,
    Warning,
    Critical,
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Safe => "SAFE",
            RiskTier::Watch => "WATCH",
            RiskTier::Warning => "WARNING",
            RiskTier::Critical => "CRITICAL",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskTier::Safe => "No immediate flood risk.",
            RiskTier::Watch => "Low flood risk. Stay alert for updates.",
            RiskTier::Warning => "Moderate flood risk. Prepare to act.",
            RiskTier::Critical => "High flood risk. Act immediately.",
        }
    }
}

/// One complete flood-risk assessment for a resolved location.
///
/// Immutable once produced; a new location input produces a new
/// assessment that replaces the old one in the sender's session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub location: Location,
    pub rainfall: RainfallReading,
    pub susceptibility: SusceptibilityRating,
    /// Effective rain trigger after the safety-bias rule, so the WHY
    /// arithmetic is reproducible from the stored assessment
    pub rain_trigger: u8,
    /// susceptibility tier x rain trigger, in 0..=12
    pub score: u8,
    pub tier: RiskTier,
    pub computed_at: DateTime<Utc>,
}
