//! Pure scoring logic
//!
//! Rainfall classification thresholds (mm over the forward window):
//!   < 40 Light, 40-80 Moderate, 80-120 Heavy, 120+ Intense
//!
//! Score thresholds:
//!   0 SAFE, 1-3 WATCH, 4-6 WARNING, 7+ CRITICAL
//!
//! Safety bias: when rainfall data is entirely unavailable, High and
//! VeryHigh susceptibility areas get a minimum rain trigger of 1 so they
//! cannot silently score SAFE on missing data. When rainfall data exists
//! and genuinely reads zero, the multiplicative SAFE result stands even
//! for VeryHigh susceptibility.

use chrono::Utc;
use tracing::debug;

use crate::geo::Location;

use super::{RainClass, RainfallReading, RiskAssessment, RiskTier, SusceptibilityRating, SusceptibilityTier};

/// Minimum trigger substituted by the safety-bias rule.
pub const MIN_BIAS_TRIGGER: u8 = 1;

/// Classify a rainfall total (mm over the forward window).
pub fn classify_rainfall(mm: f64) -> RainClass {
    if mm < 40.0 {
        RainClass::Light
    } else if mm < 80.0 {
        RainClass::Moderate
    } else if mm < 120.0 {
        RainClass::Heavy
    } else {
        RainClass::Intense
    }
}

/// Map a score (0..=12) to its risk tier.
pub fn tier_for_score(score: u8) -> RiskTier {
    match score {
        0 => RiskTier::Safe,
        1..=3 => RiskTier::Watch,
        4..=6 => RiskTier::Warning,
        _ => RiskTier::Critical,
    }
}

/// Combine resolved inputs into a final assessment.
///
/// Applies the safety-bias rule before scoring: missing rainfall data in
/// a High/VeryHigh susceptibility zone substitutes a trigger of
/// [`MIN_BIAS_TRIGGER`] instead of 0.
pub fn compute_assessment(
    location: Location,
    rainfall: RainfallReading,
    susceptibility: SusceptibilityRating,
) -> RiskAssessment {
    let raw_trigger = if rainfall.available {
        rainfall.classification.trigger()
    } else {
        0
    };

    let rain_trigger = if !rainfall.available && susceptibility.tier >= SusceptibilityTier::High {
        raw_trigger.max(MIN_BIAS_TRIGGER)
    } else {
        raw_trigger
    };

    let score = susceptibility.tier.value() * rain_trigger;
    let tier = tier_for_score(score);

    debug!(
        location = %location.name,
        susceptibility = susceptibility.tier.value(),
        rain_trigger,
        score,
        tier = tier.label(),
        "compute_assessment: scored"
    );

    RiskAssessment {
        location,
        rainfall,
        susceptibility,
        rain_trigger,
        score,
        tier,
        computed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Location, LocationSource};
    use crate::risk::RainfallProvider;

    fn loc() -> Location {
        Location {
            name: "marikina".to_string(),
            lat: 14.6507,
            lon: 121.1029,
            source: LocationSource::Cache,
            approximate: false,
        }
    }

    fn rain(mm: f64) -> RainfallReading {
        RainfallReading {
            millimeters: mm,
            classification: classify_rainfall(mm),
            source: RainfallProvider::Pagasa,
            available: true,
            detail: format!("PAGASA forecast: {mm:.0}mm"),
        }
    }

    fn suscept(tier: SusceptibilityTier) -> SusceptibilityRating {
        SusceptibilityRating {
            tier,
            source: "MGB".to_string(),
            available: true,
        }
    }

    #[test]
    fn rainfall_class_boundaries() {
        assert_eq!(classify_rainfall(0.0), RainClass::Light);
        assert_eq!(classify_rainfall(39.9), RainClass::Light);
        assert_eq!(classify_rainfall(40.0), RainClass::Moderate);
        assert_eq!(classify_rainfall(79.9), RainClass::Moderate);
        assert_eq!(classify_rainfall(80.0), RainClass::Heavy);
        assert_eq!(classify_rainfall(119.9), RainClass::Heavy);
        assert_eq!(classify_rainfall(120.0), RainClass::Intense);
        assert_eq!(classify_rainfall(500.0), RainClass::Intense);
    }

    #[test]
    fn tier_boundaries_are_exact() {
        assert_eq!(tier_for_score(0), RiskTier::Safe);
        assert_eq!(tier_for_score(1), RiskTier::Watch);
        assert_eq!(tier_for_score(3), RiskTier::Watch);
        assert_eq!(tier_for_score(4), RiskTier::Warning);
        assert_eq!(tier_for_score(6), RiskTier::Warning);
        assert_eq!(tier_for_score(7), RiskTier::Critical);
        assert_eq!(tier_for_score(12), RiskTier::Critical);
    }

    #[test]
    fn marikina_scenario_scores_warning() {
        // 45mm Moderate (trigger 1) x VeryHigh (4) = 4 -> WARNING
        let a = compute_assessment(loc(), rain(45.0), suscept(SusceptibilityTier::VeryHigh));
        assert_eq!(a.rain_trigger, 1);
        assert_eq!(a.score, 4);
        assert_eq!(a.tier, RiskTier::Warning);
    }

    #[test]
    fn cebu_scenario_scores_watch() {
        // 59mm Moderate (trigger 1) x Low (1) = 1 -> WATCH
        let a = compute_assessment(loc(), rain(59.0), suscept(SusceptibilityTier::Low));
        assert_eq!(a.score, 1);
        assert_eq!(a.tier, RiskTier::Watch);
    }

    #[test]
    fn missing_rainfall_biases_high_susceptibility_off_safe() {
        let a = compute_assessment(
            loc(),
            RainfallReading::unavailable(),
            suscept(SusceptibilityTier::VeryHigh),
        );
        assert_eq!(a.rain_trigger, MIN_BIAS_TRIGGER);
        assert_eq!(a.score, 4);
        assert_ne!(a.tier, RiskTier::Safe);

        let a = compute_assessment(
            loc(),
            RainfallReading::unavailable(),
            suscept(SusceptibilityTier::High),
        );
        assert_eq!(a.score, 3);
        assert_eq!(a.tier, RiskTier::Watch);
    }

    #[test]
    fn missing_rainfall_leaves_low_susceptibility_safe() {
        let a = compute_assessment(
            loc(),
            RainfallReading::unavailable(),
            suscept(SusceptibilityTier::Medium),
        );
        assert_eq!(a.rain_trigger, 0);
        assert_eq!(a.tier, RiskTier::Safe);
    }

    #[test]
    fn real_zero_rain_stays_safe_even_for_very_high() {
        // Deliberate narrow reading of the bias rule: genuine zero-rain
        // data multiplies out to SAFE regardless of susceptibility.
        let a = compute_assessment(loc(), rain(0.0), suscept(SusceptibilityTier::VeryHigh));
        assert_eq!(a.rain_trigger, 0);
        assert_eq!(a.score, 0);
        assert_eq!(a.tier, RiskTier::Safe);
    }

    #[test]
    fn unavailable_susceptibility_defaults_low_and_flags() {
        let s = SusceptibilityRating::unavailable();
        assert_eq!(s.tier, SusceptibilityTier::Low);
        assert!(!s.available);
        // Low + no rain data: no bias, SAFE with disclosure handled by
        // the formatter
        let a = compute_assessment(loc(), RainfallReading::unavailable(), s);
        assert_eq!(a.tier, RiskTier::Safe);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn score_monotone_in_trigger(mm_lo in 0.0f64..300.0, mm_hi in 0.0f64..300.0) {
                let (lo, hi) = if mm_lo <= mm_hi { (mm_lo, mm_hi) } else { (mm_hi, mm_lo) };
                let a = compute_assessment(loc(), rain(lo), suscept(SusceptibilityTier::High));
                let b = compute_assessment(loc(), rain(hi), suscept(SusceptibilityTier::High));
                prop_assert!(a.score <= b.score);
                prop_assert!(a.tier <= b.tier);
            }

            #[test]
            fn score_monotone_in_susceptibility(mm in 0.0f64..300.0) {
                let tiers = [
                    SusceptibilityTier::Low,
                    SusceptibilityTier::Medium,
                    SusceptibilityTier::High,
                    SusceptibilityTier::VeryHigh,
                ];
                let mut prev = 0u8;
                for t in tiers {
                    let a = compute_assessment(loc(), rain(mm), suscept(t));
                    prop_assert!(a.score >= prev);
                    prev = a.score;
                }
            }

            #[test]
            fn score_stays_in_range(mm in 0.0f64..2000.0, tier_ix in 0usize..4) {
                let tiers = [
                    SusceptibilityTier::Low,
                    SusceptibilityTier::Medium,
                    SusceptibilityTier::High,
                    SusceptibilityTier::VeryHigh,
                ];
                let a = compute_assessment(loc(), rain(mm), suscept(tiers[tier_ix]));
                prop_assert!(a.score <= 12);
                prop_assert_eq!(a.score, tiers[tier_ix].value() * a.rain_trigger);
            }
        }
    }
}
