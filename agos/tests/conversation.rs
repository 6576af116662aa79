//! End-to-end conversation tests
//!
//! Wires the full pipeline (resolver, assessor, router, formatter) over
//! in-process fake collaborators and walks the SMS conversation the way
//! a sender would.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use agos::geo::{GeocodeError, GeocodeSource, LocationCache, LocationResolver, LocationSource};
use agos::risk::{AssessorConfig, RiskAssessor, SusceptibilityTier};
use agos::router::ConversationRouter;
use agos::{MessagingGateway, RainfallSource, RainfallTotal, SourceError, SusceptibilitySource};

struct FakeGeocoder {
    coords: Option<(f64, f64)>,
}

#[async_trait]
impl GeocodeSource for FakeGeocoder {
    fn name(&self) -> &'static str {
        "fake-geocoder"
    }

    async fn geocode(&self, _query: &str) -> Result<(f64, f64), GeocodeError> {
        self.coords.ok_or(GeocodeError::NoResults)
    }
}

struct FakeRainfall {
    millimeters: Option<f64>,
}

#[async_trait]
impl RainfallSource for FakeRainfall {
    fn name(&self) -> &'static str {
        "pagasa"
    }

    async fn forecast(&self, _lat: f64, _lon: f64, _window_hours: u32) -> Result<RainfallTotal, SourceError> {
        match self.millimeters {
            Some(mm) => Ok(RainfallTotal {
                millimeters: mm,
                detail: format!("PAGASA forecast: {mm:.0}mm"),
            }),
            None => Err(SourceError::NoData),
        }
    }
}

struct FakeSusceptibility {
    tier: Option<SusceptibilityTier>,
}

#[async_trait]
impl SusceptibilitySource for FakeSusceptibility {
    fn name(&self) -> &'static str {
        "mgb"
    }

    async fn lookup(&self, _lat: f64, _lon: f64) -> Result<SusceptibilityTier, SourceError> {
        self.tier.ok_or(SourceError::NoData)
    }
}

fn build_router(
    dir: &TempDir,
    coords: Option<(f64, f64)>,
    rain_mm: Option<f64>,
    suscept: Option<SusceptibilityTier>,
) -> ConversationRouter {
    let cache = Arc::new(LocationCache::open(dir.path().join("cache.json")));
    let resolver = LocationResolver::new(cache, Duration::from_millis(200)).with_source(
        Arc::new(FakeGeocoder { coords }),
        LocationSource::PrimaryGeocoder,
        Duration::ZERO,
    );
    let assessor = RiskAssessor::new(
        Arc::new(FakeRainfall { millimeters: rain_mm }),
        None,
        Arc::new(FakeSusceptibility { tier: suscept }),
        AssessorConfig {
            source_timeout: Duration::from_millis(100),
            window_hours: 24,
        },
    );
    ConversationRouter::new(Arc::new(resolver), Arc::new(assessor))
}

#[tokio::test]
async fn full_marikina_conversation() {
    let dir = TempDir::new().unwrap();
    let router = build_router(
        &dir,
        Some((14.6507, 121.1029)),
        Some(45.0),
        Some(SusceptibilityTier::VeryHigh),
    );

    // Location text: initial WARNING view with numbered actions
    let initial = router.handle_message("+639171234567", "Marikina").await;
    assert!(initial.contains("FLOOD WARNING | MARIKINA"));
    assert!(initial.contains("Rain: Moderate (45mm) [PAGASA]"));
    assert!(initial.contains("DO NOW:"));
    assert!(initial.contains("1. "));

    // WHY: score arithmetic with both source attributions
    let why = router.handle_message("+639171234567", "why").await;
    assert!(why.contains("Risk score: 4 x 1 = 4"));
    assert!(why.contains("PAGASA"));
    assert!(why.contains("MGB"));

    // Checklists follow the stored tier
    let prep = router.handle_message("+639171234567", "2").await;
    assert!(prep.contains("HOME PREP | MARIKINA (WARNING)"));
    let travel = router.handle_message("+639171234567", "travel").await;
    assert!(travel.contains("TRAVEL | MARIKINA (WARNING)"));
    let farm = router.handle_message("+639171234567", "4").await;
    assert!(farm.contains("FARMER | MARIKINA (WARNING)"));

    // Stop, then a location re-opts-in
    let stop = router.handle_message("+639171234567", "STOP").await;
    assert!(stop.contains("unsubscribed"));
    let back = router.handle_message("+639171234567", "Marikina").await;
    assert!(back.contains("FLOOD WARNING | MARIKINA"));
}

#[tokio::test]
async fn every_source_down_still_answers() {
    let dir = TempDir::new().unwrap();
    // Geocoders dead, rainfall dead, susceptibility dead: the sender
    // still gets a coherent, disclosed reply
    let router = build_router(&dir, None, None, None);

    let reply = router.handle_message("+63918", "Somewhere Unheard Of").await;
    assert!(reply.contains("| MANILA"));
    assert!(reply.contains("Closest match shown: manila"));
    assert!(reply.contains("Rain forecast: Unavailable"));
    assert!(reply.contains("Susceptibility: Unknown (assumed Low)"));
    assert!(reply.contains("FLOOD SAFE"));
}

#[tokio::test]
async fn gateway_seam_produces_twiml() {
    let dir = TempDir::new().unwrap();
    let router = build_router(&dir, Some((10.3157, 123.8854)), Some(59.0), Some(SusceptibilityTier::Low));

    let gateway: &dyn MessagingGateway = &router;
    let reply = gateway.reply_to("+63919", "Cebu City").await;
    assert!(reply.contains("FLOOD WATCH | CEBU"));
    assert!(reply.contains("Stay alert."));

    let xml = agos::to_twiml(&reply);
    assert!(xml.contains("<Response><Message>"));
    assert!(xml.ends_with("</Message></Response>"));
}
