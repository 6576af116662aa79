//! The ordered fallback chain
//!
//! cache -> primary geocoder -> secondary geocoder -> fuzzy match ->
//! hard default. Every stage is time-bounded; any stage failure means
//! "try the next stage". `resolve` is infallible by construction.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

use super::{closest_match, normalize_location, GeocodeSource, Location, LocationCache, LocationSource};

/// Manila, the absolute last-resort coordinate.
pub const DEFAULT_LOCATION: (&str, f64, f64) = ("manila", 14.5995, 120.9842);

/// Enforces a minimum interval between requests to one collaborator.
struct RateGate {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateGate {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

struct GeocodeTier {
    source: Arc<dyn GeocodeSource>,
    kind: LocationSource,
    gate: RateGate,
}

/// Never-fails location resolution over an ordered list of geocoders
/// plus a durable cache.
pub struct LocationResolver {
    cache: Arc<LocationCache>,
    tiers: Vec<GeocodeTier>,
    remote_timeout: Duration,
}

impl LocationResolver {
    /// Wire the production chain from config: durable cache, Nominatim,
    /// and OpenCage when its API key env var is set.
    pub fn from_config(config: &crate::config::Config) -> eyre::Result<Self> {
        let cache = Arc::new(LocationCache::open(config.cache.resolved_path()));
        let geocoding = &config.geocoding;

        let nominatim = super::NominatimClient::from_config(geocoding)
            .map_err(|e| eyre::eyre!("failed to build Nominatim client: {e}"))?;
        let mut resolver = Self::new(cache, geocoding.timeout()).with_source(
            Arc::new(nominatim),
            LocationSource::PrimaryGeocoder,
            Duration::from_millis(geocoding.nominatim_min_interval_ms),
        );

        match super::OpenCageClient::from_config(geocoding) {
            Ok(opencage) => {
                resolver = resolver.with_source(
                    Arc::new(opencage),
                    LocationSource::SecondaryGeocoder,
                    Duration::from_millis(geocoding.opencage_min_interval_ms),
                );
            }
            Err(e) => {
                debug!(error = %e, "LocationResolver::from_config: skipping OpenCage tier");
            }
        }

        Ok(resolver)
    }

    pub fn new(cache: Arc<LocationCache>, remote_timeout: Duration) -> Self {
        Self {
            cache,
            tiers: Vec::new(),
            remote_timeout,
        }
    }

    /// Append a geocoding tier; earlier tiers are tried first.
    pub fn with_source(
        mut self,
        source: Arc<dyn GeocodeSource>,
        kind: LocationSource,
        min_interval: Duration,
    ) -> Self {
        self.tiers.push(GeocodeTier {
            source,
            kind,
            gate: RateGate::new(min_interval),
        });
        self
    }

    /// Resolve free-form text to a coordinate. Never fails.
    pub async fn resolve(&self, raw: &str) -> Location {
        let name = normalize_location(raw);
        debug!(%raw, %name, "LocationResolver::resolve: called");

        // Tier 0: exact cache hit
        if let Some(coords) = self.cache.get(&name).await {
            debug!(%name, "LocationResolver::resolve: cache hit");
            return Location {
                name,
                lat: coords.lat,
                lon: coords.lon,
                source: LocationSource::Cache,
                approximate: false,
            };
        }

        // Remote tiers, in priority order
        for tier in &self.tiers {
            tier.gate.wait().await;
            match timeout(self.remote_timeout, tier.source.geocode(&name)).await {
                Ok(Ok((lat, lon))) => {
                    debug!(source = tier.source.name(), %name, lat, lon, "LocationResolver::resolve: remote hit");
                    self.cache.put(&name, lat, lon).await;
                    return Location {
                        name,
                        lat,
                        lon,
                        source: tier.kind,
                        approximate: false,
                    };
                }
                Ok(Err(e)) => {
                    warn!(source = tier.source.name(), %name, error = %e, "LocationResolver::resolve: tier failed");
                }
                Err(_) => {
                    warn!(
                        source = tier.source.name(),
                        %name,
                        timeout_ms = self.remote_timeout.as_millis() as u64,
                        "LocationResolver::resolve: tier timed out"
                    );
                }
            }
        }

        // Fuzzy match against everything we have ever resolved
        let keys = self.cache.keys().await;
        if let Some(matched) = closest_match(&name, &keys) {
            if let Some(coords) = self.cache.get(matched).await {
                debug!(%name, %matched, "LocationResolver::resolve: fuzzy fallback");
                return Location {
                    name: matched.to_string(),
                    lat: coords.lat,
                    lon: coords.lon,
                    source: LocationSource::FuzzyFallback,
                    approximate: true,
                };
            }
        }

        // Hard default
        let (default_name, lat, lon) = DEFAULT_LOCATION;
        warn!(%name, "LocationResolver::resolve: all tiers exhausted, using default");
        Location {
            name: default_name.to_string(),
            lat,
            lon,
            source: LocationSource::HardDefault,
            approximate: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::mock::MockGeocoder;
    use tempfile::tempdir;

    fn cache_in(dir: &tempfile::TempDir) -> Arc<LocationCache> {
        Arc::new(LocationCache::open(dir.path().join("cache.json")))
    }

    fn resolver(cache: Arc<LocationCache>) -> LocationResolver {
        LocationResolver::new(cache, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_remote_tiers() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);
        cache.put("marikina", 14.6507, 121.1029).await;

        let primary = Arc::new(MockGeocoder::hit("nominatim", 0.0, 0.0));
        let resolver = resolver(Arc::clone(&cache)).with_source(
            Arc::clone(&primary) as Arc<dyn GeocodeSource>,
            LocationSource::PrimaryGeocoder,
            Duration::ZERO,
        );

        let loc = resolver.resolve("Marikina City").await;
        assert_eq!(loc.source, LocationSource::Cache);
        assert!(!loc.approximate);
        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn primary_hit_writes_back_to_cache() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);

        let primary = Arc::new(MockGeocoder::hit("nominatim", 10.3157, 123.8854));
        let resolver = resolver(Arc::clone(&cache)).with_source(
            Arc::clone(&primary) as Arc<dyn GeocodeSource>,
            LocationSource::PrimaryGeocoder,
            Duration::ZERO,
        );

        let loc = resolver.resolve("Cebu City").await;
        assert_eq!(loc.source, LocationSource::PrimaryGeocoder);
        assert_eq!(loc.name, "cebu");
        assert!(!loc.approximate);

        // Second resolve of the same literal text is a cache hit with
        // identical coordinates
        let again = resolver.resolve("Cebu City").await;
        assert_eq!(again.source, LocationSource::Cache);
        assert!(!again.approximate);
        assert_eq!(again.lat, loc.lat);
        assert_eq!(again.lon, loc.lon);
        assert_eq!(primary.call_count(), 1);
    }

    #[tokio::test]
    async fn failed_primary_falls_through_to_secondary() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);

        let primary = Arc::new(MockGeocoder::failing("nominatim"));
        let secondary = Arc::new(MockGeocoder::hit("opencage", 7.1907, 125.4553));
        let resolver = resolver(Arc::clone(&cache))
            .with_source(
                Arc::clone(&primary) as Arc<dyn GeocodeSource>,
                LocationSource::PrimaryGeocoder,
                Duration::ZERO,
            )
            .with_source(
                Arc::clone(&secondary) as Arc<dyn GeocodeSource>,
                LocationSource::SecondaryGeocoder,
                Duration::ZERO,
            );

        let loc = resolver.resolve("Davao").await;
        assert_eq!(loc.source, LocationSource::SecondaryGeocoder);
        assert!(!loc.approximate);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
    }

    #[tokio::test]
    async fn fuzzy_fallback_matches_cached_name() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);
        cache.put("marikina", 14.6507, 121.1029).await;

        let resolver = resolver(Arc::clone(&cache)).with_source(
            Arc::new(MockGeocoder::failing("nominatim")),
            LocationSource::PrimaryGeocoder,
            Duration::ZERO,
        );

        let loc = resolver.resolve("marikna").await;
        assert_eq!(loc.source, LocationSource::FuzzyFallback);
        assert!(loc.approximate);
        assert_eq!(loc.name, "marikina");
    }

    #[tokio::test]
    async fn exhausted_chain_returns_hard_default() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);

        let resolver = resolver(cache).with_source(
            Arc::new(MockGeocoder::failing("nominatim")),
            LocationSource::PrimaryGeocoder,
            Duration::ZERO,
        );

        let loc = resolver.resolve("xyzzy qwertyuiop").await;
        assert_eq!(loc.source, LocationSource::HardDefault);
        assert!(loc.approximate);
        assert_eq!(loc.name, "manila");
        assert!((loc.lat - 14.5995).abs() < 1e-9);
    }

    #[tokio::test]
    async fn resolver_with_no_sources_still_resolves() {
        let dir = tempdir().unwrap();
        let resolver = resolver(cache_in(&dir));

        let loc = resolver.resolve("").await;
        assert_eq!(loc.source, LocationSource::HardDefault);
        assert!(loc.approximate);
    }
}
