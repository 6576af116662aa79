//! Nominatim (OpenStreetMap) geocoder client
//!
//! Primary geocoder: free, no key, strict rate limits. Queries are
//! scoped to the Philippines via `countrycodes` and carry an explicit
//! User-Agent as Nominatim's usage policy requires.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::GeocodingConfig;

use super::{GeocodeError, GeocodeSource};

/// Nominatim returns lat/lon as strings.
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
}

pub struct NominatimClient {
    url: String,
    country_scope: String,
    user_agent: String,
    http: Client,
}

impl NominatimClient {
    pub fn from_config(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            url: config.nominatim_url.clone(),
            country_scope: config.country_scope.clone(),
            user_agent: config.user_agent.clone(),
            http,
        })
    }
}

#[async_trait]
impl GeocodeSource for NominatimClient {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, query: &str) -> Result<(f64, f64), GeocodeError> {
        debug!(%query, "NominatimClient::geocode: called");

        let results: Vec<NominatimResult> = self
            .http
            .get(&self.url)
            .header("User-Agent", &self.user_agent)
            .query(&[
                ("q", format!("{query}, Philippines")),
                ("format", "json".to_string()),
                ("limit", "1".to_string()),
                ("countrycodes", self.country_scope.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first = results.into_iter().next().ok_or(GeocodeError::NoResults)?;
        let lat: f64 = first
            .lat
            .parse()
            .map_err(|_| GeocodeError::MalformedResponse(format!("bad lat: {}", first.lat)))?;
        let lon: f64 = first
            .lon
            .parse()
            .map_err(|_| GeocodeError::MalformedResponse(format!("bad lon: {}", first.lon)))?;

        debug!(%query, lat, lon, "NominatimClient::geocode: hit");
        Ok((lat, lon))
    }
}
