//! OpenCage geocoder client
//!
//! Secondary geocoder; needs an API key (free tier). Skipped entirely by
//! the resolver when the key env var is unset.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::GeocodingConfig;

use super::{GeocodeError, GeocodeSource};

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: OpenCageGeometry,
}

#[derive(Debug, Deserialize)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}

pub struct OpenCageClient {
    url: String,
    country_scope: String,
    api_key: String,
    http: Client,
}

impl OpenCageClient {
    /// Build from config; fails with `NotConfigured` when the API key
    /// env var is unset, letting the resolver skip this tier.
    pub fn from_config(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let api_key = std::env::var(&config.opencage_api_key_env).map_err(|_| GeocodeError::NotConfigured)?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            url: config.opencage_url.clone(),
            country_scope: config.country_scope.clone(),
            api_key,
            http,
        })
    }
}

#[async_trait]
impl GeocodeSource for OpenCageClient {
    fn name(&self) -> &'static str {
        "opencage"
    }

    async fn geocode(&self, query: &str) -> Result<(f64, f64), GeocodeError> {
        debug!(%query, "OpenCageClient::geocode: called");

        let response: OpenCageResponse = self
            .http
            .get(&self.url)
            .query(&[
                ("q", format!("{query}, Philippines")),
                ("key", self.api_key.clone()),
                ("limit", "1".to_string()),
                ("countrycode", self.country_scope.clone()),
                ("no_annotations", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first = response.results.into_iter().next().ok_or(GeocodeError::NoResults)?;
        debug!(%query, lat = first.geometry.lat, lon = first.geometry.lng, "OpenCageClient::geocode: hit");
        Ok((first.geometry.lat, first.geometry.lng))
    }
}
