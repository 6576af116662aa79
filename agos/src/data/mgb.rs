//! MGB flood-susceptibility client
//!
//! Point-in-polygon query against the MGB Detailed Flood Susceptibility
//! FeatureServer (the dataset behind HazardHunterPH). The response names
//! the zone the coordinate falls in: VHF / HF / MF / LF.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::SusceptibilityConfig;
use crate::risk::SusceptibilityTier;

use super::{SourceError, SusceptibilitySource};

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    attributes: FeatureAttributes,
}

#[derive(Debug, Deserialize)]
struct FeatureAttributes {
    #[serde(rename = "FloodSusc")]
    flood_susc: Option<String>,
}

fn tier_for_code(code: &str) -> Option<SusceptibilityTier> {
    match code {
        "VHF" => Some(SusceptibilityTier::VeryHigh),
        "HF" => Some(SusceptibilityTier::High),
        "MF" => Some(SusceptibilityTier::Medium),
        "LF" => Some(SusceptibilityTier::Low),
        _ => None,
    }
}

pub struct MgbClient {
    url: String,
    http: Client,
}

impl MgbClient {
    pub fn from_config(config: &SusceptibilityConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            url: config.mgb_url.clone(),
            http,
        })
    }
}

#[async_trait]
impl SusceptibilitySource for MgbClient {
    fn name(&self) -> &'static str {
        "mgb"
    }

    async fn lookup(&self, lat: f64, lon: f64) -> Result<SusceptibilityTier, SourceError> {
        debug!(lat, lon, "MgbClient::lookup: called");

        let geometry = format!(r#"{{"x":{lon},"y":{lat},"spatialReference":{{"wkid":4326}}}}"#);

        let response: QueryResponse = self
            .http
            .get(&self.url)
            .query(&[
                ("geometry", geometry.as_str()),
                ("geometryType", "esriGeometryPoint"),
                ("inSR", "4326"),
                ("spatialRel", "esriSpatialRelIntersects"),
                ("outFields", "FloodSusc"),
                ("returnGeometry", "false"),
                ("f", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let feature = response.features.into_iter().next().ok_or(SourceError::NoData)?;
        let code = feature.attributes.flood_susc.ok_or(SourceError::NoData)?;
        let tier =
            tier_for_code(&code).ok_or_else(|| SourceError::MalformedResponse(format!("unknown FloodSusc: {code}")))?;

        debug!(lat, lon, %code, tier = tier.label(), "MgbClient::lookup: zone found");
        Ok(tier)
    }
}
