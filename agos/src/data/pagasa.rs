//! PAGASA Rainfall Forecast client (primary rainfall source)
//!
//! Queries the PAGASA/Rainfall_Forecast raster layer on the GeoRisk
//! portal via ArcGIS Identify. The raster pixel value is the official
//! forecast rainfall total in mm for the forward window.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::RainfallConfig;

use super::{RainfallSource, RainfallTotal, SourceError};

#[derive(Debug, Deserialize)]
struct IdentifyResponse {
    #[serde(default)]
    results: Vec<IdentifyResult>,
}

#[derive(Debug, Deserialize)]
struct IdentifyResult {
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

pub struct PagasaClient {
    url: String,
    http: Client,
}

impl PagasaClient {
    pub fn from_config(config: &RainfallConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            url: config.pagasa_url.clone(),
            http,
        })
    }
}

#[async_trait]
impl RainfallSource for PagasaClient {
    fn name(&self) -> &'static str {
        "pagasa"
    }

    async fn forecast(&self, lat: f64, lon: f64, _window_hours: u32) -> Result<RainfallTotal, SourceError> {
        debug!(lat, lon, "PagasaClient::forecast: called");

        // Identify needs a small mapExtent around the point
        let delta = 0.01;
        let extent = format!("{},{},{},{}", lon - delta, lat - delta, lon + delta, lat + delta);
        let geometry = format!(r#"{{"x":{lon},"y":{lat},"spatialReference":{{"wkid":4326}}}}"#);

        let response: IdentifyResponse = self
            .http
            .get(&self.url)
            .query(&[
                ("geometry", geometry.as_str()),
                ("geometryType", "esriGeometryPoint"),
                ("sr", "4326"),
                ("layers", "all"),
                ("tolerance", "5"),
                ("mapExtent", extent.as_str()),
                ("imageDisplay", "800,600,96"),
                ("returnGeometry", "false"),
                ("f", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first = response.results.into_iter().next().ok_or(SourceError::NoData)?;

        // The raster's "Classify.Pixel Value" attribute is rainfall in mm;
        // it arrives as either a number or a numeric string
        let value = first
            .attributes
            .get("Classify.Pixel Value")
            .ok_or_else(|| SourceError::MalformedResponse("missing pixel value".to_string()))?;
        let millimeters = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| SourceError::MalformedResponse(format!("unusable pixel value: {value}")))?;

        debug!(lat, lon, millimeters, "PagasaClient::forecast: got pixel value");
        Ok(RainfallTotal {
            millimeters,
            detail: format!("PAGASA forecast: {millimeters:.0}mm"),
        })
    }
}
