//! Open-Meteo hourly forecast client (secondary rainfall source)
//!
//! Free API, no key. Hourly precipitation values are summed over the
//! same forward window the primary source covers, so both sources
//! classify against the same thresholds.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::RainfallConfig;

use super::{RainfallSource, RainfallTotal, SourceError};

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

pub struct OpenMeteoClient {
    url: String,
    http: Client,
}

impl OpenMeteoClient {
    pub fn from_config(config: &RainfallConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            url: config.open_meteo_url.clone(),
            http,
        })
    }
}

#[async_trait]
impl RainfallSource for OpenMeteoClient {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    async fn forecast(&self, lat: f64, lon: f64, window_hours: u32) -> Result<RainfallTotal, SourceError> {
        debug!(lat, lon, window_hours, "OpenMeteoClient::forecast: called");

        let response: ForecastResponse = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("hourly", "precipitation".to_string()),
                ("forecast_hours", window_hours.to_string()),
                ("timezone", "Asia/Manila".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let hourly: Vec<f64> = response
            .hourly
            .precipitation
            .into_iter()
            .flatten()
            .take(window_hours as usize)
            .collect();
        if hourly.is_empty() {
            return Err(SourceError::NoData);
        }

        let total: f64 = hourly.iter().sum();
        let peak = hourly.iter().cloned().fold(0.0f64, f64::max);

        debug!(lat, lon, total, peak, "OpenMeteoClient::forecast: aggregated");
        Ok(RainfallTotal {
            millimeters: total,
            detail: format!("Open-Meteo {window_hours}h: {total:.1}mm, peak {peak:.1}mm/h"),
        })
    }
}
