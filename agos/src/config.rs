//! Configuration types and loading
//!
//! YAML config with a fallback chain: explicit path, project-local
//! `.agos.yml`, then `~/.config/agos/agos.yml`, then defaults. API keys
//! are named by env var in the config and read from the environment at
//! client construction, never stored in the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoding: GeocodingConfig,
    pub rainfall: RainfallConfig,
    pub susceptibility: SusceptibilityConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration with fallback chain.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(".agos.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("agos").join("agos.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate configuration before use. Fails fast on nonsense values;
    /// a missing OpenCage key is fine (that tier is skipped).
    pub fn validate(&self) -> Result<()> {
        if self.rainfall.window_hours == 0 {
            return Err(eyre::eyre!("rainfall.window_hours must be at least 1"));
        }
        if self.geocoding.timeout_ms == 0 || self.rainfall.timeout_ms == 0 || self.susceptibility.timeout_ms == 0 {
            return Err(eyre::eyre!("timeouts must be non-zero"));
        }
        Ok(())
    }
}

/// Geocoding collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub nominatim_url: String,
    pub opencage_url: String,
    /// Env var holding the OpenCage API key; tier skipped when unset
    pub opencage_api_key_env: String,
    /// ISO country code scope for all geocoding queries
    pub country_scope: String,
    pub user_agent: String,
    /// Per-request timeout
    pub timeout_ms: u64,
    /// Minimum spacing between Nominatim requests (usage policy: 1/s)
    pub nominatim_min_interval_ms: u64,
    /// Minimum spacing between OpenCage requests
    pub opencage_min_interval_ms: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            opencage_url: "https://api.opencagedata.com/geocode/v1/json".to_string(),
            opencage_api_key_env: "OPENCAGE_API_KEY".to_string(),
            country_scope: "ph".to_string(),
            user_agent: "agos-flood-risk/0.1".to_string(),
            timeout_ms: 5_000,
            nominatim_min_interval_ms: 1_000,
            opencage_min_interval_ms: 200,
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Rainfall collaborators (PAGASA primary, Open-Meteo secondary).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RainfallConfig {
    pub pagasa_url: String,
    pub open_meteo_url: String,
    pub timeout_ms: u64,
    /// Forward forecast window in hours
    pub window_hours: u32,
}

impl Default for RainfallConfig {
    fn default() -> Self {
        Self {
            pagasa_url: "https://portal.georisk.gov.ph/arcgis/rest/services/PAGASA/Rainfall_Forecast/MapServer/identify"
                .to_string(),
            open_meteo_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timeout_ms: 10_000,
            window_hours: 24,
        }
    }
}

/// Flood-susceptibility collaborator (MGB FeatureServer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SusceptibilityConfig {
    pub mgb_url: String,
    pub timeout_ms: u64,
}

impl Default for SusceptibilityConfig {
    fn default() -> Self {
        Self {
            mgb_url: "https://controlmap.mgb.gov.ph/arcgis/rest/services/GeospatialDataInventory/GDI_Detailed_Flood_Susceptibility/FeatureServer/0/query"
                .to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Location-cache storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache file path; default lives under the user data dir
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { path: None }
    }
}

impl CacheConfig {
    /// Resolved cache path, defaulting to the platform data dir.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("agos")
                .join("locations_cache.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn zero_window_rejected() {
        let mut config = Config::default();
        config.rainfall.window_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_overrides_defaults() {
        let yaml = "rainfall:\n  window_hours: 6\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rainfall.window_hours, 6);
        // Untouched sections keep defaults
        assert_eq!(config.geocoding.country_scope, "ph");
        assert_eq!(config.rainfall.timeout_ms, 10_000);
    }

    #[test]
    fn explicit_cache_path_wins() {
        let config = CacheConfig {
            path: Some(PathBuf::from("/tmp/agos-test/cache.json")),
        };
        assert_eq!(config.resolved_path(), PathBuf::from("/tmp/agos-test/cache.json"));
    }
}
