//! Durable location cache
//!
//! Normalized name -> coordinates, persisted as a small JSON file and
//! held in memory behind an RwLock. Read on every resolve, written
//! through on every successful remote geocode. Load failures degrade to
//! an empty cache; save failures are logged and swallowed so a broken
//! disk never breaks resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Cached coordinates for one location name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CachedCoords {
    pub lat: f64,
    pub lon: f64,
}

/// In-memory cache with JSON write-through.
pub struct LocationCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, CachedCoords>>,
}

impl LocationCache {
    /// Open the cache at `path`, loading existing entries if present.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, CachedCoords>>(&content) {
                Ok(map) => {
                    debug!(count = map.len(), path = %path.display(), "LocationCache::open: loaded");
                    map
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "LocationCache::open: unparsable cache, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Exact lookup by normalized name.
    pub async fn get(&self, name: &str) -> Option<CachedCoords> {
        self.entries.read().await.get(name).copied()
    }

    /// Insert and persist a resolved coordinate.
    pub async fn put(&self, name: &str, lat: f64, lon: f64) {
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.insert(name.to_string(), CachedCoords { lat, lon });
            entries.clone()
        };
        self.save(&snapshot);
    }

    /// All cached names, for fuzzy matching.
    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn save(&self, entries: &HashMap<String, CachedCoords>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, "LocationCache::save: cannot create cache dir");
                return;
            }
        }
        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!(error = %e, path = %self.path.display(), "LocationCache::save: write failed");
                }
            }
            Err(e) => warn!(error = %e, "LocationCache::save: serialize failed"),
        }
    }
}
