//! Named tuning-preset loading with a per-loader cache.
//!
//! A `ConfigSource` fetches raw JSON by preset name; the loader parses,
//! validates, and caches successful loads for its lifetime. Failures fall back
//! to the embedded default, which is returned but never cached, so a later
//! call can still pick up a fixed preset.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::search::tactical_config::TacticalConfig;

/// Environment variable naming the preset directory.
pub const CONFIG_DIR_ENV: &str = "ONITAMA_CONFIG_DIR";
pub const DEFAULT_CONFIG_DIR: &str = "presets";

/// Presets the engine knows by name.
pub const KNOWN_PRESETS: &[&str] = &["default", "aggressive", "defensive", "custom"];

pub trait ConfigSource: Send + Sync {
    fn fetch(&self, name: &str) -> Result<String, ConfigError>;
}

/// Reads `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `ONITAMA_CONFIG_DIR` if set, otherwise `presets/`.
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => {
                debug!("Using preset directory from {}: {}", CONFIG_DIR_ENV, dir);
                Self::new(dir)
            }
            Err(_) => Self::new(DEFAULT_CONFIG_DIR),
        }
    }
}

impl ConfigSource for DirectorySource {
    fn fetch(&self, name: &str) -> Result<String, ConfigError> {
        if name.is_empty() || name.contains(['/', '\\', '.']) {
            return Err(ConfigError::Source {
                name: name.to_owned(),
                message: "preset names must be plain identifiers".to_owned(),
            });
        }
        let path = self.dir.join(format!("{name}.json"));
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Fixed documents keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: HashMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, json: &str) -> Self {
        self.documents.insert(name.to_owned(), json.to_owned());
        self
    }
}

impl ConfigSource for InMemorySource {
    fn fetch(&self, name: &str) -> Result<String, ConfigError> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::Source {
                name: name.to_owned(),
                message: "no such preset".to_owned(),
            })
    }
}

pub struct TacticalConfigLoader {
    source: Box<dyn ConfigSource>,
    cache: Mutex<HashMap<String, Arc<TacticalConfig>>>,
    fetches: AtomicU64,
}

impl TacticalConfigLoader {
    pub fn new(source: Box<dyn ConfigSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn from_env() -> Self {
        Self::new(Box::new(DirectorySource::from_env()))
    }

    /// Loader whose every preset is the embedded default.
    pub fn embedded_only() -> Self {
        Self::new(Box::new(InMemorySource::new().with("default", "{}")))
    }

    /// Fetch, parse, and validate `name` without touching the cache.
    pub fn try_load(&self, name: &str) -> Result<TacticalConfig, ConfigError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let text = self.source.fetch(name)?;
        TacticalConfig::from_json(&text)
    }

    /// Cached preset, loading it on first use. Never fails: a broken or
    /// missing preset yields the embedded default.
    pub fn load(&self, name: &str) -> Arc<TacticalConfig> {
        // The lock is held across the fetch so each name loads once.
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(hit) = cache.get(name) {
            return Arc::clone(hit);
        }

        match self.try_load(name) {
            Ok(config) => {
                info!("Loaded tactical config preset '{}'", name);
                let config = Arc::new(config);
                cache.insert(name.to_owned(), Arc::clone(&config));
                config
            }
            Err(err) => {
                warn!(
                    "Failed to load tactical config preset '{}': {}, using embedded default",
                    name, err
                );
                Arc::new(TacticalConfig::default())
            }
        }
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache
            .lock()
            .map(|cache| cache.contains_key(name))
            .unwrap_or(false)
    }

    /// Number of times the source has been asked for a document.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}
