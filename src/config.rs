//! Configuration types for the import pipeline.
//!
//! Loads settings from config.json at startup. Provides detection thresholds,
//! grid scan heuristics, match policy, OCR settings and reference data sources.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::vision::grid::GridStrategy;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<ImportConfig> = OnceLock::new();

/// Content region detection thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Gray value at or above which a pixel counts as white after binarization
    pub white_level: u8,
    /// Minimum white ratio across a row for it to be a panel boundary
    pub x_threshold: f32,
    /// Minimum white ratio down a column (within the row span) for it to be a boundary
    pub y_threshold: f32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            white_level: 250,
            x_threshold: 0.75,
            y_threshold: 0.9,
        }
    }
}

/// Hash match policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Candidates farther than this (in bits) are discarded
    pub max_distance: u32,
    /// Best candidate at or below this distance is returned alone
    pub confident_distance: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_distance: 24,
            confident_distance: 10,
        }
    }
}

/// Badge OCR settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Read level and master rank badges with OCR
    pub enabled: bool,
    /// Number of OCR worker threads
    pub workers: usize,
    /// Badge binarization threshold (pixels with R, G, B all > threshold are kept as text)
    pub badge_threshold: u8,
    /// Explicit tesseract executable, overrides lookup
    pub tesseract_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            workers: 4,
            badge_threshold: 200,
            tesseract_path: None,
        }
    }
}

/// Where the reference hash table and card list are read from.
/// Values starting with `http://` or `https://` are fetched, anything else is a file path.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub hash_table: String,
    pub cards: String,
    /// HTTP timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            hash_table: "https://sekai-world.github.io/sekai-viewer-asset/chara_hash.json"
                .to_string(),
            cards: "https://sekai-world.github.io/sekai-master-db-diff/cards.json".to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Complete import configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub locator: LocatorConfig,
    pub grid: GridStrategy,
    pub matching: MatchConfig,
    pub ocr: OcrConfig,
    pub sources: SourcesConfig,
}

/// Loads configuration from the given path, or config.json in the working
/// directory, falling back to defaults.
pub fn load_config(path: Option<&Path>) -> ImportConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("config.json"));

    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log(&format!("Config loaded from {}", config_path.display()));
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                ));
            }
        }
    } else {
        crate::log("Config file not found. Using default config.");
    }

    ImportConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config(path: Option<&Path>) {
    let _ = CONFIG.set(load_config(path));
}

/// Returns a reference to the global configuration, or the defaults if
/// init_config() was never called.
pub fn get_config() -> &'static ImportConfig {
    CONFIG.get_or_init(ImportConfig::default)
}
