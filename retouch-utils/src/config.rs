//! Shared configuration types consumed across the retouch workspace.
//!
//! Settings are plain serde structures persisted as pretty-printed JSON. Every
//! struct uses `#[serde(default)]` so partial files only override the keys they
//! mention; values are sanitised after loading.

use crate::params::ParameterSet;

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

/// Session-level behaviour applied when an image is loaded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionSettings {
    /// Images larger than this on either axis are downscaled on load.
    pub max_side: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { max_side: 1024 }
    }
}

/// Area and aspect-ratio gate applied to each candidate contour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContourFilter {
    /// Contours must enclose strictly more than this many pixels.
    pub min_area: f64,
    /// Contours must enclose strictly less than this fraction of the image.
    pub max_area_fraction: f64,
    /// Inclusive lower bound on bounding-box width / height. A ratio exactly
    /// on the bound is accepted, unlike the strict area bounds.
    pub min_aspect: f64,
    /// Inclusive upper bound on bounding-box width / height.
    pub max_aspect: f64,
}

impl Default for ContourFilter {
    fn default() -> Self {
        Self {
            min_area: 2000.0,
            max_area_fraction: 0.4,
            min_aspect: 0.6,
            max_aspect: 1.5,
        }
    }
}

impl ContourFilter {
    /// Returns true when a contour of `area` with a `width` x `height` bounding
    /// box inside an image of `total_pixels` passes the gate.
    pub fn accepts(&self, area: f64, width: u32, height: u32, total_pixels: f64) -> bool {
        if height == 0 || area <= self.min_area || area >= total_pixels * self.max_area_fraction {
            return false;
        }
        let aspect = width as f64 / height as f64;
        aspect >= self.min_aspect && aspect <= self.max_aspect
    }
}

/// Constants of the two heuristic region-detection strategies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionSettings {
    /// Inclusive hue band (half degrees, 0..180) treated as skin.
    pub skin_hue: [u8; 2],
    /// Inclusive saturation band treated as skin.
    pub skin_saturation: [u8; 2],
    /// Inclusive value band treated as skin.
    pub skin_value: [u8; 2],
    /// Gate for skin-mask contours.
    pub skin_contours: ContourFilter,
    /// Low hysteresis threshold of the edge detector.
    pub canny_low: f32,
    /// High hysteresis threshold of the edge detector.
    pub canny_high: f32,
    /// Gate for edge-map contours.
    pub shape_contours: ContourFilter,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            skin_hue: [0, 20],
            skin_saturation: [20, 255],
            skin_value: [70, 255],
            skin_contours: ContourFilter::default(),
            canny_low: 50.0,
            canny_high: 150.0,
            shape_contours: ContourFilter {
                min_area: 1000.0,
                max_area_fraction: 0.3,
                min_aspect: 0.7,
                max_aspect: 1.3,
            },
        }
    }
}

/// Encoding of the downloadable result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportSettings {
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
    /// Suggested file name for the download.
    pub file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            file_name: "retouched.jpg".to_string(),
        }
    }
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Whether telemetry timing logs are enabled.
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string into a `LevelFilter`.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Debug,
        }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub session: SessionSettings,
    pub detection: DetectionSettings,
    pub export: ExportSettings,
    /// User presets, layered over the built-in table by name.
    pub presets: BTreeMap<String, ParameterSet>,
    pub telemetry: TelemetrySettings,
}

impl AppSettings {
    /// Clamp values to their valid ranges.
    pub fn sanitize(&mut self) {
        self.session.max_side = self.session.max_side.max(1);
        self.export.jpeg_quality = self.export.jpeg_quality.clamp(1, 100);
        for params in self.presets.values_mut() {
            *params = params.sanitized();
        }
    }

    /// Load settings from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        settings.sanitize();
        Ok(settings)
    }

    /// Serialize settings to disk in pretty-printed JSON.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }
}

/// Returns the default path for persisted settings (`config/retouch_settings.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/retouch_settings.json"))
        .unwrap_or_else(|_| PathBuf::from("config/retouch_settings.json"))
}
