//! Common helpers shared across the retouch crates.

/// Per-pixel color-space conversions (HSV, luma/chroma, grayscale).
pub mod color;
/// Application configuration and settings management.
pub mod config;
/// Individual enhancement stages (white balance, smoothing, skin softening, clarity).
pub mod enhance;
/// Fixed-kernel Gaussian and bilateral filters.
pub mod filter;
/// Image decoding, fitting and working-layout conversion.
pub mod image_utils;
/// Image output helpers (JPEG/PNG encoding, file writes).
pub mod output;
/// Slider parameter model.
pub mod params;
/// Image quality analysis (brightness, contrast, Laplacian sharpness).
pub mod quality;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

use anyhow::Result;
use log::LevelFilter;
use std::path::{Path, PathBuf};

pub use config::{AppSettings, ContourFilter, DetectionSettings, ExportSettings, SessionSettings};
pub use image_utils::{decode_image, fit_dimensions, fit_to_max_side, to_display, to_working};
pub use output::{ImageFormatHint, append_suffix_to_filename, encode_image, encode_jpeg};
pub use params::{Adjustments, ParamKey, ParameterSet};
pub use quality::{QualityLabel, QualityReport, analyze as analyze_quality};
pub use telemetry::{
    TimingGuard, configure as configure_telemetry, telemetry_allows, telemetry_enabled,
    timing_guard, timing_guard_if,
};

/// Initialize logging once for CLI and test environments.
///
/// This function respects the `RUST_LOG` environment variable if it is set.
/// Otherwise, it falls back to the provided default filter level.
///
/// # Arguments
///
/// * `default_filter` - The `LevelFilter` to use if `RUST_LOG` is not set.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module(telemetry::TELEMETRY_TARGET, LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Resolve `path` to an absolute, canonical path. Fails when it does not exist.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_rejects_missing_paths() {
        assert!(normalize_path("definitely/not/here.jpg").is_err());
        let dir = tempfile::tempdir().expect("tempdir");
        let resolved = normalize_path(dir.path()).expect("existing dir");
        assert!(resolved.is_absolute());
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LevelFilter::Warn).expect("first init");
        init_logging(LevelFilter::Debug).expect("second init");
    }
}
