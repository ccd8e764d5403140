//! Command-line argument definitions for retouch-cli.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use retouch_utils::ParamKey;

/// Retouch a photo: apply presets, slider values and auto-enhancement.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct RetouchArgs {
    /// Image to retouch (JPEG, PNG, BMP or WebP).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Destination file. Defaults to `<input stem>_retouched.jpg` next to the input.
    /// A `.png` extension writes a lossless PNG instead of the JPEG download.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional settings JSON. Defaults to `config/retouch_settings.json` when present, otherwise built-in parameters.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Named preset applied right after loading (e.g. `passport`).
    #[arg(long)]
    pub preset: Option<String>,

    /// Brightness offset (-100..=100).
    #[arg(long, allow_negative_numbers = true)]
    pub brightness: Option<i32>,

    /// Contrast (-100..=100).
    #[arg(long, allow_negative_numbers = true)]
    pub contrast: Option<i32>,

    /// Clarity / unsharp-mask strength (0..=100).
    #[arg(long)]
    pub clarity: Option<i32>,

    /// Edge-preserving smoothing strength (0..=100).
    #[arg(long)]
    pub smooth: Option<i32>,

    /// Skin softening strength (0..=100).
    #[arg(long)]
    pub skin: Option<i32>,

    /// Gray-world white balance (-50..=50).
    #[arg(long, visible_alias = "wb", allow_negative_numbers = true)]
    pub white_balance: Option<i32>,

    /// Switch AI mode on: analyse the image, detect regions and apply the proposed adjustments.
    #[arg(long, action = ArgAction::SetTrue)]
    pub ai: bool,

    /// Reset every slider after the other edits (AI mode stays as set).
    #[arg(long, action = ArgAction::SetTrue)]
    pub reset: bool,

    /// Print the quality report and detected regions without writing an image.
    #[arg(long, action = ArgAction::SetTrue)]
    pub analyze_only: bool,

    /// Write the run summary (or analysis) to a JSON file instead of stdout.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Override the JPEG quality of the output (1-100).
    #[arg(long, value_name = "1-100")]
    pub quality: Option<u8>,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,
}

impl RetouchArgs {
    /// Slider overrides given on the command line, in slider order.
    pub fn slider_overrides(&self) -> Vec<(ParamKey, i32)> {
        ParamKey::ALL
            .into_iter()
            .filter_map(|key| {
                let value = match key {
                    ParamKey::Brightness => self.brightness,
                    ParamKey::Contrast => self.contrast,
                    ParamKey::Clarity => self.clarity,
                    ParamKey::Smooth => self.smooth,
                    ParamKey::Skin => self.skin,
                    ParamKey::WhiteBalance => self.white_balance,
                };
                value.map(|v| (key, v))
            })
            .collect()
    }
}
