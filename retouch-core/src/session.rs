//! Editing session state machine.
//!
//! A [`SessionState`] owns the current source image, the slider values, the
//! detected regions and the latest rendered output. Every edit re-runs the
//! full pipeline synchronously before returning, so the output always matches
//! the most recently committed parameters.
//!
//! ```text
//! NoImage --load--> AiOff <--toggle--> AiOn { analyzed }
//! ```
//!
//! Analysis (quality report, region detection, auto-enhance proposal) runs at
//! most once per loaded image, the first time AI mode is switched on.

use std::time::Duration;

use image::{DynamicImage, RgbaImage};
use log::{debug, info};
use retouch_utils::{
    AppSettings, ParamKey, ParameterSet, QualityReport, analyze_quality, decode_image,
    encode_jpeg, fit_to_max_side, image_utils::to_working, timing_guard,
};
use thiserror::Error;

use crate::{
    auto_enhance::propose, detector::RegionDetector, pipeline::render, presets::resolve_preset,
    region::Region,
};

/// Failures surfaced at the session boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No image is loaded.
    #[error("no image loaded")]
    NotReady,
    /// The raw bytes could not be decoded; the session is left without an image.
    #[error("failed to load image")]
    Decode(#[source] anyhow::Error),
    /// The output could not be encoded for download.
    #[error("failed to encode output")]
    Encode(#[source] anyhow::Error),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("unknown parameter '{0}'")]
    UnknownParam(String),
}

/// What an edit did to the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The pipeline ran and the output was replaced.
    Rendered,
    /// Nothing to render yet.
    NotReady,
}

/// Observable lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoImage,
    AiOff,
    AiOn { analyzed: bool },
}

/// Snapshot pushed after every render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub width: u32,
    pub height: u32,
    pub params: ParameterSet,
    pub ai_enabled: bool,
    pub region_count: usize,
    pub elapsed: Duration,
}

/// Snapshot pushed after an AI analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSummary {
    pub report: QualityReport,
    pub region_count: usize,
    /// Number of slider values written by the auto-enhance proposal.
    pub applied_count: usize,
}

/// Receives push notifications from a session. Both methods default to no-ops.
pub trait SessionObserver {
    fn on_render(&mut self, _summary: &RenderSummary) {}
    fn on_analysis(&mut self, _summary: &AnalysisSummary) {}
}

/// Mutable state of a single editing session.
pub struct SessionState {
    settings: AppSettings,
    detector: RegionDetector,
    source: Option<RgbaImage>,
    output: Option<RgbaImage>,
    params: ParameterSet,
    regions: Vec<Region>,
    ai_enabled: bool,
    auto_enhance_applied: bool,
    last_report: Option<QualityReport>,
    observer: Option<Box<dyn SessionObserver>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("source", &self.source.as_ref().map(|s| s.dimensions()))
            .field("params", &self.params)
            .field("regions", &self.regions)
            .field("ai_enabled", &self.ai_enabled)
            .field("auto_enhance_applied", &self.auto_enhance_applied)
            .finish_non_exhaustive()
    }
}

impl SessionState {
    /// Create an empty session. Settings are sanitised first.
    pub fn new(mut settings: AppSettings) -> Self {
        settings.sanitize();
        let detector = RegionDetector::new(settings.detection.clone());
        Self {
            settings,
            detector,
            source: None,
            output: None,
            params: ParameterSet::default(),
            regions: Vec::new(),
            ai_enabled: false,
            auto_enhance_applied: false,
            last_report: None,
            observer: None,
        }
    }

    /// Install an observer for render and analysis notifications.
    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn auto_enhance_applied(&self) -> bool {
        self.auto_enhance_applied
    }

    /// Report from the most recent analysis of the current image.
    pub fn last_report(&self) -> Option<&QualityReport> {
        self.last_report.as_ref()
    }

    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_ref()
    }

    /// The most recent render.
    pub fn output(&self) -> Option<&RgbaImage> {
        self.output.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.source.is_some(), self.ai_enabled) {
            (false, _) => SessionPhase::NoImage,
            (true, false) => SessionPhase::AiOff,
            (true, true) => SessionPhase::AiOn {
                analyzed: self.auto_enhance_applied,
            },
        }
    }

    /// Decode `raw` and load it. A decode failure leaves the session empty.
    pub fn load_bytes(&mut self, raw: &[u8]) -> Result<RenderOutcome, SessionError> {
        match decode_image(raw) {
            Ok(image) => Ok(self.load_image(image)),
            Err(err) => {
                self.clear();
                Err(SessionError::Decode(err))
            }
        }
    }

    /// Replace the source image, resetting every edit, and render it.
    ///
    /// Images larger than the configured maximum side are downscaled first.
    pub fn load_image(&mut self, image: DynamicImage) -> RenderOutcome {
        let (orig_w, orig_h) = (image.width(), image.height());
        let fitted = fit_to_max_side(image, self.settings.session.max_side).to_rgba8();
        if fitted.width() == 0 || fitted.height() == 0 {
            self.clear();
            return RenderOutcome::NotReady;
        }
        info!(
            "Loaded {}x{} image (working size {}x{})",
            orig_w,
            orig_h,
            fitted.width(),
            fitted.height()
        );
        self.clear();
        self.source = Some(fitted);
        self.render()
    }

    /// Set one slider, clamping into its range, and render. A no-op without an
    /// image.
    pub fn set_param(&mut self, key: ParamKey, value: i32) -> RenderOutcome {
        if !self.is_loaded() {
            return RenderOutcome::NotReady;
        }
        let stored = self.params.set(key, value);
        if stored != value {
            debug!("{key} clamped from {value} to {stored}");
        }
        self.render()
    }

    /// [`SessionState::set_param`] keyed by name.
    pub fn set_param_named(&mut self, key: &str, value: i32) -> Result<RenderOutcome, SessionError> {
        let key: ParamKey = key
            .parse()
            .map_err(|_| SessionError::UnknownParam(key.to_string()))?;
        Ok(self.set_param(key, value))
    }

    /// Flip AI mode.
    ///
    /// Switching on for the first time after a load runs the analysis and
    /// writes the proposed adjustments. Switching off keeps slider values and
    /// only drops the region pre-blur from subsequent renders.
    pub fn toggle_ai(&mut self) -> RenderOutcome {
        if !self.is_loaded() {
            return RenderOutcome::NotReady;
        }
        self.ai_enabled = !self.ai_enabled;
        debug!("AI mode {}", if self.ai_enabled { "on" } else { "off" });
        if self.ai_enabled && !self.auto_enhance_applied {
            self.analyze();
        }
        self.render()
    }

    /// Restore default sliders and forget the analysis. AI mode is unchanged.
    pub fn reset(&mut self) -> RenderOutcome {
        if !self.is_loaded() {
            return RenderOutcome::NotReady;
        }
        self.params = ParameterSet::default();
        self.regions.clear();
        self.auto_enhance_applied = false;
        self.last_report = None;
        self.render()
    }

    /// Overwrite every slider with the named preset and render.
    pub fn apply_preset(&mut self, name: &str) -> Result<RenderOutcome, SessionError> {
        let params = resolve_preset(name, &self.settings.presets)
            .ok_or_else(|| SessionError::UnknownPreset(name.to_string()))?;
        if !self.is_loaded() {
            return Ok(RenderOutcome::NotReady);
        }
        debug!("Applying preset '{name}': {params:?}");
        self.params = params;
        Ok(self.render())
    }

    /// Encode the current output for download.
    pub fn download(&self) -> Result<Vec<u8>, SessionError> {
        let output = self.output.as_ref().ok_or(SessionError::NotReady)?;
        encode_jpeg(output, self.settings.export.jpeg_quality).map_err(SessionError::Encode)
    }

    /// Suggested file name for [`SessionState::download`].
    pub fn download_name(&self) -> &str {
        &self.settings.export.file_name
    }

    fn clear(&mut self) {
        self.source = None;
        self.output = None;
        self.params = ParameterSet::default();
        self.regions.clear();
        self.ai_enabled = false;
        self.auto_enhance_applied = false;
        self.last_report = None;
    }

    fn analyze(&mut self) {
        let Some(source) = self.source.as_ref() else {
            return;
        };
        let _guard = timing_guard("retouch_core::session::analyze", log::Level::Debug);
        let working = to_working(source);
        let report = analyze_quality(&working);
        let regions = self.detector.detect(&working);
        let proposal = propose(&report, regions.len());
        let applied_count = proposal.apply_to(&mut self.params);

        info!(
            "Analysis: {} (brightness {:.1}, contrast {:.1}, sharpness {:.1}); {} region(s), {} adjustment(s)",
            report.label.as_label(),
            report.brightness,
            report.contrast,
            report.sharpness,
            regions.len(),
            applied_count
        );

        let summary = AnalysisSummary {
            report,
            region_count: regions.len(),
            applied_count,
        };
        self.regions = regions;
        self.last_report = Some(report);
        self.auto_enhance_applied = true;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_analysis(&summary);
        }
    }

    fn render(&mut self) -> RenderOutcome {
        let Some(source) = self.source.as_ref() else {
            debug!("render requested with no image loaded");
            return RenderOutcome::NotReady;
        };
        let guard = timing_guard("retouch_core::session::render", log::Level::Debug);
        let Some(output) = render(source, &self.params, &self.regions, self.ai_enabled) else {
            return RenderOutcome::NotReady;
        };

        let summary = RenderSummary {
            width: output.width(),
            height: output.height(),
            params: self.params,
            ai_enabled: self.ai_enabled,
            region_count: self.regions.len(),
            elapsed: guard.elapsed(),
        };
        self.output = Some(output);
        if let Some(observer) = self.observer.as_mut() {
            observer.on_render(&summary);
        }
        RenderOutcome::Rendered
    }
}
