mod args;
mod config;

use std::{
    fs::{self, File},
    path::Path,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use retouch_core::{
    AnalysisSummary, Region, RegionDetector, RenderSummary, SessionObserver, SessionState,
    propose,
};
use retouch_utils::{
    Adjustments, ImageFormatHint, ParameterSet, QualityReport, analyze_quality,
    configure_telemetry, encode_image, image_utils::to_working, init_logging, normalize_path,
    output::write_bytes,
};
use serde::Serialize;

use crate::{
    args::RetouchArgs,
    config::{apply_cli_overrides, load_settings, resolve_output_path},
};

#[derive(Debug, Serialize)]
struct AnalysisRecord {
    image: String,
    width: u32,
    height: u32,
    quality: QualityReport,
    regions: Vec<Region>,
    proposal: Adjustments,
}

#[derive(Debug, Serialize)]
struct RunRecord {
    image: String,
    output: String,
    width: u32,
    height: u32,
    params: ParameterSet,
    ai_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<QualityReport>,
    regions: Vec<Region>,
}

/// Logs every render and analysis the session reports.
struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_render(&mut self, summary: &RenderSummary) {
        debug!(
            "Rendered {}x{} in {:.2?} (AI {}, {} region(s)): {:?}",
            summary.width,
            summary.height,
            summary.elapsed,
            if summary.ai_enabled { "on" } else { "off" },
            summary.region_count,
            summary.params
        );
    }

    fn on_analysis(&mut self, summary: &AnalysisSummary) {
        info!(
            "Image quality {} (brightness {:.0}, contrast {:.0}, sharpness {:.0}); {} region(s), {} adjustment(s) applied",
            summary.report.label.as_label(),
            summary.report.brightness,
            summary.report.contrast,
            summary.report.sharpness,
            summary.region_count,
            summary.applied_count
        );
    }
}

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info)?;
    let args = RetouchArgs::parse();

    let input_path = normalize_path(&args.input)?;
    let mut settings = load_settings(args.config.as_ref())?;
    apply_cli_overrides(&mut settings, &args);
    configure_telemetry(
        settings.telemetry.enabled,
        settings.telemetry.level_filter(),
    );

    let raw = fs::read(&input_path)
        .with_context(|| format!("failed to read {}", input_path.display()))?;
    let mut session = SessionState::new(settings).with_observer(Box::new(LogObserver));
    session
        .load_bytes(&raw)
        .with_context(|| format!("failed to load {}", input_path.display()))?;

    if args.analyze_only {
        let record = analyze(&session, &input_path)?;
        return emit_json(&record, args.json.as_deref());
    }

    if let Some(name) = args.preset.as_deref() {
        session.apply_preset(name)?;
        info!("Applied preset '{name}'");
    }
    for (key, value) in args.slider_overrides() {
        session.set_param(key, value);
    }
    if args.ai {
        session.toggle_ai();
    }
    if args.reset {
        session.reset();
    }

    let output_path = resolve_output_path(&input_path, args.output.as_ref());
    let format = ImageFormatHint::from_path(&output_path).unwrap_or_default();
    let bytes = match format {
        ImageFormatHint::Jpeg => session.download()?,
        ImageFormatHint::Png => {
            let output = session.output().context("no rendered output available")?;
            encode_image(output, format, session.settings().export.jpeg_quality)?
        }
    };
    if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    write_bytes(&output_path, &bytes)?;
    info!("Saved retouched image to {}", output_path.display());

    if let Some(json_path) = args.json.as_deref() {
        let (width, height) = session.output().map(|o| o.dimensions()).unwrap_or((0, 0));
        let record = RunRecord {
            image: input_path.display().to_string(),
            output: output_path.display().to_string(),
            width,
            height,
            params: *session.params(),
            ai_enabled: session.ai_enabled(),
            quality: session.last_report().copied(),
            regions: session.regions().to_vec(),
        };
        emit_json(&record, Some(json_path))?;
    }

    Ok(())
}

fn analyze(session: &SessionState, input_path: &Path) -> Result<AnalysisRecord> {
    let source = session.source().context("no image loaded")?;
    let working = to_working(source);
    let quality = analyze_quality(&working);
    let regions = RegionDetector::new(session.settings().detection.clone()).detect(&working);
    let proposal = propose(&quality, regions.len());
    Ok(AnalysisRecord {
        image: input_path.display().to_string(),
        width: working.width(),
        height: working.height(),
        quality,
        regions,
        proposal,
    })
}

fn emit_json<T: Serialize>(record: &T, json_path: Option<&Path>) -> Result<()> {
    if let Some(json_path) = json_path {
        if let Some(dir) = json_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        let file = File::create(json_path)
            .with_context(|| format!("failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, record)
            .with_context(|| format!("failed to write JSON to {}", json_path.display()))?;
        info!("Wrote summary to {}", json_path.display());
    } else {
        let json = serde_json::to_string_pretty(record).context("failed to serialize summary")?;
        println!("{json}");
    }
    Ok(())
}
