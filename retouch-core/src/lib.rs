//! Retouching core.
//!
//! This crate detects face/skin regions, proposes automatic adjustments from
//! a quality report, runs the ordered enhancement pipeline and tracks the
//! state of an editing session.

/// Quality-driven adjustment proposals.
pub mod auto_enhance;
/// Heuristic face/skin region detection.
pub mod detector;
/// The ordered enhancement chain.
pub mod pipeline;
/// Named slider presets.
pub mod presets;
/// Rectangular regions of interest.
pub mod region;
/// Editing session state machine.
pub mod session;

pub use auto_enhance::propose;
pub use detector::{DetectionStrategy, RegionDetector};
pub use pipeline::render;
pub use presets::{ParamPreset, preset_by_name, resolve_preset, standard_presets};
pub use region::Region;
pub use session::{
    AnalysisSummary, RenderOutcome, RenderSummary, SessionError, SessionObserver, SessionPhase,
    SessionState,
};
