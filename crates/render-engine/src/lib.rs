//! Retake Render Engine
//!
//! Offline rendering pipeline that composites recorded frames with the
//! director's decisions into an encoded video:
//!
//! ```text
//! frames/*.png ──┐
//!                ├── Crop/Scale (viewport trajectory)
//! keyframes ─────┘        │
//!                         ├── Cursor Overlay
//! smoothed cursor ────────┘        │
//!                                  ├── Click Rings / Key Badges
//! events ──────────────────────────┘        │
//!                                           ├── Corners / Shadow / Background
//! style ────────────────────────────────────┘        │
//!                                                    ▼
//!                                        ffmpeg (stdin pipe) ──► output
//! ```
//!
//! Frames are processed strictly sequentially; the encoder subprocess runs
//! concurrently behind its pipe and supplies natural back-pressure.

pub mod compositor;
pub mod effects;
pub mod encoder;
pub mod pipeline;
pub mod presets;
pub mod style;
pub mod thumbnail;

pub use pipeline::{render_recording, CancelFlag, ProgressEvent, ProgressStage, RenderJob};
pub use presets::{EncodingParams, ExportFormat, QualityPreset};
pub use style::OutputStyle;
