//! Recording metadata and the on-disk artifact layout.
//!
//! A recording directory contains:
//! - `meta.json`: recording metadata
//! - `events.jsonl`: input events, one per line
//! - `window_events.jsonl`: optional window-focus events (separate file so
//!   focus tracking never races the input writer)
//! - `frames/frame_00000001.png`, ...: zero-padded 8-digit, 1-based
//! - `frame_count.txt`: integer frame count
//! - `dimensions.txt`: `WxH`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use retake_common::error::{RetakeError, RetakeResult};

use crate::event::{parse_events_jsonl, RecordingEvent, TimestampMs};
use crate::geometry::Rect;

/// Metadata about a completed recording session (`meta.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingMeta {
    pub version: u32,
    pub id: String,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Nominal capture rate. Advisory only: effective frame timestamps are
    /// derived from `duration_ms` and the frame count, never from this.
    pub fps: u32,
    pub duration_ms: u64,
    pub has_audio: bool,
    pub recording_dir: String,
    #[serde(default)]
    pub recording_mode: RecordingMode,
    #[serde(default)]
    pub window_title: Option<String>,
    #[serde(default)]
    pub window_initial_rect: Option<Rect>,
}

/// What was captured: the full display, a single window, or a screen area.
///
/// Non-display modes suppress overview zoom-outs to 1.0×: there is no
/// meaningful "full screen" to return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    #[default]
    Display,
    Window,
    Area,
}

impl RecordingMode {
    pub fn is_full_screen(&self) -> bool {
        matches!(self, RecordingMode::Display)
    }
}

/// A recording's artifacts loaded into memory: metadata, merged event
/// stream, and frame-sequence bookkeeping. Events are immutable after load.
#[derive(Debug, Clone)]
pub struct Recording {
    pub dir: PathBuf,
    pub meta: RecordingMeta,
    /// Input and window-focus events merged and time-sorted. The sort is
    /// stable: ordering among simultaneous events is preserved as recorded.
    pub events: Vec<RecordingEvent>,
    pub frame_count: u64,
}

impl Recording {
    /// Load a recording directory. Fails with `InputInvalid` if a required
    /// artifact (meta, dimensions, frame count) is unusable; corrupt event
    /// lines are discarded and logged.
    pub fn load(dir: &Path) -> RetakeResult<Self> {
        let meta_path = dir.join("meta.json");
        let meta_str = std::fs::read_to_string(&meta_path).map_err(|e| {
            RetakeError::input_invalid(format!("cannot read {}: {e}", meta_path.display()))
        })?;
        let mut meta: RecordingMeta = serde_json::from_str(&meta_str).map_err(|e| {
            RetakeError::input_invalid(format!("cannot parse {}: {e}", meta_path.display()))
        })?;

        // dimensions.txt is authoritative for the frame pixel size; meta.json
        // may predate a capture-scale correction.
        let (width, height) = read_dimensions(dir)?;
        meta.screen_width = width;
        meta.screen_height = height;

        let frame_count = read_frame_count(dir)?;
        let events = load_events(dir);

        tracing::info!(
            id = %meta.id,
            frames = frame_count,
            events = events.len(),
            "Loaded recording"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            meta,
            events,
            frame_count,
        })
    }

    /// Path of the source PNG for output frame `index` (0-based). Frame
    /// files on disk are 1-based.
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir
            .join("frames")
            .join(format!("frame_{:08}.png", index + 1))
    }

    /// Effective timestamp of output frame `index` (0-based), derived from
    /// the recorded duration rather than the nominal fps.
    pub fn frame_timestamp_ms(&self, index: u64) -> TimestampMs {
        if self.frame_count == 0 {
            return 0;
        }
        index * self.meta.duration_ms / self.frame_count
    }

    /// Actual capture rate implied by duration and frame count.
    pub fn effective_fps(&self) -> f64 {
        if self.meta.duration_ms == 0 {
            return self.meta.fps as f64;
        }
        self.frame_count as f64 * 1000.0 / self.meta.duration_ms as f64
    }
}

fn read_dimensions(dir: &Path) -> RetakeResult<(u32, u32)> {
    let path = dir.join("dimensions.txt");
    let content = std::fs::read_to_string(&path)
        .map_err(|e| RetakeError::input_invalid(format!("cannot read {}: {e}", path.display())))?;
    let content = content.trim();
    let (w, h) = content
        .split_once('x')
        .ok_or_else(|| RetakeError::input_invalid(format!("bad dimensions: {content:?}")))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| RetakeError::input_invalid(format!("bad width in dimensions: {content:?}")))?;
    let height = h.trim().parse().map_err(|_| {
        RetakeError::input_invalid(format!("bad height in dimensions: {content:?}"))
    })?;
    Ok((width, height))
}

fn read_frame_count(dir: &Path) -> RetakeResult<u64> {
    let path = dir.join("frame_count.txt");
    let content = std::fs::read_to_string(&path)
        .map_err(|e| RetakeError::input_invalid(format!("cannot read {}: {e}", path.display())))?;
    content
        .trim()
        .parse()
        .map_err(|_| RetakeError::input_invalid(format!("bad frame count: {:?}", content.trim())))
}

/// Load and merge `events.jsonl` and the optional `window_events.jsonl`,
/// re-sorting by timestamp so focus events interleave correctly.
fn load_events(dir: &Path) -> Vec<RecordingEvent> {
    let mut events = Vec::new();

    for name in ["events.jsonl", "window_events.jsonl"] {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let (mut parsed, discarded) = parse_events_jsonl(&content);
                if discarded > 0 {
                    tracing::warn!("{name}: discarded {discarded} malformed lines");
                }
                events.append(&mut parsed);
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}", path.display());
            }
        }
    }

    events.sort_by_key(|e| e.timestamp());
    events
}
