//! Input event types for the recorded event stream.
//!
//! Events are written by the recording collaborator in append-only JSONL
//! format, one event per line, tagged by `type`. Timestamps are milliseconds
//! from recording start; coordinates are source-screen pixels. The stream is
//! globally time-ordered; `mouse_move` is the only high-frequency variant.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Milliseconds since recording start.
pub type TimestampMs = u64;

/// A single recorded input event, discriminated by the `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordingEvent {
    /// Pointer position update.
    MouseMove { t: TimestampMs, x: f64, y: f64 },

    /// Mouse button press.
    Click {
        t: TimestampMs,
        button: MouseButton,
        x: f64,
        y: f64,
    },

    /// Mouse button release.
    ClickRelease {
        t: TimestampMs,
        button: MouseButton,
        x: f64,
        y: f64,
    },

    /// Keyboard key press.
    Key {
        t: TimestampMs,
        key: String,
        #[serde(default)]
        modifiers: Vec<Modifier>,
    },

    /// Scroll wheel event at a pointer position.
    Scroll {
        t: TimestampMs,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
    },

    /// Foreground window change.
    WindowFocus {
        t: TimestampMs,
        title: String,
        rect: Rect,
    },
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

/// Keyboard modifier held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl Modifier {
    /// Display name used in key badge labels.
    pub fn label(&self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Shift => "Shift",
            Modifier::Alt => "Alt",
            Modifier::Meta => "Meta",
        }
    }
}

impl RecordingEvent {
    /// Timestamp of the event.
    pub fn timestamp(&self) -> TimestampMs {
        match self {
            RecordingEvent::MouseMove { t, .. }
            | RecordingEvent::Click { t, .. }
            | RecordingEvent::ClickRelease { t, .. }
            | RecordingEvent::Key { t, .. }
            | RecordingEvent::Scroll { t, .. }
            | RecordingEvent::WindowFocus { t, .. } => *t,
        }
    }

    /// Pointer position, for variants that carry one.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            RecordingEvent::MouseMove { x, y, .. }
            | RecordingEvent::Click { x, y, .. }
            | RecordingEvent::ClickRelease { x, y, .. }
            | RecordingEvent::Scroll { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }

    /// Whether the event marks deliberate user action (everything except
    /// pointer motion and focus bookkeeping). Used for decimation protection
    /// windows.
    pub fn is_significant(&self) -> bool {
        matches!(
            self,
            RecordingEvent::Click { .. }
                | RecordingEvent::ClickRelease { .. }
                | RecordingEvent::Key { .. }
                | RecordingEvent::Scroll { .. }
        )
    }
}

/// Parse a JSONL event stream. Malformed lines are skipped and reported via
/// the returned count; a corrupt line never fails the whole stream.
pub fn parse_events_jsonl(content: &str) -> (Vec<RecordingEvent>, usize) {
    let mut events = Vec::new();
    let mut discarded = 0usize;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RecordingEvent>(line) {
            Ok(event) => events.push(event),
            Err(e) => {
                discarded += 1;
                tracing::warn!("Discarding malformed event line: {e}");
            }
        }
    }

    (events, discarded)
}

/// Serialize events to JSONL format.
pub fn serialize_events(events: &[RecordingEvent]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}
