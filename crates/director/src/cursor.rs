//! Cursor path smoothing.
//!
//! Raw pointer samples carry hand tremor and sensor noise. Each axis is
//! passed through a fast critically damped spring (50 ms half-life) driven
//! by the real inter-sample timestamps, after a pre-gate that freezes
//! sub-threshold jitter without adding latency to deliberate motion.

use retake_recording_model::event::{RecordingEvent, TimestampMs};
use retake_recording_model::geometry::distance;

use crate::spring::Spring;

/// Half-life of the smoothing springs (seconds).
const SMOOTHING_HALF_LIFE: f64 = 0.05;
/// Displacements below this many pixels are treated as tremor.
const JITTER_DISPLACEMENT_PX: f64 = 2.0;
/// Velocities below this many pixels/second are treated as drift.
const JITTER_VELOCITY_PX_PER_S: f64 = 50.0;

/// A timestamped cursor position.
pub type CursorSample = (TimestampMs, f64, f64);

/// Smooth a raw cursor path. The output has the same length and timestamps
/// as the input.
pub fn smooth_cursor_path(raw: &[CursorSample]) -> Vec<CursorSample> {
    if raw.is_empty() {
        return Vec::new();
    }

    let gated = gate_jitter(raw);

    let mut spring_x = Spring::new(gated[0].1);
    let mut spring_y = Spring::new(gated[0].2);
    spring_x.snap(gated[0].1);
    spring_y.snap(gated[0].2);

    let mut result = Vec::with_capacity(gated.len());
    result.push(gated[0]);
    let mut prev_t = gated[0].0;

    for &(t, x, y) in &gated[1..] {
        let dt = t.saturating_sub(prev_t) as f64 / 1000.0;
        prev_t = t;

        spring_x.set_target(x);
        spring_y.set_target(y);
        spring_x.update(SMOOTHING_HALF_LIFE, dt);
        spring_y.update(SMOOTHING_HALF_LIFE, dt);

        result.push((t, spring_x.position, spring_y.position));
    }

    result
}

/// Replace samples whose displacement or velocity falls below the tremor
/// thresholds with the previous (gated) position.
fn gate_jitter(raw: &[CursorSample]) -> Vec<CursorSample> {
    let mut gated = Vec::with_capacity(raw.len());
    let (mut prev_t, mut prev_x, mut prev_y) = raw[0];
    gated.push(raw[0]);

    for &(t, x, y) in &raw[1..] {
        let d = distance((prev_x, prev_y), (x, y));
        let dt = t.saturating_sub(prev_t) as f64 / 1000.0;
        let velocity = if dt > 0.0 { d / dt } else { 0.0 };

        let sample = if d < JITTER_DISPLACEMENT_PX || velocity < JITTER_VELOCITY_PX_PER_S {
            (t, prev_x, prev_y)
        } else {
            (t, x, y)
        };
        (prev_t, prev_x, prev_y) = sample;
        gated.push(sample);
    }

    gated
}

/// Pull raw cursor samples from the event stream (moves and clicks carry
/// positions; a click pins the cursor at its coordinates).
pub fn extract_cursor_path(events: &[RecordingEvent]) -> Vec<CursorSample> {
    events
        .iter()
        .filter_map(|e| match e {
            RecordingEvent::MouseMove { t, x, y } | RecordingEvent::Click { t, x, y, .. } => {
                Some((*t, *x, *y))
            }
            _ => None,
        })
        .collect()
}

/// Cursor position at `time_ms`: the most recent sample at or before the
/// given time, or the first sample before any data exists.
pub fn sample_at(path: &[CursorSample], time_ms: TimestampMs) -> Option<(f64, f64)> {
    if path.is_empty() {
        return None;
    }
    match path.binary_search_by_key(&time_ms, |&(t, _, _)| t) {
        Ok(i) => Some((path[i].1, path[i].2)),
        Err(0) => Some((path[0].1, path[0].2)),
        Err(i) => Some((path[i - 1].1, path[i - 1].2)),
    }
}
