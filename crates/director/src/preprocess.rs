//! Event preprocessing: pointer decimation and drag inference.
//!
//! Decimation drops sub-threshold mouse moves so that idle detection can
//! operate on natural temporal gaps, while protecting motion around
//! deliberate actions. Drag inference recovers press-move-release spans that
//! the raw stream only records as disconnected events.

use retake_recording_model::event::{MouseButton, RecordingEvent, TimestampMs};
use retake_recording_model::geometry::distance;

/// Minimum pointer travel (px) for a mouse move to survive decimation.
const DECIMATION_DISTANCE_PX: f64 = 3.0;
/// Moves within this window (ms) of a significant event are always kept.
const PROTECTION_WINDOW_MS: u64 = 100;
/// A move after this quiet gap (ms) is kept as a stop position.
const QUIET_GAP_MS: u64 = 200;
/// Cumulative press-to-release path length (px) that classifies a drag.
const DRAG_PATH_THRESHOLD_PX: f64 = 20.0;
/// Fallback displacement threshold (px) when no release was recorded.
const DRAG_FALLBACK_DISPLACEMENT_PX: f64 = 50.0;

/// A press-move-release span inferred from the event stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSpan {
    pub start_t: TimestampMs,
    pub end_t: TimestampMs,
    pub start_pos: (f64, f64),
    pub end_pos: (f64, f64),
}

/// Output of preprocessing: the decimated event list plus inferred drags.
#[derive(Debug, Clone)]
pub struct PreprocessedEvents {
    pub events: Vec<RecordingEvent>,
    pub drags: Vec<DragSpan>,
}

/// Run both preprocessing steps on a raw event stream.
pub fn preprocess(events: &[RecordingEvent]) -> PreprocessedEvents {
    PreprocessedEvents {
        events: decimate_mouse_moves(events, DECIMATION_DISTANCE_PX),
        drags: infer_drags(events),
    }
}

/// Drop mouse moves that carry no information: closer than
/// `distance_threshold` to the last kept move, outside every protection
/// window, and not the first move after a quiet gap. All other event kinds
/// pass through unchanged.
pub fn decimate_mouse_moves(
    events: &[RecordingEvent],
    distance_threshold: f64,
) -> Vec<RecordingEvent> {
    // Sorted timestamps of deliberate actions; binary search gives the
    // protection-window test without materializing per-millisecond sets.
    let significant_times: Vec<TimestampMs> = events
        .iter()
        .filter(|e| e.is_significant())
        .map(|e| e.timestamp())
        .collect();

    let is_protected = |t: TimestampMs| -> bool {
        let from = t.saturating_sub(PROTECTION_WINDOW_MS);
        let idx = significant_times.partition_point(|&s| s < from);
        significant_times
            .get(idx)
            .is_some_and(|&s| s <= t + PROTECTION_WINDOW_MS)
    };

    let mut result = Vec::with_capacity(events.len());
    let mut last_kept: Option<(f64, f64)> = None;
    let mut last_kept_t: TimestampMs = 0;

    for event in events {
        match event {
            RecordingEvent::MouseMove { t, x, y } => {
                let far_enough = match last_kept {
                    None => true,
                    Some(prev) => distance(prev, (*x, *y)) >= distance_threshold,
                };
                let quiet_gap = t.saturating_sub(last_kept_t) >= QUIET_GAP_MS;

                if far_enough || is_protected(*t) || quiet_gap {
                    result.push(event.clone());
                    last_kept = Some((*x, *y));
                    last_kept_t = *t;
                }
            }
            _ => result.push(event.clone()),
        }
    }

    result
}

/// Infer drag spans from Click → MouseMove* → ClickRelease patterns.
///
/// A click with a matching later release qualifies when the cumulative
/// pointer path between them exceeds 20 px. Without a recorded release, a
/// 50 px max-displacement fallback applies, with the search window
/// terminating at the next click.
pub fn infer_drags(events: &[RecordingEvent]) -> Vec<DragSpan> {
    let mut drags = Vec::new();

    for (i, event) in events.iter().enumerate() {
        let RecordingEvent::Click { t, button, x, y } = event else {
            continue;
        };
        if let Some(drag) = scan_drag_window(&events[i + 1..], *t, *button, (*x, *y)) {
            drags.push(drag);
        }
    }

    drags
}

fn scan_drag_window(
    following: &[RecordingEvent],
    press_t: TimestampMs,
    press_button: MouseButton,
    press_pos: (f64, f64),
) -> Option<DragSpan> {
    let mut path_len = 0.0;
    let mut prev_pos = press_pos;
    let mut farthest = (0.0, press_t, press_pos);

    for event in following {
        match event {
            RecordingEvent::MouseMove { t, x, y } => {
                path_len += distance(prev_pos, (*x, *y));
                prev_pos = (*x, *y);

                let displacement = distance(press_pos, (*x, *y));
                if displacement > farthest.0 {
                    farthest = (displacement, *t, (*x, *y));
                }
            }
            RecordingEvent::ClickRelease { t, button, x, y } if *button == press_button => {
                path_len += distance(prev_pos, (*x, *y));
                if path_len > DRAG_PATH_THRESHOLD_PX {
                    return Some(DragSpan {
                        start_t: press_t,
                        end_t: *t,
                        start_pos: press_pos,
                        end_pos: (*x, *y),
                    });
                }
                return None;
            }
            // The next press ends the search window.
            RecordingEvent::Click { .. } => break,
            _ => {}
        }
    }

    // No release recorded: fall back to max displacement.
    let (max_displacement, end_t, end_pos) = farthest;
    if max_displacement > DRAG_FALLBACK_DISPLACEMENT_PX {
        return Some(DragSpan {
            start_t: press_t,
            end_t,
            start_pos: press_pos,
            end_pos,
        });
    }
    None
}
