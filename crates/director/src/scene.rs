//! Scene splitting: partition activity points into user-intent scenes.
//!
//! A scene is a maximal time interval of semantically related activity,
//! characterized by a bounding box and a derived zoom level. Splitting is
//! global: the whole event stream is known before any boundary is chosen.
//!
//! The stages are: activity point extraction, temporal/window grouping,
//! spatial sub-splitting of oversized groups, per-scene field derivation,
//! and a final merge of consecutive scenes with nearby centers.

use retake_recording_model::event::{RecordingEvent, TimestampMs};
use retake_recording_model::geometry::{distance, Rect};
use serde::{Deserialize, Serialize};

/// Minimum idle gap that starts a new scene (ms).
const SCENE_GAP_MS: u64 = 1500;
/// Corner tolerance when comparing window rectangles (px); absorbs minor
/// UI chrome movement.
const WINDOW_RECT_TOLERANCE_PX: f64 = 50.0;
/// Padding around a scene bounding box (px).
const BBOX_PADDING_PX: f64 = 80.0;
/// Minimum bounding box dimension before padding (px).
const MIN_BBOX_SIZE_PX: f64 = 200.0;
/// Maximum fraction of screen area a padded bbox may cover before the
/// group is split spatially.
const MAX_BBOX_SCREEN_FRACTION: f64 = 0.5;
/// Interior split requires at least this time gap (ms)...
const SUB_SPLIT_TIME_GAP_MS: u64 = 500;
/// ...and at least this spatial distance (px) between successive points.
const SUB_SPLIT_DISTANCE_PX: f64 = 400.0;
/// Window for attributing key presses to a preceding click (ms).
const RECENT_CLICK_WINDOW_MS: u64 = 2000;
/// Maximum center distance to merge consecutive scenes (px).
const MERGE_CENTER_DISTANCE_PX: f64 = 150.0;
/// Floor for scene zoom levels: a scene always zooms in at least this much.
const MIN_SCENE_ZOOM: f64 = 1.2;
/// Relative padding when fitting a window rect on screen.
const WINDOW_FIT_PADDING: f64 = 0.05;

/// A period of continuous user activity with a defined spatial focus area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: u32,
    pub start_ms: TimestampMs,
    pub end_ms: TimestampMs,
    pub bbox: Rect,
    pub center_x: f64,
    pub center_y: f64,
    pub zoom_level: f64,
    /// Most common window rectangle among member points, if any.
    pub window_rect: Option<Rect>,
    pub event_count: usize,
}

/// Time-and-place projection of one semantically meaningful event.
#[derive(Debug, Clone)]
pub struct ActivityPoint {
    pub time_ms: TimestampMs,
    pub x: f64,
    pub y: f64,
    /// Active window rectangle when the event occurred.
    pub window_rect: Option<Rect>,
    /// Spatial extent the point stands for, beyond its position. Key events
    /// placed at a window center carry the window rect here so the scene
    /// frames the window the user is typing into, not a point.
    pub extent: Option<Rect>,
}

/// Project events onto activity points.
///
/// Clicks, releases, and scrolls carry their own coordinates. Key presses
/// use the position of a click within the last 2 s (the "click a field then
/// type" pattern), else the active window center (the "terminal" pattern),
/// else they are discarded. Window-focus events produce no point but update
/// the active window rectangle.
pub fn extract_activity_points(events: &[RecordingEvent]) -> Vec<ActivityPoint> {
    let mut points = Vec::new();
    let mut active_window: Option<Rect> = None;
    let mut last_click: Option<(f64, f64, TimestampMs)> = None;

    for event in events {
        match event {
            RecordingEvent::Click { t, x, y, .. } => {
                points.push(ActivityPoint {
                    time_ms: *t,
                    x: *x,
                    y: *y,
                    window_rect: active_window,
                    extent: None,
                });
                last_click = Some((*x, *y, *t));
            }
            RecordingEvent::ClickRelease { t, x, y, .. }
            | RecordingEvent::Scroll { t, x, y, .. } => {
                points.push(ActivityPoint {
                    time_ms: *t,
                    x: *x,
                    y: *y,
                    window_rect: active_window,
                    extent: None,
                });
            }
            RecordingEvent::Key { t, .. } => {
                let recent_click = last_click
                    .filter(|(_, _, ct)| t.saturating_sub(*ct) < RECENT_CLICK_WINDOW_MS)
                    .map(|(cx, cy, _)| (cx, cy));

                if let Some((x, y)) = recent_click {
                    points.push(ActivityPoint {
                        time_ms: *t,
                        x,
                        y,
                        window_rect: active_window,
                        extent: None,
                    });
                } else if let Some(window) = active_window {
                    let (cx, cy) = window.center();
                    points.push(ActivityPoint {
                        time_ms: *t,
                        x: cx,
                        y: cy,
                        window_rect: active_window,
                        extent: Some(window),
                    });
                }
                // No click and no window: nowhere reliable to place the key.
            }
            RecordingEvent::WindowFocus { rect, .. } => {
                active_window = Some(*rect);
            }
            RecordingEvent::MouseMove { .. } => {}
        }
    }

    points
}

/// Split events into scenes. Total: empty events yield an empty list;
/// pathological inputs degrade to a single scene.
pub fn split_into_scenes(
    events: &[RecordingEvent],
    screen_w: f64,
    screen_h: f64,
    max_zoom: f64,
) -> Vec<Scene> {
    let points = extract_activity_points(events);
    if points.is_empty() {
        return Vec::new();
    }

    // Temporal/window grouping: one open group, closed on an idle gap or a
    // meaningful window change.
    let mut groups: Vec<Vec<&ActivityPoint>> = Vec::new();
    let mut current: Vec<&ActivityPoint> = vec![&points[0]];

    for window in points.windows(2) {
        let (prev, next) = (&window[0], &window[1]);
        let time_gap = next.time_ms.saturating_sub(prev.time_ms);
        let window_changed = !window_rects_match(&prev.window_rect, &next.window_rect);

        if time_gap >= SCENE_GAP_MS || window_changed {
            groups.push(std::mem::take(&mut current));
        }
        current.push(next);
    }
    groups.push(current);

    // Spatial sub-splitting, then scene construction.
    let mut scenes = Vec::new();
    let mut next_id = 0u32;
    for group in &groups {
        split_oversized_group(group, screen_w, screen_h, max_zoom, &mut next_id, &mut scenes);
    }

    merge_nearby_scenes(&mut scenes, screen_w, screen_h, max_zoom);

    tracing::debug!(
        points = points.len(),
        scenes = scenes.len(),
        "Scene splitting complete"
    );

    scenes
}

fn window_rects_match(a: &Option<Rect>, b: &Option<Rect>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.approx_eq(b, WINDOW_RECT_TOLERANCE_PX),
        _ => false,
    }
}

/// Recursively split a group whose padded bbox covers more than half the
/// screen, cutting at the first interior gap that is both slow (≥ 500 ms)
/// and far (≥ 400 px). Groups with no such gap stay whole.
fn split_oversized_group(
    points: &[&ActivityPoint],
    screen_w: f64,
    screen_h: f64,
    max_zoom: f64,
    next_id: &mut u32,
    out: &mut Vec<Scene>,
) {
    let bbox = compute_bbox(points);
    let over_cap = bbox.area() > screen_w * screen_h * MAX_BBOX_SCREEN_FRACTION;

    let cut = over_cap.then(|| find_split_point(points)).flatten();

    match cut {
        Some(idx) => {
            split_oversized_group(&points[..idx], screen_w, screen_h, max_zoom, next_id, out);
            split_oversized_group(&points[idx..], screen_w, screen_h, max_zoom, next_id, out);
        }
        None => {
            out.push(make_scene(points, screen_w, screen_h, max_zoom, *next_id));
            *next_id += 1;
        }
    }
}

fn find_split_point(points: &[&ActivityPoint]) -> Option<usize> {
    (1..points.len()).find(|&i| {
        let prev = points[i - 1];
        let next = points[i];
        let time_gap = next.time_ms.saturating_sub(prev.time_ms);
        let spatial = distance((prev.x, prev.y), (next.x, next.y));
        time_gap >= SUB_SPLIT_TIME_GAP_MS && spatial >= SUB_SPLIT_DISTANCE_PX
    })
}

/// Padded bounding box over point positions and extents.
fn compute_bbox(points: &[&ActivityPoint]) -> Rect {
    if points.is_empty() {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    }

    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;

    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
        if let Some(extent) = &p.extent {
            min_x = min_x.min(extent.x);
            max_x = max_x.max(extent.right());
            min_y = min_y.min(extent.y);
            max_y = max_y.max(extent.bottom());
        }
    }

    let raw_w = max_x - min_x;
    let raw_h = max_y - min_y;
    let w = raw_w.max(MIN_BBOX_SIZE_PX);
    let h = raw_h.max(MIN_BBOX_SIZE_PX);
    let cx = min_x + raw_w / 2.0;
    let cy = min_y + raw_h / 2.0;

    Rect::new(
        cx - w / 2.0 - BBOX_PADDING_PX,
        cy - h / 2.0 - BBOX_PADDING_PX,
        w + BBOX_PADDING_PX * 2.0,
        h + BBOX_PADDING_PX * 2.0,
    )
}

fn make_scene(
    points: &[&ActivityPoint],
    screen_w: f64,
    screen_h: f64,
    max_zoom: f64,
    id: u32,
) -> Scene {
    let bbox = compute_bbox(points);
    let (center_x, center_y) = bbox.center();

    Scene {
        id,
        start_ms: points.first().map(|p| p.time_ms).unwrap_or(0),
        end_ms: points.last().map(|p| p.time_ms).unwrap_or(0),
        zoom_level: scene_zoom(&bbox, screen_w, screen_h, max_zoom),
        window_rect: most_common_window_rect(points),
        event_count: points.len(),
        bbox,
        center_x,
        center_y,
    }
}

/// Zoom that fits the bbox on screen, clamped to [1.2, max_zoom].
fn scene_zoom(bbox: &Rect, screen_w: f64, screen_h: f64, max_zoom: f64) -> f64 {
    let zoom_w = screen_w / bbox.width.max(1.0);
    let zoom_h = screen_h / bbox.height.max(1.0);
    zoom_w.min(zoom_h).clamp(MIN_SCENE_ZOOM, max_zoom.max(MIN_SCENE_ZOOM))
}

/// Zoom that fits a window rectangle on screen with 5% padding, clamped to
/// [1.0, max_zoom]. Used for idle fallback targets and Window mode.
pub fn window_fit_zoom(window: &Rect, screen_w: f64, screen_h: f64, max_zoom: f64) -> f64 {
    let padded_w = window.width * (1.0 + WINDOW_FIT_PADDING * 2.0);
    let padded_h = window.height * (1.0 + WINDOW_FIT_PADDING * 2.0);
    let zoom_w = screen_w / padded_w.max(1.0);
    let zoom_h = screen_h / padded_h.max(1.0);
    zoom_w.min(zoom_h).clamp(1.0, max_zoom.max(1.0))
}

fn most_common_window_rect(points: &[&ActivityPoint]) -> Option<Rect> {
    let mut counts: Vec<(Rect, usize)> = Vec::new();
    for p in points {
        let Some(rect) = &p.window_rect else { continue };
        match counts.iter_mut().find(|(r, _)| r == rect) {
            Some((_, n)) => *n += 1,
            None => counts.push((*rect, 1)),
        }
    }
    counts.into_iter().max_by_key(|(_, n)| *n).map(|(r, _)| r)
}

/// Merge consecutive scenes whose centers are within 150 px: the camera has
/// nowhere meaningful to move between them.
fn merge_nearby_scenes(scenes: &mut Vec<Scene>, screen_w: f64, screen_h: f64, max_zoom: f64) {
    if scenes.len() < 2 {
        return;
    }

    let mut merged: Vec<Scene> = Vec::with_capacity(scenes.len());
    for scene in scenes.drain(..) {
        let Some(prev) = merged.last_mut() else {
            merged.push(scene);
            continue;
        };

        let dist = distance(
            (prev.center_x, prev.center_y),
            (scene.center_x, scene.center_y),
        );
        if dist > MERGE_CENTER_DISTANCE_PX {
            merged.push(scene);
            continue;
        }

        prev.bbox = prev.bbox.union(&scene.bbox);
        let (cx, cy) = prev.bbox.center();
        prev.center_x = cx;
        prev.center_y = cy;
        prev.end_ms = scene.end_ms;
        prev.zoom_level = scene_zoom(&prev.bbox, screen_w, screen_h, max_zoom);
        prev.event_count += scene.event_count;
        if prev.window_rect.is_none() {
            prev.window_rect = scene.window_rect;
        }
    }

    for (i, scene) in merged.iter_mut().enumerate() {
        scene.id = i as u32;
    }
    *scenes = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use retake_recording_model::event::MouseButton;

    fn click(t: u64, x: f64, y: f64) -> RecordingEvent {
        RecordingEvent::Click {
            t,
            button: MouseButton::Left,
            x,
            y,
        }
    }

    fn key(t: u64) -> RecordingEvent {
        RecordingEvent::Key {
            t,
            key: "A".to_string(),
            modifiers: vec![],
        }
    }

    fn focus(t: u64, rect: Rect) -> RecordingEvent {
        RecordingEvent::WindowFocus {
            t,
            title: "win".to_string(),
            rect,
        }
    }

    #[test]
    fn test_empty_events_yield_no_scenes() {
        assert!(split_into_scenes(&[], 1920.0, 1080.0, 3.0).is_empty());
    }

    #[test]
    fn test_single_click_scene() {
        let events = vec![click(500, 500.0, 300.0)];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 1);
        let scene = &scenes[0];
        assert_eq!(scene.start_ms, 500);
        assert_eq!(scene.end_ms, 500);
        assert_eq!(scene.event_count, 1);
        assert!((scene.center_x - 500.0).abs() < 1.0);
        assert!((scene.center_y - 300.0).abs() < 1.0);
        // Minimum bbox is 360px padded; 1920/360 > 3.0 clamps to max_zoom.
        assert_eq!(scene.zoom_level, 3.0);
    }

    #[test]
    fn test_idle_gap_splits_scenes() {
        let events = vec![
            click(0, 500.0, 300.0),
            click(500, 520.0, 310.0),
            click(6500, 1400.0, 800.0),
            click(7000, 1410.0, 810.0),
        ];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].id, 0);
        assert_eq!(scenes[1].id, 1);
        assert!(scenes[0].end_ms <= scenes[1].start_ms);
    }

    #[test]
    fn test_window_change_splits_scenes() {
        let events = vec![
            focus(0, Rect::new(0.0, 0.0, 900.0, 900.0)),
            click(100, 400.0, 400.0),
            // New window far away; only 400ms later but a different rect.
            focus(500, Rect::new(1000.0, 100.0, 900.0, 900.0)),
            click(600, 1400.0, 500.0),
        ];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 2);
    }

    #[test]
    fn test_minor_window_movement_does_not_split() {
        let events = vec![
            focus(0, Rect::new(100.0, 100.0, 800.0, 600.0)),
            click(100, 400.0, 400.0),
            // Same window dragged by a few pixels.
            focus(500, Rect::new(120.0, 110.0, 800.0, 600.0)),
            click(600, 420.0, 410.0),
        ];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].event_count, 2);
    }

    #[test]
    fn test_keys_use_recent_click_position() {
        let events = vec![click(0, 500.0, 300.0), key(200), key(400), key(600)];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].event_count, 4);
        assert!((scenes[0].center_x - 500.0).abs() < 1.0);
    }

    #[test]
    fn test_keys_fall_back_to_window_center() {
        let events = vec![
            focus(0, Rect::new(100.0, 100.0, 800.0, 600.0)),
            key(3000),
            key(3200),
            key(3500),
        ];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 1);
        let scene = &scenes[0];
        assert!((scene.center_x - 500.0).abs() < 1.0);
        assert!((scene.center_y - 400.0).abs() < 1.0);
        // The scene frames the whole window, so the zoom is window-fit
        // level rather than the point-scene maximum.
        assert!(scene.zoom_level < 2.0, "got {}", scene.zoom_level);
        assert!(scene.zoom_level >= 1.2);
    }

    #[test]
    fn test_keys_without_click_or_window_are_discarded() {
        let events = vec![key(3000), key(3200)];
        assert!(split_into_scenes(&events, 1920.0, 1080.0, 3.0).is_empty());
    }

    #[test]
    fn test_stale_click_does_not_position_keys() {
        // Click 5s before the key press: outside the 2s window, no focus
        // rect either, so the keys are dropped.
        let events = vec![click(0, 500.0, 300.0), key(5000), key(5200)];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].event_count, 1);
    }

    #[test]
    fn test_oversized_group_splits_spatially() {
        let events = vec![
            click(0, 100.0, 100.0),
            click(200, 120.0, 110.0),
            // 600ms gap and ~1900px jump inside one temporal group.
            click(800, 1800.0, 950.0),
            click(1000, 1820.0, 960.0),
        ];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 2);
        assert!(scenes[0].center_x < scenes[1].center_x);
    }

    #[test]
    fn test_fast_jump_stays_one_scene() {
        // Far apart but only 100ms apart: no interior split point, single
        // wide scene at reduced zoom.
        let events = vec![click(0, 100.0, 100.0), click(100, 1800.0, 950.0)];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 1);
        assert!(scenes[0].zoom_level >= 1.2);
    }

    #[test]
    fn test_zoom_range_invariant() {
        let events = vec![click(0, 10.0, 10.0), click(100, 1900.0, 1070.0)];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        for scene in &scenes {
            assert!(scene.zoom_level >= 1.2);
            assert!(scene.zoom_level <= 3.0);
        }
    }

    #[test]
    fn test_nearby_scenes_merge() {
        let events = vec![
            click(0, 500.0, 300.0),
            click(200, 510.0, 310.0),
            // Idle gap, then activity in almost the same spot.
            click(2000, 530.0, 320.0),
            click(2200, 540.0, 330.0),
        ];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].event_count, 4);
        assert_eq!(scenes[0].start_ms, 0);
        assert_eq!(scenes[0].end_ms, 2200);
    }

    #[test]
    fn test_scene_coverage_and_disjointness() {
        let events = vec![
            click(0, 200.0, 200.0),
            click(400, 220.0, 210.0),
            click(3000, 1500.0, 800.0),
            click(3400, 1520.0, 820.0),
            click(8000, 300.0, 900.0),
        ];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        let points = extract_activity_points(&events);

        for point in &points {
            let containing = scenes
                .iter()
                .filter(|s| s.start_ms <= point.time_ms && point.time_ms <= s.end_ms)
                .count();
            assert_eq!(containing, 1, "point at {} not uniquely owned", point.time_ms);
        }
        for pair in scenes.windows(2) {
            assert!(pair[0].end_ms < pair[1].start_ms);
        }
    }

    #[test]
    fn test_splitting_is_deterministic_and_stable() {
        let events = vec![
            click(0, 200.0, 200.0),
            click(400, 220.0, 210.0),
            click(3000, 1500.0, 800.0),
        ];
        let first = split_into_scenes(&events, 1920.0, 1080.0, 3.0);

        // Re-project the scene members through extraction and split again:
        // boundaries and boxes must be unchanged.
        let reprojected: Vec<RecordingEvent> = extract_activity_points(&events)
            .iter()
            .map(|p| click(p.time_ms, p.x, p.y))
            .collect();
        let second = split_into_scenes(&reprojected, 1920.0, 1080.0, 3.0);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.start_ms, b.start_ms);
            assert_eq!(a.end_ms, b.end_ms);
            assert_eq!(a.bbox, b.bbox);
            assert_eq!(a.zoom_level, b.zoom_level);
        }
    }

    #[test]
    fn test_window_fit_zoom_range() {
        let window = Rect::new(100.0, 100.0, 800.0, 600.0);
        let zoom = window_fit_zoom(&window, 1920.0, 1080.0, 3.0);
        assert!(zoom > 1.0 && zoom <= 3.0, "got {zoom}");

        let huge = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        assert_eq!(window_fit_zoom(&huge, 1920.0, 1080.0, 3.0), 1.0);
    }

    #[test]
    fn test_most_common_window_rect_wins() {
        let a = Rect::new(0.0, 0.0, 500.0, 500.0);
        // Same window nudged by a few pixels: within tolerance, so the
        // group stays open and holds a mix of rects.
        let a_nudged = Rect::new(10.0, 5.0, 500.0, 500.0);
        let events = vec![
            focus(0, a),
            click(100, 200.0, 200.0),
            click(300, 210.0, 210.0),
            focus(400, a_nudged),
            click(450, 220.0, 215.0),
        ];
        let scenes = split_into_scenes(&events, 1920.0, 1080.0, 3.0);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].window_rect, Some(a));
    }
}
