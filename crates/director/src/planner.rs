//! Anticipatory zoom planning.
//!
//! Converts the scene list plus detected idle spans into sparse keyframes.
//! Because the whole event sequence is known, the camera can begin moving
//! before a scene starts, so that by the scene's first event it has already
//! arrived. The keyframe for a scene is back-dated by three pan half-lives
//! (~87.5% spring convergence).

use retake_common::config::RenderSettings;
use retake_common::error::{RetakeError, RetakeResult};
use retake_recording_model::meta::{RecordingMeta, RecordingMode};
use serde::{Deserialize, Serialize};

use crate::scene::{window_fit_zoom, Scene};

/// How a keyframe transition should feel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Energetic move into a work area (first scene, or return from idle).
    SpringIn,
    /// Relaxed retreat to a wider view.
    SpringOut,
    /// Gentle scene-to-scene glide.
    Smooth,
}

/// Per-keyframe half-life override, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringHint {
    pub zoom_half_life: f64,
    pub pan_half_life: f64,
}

/// A sparse camera control point consumed by the viewport integrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomKeyframe {
    pub time_ms: u64,
    pub target_x: f64,
    pub target_y: f64,
    pub zoom_level: f64,
    pub transition: TransitionKind,
    #[serde(default)]
    pub spring_hint: Option<SpringHint>,
}

/// Base half-lives in seconds, scaled by the animation-speed preset.
pub(crate) mod half_lives {
    /// First scene or zoom-in after an idle-out.
    pub const ZOOM_IN: (f64, f64) = (0.20, 0.20);
    /// Adjacent-scene smooth transition.
    pub const SCENE_TO_SCENE: (f64, f64) = (0.25, 0.25);
    /// Medium-idle retreat to the window level.
    pub const WINDOW_OUT: (f64, f64) = (0.35, 0.30);
    /// Long-idle retreat to the full overview.
    pub const OVERVIEW_OUT: (f64, f64) = (0.40, 0.35);
}

/// Half-lives before a scene to begin moving; 3 half-lives is ~87.5%
/// convergence at the scene's first event.
const ANTICIPATION_HALF_LIVES: f64 = 3.0;
/// Minimum spacing between keyframes (ms).
const MIN_KEYFRAME_INTERVAL_MS: u64 = 200;
/// Idle zoom-outs land this long after the previous scene ends (ms).
const IDLE_ZOOM_OUT_DELAY_MS: u64 = 300;
/// Zoom deltas below this are considered identical during deduplication.
const ZOOM_COLLAPSE_EPSILON: f64 = 0.01;
/// Pan-target deltas below this are considered identical during
/// deduplication (px).
const PAN_COLLAPSE_EPSILON_PX: f64 = 1.0;

/// Generate the keyframe plan for a recording.
///
/// Returns an empty plan when auto-zoom is disabled or no scenes exist; the
/// viewport then stays at identity.
pub fn generate_zoom_plan(
    scenes: &[Scene],
    meta: &RecordingMeta,
    settings: &RenderSettings,
) -> Vec<ZoomKeyframe> {
    if !settings.auto_zoom_enabled || scenes.is_empty() {
        return Vec::new();
    }

    let screen_w = meta.screen_width as f64;
    let screen_h = meta.screen_height as f64;
    let scale = settings.animation_speed.speed_scale();
    let full_screen = meta.recording_mode.is_full_screen();

    let mut plan: Vec<ZoomKeyframe> = Vec::new();

    for (i, scene) in scenes.iter().enumerate() {
        let prev_scene = i.checked_sub(1).map(|p| &scenes[p]);
        let gap_before = prev_scene
            .map(|ps| scene.start_ms.saturating_sub(ps.end_ms))
            .unwrap_or(0);

        // Idle retreat between scenes: long gaps pull all the way out to
        // the overview (full-screen recordings only), medium gaps fall back
        // to the window the user was in.
        let mut idled_out = false;
        if let Some(ps) = prev_scene {
            if gap_before >= settings.overview_idle_ms && full_screen {
                let time_ms = idle_out_time(&plan, ps.end_ms);
                push_keyframe(
                    &mut plan,
                    time_ms,
                    (screen_w / 2.0, screen_h / 2.0),
                    1.0,
                    TransitionKind::SpringOut,
                    half_lives::OVERVIEW_OUT,
                    scale,
                );
                idled_out = true;
            } else if gap_before >= settings.zoom_out_idle_ms {
                if let Some(target) =
                    window_out_target(ps, meta, settings.max_zoom, screen_w, screen_h)
                {
                    let time_ms = idle_out_time(&plan, ps.end_ms);
                    push_keyframe(
                        &mut plan,
                        time_ms,
                        (target.0, target.1),
                        target.2,
                        TransitionKind::SpringOut,
                        half_lives::WINDOW_OUT,
                        scale,
                    );
                    idled_out = true;
                }
            }
        }

        let is_first = prev_scene.is_none();
        let ((zoom_hl, pan_hl), transition) = if is_first || idled_out {
            (half_lives::ZOOM_IN, TransitionKind::SpringIn)
        } else {
            (half_lives::SCENE_TO_SCENE, TransitionKind::Smooth)
        };

        // Anticipation: back-date the keyframe so the spring has converged
        // by the scene's first event. The first scene targets t=0 outright.
        let time_ms = if is_first {
            0
        } else {
            let anticipation_ms = (pan_hl * scale * ANTICIPATION_HALF_LIVES * 1000.0) as u64;
            let anticipated = scene.start_ms.saturating_sub(anticipation_ms);
            let earliest = prev_scene.map_or(0, |ps| ps.end_ms);
            let after_last = plan
                .last()
                .map_or(0, |kf| kf.time_ms + MIN_KEYFRAME_INTERVAL_MS);
            anticipated.max(earliest).max(after_last)
        };

        let zoom_level = match meta.recording_mode {
            // Window mode never zooms past the window overview; the camera
            // follows by panning.
            RecordingMode::Window => scene
                .zoom_level
                .min(window_overview_zoom(meta, settings.max_zoom, screen_w, screen_h)),
            _ => scene.zoom_level,
        };

        push_keyframe(
            &mut plan,
            time_ms,
            (scene.center_x, scene.center_y),
            zoom_level,
            transition,
            (zoom_hl, pan_hl),
            scale,
        );
    }

    // Trailing idle: if the recording keeps running well past the last
    // activity, return to the overview.
    if let Some(last) = scenes.last() {
        let remaining = meta.duration_ms.saturating_sub(last.end_ms);
        if remaining >= settings.overview_idle_ms && full_screen {
            let time_ms = idle_out_time(&plan, last.end_ms);
            push_keyframe(
                &mut plan,
                time_ms,
                (screen_w / 2.0, screen_h / 2.0),
                1.0,
                TransitionKind::SpringOut,
                half_lives::OVERVIEW_OUT,
                scale,
            );
        }
    }

    deduplicate(&mut plan);

    tracing::debug!(
        scenes = scenes.len(),
        keyframes = plan.len(),
        speed = ?settings.animation_speed,
        "Zoom plan generated"
    );

    plan
}

fn push_keyframe(
    plan: &mut Vec<ZoomKeyframe>,
    time_ms: u64,
    target: (f64, f64),
    zoom_level: f64,
    transition: TransitionKind,
    (zoom_hl, pan_hl): (f64, f64),
    scale: f64,
) {
    plan.push(ZoomKeyframe {
        time_ms,
        target_x: target.0,
        target_y: target.1,
        zoom_level,
        transition,
        spring_hint: Some(SpringHint {
            zoom_half_life: zoom_hl * scale,
            pan_half_life: pan_hl * scale,
        }),
    });
}

/// Idle zoom-outs start shortly after the previous scene ends, but never
/// closer than the minimum interval to the last keyframe.
fn idle_out_time(plan: &[ZoomKeyframe], prev_end_ms: u64) -> u64 {
    let desired = prev_end_ms + IDLE_ZOOM_OUT_DELAY_MS;
    let after_last = plan
        .last()
        .map_or(0, |kf| kf.time_ms + MIN_KEYFRAME_INTERVAL_MS);
    desired.max(after_last)
}

/// Target for a medium-idle retreat: the prior scene's window at window-fit
/// zoom. Without a known window rect, full-screen recordings fall back to
/// the overview; otherwise no retreat target exists.
fn window_out_target(
    prev_scene: &Scene,
    meta: &RecordingMeta,
    max_zoom: f64,
    screen_w: f64,
    screen_h: f64,
) -> Option<(f64, f64, f64)> {
    let window = prev_scene.window_rect.or(meta.window_initial_rect);
    if let Some(rect) = window {
        let (cx, cy) = rect.center();
        return Some((cx, cy, window_fit_zoom(&rect, screen_w, screen_h, max_zoom)));
    }
    if meta.recording_mode.is_full_screen() {
        return Some((screen_w / 2.0, screen_h / 2.0, 1.0));
    }
    None
}

/// The widest view Window mode ever shows: the initial window rect fit on
/// screen, or identity if the rect was not recorded.
fn window_overview_zoom(meta: &RecordingMeta, max_zoom: f64, screen_w: f64, screen_h: f64) -> f64 {
    meta.window_initial_rect
        .map(|rect| window_fit_zoom(&rect, screen_w, screen_h, max_zoom))
        .unwrap_or(1.0)
}

/// Drop keyframes that land within the minimum interval of their
/// predecessor (the later one wins), and collapse keyframes that change
/// neither zoom nor pan target measurably.
fn deduplicate(plan: &mut Vec<ZoomKeyframe>) {
    let mut i = 0;
    while i + 1 < plan.len() {
        let dt = plan[i + 1].time_ms.saturating_sub(plan[i].time_ms);
        if dt < MIN_KEYFRAME_INTERVAL_MS {
            plan.remove(i);
            continue;
        }

        let same_zoom =
            (plan[i + 1].zoom_level - plan[i].zoom_level).abs() < ZOOM_COLLAPSE_EPSILON;
        let same_target = (plan[i + 1].target_x - plan[i].target_x).abs()
            < PAN_COLLAPSE_EPSILON_PX
            && (plan[i + 1].target_y - plan[i].target_y).abs() < PAN_COLLAPSE_EPSILON_PX;
        if same_zoom && same_target {
            plan.remove(i + 1);
            continue;
        }

        i += 1;
    }
}

/// Check plan invariants before integration: timestamps must be
/// non-decreasing after deduplication. A violation is a programming error
/// in the planner, surfaced with context.
pub fn validate_plan(plan: &[ZoomKeyframe]) -> RetakeResult<()> {
    for pair in plan.windows(2) {
        if pair[1].time_ms < pair[0].time_ms {
            return Err(RetakeError::internal(format!(
                "keyframes out of order: {} after {}",
                pair[1].time_ms, pair[0].time_ms
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use retake_common::config::AnimationSpeed;
    use retake_recording_model::geometry::Rect;

    fn settings_with_speed(speed: AnimationSpeed) -> RenderSettings {
        RenderSettings {
            animation_speed: speed,
            ..RenderSettings::default()
        }
    }

    fn test_meta(duration_ms: u64) -> RecordingMeta {
        RecordingMeta {
            version: 2,
            id: "test".to_string(),
            screen_width: 1920,
            screen_height: 1080,
            fps: 30,
            duration_ms,
            has_audio: false,
            recording_dir: "test".to_string(),
            recording_mode: RecordingMode::Display,
            window_title: None,
            window_initial_rect: None,
        }
    }

    fn scene(id: u32, start_ms: u64, end_ms: u64, cx: f64, cy: f64, zoom: f64) -> Scene {
        Scene {
            id,
            start_ms,
            end_ms,
            bbox: Rect::new(cx - 180.0, cy - 180.0, 360.0, 360.0),
            center_x: cx,
            center_y: cy,
            zoom_level: zoom,
            window_rect: None,
            event_count: 3,
        }
    }

    #[test]
    fn test_empty_scenes_empty_plan() {
        let plan = generate_zoom_plan(&[], &test_meta(10000), &RenderSettings::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_auto_zoom_disabled_returns_empty_plan() {
        let scenes = vec![scene(0, 500, 500, 500.0, 300.0, 3.0)];
        let settings = RenderSettings {
            auto_zoom_enabled: false,
            ..RenderSettings::default()
        };
        let plan = generate_zoom_plan(&scenes, &test_meta(10000), &settings);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_single_scene_keyframe_at_zero() {
        let scenes = vec![scene(0, 500, 500, 500.0, 300.0, 3.0)];
        let plan = generate_zoom_plan(&scenes, &test_meta(3000), &RenderSettings::default());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].time_ms, 0);
        assert_eq!(plan[0].target_x, 500.0);
        assert_eq!(plan[0].target_y, 300.0);
        assert_eq!(plan[0].zoom_level, 3.0);
        assert_eq!(plan[0].transition, TransitionKind::SpringIn);
    }

    #[test]
    fn test_adjacent_scenes_anticipated_smooth_transition() {
        // Scenario: clicks at t=0 and t=3000; gap below the idle threshold.
        let scenes = vec![
            scene(0, 0, 0, 500.0, 300.0, 3.0),
            scene(1, 3000, 3000, 1500.0, 800.0, 3.0),
        ];
        let plan = generate_zoom_plan(&scenes, &test_meta(4000), &RenderSettings::default());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].time_ms, 0);
        // pan half-life 0.25s at Mellow: 3000 - 3*250 = 2250.
        assert_eq!(plan[1].time_ms, 2250);
        assert_eq!(plan[1].transition, TransitionKind::Smooth);
    }

    #[test]
    fn test_long_idle_inserts_overview_and_springs_back_in() {
        // Scenario: clicks at t=500 and t=15000 in Display mode.
        let scenes = vec![
            scene(0, 500, 500, 500.0, 300.0, 3.0),
            scene(1, 15000, 15000, 1500.0, 800.0, 3.0),
        ];
        let plan = generate_zoom_plan(&scenes, &test_meta(16000), &RenderSettings::default());
        assert_eq!(plan.len(), 3);

        assert_eq!(plan[0].time_ms, 0);
        assert_eq!(plan[0].transition, TransitionKind::SpringIn);

        // Overview retreat lands shortly after scene #1 ends.
        assert_eq!(plan[1].transition, TransitionKind::SpringOut);
        assert_eq!(plan[1].time_ms, 800);
        assert_eq!(plan[1].target_x, 960.0);
        assert_eq!(plan[1].target_y, 540.0);
        assert_eq!(plan[1].zoom_level, 1.0);

        // Return keyframe anticipates the second scene by 3 pan half-lives
        // of the zoom-in table entry (0.20s): 15000 - 600.
        assert_eq!(plan[2].time_ms, 14400);
        assert_eq!(plan[2].transition, TransitionKind::SpringIn);
    }

    #[test]
    fn test_medium_idle_retreats_to_window_level() {
        let window = Rect::new(100.0, 100.0, 800.0, 600.0);
        let mut first = scene(0, 0, 500, 500.0, 400.0, 3.0);
        first.window_rect = Some(window);
        let scenes = vec![first, scene(1, 6500, 7000, 1500.0, 800.0, 3.0)];

        let plan = generate_zoom_plan(&scenes, &test_meta(8000), &RenderSettings::default());
        assert_eq!(plan.len(), 3);

        let retreat = &plan[1];
        assert_eq!(retreat.transition, TransitionKind::SpringOut);
        assert_eq!(retreat.target_x, 500.0);
        assert_eq!(retreat.target_y, 400.0);
        assert!(retreat.zoom_level > 1.0 && retreat.zoom_level < 3.0);

        // The scene after an idle-out springs in rather than gliding.
        assert_eq!(plan[2].transition, TransitionKind::SpringIn);
    }

    #[test]
    fn test_non_display_mode_suppresses_overview() {
        let mut meta = test_meta(20000);
        meta.recording_mode = RecordingMode::Area;
        let scenes = vec![
            scene(0, 0, 500, 500.0, 300.0, 2.0),
            // 14.5s gap: would be an overview retreat in Display mode.
            scene(1, 15000, 15500, 1500.0, 800.0, 2.0),
        ];
        let plan = generate_zoom_plan(&scenes, &meta, &RenderSettings::default());
        assert!(
            plan.iter().all(|kf| kf.zoom_level > 1.0),
            "area recordings must not zoom out to 1.0"
        );
    }

    #[test]
    fn test_window_mode_clamps_scene_zoom_to_window_overview() {
        let mut meta = test_meta(10000);
        meta.recording_mode = RecordingMode::Window;
        meta.window_initial_rect = Some(Rect::new(100.0, 100.0, 800.0, 600.0));
        let scenes = vec![scene(0, 500, 500, 500.0, 400.0, 3.0)];

        let plan = generate_zoom_plan(&scenes, &meta, &RenderSettings::default());
        let overview = window_fit_zoom(
            &Rect::new(100.0, 100.0, 800.0, 600.0),
            1920.0,
            1080.0,
            3.0,
        );
        assert!((plan[0].zoom_level - overview).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_idle_returns_to_overview() {
        let scenes = vec![scene(0, 0, 2000, 500.0, 300.0, 2.5)];
        let plan = generate_zoom_plan(&scenes, &test_meta(30000), &RenderSettings::default());
        assert_eq!(plan.len(), 2);
        let last = plan.last().unwrap();
        assert_eq!(last.transition, TransitionKind::SpringOut);
        assert_eq!(last.zoom_level, 1.0);
        assert_eq!(last.time_ms, 2300);
    }

    #[test]
    fn test_no_trailing_overview_for_short_tail() {
        let scenes = vec![scene(0, 0, 2000, 500.0, 300.0, 2.5)];
        let plan = generate_zoom_plan(&scenes, &test_meta(5000), &RenderSettings::default());
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_speed_preset_scales_half_lives_and_anticipation() {
        let scenes = vec![
            scene(0, 0, 0, 500.0, 300.0, 3.0),
            scene(1, 3000, 3000, 1500.0, 800.0, 3.0),
        ];
        let plan = generate_zoom_plan(
            &scenes,
            &test_meta(4000),
            &settings_with_speed(AnimationSpeed::Rapid),
        );
        // Rapid halves the half-lives: anticipation is 3*125ms = 375ms.
        assert_eq!(plan[1].time_ms, 2625);
        let hint = plan[1].spring_hint.unwrap();
        assert!((hint.pan_half_life - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_plan_is_time_monotonic() {
        let scenes: Vec<Scene> = (0..8)
            .map(|i| {
                let t = i as u64 * 2500;
                scene(i, t, t + 800, 200.0 + i as f64 * 200.0, 500.0, 2.0)
            })
            .collect();
        let plan = generate_zoom_plan(&scenes, &test_meta(30000), &RenderSettings::default());
        assert!(validate_plan(&plan).is_ok());
        for pair in plan.windows(2) {
            assert!(pair[1].time_ms >= pair[0].time_ms + MIN_KEYFRAME_INTERVAL_MS);
        }
    }

    #[test]
    fn test_dedup_collapses_identical_targets() {
        let mut plan = vec![
            ZoomKeyframe {
                time_ms: 0,
                target_x: 500.0,
                target_y: 300.0,
                zoom_level: 2.0,
                transition: TransitionKind::SpringIn,
                spring_hint: None,
            },
            ZoomKeyframe {
                time_ms: 1000,
                target_x: 500.2,
                target_y: 300.3,
                zoom_level: 2.005,
                transition: TransitionKind::Smooth,
                spring_hint: None,
            },
            ZoomKeyframe {
                time_ms: 2000,
                target_x: 900.0,
                target_y: 300.0,
                zoom_level: 2.0,
                transition: TransitionKind::Smooth,
                spring_hint: None,
            },
        ];
        deduplicate(&mut plan);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].target_x, 900.0);
    }

    #[test]
    fn test_dedup_keeps_later_of_crowded_pair() {
        let mut plan = vec![
            ZoomKeyframe {
                time_ms: 1000,
                target_x: 100.0,
                target_y: 100.0,
                zoom_level: 2.0,
                transition: TransitionKind::Smooth,
                spring_hint: None,
            },
            ZoomKeyframe {
                time_ms: 1100,
                target_x: 900.0,
                target_y: 900.0,
                zoom_level: 2.5,
                transition: TransitionKind::Smooth,
                spring_hint: None,
            },
        ];
        deduplicate(&mut plan);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].time_ms, 1100);
    }

    #[test]
    fn test_validate_plan_flags_disorder() {
        let plan = vec![
            ZoomKeyframe {
                time_ms: 1000,
                target_x: 0.0,
                target_y: 0.0,
                zoom_level: 1.5,
                transition: TransitionKind::Smooth,
                spring_hint: None,
            },
            ZoomKeyframe {
                time_ms: 500,
                target_x: 0.0,
                target_y: 0.0,
                zoom_level: 1.5,
                transition: TransitionKind::Smooth,
                spring_hint: None,
            },
        ];
        assert!(validate_plan(&plan).is_err());
    }
}
