//! End-to-end scenarios for the analysis pipeline: events in, scenes and
//! keyframes out, springs integrated over synthetic frame clocks.

use retake_common::config::RenderSettings;
use retake_director::planner::{generate_zoom_plan, validate_plan, TransitionKind};
use retake_director::preprocess::preprocess;
use retake_director::scene::split_into_scenes;
use retake_director::viewport::ViewportIntegrator;
use retake_recording_model::event::{MouseButton, RecordingEvent};
use retake_recording_model::geometry::Rect;
use retake_recording_model::meta::{RecordingMeta, RecordingMode};

fn meta(duration_ms: u64) -> RecordingMeta {
    RecordingMeta {
        version: 2,
        id: "scenario".to_string(),
        screen_width: 1920,
        screen_height: 1080,
        fps: 30,
        duration_ms,
        has_audio: false,
        recording_dir: "scenario".to_string(),
        recording_mode: RecordingMode::Display,
        window_title: None,
        window_initial_rect: None,
    }
}

fn click(t: u64, x: f64, y: f64) -> RecordingEvent {
    RecordingEvent::Click {
        t,
        button: MouseButton::Left,
        x,
        y,
    }
}

fn mv(t: u64, x: f64, y: f64) -> RecordingEvent {
    RecordingEvent::MouseMove { t, x, y }
}

fn plan_for(events: &[RecordingEvent], meta: &RecordingMeta) -> Vec<retake_director::ZoomKeyframe> {
    let settings = RenderSettings::default();
    let preprocessed = preprocess(events);
    let scenes = split_into_scenes(&preprocessed.events, 1920.0, 1080.0, settings.max_zoom);
    generate_zoom_plan(&scenes, meta, &settings)
}

#[test]
fn empty_events_render_at_identity() {
    let meta = meta(10000);
    let plan = plan_for(&[], &meta);
    assert!(plan.is_empty());

    let mut vp = ViewportIntegrator::new(1920.0, 1080.0, plan);
    for i in 0..300u64 {
        let rect = vp.advance_to(i * 33, 1.0 / 30.0);
        assert_eq!(rect.zoom, 1.0);
        assert_eq!((rect.x, rect.y), (0.0, 0.0));
    }
}

#[test]
fn single_click_scene_zooms_from_frame_zero() {
    let meta = meta(3000);
    let plan = plan_for(&[click(500, 500.0, 300.0)], &meta);

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].time_ms, 0);
    assert!((plan[0].target_x - 500.0).abs() < 1.0);
    assert!((plan[0].target_y - 300.0).abs() < 1.0);
    // Minimum padded bbox on a 1920x1080 screen clamps to max_zoom.
    assert_eq!(plan[0].zoom_level, 3.0);
    assert_eq!(plan[0].transition, TransitionKind::SpringIn);
}

#[test]
fn two_close_scenes_get_anticipated_smooth_handoff() {
    let meta = meta(4000);
    let plan = plan_for(&[click(0, 500.0, 300.0), click(3000, 1500.0, 800.0)], &meta);

    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].time_ms, 0);
    // max(3000 - 3*250ms, end of scene #1, 200ms floor) = 2250.
    assert_eq!(plan[1].time_ms, 2250);
    assert_eq!(plan[1].transition, TransitionKind::Smooth);
}

#[test]
fn long_idle_pulls_back_to_overview_then_springs_in() {
    let meta = meta(16000);
    let plan = plan_for(&[click(500, 500.0, 300.0), click(15000, 1500.0, 800.0)], &meta);

    assert_eq!(plan.len(), 3);
    assert_eq!(plan[0].time_ms, 0);
    assert_eq!(plan[0].transition, TransitionKind::SpringIn);

    assert_eq!(plan[1].transition, TransitionKind::SpringOut);
    assert!((500..=1500).contains(&plan[1].time_ms));
    assert_eq!((plan[1].target_x, plan[1].target_y), (960.0, 540.0));
    assert_eq!(plan[1].zoom_level, 1.0);

    assert_eq!(plan[2].time_ms, 14400);
    assert_eq!(plan[2].transition, TransitionKind::SpringIn);
}

#[test]
fn terminal_typing_frames_the_focused_window() {
    let meta = meta(6000);
    let events = vec![
        RecordingEvent::WindowFocus {
            t: 0,
            title: "Terminal".to_string(),
            rect: Rect::new(100.0, 100.0, 800.0, 600.0),
        },
        RecordingEvent::Key {
            t: 3000,
            key: "L".to_string(),
            modifiers: vec![],
        },
        RecordingEvent::Key {
            t: 3250,
            key: "S".to_string(),
            modifiers: vec![],
        },
        RecordingEvent::Key {
            t: 3500,
            key: "Enter".to_string(),
            modifiers: vec![],
        },
    ];
    let plan = plan_for(&events, &meta);

    assert!(!plan.is_empty());
    assert_eq!(plan[0].time_ms, 0);
    assert!((plan[0].target_x - 500.0).abs() < 1.0);
    assert!((plan[0].target_y - 400.0).abs() < 1.0);
    // Window-fit level, not the point-scene maximum.
    assert!(plan[0].zoom_level > 1.0 && plan[0].zoom_level < 2.0);
}

#[test]
fn drag_inference_scenario() {
    let events = vec![
        click(100, 200.0, 200.0),
        mv(300, 240.0, 205.0),
        mv(500, 262.0, 212.0),
        mv(700, 276.0, 218.0),
        RecordingEvent::ClickRelease {
            t: 800,
            button: MouseButton::Left,
            x: 280.0,
            y: 220.0,
        },
    ];
    let preprocessed = preprocess(&events);
    assert_eq!(preprocessed.drags.len(), 1);
    let drag = &preprocessed.drags[0];
    assert_eq!(drag.start_t, 100);
    assert_eq!(drag.end_t, 800);
    assert_eq!(drag.start_pos, (200.0, 200.0));
    assert_eq!(drag.end_pos, (280.0, 220.0));
}

#[test]
fn decimation_preserves_every_significant_event() {
    let mut events = vec![];
    for i in 0..200u64 {
        events.push(mv(i * 10, 100.0 + (i % 3) as f64 * 0.4, 100.0));
    }
    events.push(click(2500, 400.0, 400.0));
    events.push(RecordingEvent::Scroll {
        t: 2600,
        x: 400.0,
        y: 400.0,
        dx: 0.0,
        dy: -2.0,
    });
    events.sort_by_key(|e| e.timestamp());

    let preprocessed = preprocess(&events);
    let significant_before: Vec<_> = events.iter().filter(|e| e.is_significant()).collect();
    let significant_after: Vec<_> = preprocessed
        .events
        .iter()
        .filter(|e| e.is_significant())
        .collect();
    assert_eq!(significant_before, significant_after);
    // And the pointer stream actually shrank.
    assert!(preprocessed.events.len() < events.len());
}

#[test]
fn plan_is_deterministic() {
    let meta = meta(30000);
    let events: Vec<RecordingEvent> = (0..40)
        .map(|i| click(i * 700, 200.0 + (i % 7) as f64 * 250.0, 300.0 + (i % 5) as f64 * 150.0))
        .collect();

    let first = plan_for(&events, &meta);
    let second = plan_for(&events, &meta);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.time_ms, b.time_ms);
        assert_eq!(a.target_x, b.target_x);
        assert_eq!(a.target_y, b.target_y);
        assert_eq!(a.zoom_level, b.zoom_level);
    }
}

#[test]
fn integrated_trajectory_stays_bounded_for_noisy_input() {
    let meta = meta(20000);
    let events: Vec<RecordingEvent> = (0..60)
        .map(|i| {
            click(
                i * 330,
                (i as f64 * 397.0) % 1920.0,
                (i as f64 * 211.0) % 1080.0,
            )
        })
        .collect();
    let plan = plan_for(&events, &meta);
    assert!(validate_plan(&plan).is_ok());

    let mut vp = ViewportIntegrator::new(1920.0, 1080.0, plan);
    let mut prev_t = 0u64;
    for i in 0..600u64 {
        let t = i * 20000 / 600;
        let dt = (t - prev_t) as f64 / 1000.0;
        prev_t = t;
        let rect = vp.advance_to(t, dt);
        assert!(rect.x >= 0.0 && rect.y >= 0.0);
        assert!(rect.x + rect.width <= 1920.0 + 1e-6);
        assert!(rect.y + rect.height <= 1080.0 + 1e-6);
        assert!(rect.width > 0.0 && rect.height > 0.0);
    }
}
