//! Viewport integration: keyframes in, continuous camera trajectory out.
//!
//! Three springs (center-x, center-y, zoom) are advanced strictly forward
//! in time. A cursor over the keyframe list applies each keyframe exactly
//! once as its timestamp is crossed; the derived crop rectangle is always
//! clamped inside the screen.

use crate::planner::{half_lives, TransitionKind, ZoomKeyframe};
use crate::spring::Spring;

/// The rectangular sub-region of the source screen resampled into each
/// output frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

/// Spring-animated camera state over a fixed keyframe plan.
#[derive(Debug, Clone)]
pub struct ViewportIntegrator {
    center_x: Spring,
    center_y: Spring,
    zoom: Spring,
    pan_half_life: f64,
    zoom_half_life: f64,
    keyframes: Vec<ZoomKeyframe>,
    cursor: usize,
    screen_w: f64,
    screen_h: f64,
}

impl ViewportIntegrator {
    /// Start at the identity viewport: centered, zoom 1.0.
    pub fn new(screen_w: f64, screen_h: f64, keyframes: Vec<ZoomKeyframe>) -> Self {
        let mut center_x = Spring::new(screen_w / 2.0);
        center_x.snap(screen_w / 2.0);
        let mut center_y = Spring::new(screen_h / 2.0);
        center_y.snap(screen_h / 2.0);
        let mut zoom = Spring::new(1.0);
        zoom.snap(1.0);

        Self {
            center_x,
            center_y,
            zoom,
            pan_half_life: half_lives::SCENE_TO_SCENE.1,
            zoom_half_life: half_lives::SCENE_TO_SCENE.0,
            keyframes,
            cursor: 0,
            screen_w,
            screen_h,
        }
    }

    /// Advance to the frame at `time_ms`, `dt` seconds after the previous
    /// frame. Applies every keyframe whose timestamp has been reached (each
    /// exactly once), then steps the springs.
    pub fn advance_to(&mut self, time_ms: u64, dt: f64) -> ViewportRect {
        while self
            .keyframes
            .get(self.cursor)
            .is_some_and(|kf| kf.time_ms <= time_ms)
        {
            let kf = self.keyframes[self.cursor].clone();
            self.apply_keyframe(&kf);
            self.cursor += 1;
        }

        self.center_x.update(self.pan_half_life, dt);
        self.center_y.update(self.pan_half_life, dt);
        self.zoom.update(self.zoom_half_life, dt);

        self.current_rect()
    }

    fn apply_keyframe(&mut self, kf: &ZoomKeyframe) {
        self.center_x.set_target(kf.target_x);
        self.center_y.set_target(kf.target_y);
        self.zoom.set_target(kf.zoom_level);

        let (zoom_hl, pan_hl) = match &kf.spring_hint {
            Some(hint) => (hint.zoom_half_life, hint.pan_half_life),
            None => match kf.transition {
                TransitionKind::SpringIn => half_lives::ZOOM_IN,
                TransitionKind::SpringOut => half_lives::OVERVIEW_OUT,
                TransitionKind::Smooth => half_lives::SCENE_TO_SCENE,
            },
        };
        self.zoom_half_life = zoom_hl;
        self.pan_half_life = pan_hl;
    }

    /// Derive the clamped crop rectangle from current spring positions.
    pub fn current_rect(&self) -> ViewportRect {
        let zoom = self.zoom.position.max(1.0);
        let vp_w = self.screen_w / zoom;
        let vp_h = self.screen_h / zoom;

        let x = (self.center_x.position - vp_w / 2.0).clamp(0.0, self.screen_w - vp_w);
        let y = (self.center_y.position - vp_h / 2.0).clamp(0.0, self.screen_h - vp_h);

        ViewportRect {
            x,
            y,
            width: vp_w,
            height: vp_h,
            zoom,
        }
    }

    /// Project a screen-space point into output pixel coordinates for the
    /// current viewport.
    pub fn to_output_coords(
        &self,
        screen_x: f64,
        screen_y: f64,
        output_w: f64,
        output_h: f64,
    ) -> (f64, f64) {
        let vp = self.current_rect();
        let rel_x = (screen_x - vp.x) / vp.width;
        let rel_y = (screen_y - vp.y) / vp.height;
        (rel_x * output_w, rel_y * output_h)
    }

    /// Whether all three springs have effectively reached their targets.
    pub fn is_settled(&self, threshold: f64) -> bool {
        self.center_x.is_settled(threshold)
            && self.center_y.is_settled(threshold)
            && self.zoom.is_settled(threshold * 0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::SpringHint;

    fn kf(time_ms: u64, x: f64, y: f64, zoom: f64) -> ZoomKeyframe {
        ZoomKeyframe {
            time_ms,
            target_x: x,
            target_y: y,
            zoom_level: zoom,
            transition: TransitionKind::SpringIn,
            spring_hint: Some(SpringHint {
                zoom_half_life: 0.2,
                pan_half_life: 0.2,
            }),
        }
    }

    #[test]
    fn test_starts_at_identity() {
        let vp = ViewportIntegrator::new(1920.0, 1080.0, vec![]);
        let rect = vp.current_rect();
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.width, 1920.0);
        assert_eq!(rect.height, 1080.0);
        assert_eq!(rect.zoom, 1.0);
    }

    #[test]
    fn test_empty_plan_stays_at_identity() {
        let mut vp = ViewportIntegrator::new(1920.0, 1080.0, vec![]);
        for i in 0..300 {
            let rect = vp.advance_to(i * 33, 1.0 / 30.0);
            assert_eq!(rect.zoom, 1.0);
            assert_eq!(rect.x, 0.0);
        }
    }

    #[test]
    fn test_converges_to_keyframe_target() {
        let mut vp =
            ViewportIntegrator::new(1920.0, 1080.0, vec![kf(0, 500.0, 300.0, 2.0)]);
        let mut rect = vp.current_rect();
        for i in 0..120 {
            rect = vp.advance_to(i * 33, 1.0 / 30.0);
        }
        // After 4s the camera has settled on the target: a 960x540 crop
        // centered at (500, 300).
        assert!((rect.width - 960.0).abs() < 1.0);
        assert!((rect.x - 20.0).abs() < 1.0);
        assert!((rect.y - 30.0).abs() < 1.0);
        assert!(vp.is_settled(1.0));
    }

    #[test]
    fn test_viewport_always_inside_screen() {
        // Target near the corner at high zoom forces clamping.
        let mut vp =
            ViewportIntegrator::new(1920.0, 1080.0, vec![kf(0, 30.0, 1080.0, 3.0)]);
        for i in 0..200 {
            let rect = vp.advance_to(i * 16, 1.0 / 60.0);
            assert!(rect.x >= 0.0);
            assert!(rect.y >= 0.0);
            assert!(rect.x + rect.width <= 1920.0 + 1e-6);
            assert!(rect.y + rect.height <= 1080.0 + 1e-6);
            assert!(rect.width > 0.0 && rect.height > 0.0);
        }
    }

    #[test]
    fn test_keyframes_apply_once_in_order() {
        let mut vp = ViewportIntegrator::new(
            1920.0,
            1080.0,
            vec![kf(0, 500.0, 300.0, 2.0), kf(1000, 1500.0, 800.0, 2.5)],
        );
        vp.advance_to(0, 0.0);
        assert_eq!(vp.zoom.target, 2.0);
        vp.advance_to(500, 0.5);
        assert_eq!(vp.zoom.target, 2.0);
        vp.advance_to(1000, 0.5);
        assert_eq!(vp.zoom.target, 2.5);
        assert_eq!(vp.center_x.target, 1500.0);
        // Cursor exhausted; nothing re-applies.
        vp.advance_to(5000, 4.0);
        assert_eq!(vp.cursor, 2);
    }

    #[test]
    fn test_zoom_below_one_clamps_to_identity_size() {
        let mut vp = ViewportIntegrator::new(1920.0, 1080.0, vec![kf(0, 960.0, 540.0, 1.0)]);
        // Overshooting springs may momentarily dip below 1.0; the derived
        // rect never exceeds the screen.
        vp.zoom.position = 0.9;
        let rect = vp.current_rect();
        assert_eq!(rect.width, 1920.0);
        assert_eq!(rect.zoom, 1.0);
        let _ = vp.advance_to(0, 0.0);
    }

    #[test]
    fn test_to_output_coords_center_maps_to_center() {
        let vp = ViewportIntegrator::new(1920.0, 1080.0, vec![]);
        let (x, y) = vp.to_output_coords(960.0, 540.0, 1280.0, 720.0);
        assert!((x - 640.0).abs() < 1e-9);
        assert!((y - 360.0).abs() < 1e-9);
    }
}
