//! Expanding click rings.
//!
//! A click spawns a stroked ring that grows with ease-out-cubic progress
//! and fades linearly, plus a faint inner fill.

use image::{Rgba, RgbaImage};
use retake_recording_model::event::{RecordingEvent, TimestampMs};

use super::blend_pixel;

/// Fraction of the ring alpha used for the inner fill.
const INNER_FILL_ALPHA: f64 = 0.15;

/// One click's ring animation.
#[derive(Debug, Clone)]
pub struct ClickEffect {
    pub x: f64,
    pub y: f64,
    pub start_ms: TimestampMs,
    pub duration_ms: u64,
}

impl ClickEffect {
    pub fn is_active(&self, time_ms: TimestampMs) -> bool {
        time_ms >= self.start_ms && time_ms <= self.start_ms + self.duration_ms
    }

    /// Linear progress in [0, 1] while active.
    pub fn linear_progress(&self, time_ms: TimestampMs) -> f64 {
        if !self.is_active(time_ms) {
            return 0.0;
        }
        (time_ms - self.start_ms) as f64 / self.duration_ms as f64
    }
}

/// Collect one effect per click event.
pub fn extract_click_effects(events: &[RecordingEvent], duration_ms: u64) -> Vec<ClickEffect> {
    events
        .iter()
        .filter_map(|e| match e {
            RecordingEvent::Click { t, x, y, .. } => Some(ClickEffect {
                x: *x,
                y: *y,
                start_ms: *t,
                duration_ms,
            }),
            _ => None,
        })
        .collect()
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Draw a ring at `linear` progress: radius grows with eased progress,
/// alpha fades with linear progress.
pub fn draw_click_ring(
    img: &mut RgbaImage,
    x: f64,
    y: f64,
    linear: f64,
    max_radius: f64,
    color: &[u8; 4],
    stroke_width: f64,
) {
    let radius = max_radius * ease_out_cubic(linear);
    let base_alpha = (1.0 - linear) * color[3] as f64;
    let ring_alpha = base_alpha as u8;
    let fill_alpha = (base_alpha * INNER_FILL_ALPHA) as u8;

    let cx = x as i32;
    let cy = y as i32;
    let r = radius as i32;
    let sw = stroke_width.ceil() as i32;

    for dy in -r - sw..=r + sw {
        for dx in -r - sw..=r + sw {
            let px = cx + dx;
            let py = cy + dy;
            if px < 0 || py < 0 || px as u32 >= img.width() || py as u32 >= img.height() {
                continue;
            }

            let dist = ((dx * dx + dy * dy) as f64).sqrt();

            if dist <= radius && fill_alpha > 0 {
                let dst = *img.get_pixel(px as u32, py as u32);
                let src = Rgba([color[0], color[1], color[2], fill_alpha]);
                img.put_pixel(px as u32, py as u32, blend_pixel(dst, src));
            }

            let ring_dist = (dist - radius).abs();
            if ring_dist <= stroke_width {
                // Anti-alias the outer pixel of the stroke.
                let edge_alpha = if ring_dist > stroke_width - 1.0 {
                    ((stroke_width - ring_dist).max(0.0) * ring_alpha as f64) as u8
                } else {
                    ring_alpha
                };
                let dst = *img.get_pixel(px as u32, py as u32);
                let src = Rgba([color[0], color[1], color[2], edge_alpha]);
                img.put_pixel(px as u32, py as u32, blend_pixel(dst, src));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retake_recording_model::event::MouseButton;

    #[test]
    fn test_activity_window() {
        let effect = ClickEffect {
            x: 0.0,
            y: 0.0,
            start_ms: 1000,
            duration_ms: 400,
        };
        assert!(!effect.is_active(999));
        assert!(effect.is_active(1000));
        assert!(effect.is_active(1400));
        assert!(!effect.is_active(1401));
    }

    #[test]
    fn test_ease_out_cubic_front_loads_growth() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_extract_only_clicks() {
        let events = vec![
            RecordingEvent::Click {
                t: 100,
                button: MouseButton::Left,
                x: 10.0,
                y: 20.0,
            },
            RecordingEvent::ClickRelease {
                t: 150,
                button: MouseButton::Left,
                x: 10.0,
                y: 20.0,
            },
            RecordingEvent::MouseMove {
                t: 200,
                x: 11.0,
                y: 21.0,
            },
        ];
        let effects = extract_click_effects(&events, 400);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].start_ms, 100);
    }

    #[test]
    fn test_draw_marks_ring_pixels() {
        let mut img = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        draw_click_ring(&mut img, 50.0, 50.0, 0.5, 30.0, &[255, 0, 0, 200], 2.5);

        let eased = ease_out_cubic(0.5);
        let radius = (30.0 * eased) as i32;
        let on_ring = img.get_pixel((50 + radius) as u32, 50);
        assert!(on_ring[0] > 0, "ring stroke should be tinted");

        // Center carries only the faint fill.
        let center = img.get_pixel(50, 50);
        assert!(center[0] > 0 && center[0] < 60);
    }

    #[test]
    fn test_draw_at_border_does_not_panic() {
        let mut img = RgbaImage::new(32, 32);
        draw_click_ring(&mut img, 0.0, 31.0, 0.9, 30.0, &[255, 255, 255, 255], 3.0);
    }
}
