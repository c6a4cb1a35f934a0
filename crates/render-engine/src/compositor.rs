//! Per-frame compositing.
//!
//! The pipeline per frame: crop and scale the viewport from the source
//! frame, draw the cursor and active overlays, round the corners, then
//! place the content (with its drop shadow) on the cached background
//! canvas.

use image::{Rgba, RgbaImage};
use retake_director::viewport::ViewportRect;

use crate::effects::background::create_background_image;
use crate::effects::blend_pixel;
use crate::effects::click_ring::{draw_click_ring, ClickEffect};
use crate::effects::cursor::{draw_cursor_sprite, CursorSprite};
use crate::effects::key_badge::{draw_key_badge, KeyBadge};
use crate::style::OutputStyle;

/// Stateful per-job compositor. Holds the immutable caches (background
/// canvas, cursor sprite) shared by every frame of one job.
pub struct Compositor {
    style: OutputStyle,
    cursor_sprite: CursorSprite,
    cached_background: Option<RgbaImage>,
}

impl Compositor {
    pub fn new(style: OutputStyle, cursor: CursorSprite) -> Self {
        Self {
            style,
            cursor_sprite: cursor,
            cached_background: None,
        }
    }

    /// Compose one output frame. The caller provides the integrated
    /// viewport for this frame's timestamp and the currently active
    /// overlays.
    pub fn compose_frame(
        &mut self,
        raw_frame: &RgbaImage,
        viewport: &ViewportRect,
        frame_time_ms: u64,
        cursor_pos: Option<(f64, f64)>,
        click_effects: &[ClickEffect],
        key_badge: Option<&KeyBadge>,
    ) -> RgbaImage {
        let out_w = self.style.output_width;
        let out_h = self.style.output_height;

        let mut output = crop_and_scale(raw_frame, viewport, out_w, out_h);

        if let Some((cx, cy)) = cursor_pos {
            let (x, y) = to_output_coords(viewport, cx, cy, out_w as f64, out_h as f64);
            let scale = self.style.cursor_size_multiplier * viewport.zoom;
            draw_cursor_sprite(&mut output, &self.cursor_sprite, x, y, scale);
        }

        for effect in click_effects {
            if !effect.is_active(frame_time_ms) {
                continue;
            }
            let (x, y) = to_output_coords(viewport, effect.x, effect.y, out_w as f64, out_h as f64);
            draw_click_ring(
                &mut output,
                x,
                y,
                effect.linear_progress(frame_time_ms),
                self.style.click_ring_max_radius * viewport.zoom,
                &self.style.click_ring_color,
                self.style.click_ring_stroke_width * viewport.zoom,
            );
        }

        if let Some(badge) = key_badge {
            draw_key_badge(
                &mut output,
                &badge.label,
                badge.opacity(frame_time_ms),
                out_w,
                out_h,
            );
        }

        if self.style.border_radius > 0 {
            apply_rounded_corners(&mut output, self.style.border_radius);
        }

        let mut canvas = self.background().clone();
        let offset_x = (self.style.canvas_width - out_w) / 2;
        let offset_y = (self.style.canvas_height - out_h) / 2;

        draw_drop_shadow(
            &mut canvas,
            offset_x,
            offset_y,
            out_w,
            out_h,
            self.style.shadow_blur,
            self.style.shadow_offset_y,
            &self.style.shadow_color,
            self.style.border_radius,
        );
        composite_onto(&mut canvas, &output, offset_x, offset_y);

        canvas
    }

    fn background(&mut self) -> &RgbaImage {
        let style = &self.style;
        self.cached_background.get_or_insert_with(|| {
            create_background_image(style.canvas_width, style.canvas_height, &style.background)
        })
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.style.canvas_width, self.style.canvas_height)
    }

    pub fn style(&self) -> &OutputStyle {
        &self.style
    }
}

fn to_output_coords(vp: &ViewportRect, x: f64, y: f64, out_w: f64, out_h: f64) -> (f64, f64) {
    let rel_x = (x - vp.x) / vp.width;
    let rel_y = (y - vp.y) / vp.height;
    (rel_x * out_w, rel_y * out_h)
}

/// Resample the viewport rect of `src` to the output resolution. Triangle
/// filtering trades a little sharpness for 2-3x throughput over Lanczos;
/// the difference hides under the framing effects.
fn crop_and_scale(src: &RgbaImage, vp: &ViewportRect, out_w: u32, out_h: u32) -> RgbaImage {
    let src_x = vp.x.max(0.0) as u32;
    let src_y = vp.y.max(0.0) as u32;
    let src_w = (vp.width as u32).min(src.width().saturating_sub(src_x));
    let src_h = (vp.height as u32).min(src.height().saturating_sub(src_y));

    if src_w == 0 || src_h == 0 {
        return RgbaImage::new(out_w, out_h);
    }

    let cropped = image::imageops::crop_imm(src, src_x, src_y, src_w, src_h).to_image();
    image::imageops::resize(&cropped, out_w, out_h, image::imageops::FilterType::Triangle)
}

/// Rounded-rectangle alpha mask with sub-pixel anti-aliasing. Only the
/// corner quadrants are touched.
fn apply_rounded_corners(img: &mut RgbaImage, radius: u32) {
    let w = img.width();
    let h = img.height();
    if radius == 0 || w < radius * 2 || h < radius * 2 {
        return;
    }
    let r = radius as f64;

    let corners: [(u32, u32); 4] = [
        (0, 0),
        (w - radius, 0),
        (0, h - radius),
        (w - radius, h - radius),
    ];

    for &(corner_x, corner_y) in &corners {
        let center_x = if corner_x == 0 { r } else { w as f64 - r };
        let center_y = if corner_y == 0 { r } else { h as f64 - r };

        for y in corner_y..(corner_y + radius).min(h) {
            for x in corner_x..(corner_x + radius).min(w) {
                let dx = x as f64 + 0.5 - center_x;
                let dy = y as f64 + 0.5 - center_y;

                let outward_x = (corner_x == 0 && dx < 0.0) || (corner_x > 0 && dx > 0.0);
                let outward_y = (corner_y == 0 && dy < 0.0) || (corner_y > 0 && dy > 0.0);
                if !outward_x || !outward_y {
                    continue;
                }

                let dist = (dx * dx + dy * dy).sqrt();
                if dist > r + 0.5 {
                    img.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                } else if dist > r - 0.5 {
                    let alpha = (r + 0.5 - dist).clamp(0.0, 1.0);
                    let pixel = *img.get_pixel(x, y);
                    let new_alpha = (pixel[3] as f64 * alpha) as u8;
                    img.put_pixel(x, y, Rgba([pixel[0], pixel[1], pixel[2], new_alpha]));
                }
            }
        }
    }
}

/// Gaussian-approximated drop shadow of the rounded content rectangle:
/// quadratic falloff of the distance to the rounded rect, drawn before the
/// content so it sits beneath.
#[allow(clippy::too_many_arguments)]
fn draw_drop_shadow(
    canvas: &mut RgbaImage,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    blur: f64,
    offset_y: f64,
    color: &[u8; 4],
    border_radius: u32,
) {
    if color[3] == 0 || blur <= 0.0 {
        return;
    }

    let r = border_radius as f64;
    let shadow_top = y as f64 + offset_y;
    let spread = blur.ceil() as i32;

    let left = x as f64;
    let right = (x + w) as f64;
    let bottom = shadow_top + h as f64;

    for sy in (y as i32 - spread)..=(y as i32 + h as i32 + spread + offset_y.ceil() as i32) {
        for sx in (x as i32 - spread)..=(x as i32 + w as i32 + spread) {
            if sx < 0 || sy < 0 || sx as u32 >= canvas.width() || sy as u32 >= canvas.height() {
                continue;
            }

            let px = sx as f64 + 0.5;
            let py = sy as f64 + 0.5;
            let dist = dist_to_rounded_rect(px, py, left, shadow_top, right, bottom, r);

            if dist > 0.0 && dist <= blur {
                let t = 1.0 - dist / blur;
                let alpha = (t * t * color[3] as f64) as u8;
                let dst = *canvas.get_pixel(sx as u32, sy as u32);
                let src = Rgba([color[0], color[1], color[2], alpha]);
                canvas.put_pixel(sx as u32, sy as u32, blend_pixel(dst, src));
            }
        }
    }
}

/// Distance from a point to a rounded rectangle; 0 inside.
fn dist_to_rounded_rect(
    px: f64,
    py: f64,
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    radius: f64,
) -> f64 {
    let inner_left = left + radius;
    let inner_right = right - radius;
    let inner_top = top + radius;
    let inner_bottom = bottom - radius;

    let dx = if px < inner_left {
        inner_left - px
    } else if px > inner_right {
        px - inner_right
    } else {
        0.0
    };
    let dy = if py < inner_top {
        inner_top - py
    } else if py > inner_bottom {
        py - inner_bottom
    } else {
        0.0
    };

    if dx > 0.0 && dy > 0.0 {
        ((dx * dx + dy * dy).sqrt() - radius).max(0.0)
    } else if dx > 0.0 {
        (dx - radius).max(0.0)
    } else if dy > 0.0 {
        (dy - radius).max(0.0)
    } else {
        0.0
    }
}

fn composite_onto(canvas: &mut RgbaImage, overlay: &RgbaImage, offset_x: u32, offset_y: u32) {
    for y in 0..overlay.height() {
        for x in 0..overlay.width() {
            let cx = x + offset_x;
            let cy = y + offset_y;
            if cx >= canvas.width() || cy >= canvas.height() {
                continue;
            }
            let src = overlay.get_pixel(x, y);
            if src[3] > 0 {
                let dst = canvas.get_pixel(cx, cy);
                canvas.put_pixel(cx, cy, blend_pixel(*dst, *src));
            }
        }
    }
}
