//! Cursor sprite: generation, loading, and per-frame drawing.
//!
//! The built-in sprite is an arrow rendered through a signed distance
//! field: white fill, black outline, soft shadow, sub-pixel anti-aliased
//! edges. A custom PNG sprite can replace it via settings; failures there
//! fall back to the synthetic sprite.

use std::path::Path;

use image::{Rgba, RgbaImage};

use super::{blend_pixel, smoothstep};

/// Cursor sprite base size in pixels (before zoom scaling).
pub const CURSOR_BASE_SIZE: u32 = 32;
/// Extra sprite padding so the shadow is not clipped.
const SPRITE_PADDING: u32 = 6;

/// A renderable cursor sprite with its hotspot (tip position).
#[derive(Debug, Clone)]
pub struct CursorSprite {
    pub image: RgbaImage,
    pub hotspot: (u32, u32),
}

impl CursorSprite {
    /// The built-in SDF arrow.
    pub fn synthetic() -> Self {
        Self {
            image: create_arrow_sprite(CURSOR_BASE_SIZE),
            hotspot: (SPRITE_PADDING, SPRITE_PADDING),
        }
    }

    /// Load a custom sprite from a PNG path; falls back to the synthetic
    /// arrow (with a warning) when the file cannot be read.
    pub fn from_path_or_synthetic(path: &Path, hotspot: (u32, u32)) -> Self {
        match image::open(path) {
            Ok(img) => {
                let image = img.to_rgba8();
                tracing::info!(
                    "Custom cursor loaded: {}x{} from {}",
                    image.width(),
                    image.height(),
                    path.display()
                );
                Self { image, hotspot }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load cursor image {}: {e}; using synthetic cursor",
                    path.display()
                );
                Self::synthetic()
            }
        }
    }
}

/// Arrow vertices (normalized, origin at the tip).
const ARROW_VERTICES: [(f64, f64); 7] = [
    (0.0, 0.0),
    (0.0, 0.85),
    (0.22, 0.62),
    (0.52, 0.95),
    (0.68, 0.82),
    (0.38, 0.52),
    (0.58, 0.30),
];

fn create_arrow_sprite(size: u32) -> RgbaImage {
    let total = size + SPRITE_PADDING * 2;
    let mut img = RgbaImage::new(total, total);
    let s = size as f64;

    let pts: Vec<(f64, f64)> = ARROW_VERTICES
        .iter()
        .map(|(vx, vy)| (vx * s + SPRITE_PADDING as f64, vy * s + SPRITE_PADDING as f64))
        .collect();

    for py in 0..total {
        for px in 0..total {
            let x = px as f64 + 0.5;
            let y = py as f64 + 0.5;

            let dist = signed_distance_to_polygon(&pts, x, y);
            let shadow_dist = signed_distance_to_polygon(&pts, x - 1.0, y - 2.0);

            let shadow_alpha = smoothstep(3.0, 0.0, shadow_dist) * 0.4;
            let outline_alpha = smoothstep(0.5, -0.5, dist - 1.8);
            let fill_alpha = smoothstep(0.5, -0.5, dist);

            // Layer shadow, then black outline, then white fill.
            let mut r = 0.0f64;
            let mut g = 0.0f64;
            let mut b = 0.0f64;
            let mut a = shadow_alpha;

            if outline_alpha > 0.0 {
                a = outline_alpha + a * (1.0 - outline_alpha);
            }

            if fill_alpha > 0.0 {
                let out_a = fill_alpha + a * (1.0 - fill_alpha);
                if out_a > 0.0 {
                    r = 255.0 * fill_alpha / out_a;
                    g = 255.0 * fill_alpha / out_a;
                    b = 255.0 * fill_alpha / out_a;
                    a = out_a;
                }
            }

            if a > 0.001 {
                img.put_pixel(
                    px,
                    py,
                    Rgba([
                        r.clamp(0.0, 255.0) as u8,
                        g.clamp(0.0, 255.0) as u8,
                        b.clamp(0.0, 255.0) as u8,
                        (a * 255.0).clamp(0.0, 255.0) as u8,
                    ]),
                );
            }
        }
    }

    img
}

/// Signed distance from a point to a polygon boundary. Negative inside.
fn signed_distance_to_polygon(pts: &[(f64, f64)], px: f64, py: f64) -> f64 {
    let n = pts.len();
    let mut min_dist_sq = f64::MAX;
    let mut sign = 1.0;

    for i in 0..n {
        let j = (i + 1) % n;
        let (ex, ey) = (pts[j].0 - pts[i].0, pts[j].1 - pts[i].1);
        let (wx, wy) = (px - pts[i].0, py - pts[i].1);

        let t = ((wx * ex + wy * ey) / (ex * ex + ey * ey)).clamp(0.0, 1.0);
        let dx = wx - ex * t;
        let dy = wy - ey * t;
        min_dist_sq = min_dist_sq.min(dx * dx + dy * dy);

        let c1 = pts[i].1 <= py;
        let c2 = pts[j].1 > py;
        let c3 = pts[j].1 <= py;
        let c4 = pts[i].1 > py;
        let cross = ex * wy - ey * wx;
        if (c1 && c2 && cross > 0.0) || (c3 && c4 && cross < 0.0) {
            sign = -sign;
        }
    }

    sign * min_dist_sq.sqrt()
}

/// Scale the sprite and composite it with its hotspot at `(x, y)`.
/// `size_mult` already includes the current zoom so the cursor keeps its
/// apparent size as the camera moves.
pub fn draw_cursor_sprite(img: &mut RgbaImage, sprite: &CursorSprite, x: f64, y: f64, size_mult: f64) {
    let scale = size_mult * (CURSOR_BASE_SIZE as f64) / (sprite.image.width().max(1) as f64);
    let target_w = ((sprite.image.width() as f64) * scale) as u32;
    let target_h = ((sprite.image.height() as f64) * scale) as u32;
    if target_w == 0 || target_h == 0 {
        return;
    }

    // CatmullRom keeps the outline crisp where Triangle would smear it.
    let scaled = image::imageops::resize(
        &sprite.image,
        target_w.max(1),
        target_h.max(1),
        image::imageops::FilterType::CatmullRom,
    );

    let hotspot_x = (sprite.hotspot.0 as f64 * scale) as i32;
    let hotspot_y = (sprite.hotspot.1 as f64 * scale) as i32;
    let start_x = x as i32 - hotspot_x;
    let start_y = y as i32 - hotspot_y;

    for sy in 0..scaled.height() {
        for sx in 0..scaled.width() {
            let px = start_x + sx as i32;
            let py = start_y + sy as i32;
            if px < 0 || py < 0 || px as u32 >= img.width() || py as u32 >= img.height() {
                continue;
            }
            let src = scaled.get_pixel(sx, sy);
            if src[3] > 0 {
                let dst = img.get_pixel(px as u32, py as u32);
                img.put_pixel(px as u32, py as u32, blend_pixel(*dst, *src));
            }
        }
    }
}
