//! Key badges: a rounded label ("Ctrl+C", "Enter") at the bottom center of
//! the output, shown for modifier combos and special keys, with fade
//! in/out.
//!
//! Labels are rasterized with a built-in 5x7 pixel font; the overlay has no
//! text-shaping needs beyond ASCII key names.

use image::{Rgba, RgbaImage};
use retake_recording_model::event::{RecordingEvent, TimestampMs};

use super::blend_pixel;

/// Fade-in/fade-out ramp at each end of the badge's lifetime (ms).
const FADE_MS: u64 = 150;
/// Pixel-font glyph cell (before scaling).
const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;
/// Integer upscale factor for the glyphs.
const GLYPH_SCALE: u32 = 2;
/// Space between characters (scaled pixels).
const GLYPH_SPACING: u32 = 2;

/// Keys that earn a badge even without modifiers.
const SPECIAL_KEYS: &[&str] = &[
    "Enter", "Return", "Tab", "Escape", "Backspace", "Delete", "Space", "F1", "F2", "F3", "F4",
    "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "ArrowUp", "ArrowDown", "ArrowLeft",
    "ArrowRight", "Up", "Down", "Left", "Right",
];

/// One key press worth showing, with its display window.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBadge {
    pub label: String,
    pub start_ms: TimestampMs,
    pub duration_ms: u64,
}

impl KeyBadge {
    pub fn is_visible(&self, time_ms: TimestampMs) -> bool {
        time_ms >= self.start_ms && time_ms <= self.start_ms + self.duration_ms
    }

    /// Opacity in [0, 1] with linear ramps at both ends.
    pub fn opacity(&self, time_ms: TimestampMs) -> f64 {
        if !self.is_visible(time_ms) {
            return 0.0;
        }
        let elapsed = time_ms - self.start_ms;
        let remaining = self.start_ms + self.duration_ms - time_ms;
        let fade_in = elapsed as f64 / FADE_MS as f64;
        let fade_out = remaining as f64 / FADE_MS as f64;
        fade_in.min(fade_out).min(1.0)
    }
}

/// Build badges from key events: modifier combos always display, bare keys
/// only when they are special.
pub fn extract_key_badges(events: &[RecordingEvent], duration_ms: u64) -> Vec<KeyBadge> {
    events
        .iter()
        .filter_map(|e| {
            let RecordingEvent::Key { t, key, modifiers } = e else {
                return None;
            };
            let label = format_label(key, modifiers)?;
            Some(KeyBadge {
                label,
                start_ms: *t,
                duration_ms,
            })
        })
        .collect()
}

/// "Ctrl+Shift+P" for combos, the key name for special keys, `None` for
/// plain typing (which would be noise).
pub fn format_label(
    key: &str,
    modifiers: &[retake_recording_model::event::Modifier],
) -> Option<String> {
    if !modifiers.is_empty() {
        let mods: Vec<&str> = modifiers.iter().map(|m| m.label()).collect();
        return Some(format!("{}+{}", mods.join("+"), key));
    }
    SPECIAL_KEYS
        .contains(&key)
        .then(|| key.to_string())
}

/// Draw the badge at bottom-center with the given opacity.
pub fn draw_key_badge(img: &mut RgbaImage, label: &str, opacity: f64, out_w: u32, out_h: u32) {
    if opacity <= 0.0 || label.is_empty() {
        return;
    }

    let char_advance = GLYPH_W * GLYPH_SCALE + GLYPH_SPACING;
    let text_w = label.chars().count() as u32 * char_advance - GLYPH_SPACING;
    let text_h = GLYPH_H * GLYPH_SCALE;

    let pad_x = 14u32;
    let pad_y = 8u32;
    let badge_w = (text_w + pad_x * 2).min(out_w);
    let badge_h = text_h + pad_y * 2;
    let x0 = out_w.saturating_sub(badge_w) / 2;
    let y0 = out_h.saturating_sub(badge_h + 24);
    let radius = 8u32;

    let bg_alpha = (220.0 * opacity) as u8;
    for y in y0..(y0 + badge_h).min(img.height()) {
        for x in x0..(x0 + badge_w).min(img.width()) {
            if !in_rounded_rect(x - x0, y - y0, badge_w, badge_h, radius) {
                continue;
            }
            let dst = *img.get_pixel(x, y);
            img.put_pixel(x, y, blend_pixel(dst, Rgba([20, 20, 20, bg_alpha])));
        }
    }

    let text_alpha = (255.0 * opacity) as u8;
    let mut cx = x0 + pad_x;
    let cy = y0 + pad_y;
    for ch in label.chars() {
        draw_glyph(img, ch, cx, cy, text_alpha);
        cx += char_advance;
    }
}

fn in_rounded_rect(x: u32, y: u32, w: u32, h: u32, r: u32) -> bool {
    let corner = |dx: u32, dy: u32| dx * dx + dy * dy <= r * r;
    if x < r && y < r {
        return corner(r - x, r - y);
    }
    if x >= w - r && y < r {
        return corner(x - (w - r), r - y);
    }
    if x < r && y >= h - r {
        return corner(r - x, y - (h - r));
    }
    if x >= w - r && y >= h - r {
        return corner(x - (w - r), y - (h - r));
    }
    true
}

fn draw_glyph(img: &mut RgbaImage, ch: char, x0: u32, y0: u32, alpha: u8) {
    let Some(rows) = glyph_rows(ch) else { return };
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_W {
            if *bits & (1u8 << (GLYPH_W - 1 - col)) == 0 {
                continue;
            }
            for sy in 0..GLYPH_SCALE {
                for sx in 0..GLYPH_SCALE {
                    let px = x0 + col * GLYPH_SCALE + sx;
                    let py = y0 + row as u32 * GLYPH_SCALE + sy;
                    if px < img.width() && py < img.height() {
                        let dst = *img.get_pixel(px, py);
                        img.put_pixel(px, py, blend_pixel(dst, Rgba([240, 240, 240, alpha])));
                    }
                }
            }
        }
    }
}

/// 5x7 glyphs; lowercase renders as uppercase, unknown characters advance
/// silently.
fn glyph_rows(ch: char) -> Option<[u8; 7]> {
    let ch = ch.to_ascii_uppercase();
    Some(match ch {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x0A, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ' ' => [0x00; 7],
        _ => return None,
    })
}
