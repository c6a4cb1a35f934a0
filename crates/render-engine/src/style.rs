//! Output style: everything the compositor needs to know about framing.

use retake_common::config::{AppConfig, BackgroundConfig};

use crate::presets::EncodingParams;

/// Resolved per-job style, combining a quality preset with user settings.
#[derive(Debug, Clone)]
pub struct OutputStyle {
    pub output_width: u32,
    pub output_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: BackgroundConfig,
    pub border_radius: u32,
    pub shadow_blur: f64,
    pub shadow_offset_y: f64,
    pub shadow_color: [u8; 4],
    pub cursor_size_multiplier: f64,
    pub click_ring_max_radius: f64,
    pub click_ring_duration_ms: u64,
    pub click_ring_color: [u8; 4],
    pub click_ring_stroke_width: f64,
    pub key_badge_duration_ms: u64,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            output_width: 1920,
            output_height: 1080,
            canvas_width: 2048,
            canvas_height: 1208,
            background: BackgroundConfig::Gradient {
                from: [139, 92, 246],
                to: [59, 130, 246],
                angle: 135.0,
            },
            border_radius: 12,
            shadow_blur: 40.0,
            shadow_offset_y: 10.0,
            shadow_color: [0, 0, 0, 80],
            cursor_size_multiplier: 1.2,
            click_ring_max_radius: 30.0,
            click_ring_duration_ms: 400,
            click_ring_color: [59, 130, 246, 180],
            click_ring_stroke_width: 2.5,
            key_badge_duration_ms: 1500,
        }
    }
}

impl OutputStyle {
    pub fn from_settings(params: &EncodingParams, config: &AppConfig) -> Self {
        let shadow = config.style.shadow_enabled;
        Self {
            output_width: params.width,
            output_height: params.height,
            canvas_width: params.canvas_width,
            canvas_height: params.canvas_height,
            background: config.style.background.clone(),
            border_radius: config.style.border_radius,
            shadow_blur: if shadow { config.style.shadow_blur } else { 0.0 },
            shadow_offset_y: if shadow {
                config.style.shadow_offset_y
            } else {
                0.0
            },
            shadow_color: if shadow { [0, 0, 0, 80] } else { [0, 0, 0, 0] },
            ..Self::default()
        }
    }
}
