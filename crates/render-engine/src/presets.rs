//! Export formats and quality presets.

use serde::{Deserialize, Serialize};

/// Framing padding added around the content on the output canvas (total).
const CANVAS_PADDING: u32 = 128;

/// Output container/codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Mp4,
    WebM,
    Gif,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "mp4",
            ExportFormat::WebM => "webm",
            ExportFormat::Gif => "gif",
        }
    }
}

/// Quality presets trade resolution and bitrate for size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityPreset {
    /// 1080p at 30fps; good default for sharing.
    Social,
    /// Source resolution at 60fps.
    HighQuality,
    /// 720p at 24fps.
    Lightweight,
}

/// Concrete encoding parameters derived from a preset.
#[derive(Debug, Clone, Copy)]
pub struct EncodingParams {
    pub width: u32,
    pub height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub fps: u32,
    pub crf: u32,
}

impl EncodingParams {
    pub fn from_preset(preset: QualityPreset, source_width: u32, source_height: u32) -> Self {
        match preset {
            QualityPreset::Social => Self::sized(1920, 1080, 30, 23),
            QualityPreset::HighQuality => Self::sized(source_width, source_height, 60, 18),
            QualityPreset::Lightweight => Self::sized(1280, 720, 24, 30),
        }
    }

    fn sized(width: u32, height: u32, fps: u32, crf: u32) -> Self {
        Self {
            width,
            height,
            canvas_width: width + CANVAS_PADDING,
            canvas_height: height + CANVAS_PADDING,
            fps,
            crf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let social = EncodingParams::from_preset(QualityPreset::Social, 2560, 1440);
        assert_eq!((social.width, social.height), (1920, 1080));
        assert_eq!(social.canvas_width, 2048);

        let hq = EncodingParams::from_preset(QualityPreset::HighQuality, 2560, 1440);
        assert_eq!((hq.width, hq.height), (2560, 1440));
        assert_eq!(hq.fps, 60);
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(ExportFormat::Mp4.extension(), "mp4");
        assert_eq!(ExportFormat::WebM.extension(), "webm");
        assert_eq!(ExportFormat::Gif.extension(), "gif");
    }
}
