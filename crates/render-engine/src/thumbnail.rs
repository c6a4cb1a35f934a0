//! Thumbnail generation for recording lists.

use std::path::{Path, PathBuf};

use retake_common::error::{RetakeError, RetakeResult};
use retake_recording_model::meta::Recording;

/// Thumbnail width; height follows the source aspect ratio.
const THUMBNAIL_WIDTH: u32 = 640;
/// Where in the recording to sample: 30% in tends to skip blank intros.
const SAMPLE_POSITION: f64 = 0.3;

/// Write `thumbnail.png` into the recording directory and return its path.
pub fn generate_thumbnail(recording_dir: &Path) -> RetakeResult<PathBuf> {
    let recording = Recording::load(recording_dir)?;
    if recording.frame_count == 0 {
        return Err(RetakeError::input_invalid("recording has no frames"));
    }

    let target_index = ((recording.frame_count as f64 * SAMPLE_POSITION) as u64)
        .min(recording.frame_count - 1);
    let mut frame_path = recording.frame_path(target_index);
    if !frame_path.exists() {
        frame_path = recording.frame_path(0);
    }
    if !frame_path.exists() {
        return Err(RetakeError::asset_missing(frame_path));
    }

    let img = image::open(&frame_path)
        .map_err(|e| RetakeError::input_invalid(format!("cannot decode {}: {e}", frame_path.display())))?;
    let height =
        ((img.height() as f64 * THUMBNAIL_WIDTH as f64 / img.width() as f64) as u32).max(1);
    let thumbnail = image::imageops::resize(
        &img,
        THUMBNAIL_WIDTH,
        height,
        image::imageops::FilterType::Triangle,
    );

    let out = recording_dir.join("thumbnail.png");
    thumbnail
        .save(&out)
        .map_err(|e| RetakeError::input_invalid(format!("cannot save thumbnail: {e}")))?;

    tracing::info!(path = %out.display(), "Thumbnail written");
    Ok(out)
}
