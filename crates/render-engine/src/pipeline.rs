//! Render pipeline orchestration.
//!
//! One job = one recording directory rendered to one output file. Analysis
//! (preprocess, scenes, plan, cursor smoothing) runs up front over the full
//! event stream; frames are then composed strictly sequentially, because
//! the viewport springs depend on every prior keyframe and dt. Rendered
//! frames stream to the encoder subprocess as they are produced.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use retake_common::config::AppConfig;
use retake_common::error::{RetakeError, RetakeResult};
use retake_director::cursor::{extract_cursor_path, sample_at, smooth_cursor_path, CursorSample};
use retake_director::planner::{generate_zoom_plan, validate_plan, ZoomKeyframe};
use retake_director::preprocess::{preprocess, DragSpan};
use retake_director::scene::{split_into_scenes, Scene};
use retake_director::viewport::ViewportIntegrator;
use retake_recording_model::meta::Recording;

use crate::compositor::Compositor;
use crate::effects::click_ring::{extract_click_effects, ClickEffect};
use crate::effects::cursor::CursorSprite;
use crate::effects::key_badge::{extract_key_badges, KeyBadge};
use crate::encoder::{find_ffmpeg, FrameEncoder, FrameSink, PipeFormat};
use crate::presets::{EncodingParams, ExportFormat, QualityPreset};
use crate::style::OutputStyle;

/// Cooperative cancellation flag, checked between frames.
pub type CancelFlag = Arc<AtomicBool>;

/// Where the job currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Composing,
    Encoding,
    Complete,
}

/// Published through the optional progress callback; `progress` is
/// monotonic within a stage.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    pub progress: f64,
    pub output_path: Option<PathBuf>,
}

pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send>;

/// A render job description. Jobs are independent: every piece of state
/// below is constructed fresh per job, so any number may run concurrently.
pub struct RenderJob {
    pub recording_dir: PathBuf,
    pub output_path: PathBuf,
    pub format: ExportFormat,
    pub quality: QualityPreset,
    pub config: AppConfig,
    pub cancel: CancelFlag,
}

impl RenderJob {
    pub fn new(recording_dir: PathBuf, output_path: PathBuf) -> Self {
        Self {
            recording_dir,
            output_path,
            format: ExportFormat::Mp4,
            quality: QualityPreset::Social,
            config: AppConfig::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Everything the director decided for one recording.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub scenes: Vec<Scene>,
    pub keyframes: Vec<ZoomKeyframe>,
    pub cursor_path: Vec<CursorSample>,
    pub click_effects: Vec<ClickEffect>,
    pub key_badges: Vec<KeyBadge>,
    pub drags: Vec<DragSpan>,
}

/// Run the full analysis stage for a recording.
pub fn build_render_plan(
    recording: &Recording,
    config: &AppConfig,
    style: &OutputStyle,
) -> RetakeResult<RenderPlan> {
    let preprocessed = preprocess(&recording.events);
    let scenes = split_into_scenes(
        &preprocessed.events,
        recording.meta.screen_width as f64,
        recording.meta.screen_height as f64,
        config.render.max_zoom,
    );
    let keyframes = generate_zoom_plan(&scenes, &recording.meta, &config.render);
    validate_plan(&keyframes)?;

    // Cursor smoothing reads the raw pointer stream, not the decimated one.
    let raw_path = extract_cursor_path(&recording.events);
    let cursor_path = if config.render.cursor_smoothing {
        smooth_cursor_path(&raw_path)
    } else {
        raw_path
    };

    let click_effects = if config.render.click_ring_enabled {
        extract_click_effects(&preprocessed.events, style.click_ring_duration_ms)
    } else {
        Vec::new()
    };
    let key_badges = if config.render.key_badge_enabled {
        extract_key_badges(&preprocessed.events, style.key_badge_duration_ms)
    } else {
        Vec::new()
    };

    tracing::info!(
        events = recording.events.len(),
        scenes = scenes.len(),
        keyframes = keyframes.len(),
        drags = preprocessed.drags.len(),
        "Analysis complete"
    );

    Ok(RenderPlan {
        scenes,
        keyframes,
        cursor_path,
        click_effects,
        key_badges,
        drags: preprocessed.drags,
    })
}

/// Render a recording to its output file. The encoder runs as a subprocess
/// behind a pipe; this function blocks a worker thread for the duration.
pub async fn render_recording(
    job: RenderJob,
    progress: Option<ProgressCallback>,
) -> RetakeResult<PathBuf> {
    tokio::task::spawn_blocking(move || render_blocking(job, progress))
        .await
        .map_err(|e| RetakeError::internal(format!("render task panicked: {e}")))?
}

fn render_blocking(job: RenderJob, progress: Option<ProgressCallback>) -> RetakeResult<PathBuf> {
    let recording = Recording::load(&job.recording_dir)?;
    if recording.frame_count == 0 {
        return Err(RetakeError::input_invalid("recording has no frames"));
    }

    let params = EncodingParams::from_preset(
        job.quality,
        recording.meta.screen_width,
        recording.meta.screen_height,
    );
    let style = OutputStyle::from_settings(&params, &job.config);
    let plan = build_render_plan(&recording, &job.config, &style)?;

    let cursor_sprite = match &job.config.style.cursor_image_path {
        Some(path) => CursorSprite::from_path_or_synthetic(
            path,
            (
                job.config.style.cursor_hotspot_x,
                job.config.style.cursor_hotspot_y,
            ),
        ),
        None => CursorSprite::synthetic(),
    };
    let mut compositor = Compositor::new(style, cursor_sprite);

    if let Some(parent) = job.output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let ffmpeg = find_ffmpeg()?;
    let audio_path = recording.meta.has_audio.then(|| recording.dir.join("audio.wav"));
    let (canvas_w, canvas_h) = compositor.canvas_size();
    let mut encoder = FrameEncoder::spawn(
        &ffmpeg,
        job.format,
        &params,
        PipeFormat::default(),
        canvas_w,
        canvas_h,
        recording.effective_fps(),
        audio_path.as_deref(),
        &job.output_path,
    )?;

    let result = compose_frames(
        &recording,
        &plan,
        &mut compositor,
        &mut encoder,
        &job.cancel,
        progress.as_ref(),
    );

    match result {
        Ok(()) => {
            publish(progress.as_ref(), ProgressStage::Encoding, 1.0, None);
            encoder.finish()?;
            publish(
                progress.as_ref(),
                ProgressStage::Complete,
                1.0,
                Some(job.output_path.clone()),
            );
            Ok(job.output_path)
        }
        Err(e) => {
            // Partial output is never presented to the caller.
            encoder.abort();
            Err(e)
        }
    }
}

/// Walk every output frame in order: apply due keyframes, advance the
/// springs by the real inter-frame dt, compose, and hand the frame to the
/// sink. This is the only place viewport state advances.
pub fn compose_frames(
    recording: &Recording,
    plan: &RenderPlan,
    compositor: &mut Compositor,
    sink: &mut dyn FrameSink,
    cancel: &CancelFlag,
    progress: Option<&ProgressCallback>,
) -> RetakeResult<()> {
    let screen_w = recording.meta.screen_width as f64;
    let screen_h = recording.meta.screen_height as f64;
    let mut viewport = ViewportIntegrator::new(screen_w, screen_h, plan.keyframes.clone());

    let mut prev_time_ms = 0u64;
    for index in 0..recording.frame_count {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!("Render cancelled at frame {index}");
            return Err(RetakeError::Cancelled);
        }

        let time_ms = recording.frame_timestamp_ms(index);
        let dt = time_ms.saturating_sub(prev_time_ms) as f64 / 1000.0;
        prev_time_ms = time_ms;

        let rect = viewport.advance_to(time_ms, dt);

        let frame_path = recording.frame_path(index);
        let raw_frame = image::open(&frame_path)
            .map_err(|_| RetakeError::asset_missing(frame_path.clone()))?
            .to_rgba8();

        let cursor_pos = sample_at(&plan.cursor_path, time_ms);
        let badge = plan
            .key_badges
            .iter()
            .rfind(|b| b.is_visible(time_ms));

        let composed = compositor.compose_frame(
            &raw_frame,
            &rect,
            time_ms,
            cursor_pos,
            &plan.click_effects,
            badge,
        );
        sink.write_frame(&composed)?;

        if index % 30 == 0 || index + 1 == recording.frame_count {
            publish(
                progress,
                ProgressStage::Composing,
                (index + 1) as f64 / recording.frame_count as f64,
                None,
            );
        }
    }

    Ok(())
}

fn publish(
    progress: Option<&ProgressCallback>,
    stage: ProgressStage,
    value: f64,
    output_path: Option<PathBuf>,
) {
    if let Some(cb) = progress {
        cb(ProgressEvent {
            stage,
            progress: value,
            output_path,
        });
    }
}
