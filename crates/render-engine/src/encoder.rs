//! Encoder subprocess driver.
//!
//! The engine never encodes video itself: rendered frames are piped to an
//! external ffmpeg process via stdin, either as uncompressed BMP images or
//! as raw RGBA planes. BMP is the default: at similar cost it moves ~10x
//! faster than PNG through the pipe. The pipe's buffer provides natural
//! back-pressure when the encoder falls behind.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbaImage;

use retake_common::error::{RetakeError, RetakeResult};

use crate::presets::{EncodingParams, ExportFormat};

/// Wire format negotiated with the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipeFormat {
    /// Uncompressed BMP frames over image2pipe.
    #[default]
    Bmp,
    /// Raw RGBA planes; no per-frame header at all.
    RawRgba,
}

/// Anything that accepts rendered frames in order. The production sink is
/// [`FrameEncoder`]; tests substitute collectors.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbaImage) -> RetakeResult<()>;
}

/// A running ffmpeg process fed through stdin.
pub struct FrameEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    output_path: PathBuf,
    pipe_format: PipeFormat,
    canvas_width: u32,
    canvas_height: u32,
    frames_written: u64,
}

impl FrameEncoder {
    /// Spawn ffmpeg configured for the given format/preset, reading frames
    /// from stdin and writing `output_path`.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        ffmpeg: &str,
        format: ExportFormat,
        params: &EncodingParams,
        pipe_format: PipeFormat,
        canvas_width: u32,
        canvas_height: u32,
        input_fps: f64,
        audio_path: Option<&Path>,
        output_path: &Path,
    ) -> RetakeResult<Self> {
        let args = build_encoder_args(
            format,
            params,
            pipe_format,
            canvas_width,
            canvas_height,
            input_fps,
            audio_path,
            output_path,
        );

        tracing::info!(ffmpeg, ?format, "Spawning encoder: {}", args.join(" "));

        let mut child = Command::new(ffmpeg)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RetakeError::encoder(format!("failed to spawn {ffmpeg}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RetakeError::encoder("encoder stdin unavailable"))?;

        Ok(Self {
            child,
            stdin: Some(stdin),
            output_path: output_path.to_path_buf(),
            pipe_format,
            canvas_width,
            canvas_height,
            frames_written: 0,
        })
    }

    /// Close stdin and wait for the encoder. Non-zero exit discards the
    /// partial output and fails the job.
    pub fn finish(mut self) -> RetakeResult<()> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| RetakeError::encoder(format!("failed to wait for encoder: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let _ = std::fs::remove_file(&self.output_path);
            return Err(RetakeError::encoder(format!(
                "encoder exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::info!(
            frames = self.frames_written,
            output = %self.output_path.display(),
            "Encoder finished"
        );
        Ok(())
    }

    /// Kill the encoder and discard the partial output (cancellation path).
    pub fn abort(mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.output_path);
    }
}

impl FrameSink for FrameEncoder {
    fn write_frame(&mut self, frame: &RgbaImage) -> RetakeResult<()> {
        if frame.width() != self.canvas_width || frame.height() != self.canvas_height {
            return Err(RetakeError::internal(format!(
                "frame size {}x{} does not match negotiated {}x{}",
                frame.width(),
                frame.height(),
                self.canvas_width,
                self.canvas_height
            )));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| RetakeError::encoder("encoder stdin already closed"))?;

        let result = match self.pipe_format {
            PipeFormat::RawRgba => stdin.write_all(frame.as_raw()),
            PipeFormat::Bmp => {
                let rgb = image::DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
                let mut buf = std::io::Cursor::new(Vec::new());
                rgb.write_to(&mut buf, image::ImageFormat::Bmp)
                    .map_err(|e| RetakeError::encoder(format!("BMP encode failed: {e}")))?;
                stdin.write_all(buf.get_ref())
            }
        };

        result.map_err(|e| RetakeError::encoder(format!("encoder pipe closed early: {e}")))?;
        self.frames_written += 1;
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn build_encoder_args(
    format: ExportFormat,
    params: &EncodingParams,
    pipe_format: PipeFormat,
    canvas_width: u32,
    canvas_height: u32,
    input_fps: f64,
    audio_path: Option<&Path>,
    output_path: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
    ];

    match pipe_format {
        PipeFormat::RawRgba => {
            args.extend([
                "-f".into(),
                "rawvideo".into(),
                "-pix_fmt".into(),
                "rgba".into(),
                "-s".into(),
                format!("{canvas_width}x{canvas_height}"),
            ]);
        }
        PipeFormat::Bmp => {
            args.extend(["-f".into(), "image2pipe".into(), "-vcodec".into(), "bmp".into()]);
        }
    }
    args.extend(["-framerate".into(), format!("{input_fps:.3}"), "-i".into(), "-".into()]);

    let audio = audio_path.filter(|p| p.exists());
    if let Some(path) = audio {
        args.extend(["-i".into(), path.to_string_lossy().into_owned()]);
    }

    match format {
        ExportFormat::Mp4 => {
            args.extend([
                "-c:v".into(),
                "libx264".into(),
                "-crf".into(),
                params.crf.to_string(),
                "-preset".into(),
                "medium".into(),
                "-pix_fmt".into(),
                "yuv420p".into(),
                "-movflags".into(),
                "+faststart".into(),
                "-r".into(),
                params.fps.to_string(),
            ]);
            if audio.is_some() {
                args.extend([
                    "-c:a".into(),
                    "aac".into(),
                    "-b:a".into(),
                    "128k".into(),
                    "-shortest".into(),
                ]);
            }
        }
        ExportFormat::WebM => {
            args.extend([
                "-c:v".into(),
                "libvpx-vp9".into(),
                "-crf".into(),
                params.crf.to_string(),
                "-b:v".into(),
                "0".into(),
                "-r".into(),
                params.fps.to_string(),
            ]);
            if audio.is_some() {
                args.extend(["-c:a".into(), "libopus".into(), "-shortest".into()]);
            }
        }
        ExportFormat::Gif => {
            let width = params.canvas_width.min(640);
            args.extend([
                "-lavfi".into(),
                format!(
                    "fps=15,scale={width}:-1:flags=lanczos,split[s0][s1];\
                     [s0]palettegen[p];[s1][p]paletteuse"
                ),
            ]);
        }
    }

    args.push(output_path.to_string_lossy().into_owned());
    args
}

/// Locate ffmpeg: $RETAKE_FFMPEG overrides, else rely on PATH.
pub fn find_ffmpeg() -> RetakeResult<String> {
    if let Ok(path) = std::env::var("RETAKE_FFMPEG") {
        if Path::new(&path).exists() {
            return Ok(path);
        }
    }

    let probe = Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match probe {
        Ok(status) if status.success() => Ok("ffmpeg".to_string()),
        _ => Err(RetakeError::encoder(
            "ffmpeg not found; install it or set RETAKE_FFMPEG",
        )),
    }
}
