//! Render a recording to video.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use retake_common::config::AppConfig;
use retake_render_engine::pipeline::{render_recording, ProgressStage, RenderJob};
use retake_render_engine::presets::{ExportFormat, QualityPreset};

pub async fn run(
    dir: PathBuf,
    output: Option<PathBuf>,
    format: &str,
    quality: &str,
    no_auto_zoom: bool,
) -> anyhow::Result<()> {
    let format = parse_format(format)?;
    let quality = parse_quality(quality)?;

    let mut config = AppConfig::load();
    if no_auto_zoom {
        config.render.auto_zoom_enabled = false;
    }

    let output_path = output.unwrap_or_else(|| {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        dir.join(format!("{name}.{}", format.extension()))
    });

    let job = RenderJob {
        recording_dir: dir,
        output_path,
        format,
        quality,
        config,
        cancel: Arc::new(AtomicBool::new(false)),
    };

    // Ctrl-C flips the cooperative cancel flag; the pipeline aborts the
    // encoder and surfaces a distinct Cancelled error.
    let cancel = job.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let progress: retake_render_engine::pipeline::ProgressCallback =
        Box::new(|event| match event.stage {
            ProgressStage::Composing => {
                use std::io::Write;
                print!("\r  Composing {:>3.0}%", event.progress * 100.0);
                let _ = std::io::stdout().flush();
            }
            ProgressStage::Encoding => println!("\n  Encoding..."),
            ProgressStage::Complete => {
                if let Some(path) = &event.output_path {
                    println!("  Done: {}", path.display());
                }
            }
        });

    let path = render_recording(job, Some(progress)).await?;
    println!("Rendered {}", path.display());
    Ok(())
}

fn parse_format(raw: &str) -> anyhow::Result<ExportFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mp4" => Ok(ExportFormat::Mp4),
        "webm" => Ok(ExportFormat::WebM),
        "gif" => Ok(ExportFormat::Gif),
        other => Err(anyhow::anyhow!(
            "Invalid format: {other}. Use one of: mp4, webm, gif"
        )),
    }
}

fn parse_quality(raw: &str) -> anyhow::Result<QualityPreset> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "social" => Ok(QualityPreset::Social),
        "high" => Ok(QualityPreset::HighQuality),
        "light" => Ok(QualityPreset::Lightweight),
        other => Err(anyhow::anyhow!(
            "Invalid quality: {other}. Use one of: social, high, light"
        )),
    }
}
