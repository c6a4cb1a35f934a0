//! Show recording information.

use std::path::PathBuf;

use retake_recording_model::meta::Recording;

pub fn run(dir: PathBuf) -> anyhow::Result<()> {
    let recording = Recording::load(&dir)?;
    let meta = &recording.meta;

    println!("Recording: {}", meta.id);
    println!("  Directory:  {}", recording.dir.display());
    println!("  Screen:     {}x{}", meta.screen_width, meta.screen_height);
    println!(
        "  Duration:   {:.1}s ({} frames, {:.1} fps effective, {} fps nominal)",
        meta.duration_ms as f64 / 1000.0,
        recording.frame_count,
        recording.effective_fps(),
        meta.fps
    );
    println!("  Mode:       {:?}", meta.recording_mode);
    println!("  Audio:      {}", if meta.has_audio { "yes" } else { "no" });
    println!("  Events:     {}", recording.events.len());
    if let Some(title) = &meta.window_title {
        println!("  Window:     {title}");
    }
    Ok(())
}
