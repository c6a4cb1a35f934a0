//! Print the detected scene list for a recording.

use std::path::PathBuf;

use retake_common::config::AppConfig;
use retake_director::preprocess::preprocess;
use retake_director::scene::split_into_scenes;
use retake_recording_model::meta::Recording;

pub fn run(dir: PathBuf, json: bool) -> anyhow::Result<()> {
    let recording = Recording::load(&dir)?;
    let config = AppConfig::load();

    let preprocessed = preprocess(&recording.events);
    let scenes = split_into_scenes(
        &preprocessed.events,
        recording.meta.screen_width as f64,
        recording.meta.screen_height as f64,
        config.render.max_zoom,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&scenes)?);
        return Ok(());
    }

    println!(
        "{} scenes over {} events ({} drags)",
        scenes.len(),
        recording.events.len(),
        preprocessed.drags.len()
    );
    for scene in &scenes {
        println!(
            "  #{:<3} {:>7}ms..{:>7}ms  center=({:.0},{:.0})  zoom={:.2}  events={}",
            scene.id,
            scene.start_ms,
            scene.end_ms,
            scene.center_x,
            scene.center_y,
            scene.zoom_level,
            scene.event_count
        );
    }
    Ok(())
}
