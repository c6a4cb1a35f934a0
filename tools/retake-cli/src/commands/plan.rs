//! Print the zoom keyframe plan for a recording.

use std::path::PathBuf;

use retake_common::config::AppConfig;
use retake_director::planner::generate_zoom_plan;
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
    let plan = generate_zoom_plan(&scenes, &recording.meta, &config.render);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{} keyframes from {} scenes", plan.len(), scenes.len());
    for kf in &plan {
        println!(
            "  {:>7}ms  {:<9}  target=({:.0},{:.0})  zoom={:.2}",
            kf.time_ms,
            format!("{:?}", kf.transition),
            kf.target_x,
            kf.target_y,
            kf.zoom_level
        );
    }
    Ok(())
}
