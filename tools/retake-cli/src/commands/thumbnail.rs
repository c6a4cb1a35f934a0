//! Generate a thumbnail for a recording.

use std::path::PathBuf;

use retake_render_engine::thumbnail::generate_thumbnail;

pub fn run(dir: PathBuf) -> anyhow::Result<()> {
    let path = generate_thumbnail(&dir)?;
    println!("Thumbnail written to {}", path.display());
    Ok(())
}
