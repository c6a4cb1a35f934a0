pub mod info;
pub mod plan;
pub mod render;
pub mod scenes;
pub mod thumbnail;
