//! Retake Director: the analysis pipeline
//!
//! Turns a raw, noisy event stream into a semantically meaningful camera
//! plan:
//! - **Preprocess:** decimate pointer noise, infer drag spans
//! - **Scenes:** partition activity into user-intent scenes
//! - **Plan:** emit sparse zoom keyframes with anticipatory timing
//! - **Springs:** critically damped motion that turns keyframes into a
//!   continuous viewport trajectory
//! - **Cursor:** spring-filter the raw cursor path
//!
//! This crate is pure computation: no I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod cursor;
pub mod planner;
pub mod preprocess;
pub mod scene;
pub mod spring;
pub mod viewport;

pub use planner::{generate_zoom_plan, TransitionKind, ZoomKeyframe};
pub use scene::{split_into_scenes, Scene};
pub use spring::Spring;
pub use viewport::{ViewportIntegrator, ViewportRect};
