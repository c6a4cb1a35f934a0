//! Retake Common Utilities
//!
//! Shared infrastructure for all Retake crates:
//! - Error taxonomy and result alias
//! - Tracing/logging initialization
//! - Settings loading and persistence

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
