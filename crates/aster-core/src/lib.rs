//! Core utilities for the aster renderer.
//!
//! This crate provides foundational types and utilities used across the renderer:
//! - Error types and result aliases
//! - Logging initialization
//! - Timing and frame pacing
//! - Configuration loading

mod config;
mod error;
mod logging;
mod timer;

pub use config::{Config, DebugConfig, GraphicsConfig, WindowConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::{FrameLimiter, Timer};
