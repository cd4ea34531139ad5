//! Scene components for the aster renderer.
//!
//! This crate provides camera management:
//! - Perspective/orthographic cameras with Vulkan-style projection
//! - FPS-style camera controller

pub mod camera;

pub use camera::{Camera, FpsController, Projection};
