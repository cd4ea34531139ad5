//! Main rendering pipeline.
//!
//! This crate orchestrates the rendering process:
//! - Frame synchronization and submission ([`frame_manager`])
//! - Depth and multisampled color targets
//! - Uniform buffer layouts
//! - The top-level [`Renderer`]

pub mod depth_buffer;
pub mod frame_manager;
pub mod render_target;
pub mod renderer;
pub mod ubo;

pub use frame_manager::FrameManager;
pub use renderer::Renderer;

/// Maximum number of frames that can be in flight simultaneously.
///
/// Two slots let the CPU prepare the next frame while the GPU renders the
/// current one, without unbounded latency.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;
