//! Depth buffer management.
//!
//! This module handles depth buffer creation for depth testing in 3D
//! rendering. The depth image matches the sample count of the color target so
//! it can be attached alongside it when multisampling is enabled.

use std::sync::Arc;

use ash::vk;
use tracing::info;

use aster_rhi::RhiResult;
use aster_rhi::device::Device;
use aster_rhi::image::{Image2D, ImageDesc};

/// Default depth buffer format (32-bit floating point).
pub const DEFAULT_DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

/// Depth buffer for depth testing.
///
/// Wraps a GPU-only depth image and its view. Recreated together with the
/// swapchain whenever the window size changes.
pub struct DepthBuffer {
    image: Image2D,
}

impl DepthBuffer {
    /// Creates a new depth buffer.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `format` - Depth format (D32_SFLOAT recommended)
    /// * `samples` - Sample count, matching the color target
    ///
    /// # Errors
    ///
    /// Returns an error if image or view creation fails.
    pub fn new(
        device: Arc<Device>,
        width: u32,
        height: u32,
        format: vk::Format,
        samples: vk::SampleCountFlags,
    ) -> RhiResult<Self> {
        let image = Image2D::new(
            device,
            &ImageDesc {
                width,
                height,
                format,
                mip_levels: 1,
                samples,
                usage: vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
                aspect: vk::ImageAspectFlags::DEPTH,
            },
        )?;

        info!(
            "Created depth buffer: {}x{} ({:?}, {:?})",
            width, height, format, samples
        );

        Ok(Self { image })
    }

    /// Creates a depth buffer with the default format (D32_SFLOAT).
    ///
    /// # Errors
    ///
    /// Returns an error if depth buffer creation fails.
    pub fn with_default_format(
        device: Arc<Device>,
        width: u32,
        height: u32,
        samples: vk::SampleCountFlags,
    ) -> RhiResult<Self> {
        Self::new(device, width, height, DEFAULT_DEPTH_FORMAT, samples)
    }

    /// Returns the Vulkan image handle.
    #[inline]
    pub fn image(&self) -> vk::Image {
        self.image.handle()
    }

    /// Returns the Vulkan image view handle.
    #[inline]
    pub fn image_view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Returns the depth format.
    #[inline]
    pub fn format(&self) -> vk::Format {
        self.image.format()
    }

    /// Returns the sample count.
    #[inline]
    pub fn samples(&self) -> vk::SampleCountFlags {
        self.image.samples()
    }

    /// Returns the depth buffer extent (width and height).
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.image.extent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_depth_format() {
        assert_eq!(DEFAULT_DEPTH_FORMAT, vk::Format::D32_SFLOAT);
    }

    #[test]
    fn test_depth_format_is_valid() {
        // Verify D32_SFLOAT is a depth format
        let format = DEFAULT_DEPTH_FORMAT;
        assert!(matches!(
            format,
            vk::Format::D32_SFLOAT
                | vk::Format::D32_SFLOAT_S8_UINT
                | vk::Format::D24_UNORM_S8_UINT
                | vk::Format::D16_UNORM
        ));
    }
}
