//! Multisampled color target.
//!
//! When MSAA is enabled, rendering happens into a multisampled color image
//! that is resolved into the (single-sampled) swapchain image at the end of
//! the pass. This module owns that intermediate image.

use std::sync::Arc;

use ash::vk;
use tracing::info;

use aster_rhi::RhiResult;
use aster_rhi::device::Device;
use aster_rhi::image::{Image2D, ImageDesc};

/// Multisampled color render target.
///
/// The image uses the swapchain's color format so the resolve is a plain
/// sample average. Its contents never outlive the frame, hence the transient
/// attachment usage hint.
pub struct ColorTarget {
    image: Image2D,
}

impl ColorTarget {
    /// Creates a multisampled color target.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `width` - Width in pixels (swapchain extent)
    /// * `height` - Height in pixels (swapchain extent)
    /// * `format` - Color format (the swapchain format)
    /// * `samples` - Sample count (> 1)
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
                usage: vk::ImageUsageFlags::COLOR_ATTACHMENT
                    | vk::ImageUsageFlags::TRANSIENT_ATTACHMENT,
                aspect: vk::ImageAspectFlags::COLOR,
            },
        )?;

        info!(
            "Created MSAA color target: {}x{} ({:?}, {:?})",
            width, height, format, samples
        );

        Ok(Self { image })
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

    /// Returns the color format.
    #[inline]
    pub fn format(&self) -> vk::Format {
        self.image.format()
    }

    /// Returns the sample count.
    #[inline]
    pub fn samples(&self) -> vk::SampleCountFlags {
        self.image.samples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_target_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ColorTarget>();
    }
}
