//! Texture sampler management.
//!
//! This module wraps VkSampler creation. Samplers define how textures are
//! filtered and addressed when read in shaders.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::RhiResult;

/// Vulkan sampler wrapper.
///
/// The sampler is configured for standard textured-mesh rendering:
/// - Linear magnification/minification filtering
/// - Repeat addressing on all axes
/// - Anisotropic filtering (when a max anisotropy > 1 is given)
/// - Linear mipmap interpolation across the full mip range
///
/// # Thread Safety
///
/// The sampler is immutable after creation and can be safely shared
/// between threads.
pub struct Sampler {
    /// Reference to the logical device.
    device: Arc<Device>,
    /// Vulkan sampler handle.
    sampler: vk::Sampler,
    /// Number of mip levels the sampler addresses.
    mip_levels: u32,
}

impl Sampler {
    /// Creates a new sampler.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `max_anisotropy` - Maximum anisotropy, typically the device limit
    ///   (`max_sampler_anisotropy`). Values <= 1.0 disable anisotropic filtering.
    /// * `mip_levels` - Number of mip levels in the sampled image; sets the
    ///   sampler's max LOD so the full mip chain is used
    ///
    /// # Errors
    ///
    /// Returns an error if sampler creation fails.
    pub fn new(device: Arc<Device>, max_anisotropy: f32, mip_levels: u32) -> RhiResult<Self> {
        let anisotropy_enable = max_anisotropy > 1.0;

        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .anisotropy_enable(anisotropy_enable)
            .max_anisotropy(max_anisotropy.max(1.0))
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(mip_levels as f32);

        let sampler = unsafe { device.handle().create_sampler(&create_info, None)? };

        debug!(
            "Created sampler (anisotropy: {}, mip levels: {})",
            if anisotropy_enable {
                format!("{:.0}x", max_anisotropy)
            } else {
                "off".to_string()
            },
            mip_levels
        );

        Ok(Self {
            device,
            sampler,
            mip_levels,
        })
    }

    /// Returns the Vulkan sampler handle.
    #[inline]
    pub fn handle(&self) -> vk::Sampler {
        self.sampler
    }

    /// Returns the number of mip levels the sampler addresses.
    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_sampler(self.sampler, None);
        }
        debug!("Destroyed sampler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Sampler>();
    }
}
