//! Sampled textures.
//!
//! This module combines an [`Image2D`], a mipmapped upload path and a
//! [`Sampler`] into a [`Texture`] ready for descriptor binding.
//!
//! # Upload path
//!
//! Texture data is written into a host-visible staging buffer, copied into
//! mip level 0 of a device-local image, and the remaining mip levels are
//! generated on the GPU by blitting each level down from the previous one.
//! All of this is recorded into a single one-time command buffer.

use std::sync::Arc;

use ash::vk;
use tracing::info;

use crate::buffer::{Buffer, BufferUsage};
use crate::command::{CommandBuffer, CommandPool, one_time_submit};
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::image::{Image2D, ImageDesc};
use crate::sampler::Sampler;

/// Format used for all sampled textures.
pub const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;

/// Returns the number of mip levels for an image of the given size.
///
/// This is `floor(log2(max(width, height))) + 1`, the full chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// A sampled 2D texture: image, full mip chain and sampler.
pub struct Texture {
    /// The device-local image with its view.
    image: Image2D,
    /// The sampler covering the image's mip range.
    sampler: Sampler,
}

impl Texture {
    /// Creates a texture from RGBA8 pixel data.
    ///
    /// The pixel data is uploaded through a staging buffer. When
    /// `generate_mips` is set, the full mip chain is generated with linear
    /// blits; the caller is responsible for checking that the device supports
    /// linear-filtered blits for [`TEXTURE_FORMAT`] (see
    /// `vkGetPhysicalDeviceFormatProperties`). Otherwise the texture has a
    /// single mip level.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `pool` - Command pool for the upload commands (graphics queue family)
    /// * `pixels` - Tightly packed RGBA8 data, `width * height * 4` bytes
    /// * `width` - Texture width in pixels
    /// * `height` - Texture height in pixels
    /// * `generate_mips` - Generate the full mip chain via blits
    /// * `max_anisotropy` - Maximum sampler anisotropy (device limit)
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel data size doesn't match the dimensions,
    /// or if any Vulkan operation fails.
    pub fn from_rgba8(
        device: Arc<Device>,
        pool: &CommandPool,
        pixels: &[u8],
        width: u32,
        height: u32,
        generate_mips: bool,
        max_anisotropy: f32,
    ) -> RhiResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RhiError::TextureError(format!(
                "Pixel data size mismatch: got {} bytes, expected {} for {}x{} RGBA8",
                pixels.len(),
                expected,
                width,
                height
            )));
        }

        let mip_levels = if generate_mips {
            mip_level_count(width, height)
        } else {
            1
        };

        // Stage the pixel data
        let staging = Buffer::new_with_data(device.clone(), BufferUsage::Staging, pixels)?;

        // Mip generation blits read back from the image, so it is a transfer
        // source as well as a destination
        let mut usage = vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED;
        if mip_levels > 1 {
            usage |= vk::ImageUsageFlags::TRANSFER_SRC;
        }

        let image = Image2D::new(
            device.clone(),
            &ImageDesc {
                width,
                height,
                format: TEXTURE_FORMAT,
                mip_levels,
                samples: vk::SampleCountFlags::TYPE_1,
                usage,
                aspect: vk::ImageAspectFlags::COLOR,
            },
        )?;

        one_time_submit(&device, pool, |cmd| {
            upload_and_mipmap(cmd, &staging, &image, width, height, mip_levels);
            Ok(())
        })?;

        let sampler = Sampler::new(device, max_anisotropy, mip_levels)?;

        info!(
            "Texture uploaded: {}x{}, {} mip level(s)",
            width, height, mip_levels
        );

        Ok(Self { image, sampler })
    }

    /// Returns the image view handle.
    #[inline]
    pub fn view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Returns the sampler handle.
    #[inline]
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler.handle()
    }

    /// Returns the number of mip levels.
    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.image.mip_levels()
    }

    /// Returns the texture extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.image.extent()
    }

    /// Returns a descriptor image info for binding this texture as a
    /// combined image sampler.
    pub fn descriptor_info(&self) -> vk::DescriptorImageInfo {
        vk::DescriptorImageInfo::default()
            .sampler(self.sampler.handle())
            .image_view(self.image.view())
            .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
    }
}

/// Records the staging copy and mip chain generation.
fn upload_and_mipmap(
    cmd: &CommandBuffer,
    staging: &Buffer,
    image: &Image2D,
    width: u32,
    height: u32,
    mip_levels: u32,
) {
    // Transition the whole mip chain for transfer writes
    cmd.pipeline_barrier(
        vk::PipelineStageFlags::TOP_OF_PIPE,
        vk::PipelineStageFlags::TRANSFER,
        &[mip_barrier(
            image.handle(),
            0,
            mip_levels,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::AccessFlags::empty(),
            vk::AccessFlags::TRANSFER_WRITE,
        )],
    );

    // Copy the staged pixels into mip level 0
    let region = vk::BufferImageCopy::default()
        .buffer_offset(0)
        .buffer_row_length(0)
        .buffer_image_height(0)
        .image_subresource(
            vk::ImageSubresourceLayers::default()
                .aspect_mask(vk::ImageAspectFlags::COLOR)
                .mip_level(0)
                .base_array_layer(0)
                .layer_count(1),
        )
        .image_extent(vk::Extent3D {
            width,
            height,
            depth: 1,
        });

    cmd.copy_buffer_to_image(
        staging.handle(),
        image.handle(),
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        &[region],
    );

    if mip_levels == 1 {
        cmd.pipeline_barrier(
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
            &[mip_barrier(
                image.handle(),
                0,
                1,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                vk::AccessFlags::TRANSFER_WRITE,
                vk::AccessFlags::SHADER_READ,
            )],
        );
        return;
    }

    // Blit each level down from the previous one, transitioning levels to
    // SHADER_READ_ONLY as they are consumed
    let mut mip_width = width as i32;
    let mut mip_height = height as i32;

    for level in 1..mip_levels {
        // The previous level was just written; make it a blit source
        cmd.pipeline_barrier(
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::TRANSFER,
            &[mip_barrier(
                image.handle(),
                level - 1,
                1,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                vk::AccessFlags::TRANSFER_WRITE,
                vk::AccessFlags::TRANSFER_READ,
            )],
        );

        let next_width = (mip_width / 2).max(1);
        let next_height = (mip_height / 2).max(1);

        let blit = vk::ImageBlit::default()
            .src_subresource(
                vk::ImageSubresourceLayers::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .mip_level(level - 1)
                    .base_array_layer(0)
                    .layer_count(1),
            )
            .src_offsets([
                vk::Offset3D { x: 0, y: 0, z: 0 },
                vk::Offset3D {
                    x: mip_width,
                    y: mip_height,
                    z: 1,
                },
            ])
            .dst_subresource(
                vk::ImageSubresourceLayers::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .mip_level(level)
                    .base_array_layer(0)
                    .layer_count(1),
            )
            .dst_offsets([
                vk::Offset3D { x: 0, y: 0, z: 0 },
                vk::Offset3D {
                    x: next_width,
                    y: next_height,
                    z: 1,
                },
            ]);

        cmd.blit_image(
            image.handle(),
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            image.handle(),
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            &[blit],
            vk::Filter::LINEAR,
        );

        // The previous level is final; hand it to the fragment shader
        cmd.pipeline_barrier(
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
            &[mip_barrier(
                image.handle(),
                level - 1,
                1,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                vk::AccessFlags::TRANSFER_READ,
                vk::AccessFlags::SHADER_READ,
            )],
        );

        mip_width = next_width;
        mip_height = next_height;
    }

    // The last level was only ever a transfer destination
    cmd.pipeline_barrier(
        vk::PipelineStageFlags::TRANSFER,
        vk::PipelineStageFlags::FRAGMENT_SHADER,
        &[mip_barrier(
            image.handle(),
            mip_levels - 1,
            1,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            vk::AccessFlags::TRANSFER_WRITE,
            vk::AccessFlags::SHADER_READ,
        )],
    );
}

/// Builds an image memory barrier for a range of mip levels.
#[allow(clippy::too_many_arguments)]
fn mip_barrier(
    image: vk::Image,
    base_mip: u32,
    level_count: u32,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    src_access: vk::AccessFlags,
    dst_access: vk::AccessFlags,
) -> vk::ImageMemoryBarrier<'static> {
    vk::ImageMemoryBarrier::default()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(
            vk::ImageSubresourceRange::default()
                .aspect_mask(vk::ImageAspectFlags::COLOR)
                .base_mip_level(base_mip)
                .level_count(level_count)
                .base_array_layer(0)
                .layer_count(1),
        )
        .src_access_mask(src_access)
        .dst_access_mask(dst_access)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(4, 4), 3);
        assert_eq!(mip_level_count(512, 512), 10);
        assert_eq!(mip_level_count(1024, 1024), 11);
        // Non-square images use the larger dimension
        assert_eq!(mip_level_count(1024, 1), 11);
        assert_eq!(mip_level_count(1, 1024), 11);
        // Non-power-of-two rounds down
        assert_eq!(mip_level_count(1000, 600), 10);
    }

    #[test]
    fn test_mip_barrier_range() {
        let barrier = mip_barrier(
            vk::Image::null(),
            3,
            1,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            vk::AccessFlags::TRANSFER_WRITE,
            vk::AccessFlags::TRANSFER_READ,
        );

        assert_eq!(barrier.subresource_range.base_mip_level, 3);
        assert_eq!(barrier.subresource_range.level_count, 1);
        assert_eq!(barrier.old_layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        assert_eq!(barrier.new_layout, vk::ImageLayout::TRANSFER_SRC_OPTIMAL);
    }

    #[test]
    fn test_texture_format_is_srgb() {
        assert_eq!(TEXTURE_FORMAT, vk::Format::R8G8B8A8_SRGB);
    }
}
