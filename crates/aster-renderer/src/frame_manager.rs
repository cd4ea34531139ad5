//! Frame management and synchronization.
//!
//! This module provides the [`FrameManager`] struct for managing per-frame
//! resources and coordinating the rendering loop. It handles:
//!
//! - Per-frame command buffers
//! - Synchronization primitives (semaphores and fences)
//! - Swapchain image acquisition and presentation
//! - Frame-in-flight management
//!
//! # Synchronization protocol
//!
//! The manager implements the standard bounded-latency frame pipeline:
//!
//! 1. Wait on the in-flight fence for the current frame slot.
//! 2. Acquire the next swapchain image (signals the slot's image-available
//!    semaphore). An out-of-date result aborts the frame so the caller can
//!    recreate the swapchain.
//! 3. If the acquired image is still referenced by a fence from a previous
//!    in-flight frame, wait on that fence too, then claim the image for the
//!    current frame's fence.
//! 4. Reset the fence, record, and submit: wait on image-available, signal
//!    render-finished and the fence.
//! 5. Present, waiting on render-finished.
//! 6. Advance the frame slot modulo [`MAX_FRAMES_IN_FLIGHT`].

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info};

use aster_rhi::RhiResult;
use aster_rhi::command::{CommandBuffer, CommandPool};
use aster_rhi::device::Device;
use aster_rhi::swapchain::Swapchain;
use aster_rhi::sync::{Fence, Semaphore};

use crate::MAX_FRAMES_IN_FLIGHT;

/// Outcome of a swapchain image acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired and the frame can proceed. `suboptimal` asks for
    /// a swapchain recreation after this frame is presented.
    Acquired { suboptimal: bool },
    /// The swapchain is out of date; the frame must be aborted and the
    /// swapchain recreated.
    OutOfDate,
}

/// Per-frame rendering data.
///
/// Each frame in flight has its own set of resources to avoid synchronization
/// issues between frames: a command buffer, two semaphores and a fence.
pub struct FrameData {
    /// Command buffer for recording rendering commands.
    command_buffer: CommandBuffer,
    /// Semaphore signaled when a swapchain image is available.
    image_available_semaphore: Semaphore,
    /// Semaphore signaled when rendering is complete.
    render_finished_semaphore: Semaphore,
    /// Fence used to wait for frame completion before reusing resources.
    in_flight_fence: Fence,
}

impl FrameData {
    /// Creates a new set of per-frame resources.
    fn new(device: Arc<Device>, command_pool: &CommandPool) -> RhiResult<Self> {
        let command_buffer = CommandBuffer::new(device.clone(), command_pool)?;
        let image_available_semaphore = Semaphore::new(device.clone())?;
        let render_finished_semaphore = Semaphore::new(device.clone())?;
        // Create fence in signaled state so the first wait doesn't block forever
        let in_flight_fence = Fence::new(device, true)?;

        Ok(Self {
            command_buffer,
            image_available_semaphore,
            render_finished_semaphore,
            in_flight_fence,
        })
    }

    /// Returns a reference to the command buffer.
    #[inline]
    pub fn command_buffer(&self) -> &CommandBuffer {
        &self.command_buffer
    }

    /// Returns a reference to the image available semaphore.
    #[inline]
    pub fn image_available_semaphore(&self) -> &Semaphore {
        &self.image_available_semaphore
    }

    /// Returns a reference to the render finished semaphore.
    #[inline]
    pub fn render_finished_semaphore(&self) -> &Semaphore {
        &self.render_finished_semaphore
    }

    /// Returns a reference to the in-flight fence.
    #[inline]
    pub fn in_flight_fence(&self) -> &Fence {
        &self.in_flight_fence
    }
}

/// Manages per-frame resources and the frame rendering loop.
///
/// The manager maintains [`MAX_FRAMES_IN_FLIGHT`] sets of resources plus a
/// table mapping each swapchain image to the fence of the frame that last
/// rendered into it. The table closes the double-buffering hazard where an
/// image comes back from the presentation engine while an older frame that
/// rendered to it is still in flight.
///
/// # Thread Safety
///
/// The frame manager is not thread-safe. It should only be accessed
/// from a single thread (typically the main/render thread).
pub struct FrameManager {
    /// Reference to the logical device.
    device: Arc<Device>,
    /// Per-frame resources.
    frames: Vec<FrameData>,
    /// Fence of the in-flight frame that last used each swapchain image
    /// (null when the image is free).
    images_in_flight: Vec<vk::Fence>,
    /// Current frame index (0 to MAX_FRAMES_IN_FLIGHT - 1).
    current_frame: usize,
    /// Current swapchain image index.
    image_index: u32,
}

impl FrameManager {
    /// Creates a new frame manager.
    ///
    /// This allocates [`MAX_FRAMES_IN_FLIGHT`] sets of per-frame resources
    /// and an image-fence table sized for the swapchain.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `command_pool` - The command pool to allocate command buffers from
    /// * `image_count` - Number of swapchain images
    ///
    /// # Errors
    ///
    /// Returns an error if any resource creation fails.
    pub fn new(
        device: Arc<Device>,
        command_pool: &CommandPool,
        image_count: usize,
    ) -> RhiResult<Self> {
        let mut frames = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);

        for i in 0..MAX_FRAMES_IN_FLIGHT {
            let frame_data = FrameData::new(device.clone(), command_pool)?;
            debug!("Created frame data for frame {}", i);
            frames.push(frame_data);
        }

        info!(
            "Frame manager created with {} frames in flight, {} swapchain images",
            MAX_FRAMES_IN_FLIGHT, image_count
        );

        Ok(Self {
            device,
            frames,
            images_in_flight: vec![vk::Fence::null(); image_count],
            current_frame: 0,
            image_index: 0,
        })
    }

    /// Returns a reference to the current frame's data.
    #[inline]
    pub fn current_frame(&self) -> &FrameData {
        &self.frames[self.current_frame]
    }

    /// Returns the current frame index.
    #[inline]
    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    /// Returns the current swapchain image index.
    ///
    /// This is set by [`acquire_next_image`](Self::acquire_next_image).
    #[inline]
    pub fn image_index(&self) -> u32 {
        self.image_index
    }

    /// Waits for the current frame slot's previous work to complete.
    ///
    /// This blocks until the GPU has finished processing the last submission
    /// that used this frame slot. Must be called before recording new commands
    /// to this frame's command buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait fails.
    pub fn wait_for_frame(&self) -> RhiResult<()> {
        self.frames[self.current_frame]
            .in_flight_fence
            .wait(u64::MAX)?;
        Ok(())
    }

    /// Acquires the next swapchain image for rendering.
    ///
    /// On success this also resolves the image-in-flight hazard: if the
    /// acquired image is still owned by another in-flight frame's fence, that
    /// fence is waited on before the image is claimed for the current frame.
    ///
    /// # Errors
    ///
    /// Returns an error if image acquisition fails for reasons other than
    /// an out-of-date swapchain.
    pub fn acquire_next_image(&mut self, swapchain: &Swapchain) -> RhiResult<AcquireOutcome> {
        let frame = &self.frames[self.current_frame];

        let (index, suboptimal) =
            match swapchain.acquire_next_image(frame.image_available_semaphore.handle()) {
                Ok(result) => result,
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    debug!("Swapchain out of date during acquire");
                    return Ok(AcquireOutcome::OutOfDate);
                }
                Err(e) => return Err(e.into()),
            };

        self.image_index = index;

        // If a previous in-flight frame is still rendering to this image,
        // wait for it before reusing the image
        let image_fence = self.images_in_flight[index as usize];
        if image_fence != vk::Fence::null() {
            let fences = [image_fence];
            unsafe {
                self.device
                    .handle()
                    .wait_for_fences(&fences, true, u64::MAX)?;
            }
        }

        // The image now belongs to the current frame
        self.images_in_flight[index as usize] = frame.in_flight_fence.handle();

        Ok(AcquireOutcome::Acquired { suboptimal })
    }

    /// Begins recording commands for the current frame.
    ///
    /// This resets the frame fence and command buffer, then begins recording.
    /// Must be called after [`acquire_next_image`](Self::acquire_next_image)
    /// succeeded, so the fence is only reset when work will be submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if resetting or beginning the command buffer fails.
    pub fn begin_frame(&self) -> RhiResult<()> {
        let frame = &self.frames[self.current_frame];
        frame.in_flight_fence.reset()?;
        frame.command_buffer.reset()?;
        frame.command_buffer.begin()?;
        Ok(())
    }

    /// Ends recording commands for the current frame.
    ///
    /// # Errors
    ///
    /// Returns an error if ending the command buffer fails.
    pub fn end_frame(&self) -> RhiResult<()> {
        self.frames[self.current_frame].command_buffer.end()?;
        Ok(())
    }

    /// Submits the current frame's commands to the graphics queue.
    ///
    /// The submission waits on the image available semaphore at the
    /// color-attachment-output stage, and signals the render finished
    /// semaphore plus the frame's in-flight fence.
    ///
    /// # Errors
    ///
    /// Returns an error if queue submission fails.
    pub fn submit(&self) -> RhiResult<()> {
        let frame = &self.frames[self.current_frame];

        let wait_semaphores = [frame.image_available_semaphore.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [frame.render_finished_semaphore.handle()];
        let command_buffers = [frame.command_buffer.handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device.submit_graphics(&[submit_info], frame.in_flight_fence.handle())?;
        }

        Ok(())
    }

    /// Presents the rendered image to the screen.
    ///
    /// # Returns
    ///
    /// Returns `true` if the swapchain is out of date or suboptimal and
    /// should be recreated. Returns `false` if presentation succeeded normally.
    ///
    /// # Errors
    ///
    /// Returns an error if presentation fails for reasons other than
    /// an out-of-date swapchain.
    pub fn present(&self, swapchain: &Swapchain) -> RhiResult<bool> {
        let frame = &self.frames[self.current_frame];

        match swapchain.present(
            self.device.present_queue(),
            self.image_index,
            frame.render_finished_semaphore.handle(),
        ) {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain out of date during present");
                Ok(true)
            }
            Err(vk::Result::SUBOPTIMAL_KHR) => {
                debug!("Swapchain suboptimal during present");
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Advances to the next frame slot.
    ///
    /// This should be called at the end of each frame to cycle through
    /// the available frame slots.
    pub fn next_frame(&mut self) {
        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;
    }

    /// Waits for all in-flight frames to complete.
    ///
    /// This is useful before destroying resources or recreating the swapchain
    /// to ensure all GPU work has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if any wait fails.
    pub fn wait_for_all_frames(&self) -> RhiResult<()> {
        let fences: Vec<vk::Fence> = self
            .frames
            .iter()
            .map(|f| f.in_flight_fence.handle())
            .collect();

        unsafe {
            self.device
                .handle()
                .wait_for_fences(&fences, true, u64::MAX)?;
        }

        Ok(())
    }

    /// Resets the manager's swapchain-dependent state after a recreation.
    ///
    /// Recreates the per-frame semaphores (an out-of-date acquire may leave a
    /// semaphore in an unknown state) and resizes the image-fence table for
    /// the new image count. The caller must ensure the device is idle.
    ///
    /// # Errors
    ///
    /// Returns an error if semaphore creation fails.
    pub fn on_swapchain_recreated(&mut self, image_count: usize) -> RhiResult<()> {
        for (i, frame) in self.frames.iter_mut().enumerate() {
            frame.image_available_semaphore = Semaphore::new(self.device.clone())?;
            frame.render_finished_semaphore = Semaphore::new(self.device.clone())?;
            debug!("Reset semaphores for frame {}", i);
        }

        self.images_in_flight = vec![vk::Fence::null(); image_count];

        info!(
            "Frame manager reset for recreated swapchain ({} images)",
            image_count
        );
        Ok(())
    }

    /// Returns a reference to the device.
    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// Returns the number of frames in flight.
    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_frames_in_flight_constant() {
        // The synchronization protocol assumes a small, fixed slot count
        assert_eq!(MAX_FRAMES_IN_FLIGHT, 2);
    }

    #[test]
    fn test_acquire_outcome_equality() {
        assert_eq!(
            AcquireOutcome::Acquired { suboptimal: false },
            AcquireOutcome::Acquired { suboptimal: false }
        );
        assert_ne!(
            AcquireOutcome::Acquired { suboptimal: true },
            AcquireOutcome::OutOfDate
        );
    }

    #[test]
    fn test_frame_manager_is_send() {
        // Compile-time check that FrameManager is Send
        fn assert_send<T: Send>() {}
        assert_send::<FrameManager>();
    }

    #[test]
    fn test_frame_data_is_send() {
        // Compile-time check that FrameData is Send
        fn assert_send<T: Send>() {}
        assert_send::<FrameData>();
    }
}
