//! Main renderer orchestration.
//!
//! This module provides the main [`Renderer`] struct that coordinates
//! all Vulkan resources and rendering operations: device setup, swapchain,
//! depth/MSAA targets, model and texture upload, per-frame uniforms and the
//! frame loop itself.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use glam::{Mat4, Vec3};
use tracing::{debug, error, info, warn};

use aster_core::Config;
use aster_platform::{InputState, KeyCode, MouseButton, Surface, Window, get_required_extensions};
use aster_resources::{Model, TextureData};
use aster_rhi::buffer::{Buffer, BufferUsage};
use aster_rhi::command::{CommandBuffer, CommandPool};
use aster_rhi::descriptor::{
    DescriptorBindingBuilder, DescriptorPool, DescriptorSetLayout, buffer_info,
    update_descriptor_sets,
};
use aster_rhi::device::Device;
use aster_rhi::instance::Instance;
use aster_rhi::physical_device::select_physical_device;
use aster_rhi::pipeline::{
    CullMode, FrontFace, GraphicsPipelineBuilder, Pipeline, PipelineLayout,
};
use aster_rhi::rendering::{ColorAttachment, DepthAttachment, RenderingConfig};
use aster_rhi::shader::{Shader, ShaderStage};
use aster_rhi::swapchain::Swapchain;
use aster_rhi::texture::{TEXTURE_FORMAT, Texture};
use aster_rhi::vertex::Vertex;
use aster_rhi::{RhiError, RhiResult};
use aster_scene::{Camera, FpsController};

use crate::MAX_FRAMES_IN_FLIGHT;
use crate::depth_buffer::{DEFAULT_DEPTH_FORMAT, DepthBuffer};
use crate::frame_manager::{AcquireOutcome, FrameManager};
use crate::render_target::ColorTarget;
use crate::ubo::{CameraUbo, ObjectUbo};

/// Compiled shader binaries, relative to the working directory.
const VERTEX_SHADER_PATH: &str = "shaders/spirv/model.vert.spv";
const FRAGMENT_SHADER_PATH: &str = "shaders/spirv/model.frag.spv";

/// The model spins around the vertical axis at this rate (radians/second).
const MODEL_SPIN_RATE: f32 = std::f32::consts::FRAC_PI_2;

/// Background clear color (dark blue-gray).
const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.15, 1.0];

/// Per-frame uniform buffers and their descriptor set.
struct FrameResources {
    /// Camera uniform buffer for this frame.
    camera_ubo: Buffer,
    /// Object uniform buffer for this frame.
    object_ubo: Buffer,
    /// Descriptor set binding the UBOs and the texture.
    descriptor_set: vk::DescriptorSet,
}

/// Mesh GPU resources.
struct MeshGpuData {
    /// Vertex buffer for this mesh.
    vertex_buffer: Buffer,
    /// Index buffer for this mesh.
    index_buffer: Buffer,
    /// Number of indices.
    index_count: u32,
}

/// Main renderer that manages all Vulkan resources.
///
/// # Resource Destruction Order
///
/// Fields drop in declaration order, which is kept at reverse creation
/// order: per-frame resources and pools first, then pipeline and descriptor
/// objects, then the size-dependent targets and swapchain, and finally
/// surface, device and instance. `Drop` waits for the device to go idle
/// before any of that happens.
pub struct Renderer {
    // Per-frame resources (allocate from command_pool / descriptor_pool)
    frame_manager: FrameManager,
    frame_resources: Vec<FrameResources>,
    command_pool: CommandPool,

    // Scene resources
    mesh_gpu_data: Vec<MeshGpuData>,
    #[allow(dead_code)] // kept alive for the descriptor sets that sample it
    texture: Texture,

    // Pipeline and descriptor objects
    pipeline: Pipeline,
    pipeline_layout: PipelineLayout,
    descriptor_pool: DescriptorPool,
    descriptor_set_layout: DescriptorSetLayout,

    // Size-dependent render targets
    color_target: Option<ColorTarget>,
    depth_buffer: DepthBuffer,
    swapchain: Swapchain,

    // Core Vulkan objects
    surface: Surface,
    device: Arc<Device>,
    instance: Instance,

    // Camera system
    camera: Camera,
    fps_controller: FpsController,

    // Model placement: centers and scales the loaded model, spun over time
    base_transform: Mat4,
    spin_angle: f32,

    // State
    msaa_samples: vk::SampleCountFlags,
    framebuffer_resized: bool,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Creates a new renderer for the given window.
    ///
    /// This initializes all Vulkan resources and loads the model and texture
    /// named in the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any Vulkan resource creation or asset load fails.
    pub fn new(window: &Window, config: &Config) -> RhiResult<Self> {
        let width = window.width();
        let height = window.height();

        info!("Initializing Vulkan renderer ({}x{})", width, height);

        // Create Vulkan instance with validation in debug builds
        let enable_validation = cfg!(debug_assertions) && config.debug.validation_layers;
        let display_handle = window
            .display_handle()
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;
        let surface_extensions = get_required_extensions(display_handle.as_raw())
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;
        let instance = Instance::new(enable_validation, &surface_extensions)?;

        // Create surface
        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;

        // Select physical device
        let surface_loader = surface.loader();
        let physical_device_info =
            select_physical_device(instance.handle(), surface.handle(), surface_loader)?;

        let msaa_samples = if config.graphics.msaa {
            physical_device_info.max_usable_sample_count()
        } else {
            vk::SampleCountFlags::TYPE_1
        };
        let max_anisotropy = physical_device_info
            .properties
            .limits
            .max_sampler_anisotropy;

        // Mipmap generation blits with linear filtering; check the texture
        // format actually supports that
        let format_props = unsafe {
            instance
                .handle()
                .get_physical_device_format_properties(physical_device_info.device, TEXTURE_FORMAT)
        };
        let supports_linear_blit = format_props
            .optimal_tiling_features
            .contains(vk::FormatFeatureFlags::SAMPLED_IMAGE_FILTER_LINEAR);
        if !supports_linear_blit {
            warn!("Device cannot blit {:?} with linear filtering; mipmaps disabled", TEXTURE_FORMAT);
        }

        info!("MSAA samples: {:?}", msaa_samples);

        // Create logical device
        let device = Device::new(&instance, &physical_device_info)?;

        // Create swapchain
        let swapchain = Swapchain::new(
            &instance,
            device.clone(),
            surface.handle(),
            width,
            height,
            config.graphics.vsync,
        )?;

        // Create size-dependent targets
        let depth_buffer =
            DepthBuffer::with_default_format(device.clone(), width, height, msaa_samples)?;
        let color_target = if msaa_samples != vk::SampleCountFlags::TYPE_1 {
            Some(ColorTarget::new(
                device.clone(),
                width,
                height,
                swapchain.format(),
                msaa_samples,
            )?)
        } else {
            None
        };

        // Command pool on the graphics queue family
        let graphics_family = device.queue_families().graphics_family.unwrap();
        let command_pool = CommandPool::new(device.clone(), graphics_family)?;

        // Upload the texture through a short-lived transient pool
        let texture_data = TextureData::load(Path::new(&config.graphics.texture_path))
            .map_err(|e| RhiError::TextureError(e.to_string()))?;
        let texture = {
            let upload_pool = CommandPool::new_transient(device.clone(), graphics_family)?;
            Texture::from_rgba8(
                device.clone(),
                &upload_pool,
                &texture_data.pixels,
                texture_data.width,
                texture_data.height,
                supports_linear_blit,
                max_anisotropy,
            )?
        };

        // Descriptor set layout: camera UBO, object UBO, texture sampler
        let bindings = [
            DescriptorBindingBuilder::uniform_buffer(
                0,
                vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            ),
            DescriptorBindingBuilder::uniform_buffer(1, vk::ShaderStageFlags::VERTEX),
            DescriptorBindingBuilder::combined_image_sampler(2, vk::ShaderStageFlags::FRAGMENT),
        ];
        let descriptor_set_layout = DescriptorSetLayout::new(device.clone(), &bindings)?;

        // Descriptor pool: 2 UBOs + 1 sampler per frame in flight
        let pool_sizes = [
            vk::DescriptorPoolSize::default()
                .ty(vk::DescriptorType::UNIFORM_BUFFER)
                .descriptor_count((MAX_FRAMES_IN_FLIGHT * 2) as u32),
            vk::DescriptorPoolSize::default()
                .ty(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .descriptor_count(MAX_FRAMES_IN_FLIGHT as u32),
        ];
        let descriptor_pool =
            DescriptorPool::new(device.clone(), MAX_FRAMES_IN_FLIGHT as u32, &pool_sizes)?;

        // Per-frame uniform buffers and descriptor sets
        let frame_resources = Self::create_frame_resources(
            &device,
            &descriptor_pool,
            &descriptor_set_layout,
            &texture,
        )?;

        // Graphics pipeline
        let (pipeline, pipeline_layout) = Self::create_pipeline(
            device.clone(),
            &descriptor_set_layout,
            swapchain.format(),
            msaa_samples,
        )?;

        // Load the model and upload its meshes
        let model_path = Path::new(&config.graphics.model_path);
        let (mesh_gpu_data, model_center, model_size) =
            Self::load_model(device.clone(), model_path)?;

        // Center the model at the origin and scale it into a ~2 unit box
        let scale_factor = 2.0 / model_size.max_element().max(0.001);
        let base_transform =
            Mat4::from_scale(Vec3::splat(scale_factor)) * Mat4::from_translation(-model_center);

        // Frame synchronization
        let frame_manager =
            FrameManager::new(device.clone(), &command_pool, swapchain.image_count() as usize)?;

        // Camera
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.set_perspective(
            45.0_f32.to_radians(),
            width as f32 / height as f32,
            0.01,
            1000.0,
        );
        let fps_controller = FpsController::with_settings(3.0, 0.002);

        info!(
            "Renderer initialized: {} swapchain images, {} frames in flight, {} meshes loaded",
            swapchain.image_count(),
            MAX_FRAMES_IN_FLIGHT,
            mesh_gpu_data.len()
        );

        Ok(Self {
            frame_manager,
            frame_resources,
            command_pool,
            mesh_gpu_data,
            texture,
            pipeline,
            pipeline_layout,
            descriptor_pool,
            descriptor_set_layout,
            color_target,
            depth_buffer,
            swapchain,
            surface,
            device,
            instance,
            camera,
            fps_controller,
            base_transform,
            spin_angle: 0.0,
            msaa_samples,
            framebuffer_resized: false,
            width,
            height,
        })
    }

    /// Creates per-frame uniform buffers and writes their descriptor sets.
    fn create_frame_resources(
        device: &Arc<Device>,
        descriptor_pool: &DescriptorPool,
        descriptor_set_layout: &DescriptorSetLayout,
        texture: &Texture,
    ) -> RhiResult<Vec<FrameResources>> {
        // Allocate all descriptor sets at once
        let layouts = [descriptor_set_layout.handle(); MAX_FRAMES_IN_FLIGHT];
        let descriptor_sets = descriptor_pool.allocate(&layouts)?;

        let mut frames = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);

        for (i, &descriptor_set) in descriptor_sets.iter().enumerate() {
            let camera_ubo =
                Buffer::new(device.clone(), BufferUsage::Uniform, CameraUbo::SIZE as u64)?;
            let object_ubo =
                Buffer::new(device.clone(), BufferUsage::Uniform, ObjectUbo::SIZE as u64)?;

            let camera_buffer_infos = [buffer_info(
                camera_ubo.handle(),
                0,
                CameraUbo::SIZE as u64,
            )];
            let object_buffer_infos = [buffer_info(
                object_ubo.handle(),
                0,
                ObjectUbo::SIZE as u64,
            )];
            let texture_infos = [texture.descriptor_info()];

            let writes = [
                vk::WriteDescriptorSet::default()
                    .dst_set(descriptor_set)
                    .dst_binding(0)
                    .dst_array_element(0)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(&camera_buffer_infos),
                vk::WriteDescriptorSet::default()
                    .dst_set(descriptor_set)
                    .dst_binding(1)
                    .dst_array_element(0)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(&object_buffer_infos),
                vk::WriteDescriptorSet::default()
                    .dst_set(descriptor_set)
                    .dst_binding(2)
                    .dst_array_element(0)
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .image_info(&texture_infos),
            ];
            update_descriptor_sets(device, &writes);

            debug!("Created frame resources for frame {}", i);

            frames.push(FrameResources {
                camera_ubo,
                object_ubo,
                descriptor_set,
            });
        }

        Ok(frames)
    }

    /// Creates the model rendering pipeline.
    fn create_pipeline(
        device: Arc<Device>,
        descriptor_set_layout: &DescriptorSetLayout,
        swapchain_format: vk::Format,
        msaa_samples: vk::SampleCountFlags,
    ) -> RhiResult<(Pipeline, PipelineLayout)> {
        let vertex_shader = Shader::from_spirv_file(
            device.clone(),
            Path::new(VERTEX_SHADER_PATH),
            ShaderStage::Vertex,
            "main",
        )?;

        let fragment_shader = Shader::from_spirv_file(
            device.clone(),
            Path::new(FRAGMENT_SHADER_PATH),
            ShaderStage::Fragment,
            "main",
        )?;

        let pipeline_layout =
            PipelineLayout::new(device.clone(), &[descriptor_set_layout.handle()], &[])?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(Vertex::binding_description())
            .vertex_attributes(&Vertex::attribute_descriptions())
            .color_attachment_format(swapchain_format)
            .depth_attachment_format(DEFAULT_DEPTH_FORMAT)
            .rasterization_samples(msaa_samples)
            .cull_mode(CullMode::Back)
            .front_face(FrontFace::CounterClockwise)
            .build(device, &pipeline_layout)?;

        info!("Model pipeline created ({:?})", msaa_samples);

        Ok((pipeline, pipeline_layout))
    }

    /// Loads an OBJ model and creates GPU buffers for its meshes.
    /// Returns the mesh GPU data, model center, and model size.
    fn load_model(device: Arc<Device>, path: &Path) -> RhiResult<(Vec<MeshGpuData>, Vec3, Vec3)> {
        let model = Model::load(path).map_err(|e| RhiError::InvalidHandle(e.to_string()))?;

        let center = model.center();
        let size = model.size();

        info!(
            "Model bounds: min={:?}, max={:?}, center={:?}, size={:?}",
            model.aabb_min, model.aabb_max, center, size
        );

        let mut mesh_gpu_data = Vec::with_capacity(model.meshes.len());

        for mesh in &model.meshes {
            let vertices: Vec<Vertex> = (0..mesh.positions.len())
                .map(|i| Vertex::new(mesh.positions[i], mesh.normals[i], mesh.tex_coords[i]))
                .collect();

            let vertex_buffer = Buffer::new_with_data(
                device.clone(),
                BufferUsage::Vertex,
                bytemuck::cast_slice(&vertices),
            )?;

            let index_buffer = Buffer::new_with_data(
                device.clone(),
                BufferUsage::Index,
                bytemuck::cast_slice(&mesh.indices),
            )?;

            debug!(
                "Mesh '{}': {} vertices, {} indices",
                mesh.name,
                vertices.len(),
                mesh.indices.len()
            );

            mesh_gpu_data.push(MeshGpuData {
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
            });
        }

        Ok((mesh_gpu_data, center, size))
    }

    /// Notifies the renderer that the window has been resized.
    ///
    /// The actual swapchain recreation happens on the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Window minimized, rendering paused");
            self.width = width;
            self.height = height;
            return;
        }

        if width != self.width || height != self.height {
            debug!(
                "Resize triggered: {}x{} -> {}x{}",
                self.width, self.height, width, height
            );
            self.width = width;
            self.height = height;
            self.framebuffer_resized = true;

            self.camera
                .set_aspect(self.width as f32 / self.height as f32);
        }
    }

    /// Recreates the swapchain and size-dependent targets.
    fn recreate_swapchain(&mut self) -> RhiResult<()> {
        if self.width == 0 || self.height == 0 {
            // Nothing to do while minimized; retry after the next resize
            return Ok(());
        }

        self.device.wait_idle()?;

        self.swapchain
            .recreate(&self.instance, self.surface.handle(), self.width, self.height)?;

        self.depth_buffer = DepthBuffer::with_default_format(
            self.device.clone(),
            self.width,
            self.height,
            self.msaa_samples,
        )?;

        if self.color_target.is_some() {
            self.color_target = Some(ColorTarget::new(
                self.device.clone(),
                self.width,
                self.height,
                self.swapchain.format(),
                self.msaa_samples,
            )?);
        }

        self.frame_manager
            .on_swapchain_recreated(self.swapchain.image_count() as usize)?;

        self.framebuffer_resized = false;
        Ok(())
    }

    /// Updates the camera from input and advances the model spin.
    ///
    /// # Arguments
    ///
    /// * `input` - Current input state
    /// * `delta_time` - Time elapsed since last frame in seconds
    pub fn update(&mut self, input: &InputState, delta_time: f32) {
        let (dx, dy) = input.mouse_delta();
        let is_pressed = input.is_mouse_pressed(MouseButton::Right);
        let just_pressed = input.is_mouse_just_pressed(MouseButton::Right);

        // Look around while the right mouse button is held. Skip the press
        // frame so the accumulated delta from before the grab doesn't jump.
        if is_pressed && !just_pressed {
            let max_delta = 100.0;
            let dx = dx.clamp(-max_delta, max_delta);
            let dy = dy.clamp(-max_delta, max_delta);

            self.fps_controller.process_mouse_movement(dx, dy);
        }

        let forward = if input.is_key_pressed(KeyCode::KeyW) {
            1.0
        } else if input.is_key_pressed(KeyCode::KeyS) {
            -1.0
        } else {
            0.0
        };

        let right = if input.is_key_pressed(KeyCode::KeyD) {
            1.0
        } else if input.is_key_pressed(KeyCode::KeyA) {
            -1.0
        } else {
            0.0
        };

        let up = if input.is_key_pressed(KeyCode::KeyQ) {
            1.0
        } else if input.is_key_pressed(KeyCode::KeyE) {
            -1.0
        } else {
            0.0
        };

        self.fps_controller.set_movement_input(forward, right, up);
        self.fps_controller
            .update_camera(&mut self.camera, delta_time);

        self.spin_angle += delta_time * MODEL_SPIN_RATE;
    }

    /// Renders a frame.
    ///
    /// Follows the per-frame synchronization protocol: wait on the frame
    /// fence, acquire (recreating the swapchain and aborting on an
    /// out-of-date result), record, submit, present, advance.
    ///
    /// # Errors
    ///
    /// Returns an error if any Vulkan operation fails.
    pub fn render_frame(&mut self) -> RhiResult<()> {
        // Skip rendering entirely while minimized
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        if self.framebuffer_resized {
            debug!("Resize requested, recreating swapchain before acquire");
            self.recreate_swapchain()?;
        }

        // Wait for this frame slot's previous work to complete
        self.frame_manager.wait_for_frame()?;

        // Acquire the next swapchain image
        let mut needs_recreate = match self.frame_manager.acquire_next_image(&self.swapchain)? {
            AcquireOutcome::Acquired { suboptimal } => suboptimal,
            AcquireOutcome::OutOfDate => {
                self.recreate_swapchain()?;
                return Ok(());
            }
        };

        let image_index = self.frame_manager.image_index();

        // Only reset the fence once we know work will be submitted
        self.frame_manager.begin_frame()?;

        self.update_uniform_buffers()?;
        self.record_commands(image_index);

        self.frame_manager.end_frame()?;
        self.frame_manager.submit()?;

        needs_recreate |= self.frame_manager.present(&self.swapchain)?;

        self.frame_manager.next_frame();

        if needs_recreate {
            debug!("Swapchain stale after present, recreating");
            self.recreate_swapchain()?;
        }

        Ok(())
    }

    /// Updates uniform buffers with current camera and object data.
    fn update_uniform_buffers(&self) -> RhiResult<()> {
        let frame = &self.frame_resources[self.frame_manager.current_frame_index()];

        let view = self.camera.view_matrix();
        let proj = self.camera.projection_matrix();

        let camera_data = CameraUbo::new(view, proj, self.camera.position);
        frame
            .camera_ubo
            .write_data(0, bytemuck::bytes_of(&camera_data))?;

        let model = Mat4::from_rotation_y(self.spin_angle) * self.base_transform;
        let object_data = ObjectUbo::new(model);
        frame
            .object_ubo
            .write_data(0, bytemuck::bytes_of(&object_data))?;

        Ok(())
    }

    /// Records rendering commands for a frame.
    fn record_commands(&self, image_index: u32) {
        let frame_index = self.frame_manager.current_frame_index();
        let cmd = self.frame_manager.current_frame().command_buffer();
        let frame = &self.frame_resources[frame_index];

        let swapchain_image = self.swapchain.image(image_index as usize);
        let swapchain_view = self.swapchain.image_view(image_index as usize);
        let extent = self.swapchain.extent();

        // The swapchain image is either rendered to directly or used as the
        // MSAA resolve destination; both want COLOR_ATTACHMENT_OPTIMAL
        transition_image(
            cmd,
            swapchain_image,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageAspectFlags::COLOR,
        );

        if let Some(ref color_target) = self.color_target {
            transition_image(
                cmd,
                color_target.image(),
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::ImageAspectFlags::COLOR,
            );
        }

        transition_image(
            cmd,
            self.depth_buffer.image(),
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
            vk::ImageAspectFlags::DEPTH,
        );

        // Render into the MSAA target and resolve into the swapchain image,
        // or straight into the swapchain image without MSAA
        let color_attachment = match self.color_target {
            Some(ref color_target) => ColorAttachment::new(color_target.image_view())
                .with_clear_color(CLEAR_COLOR)
                .dont_store()
                .with_resolve(
                    swapchain_view,
                    vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                    vk::ResolveModeFlags::AVERAGE,
                ),
            None => ColorAttachment::new(swapchain_view).with_clear_color(CLEAR_COLOR),
        };

        let rendering = RenderingConfig::from_extent(extent)
            .with_color_attachment(color_attachment)
            .with_depth_attachment(
                DepthAttachment::new(self.depth_buffer.image_view()).with_clear_depth(1.0),
            )
            .build();

        cmd.begin_rendering(&rendering.info());

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        cmd.set_viewport(&viewport);

        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        cmd.set_scissor(&scissor);

        cmd.bind_pipeline(vk::PipelineBindPoint::GRAPHICS, self.pipeline.handle());
        cmd.bind_descriptor_sets(
            vk::PipelineBindPoint::GRAPHICS,
            self.pipeline_layout.handle(),
            0,
            &[frame.descriptor_set],
            &[],
        );

        for mesh in &self.mesh_gpu_data {
            cmd.bind_vertex_buffers(0, &[mesh.vertex_buffer.handle()], &[0]);
            cmd.bind_index_buffer(mesh.index_buffer.handle(), 0, vk::IndexType::UINT32);
            cmd.draw_indexed(mesh.index_count, 1, 0, 0, 0);
        }

        cmd.end_rendering();

        // Hand the swapchain image to the presentation engine
        transition_image(
            cmd,
            swapchain_image,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
            vk::ImageAspectFlags::COLOR,
        );
    }

    /// Returns the current swapchain extent.
    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent()
    }

    /// Returns the swapchain format.
    pub fn format(&self) -> vk::Format {
        self.swapchain.format()
    }

    /// Returns the MSAA sample count in use.
    pub fn msaa_samples(&self) -> vk::SampleCountFlags {
        self.msaa_samples
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Wait for all GPU work to complete before any field is destroyed
        if let Err(e) = self.device.wait_idle() {
            error!(
                "Failed to wait for device idle during renderer drop: {:?}",
                e
            );
        }
        info!("Renderer shutting down");
        // Fields drop in declaration order (reverse creation order)
    }
}

/// Records an image layout transition.
fn transition_image(
    cmd: &CommandBuffer,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    aspect_mask: vk::ImageAspectFlags,
) {
    let (src_stage, src_access, dst_stage, dst_access) = match (old_layout, new_layout) {
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL) => (
            vk::PipelineStageFlags::TOP_OF_PIPE,
            vk::AccessFlags::empty(),
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        ),
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL) => (
            vk::PipelineStageFlags::TOP_OF_PIPE,
            vk::AccessFlags::empty(),
            vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ),
        (vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL, vk::ImageLayout::PRESENT_SRC_KHR) => (
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            vk::AccessFlags::empty(),
        ),
        _ => {
            warn!(
                "Unhandled layout transition: {:?} -> {:?}",
                old_layout, new_layout
            );
            (
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
            )
        }
    };

    let barrier = vk::ImageMemoryBarrier::default()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(
            vk::ImageSubresourceRange::default()
                .aspect_mask(aspect_mask)
                .base_mip_level(0)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1),
        )
        .src_access_mask(src_access)
        .dst_access_mask(dst_access);

    cmd.pipeline_barrier(src_stage, dst_stage, &[barrier]);
}
