//! aster - a minimal real-time Vulkan renderer.
//!
//! Opens a window, renders a textured, spinning model with depth testing and
//! MSAA, and drives an FPS-style camera from keyboard and mouse input.

use anyhow::Result;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use aster_core::{Config, FrameLimiter, Timer};
use aster_platform::{InputState, Window};
use aster_renderer::Renderer;

struct App {
    config: Config,
    window: Option<Window>,
    renderer: Option<Renderer>,
    input: InputState,
    timer: Timer,
    frame_limiter: FrameLimiter,
}

impl App {
    fn new(config: Config) -> Self {
        let frame_limiter = FrameLimiter::new(config.graphics.max_fps);
        Self {
            config,
            window: None,
            renderer: None,
            input: InputState::new(),
            timer: Timer::new(),
            frame_limiter,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window = Window::new(
                event_loop,
                self.config.window.width,
                self.config.window.height,
                &self.config.window.title,
            );

            match window {
                Ok(window) => {
                    // Create renderer after window is created
                    match Renderer::new(&window, &self.config) {
                        Ok(renderer) => {
                            info!("Initialization complete, entering main loop");
                            self.renderer = Some(renderer);
                            self.window = Some(window);
                        }
                        Err(e) => {
                            error!("Failed to create renderer: {:?}", e);
                            event_loop.exit();
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to create window: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                info!("Window resized to {}x{}", size.width, size.height);
                if let Some(ref mut window) = self.window {
                    window.resize(size.width, size.height);
                }
                if let Some(ref mut renderer) = self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let delta = self.timer.delta_secs();

                if let Some(ref mut renderer) = self.renderer {
                    renderer.update(&self.input, delta);
                    if let Err(e) = renderer.render_frame() {
                        error!("Render error: {:?}", e);
                    }
                }

                self.frame_limiter.wait();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{KeyCode, PhysicalKey};
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state.is_pressed() {
                        // Escape closes the window
                        if key == KeyCode::Escape {
                            info!("Escape pressed, shutting down");
                            event_loop.exit();
                            return;
                        }
                        self.input.on_key_pressed(key);
                    } else {
                        self.input.on_key_released(key);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = button.into();
                match state {
                    ElementState::Pressed => self.input.on_mouse_pressed(button),
                    ElementState::Released => self.input.on_mouse_released(button),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .on_mouse_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (x, y),
                    MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
                };
                self.input.on_scroll(dx, dy);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.input.begin_frame();
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    aster_core::init_logging();

    // Load configuration (defaults when config.toml is absent)
    let config = Config::load();
    info!(
        "Starting {} ({}x{})",
        config.window.title, config.window.width, config.window.height
    );

    // Create event loop
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    // Create app and run
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
