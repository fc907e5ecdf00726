//! Platform layer: windowing, input & the frame loop.
//!
//! - One window, one `GpuState`, continuous redraws.
//! - Close button or Escape ends the loop; GPU objects drop before the window.
//! - Fatal startup errors are carried out of the event loop and returned from [`run`].

mod fps;
pub mod input;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use corelib::{CameraController, CameraInput, FrameClock, MatrixSet, vec2};
use renderer::{GpuState, Scene};
use wgpu::SurfaceError;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::fps::FpsCounter;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: PhysicalSize<u32>,
    pub backends: wgpu::Backends,
    pub show_fps: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Svarog Viewer".to_string(),
            size: PhysicalSize::new(1024, 768),
            backends: wgpu::Backends::all(),
            show_fps: false,
        }
    }
}

/// Run the viewer until the window is closed.
pub fn run(config: WindowConfig, scene: Scene) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config, scene);
    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Field order matters: `gpu` holds a surface on `window` and must drop first.
struct WindowEntry {
    gpu: GpuState,
    window: Arc<Window>,
}

struct ViewerApp {
    config: WindowConfig,
    scene: Option<Scene>,
    entry: Option<WindowEntry>,

    controller: CameraController,
    input: CameraInput,
    clock: FrameClock,
    fps: Option<FpsCounter>,

    fatal: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(config: WindowConfig, scene: Scene) -> Self {
        Self {
            config,
            scene: Some(scene),
            entry: None,
            controller: CameraController::default(),
            input: CameraInput::default(),
            clock: FrameClock::default(),
            fps: None,
            fatal: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let scene = self
            .scene
            .take()
            .ok_or_else(|| anyhow!("scene was already handed to the GPU"))?;

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size)
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let gpu = pollster::block_on(GpuState::new(window.clone(), self.config.backends, scene))
            .context("GPU initialization failed")?;
        capture_cursor(&window);

        Ok(WindowEntry { gpu, window })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.take().is_some() {
            log::info!("Released GPU resources and window");
        }
        event_loop.exit();
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode, state: ElementState) {
        let pressed = state == ElementState::Pressed;
        if code == KeyCode::Escape && pressed {
            log::info!("Escape pressed. Exiting event loop.");
            self.shutdown(event_loop);
            return;
        }
        input::apply_key(&mut self.input, code, pressed);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let ft = self.clock.tick();
        self.controller.update(&self.input, ft.dt);
        self.input.clear_deltas();
        let matrices = MatrixSet::from_camera(&self.controller.camera());

        match entry.gpu.render(&matrices) {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface {e}; reconfiguring");
                entry.gpu.recreate_surface();
            }
            Err(SurfaceError::Timeout) => {
                log::warn!("Surface timeout; skipping frame");
            }
            Err(e) => {
                self.fail(event_loop, anyhow!("unrecoverable surface error: {e}"));
                return;
            }
        }

        if let Some(fps) = self.fps.as_mut() {
            if let Some(rate) = fps.frame(ft.now) {
                entry
                    .window
                    .set_title(&format!("{} | {:.0} FPS", self.config.title, rate));
            }
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.window.request_redraw();
                self.entry = Some(entry);
                self.clock.reset();
                if self.config.show_fps {
                    self.fps = Some(FpsCounter::starting_at(std::time::Instant::now()));
                }
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.on_key(event_loop, code, event.state);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.input.scroll += input::scroll_lines(delta);
            }
            WindowEvent::Focused(focused) => {
                if focused {
                    if let Some(entry) = &self.entry {
                        capture_cursor(&entry.window);
                    }
                    self.clock.reset();
                } else {
                    // avoid stuck keys after alt-tab
                    self.input = CameraInput::default();
                }
            }
            WindowEvent::Resized(size) => {
                log::info!("Resized: {}x{}", size.width, size.height);
                if let Some(entry) = self.entry.as_mut() {
                    entry.gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.entry.is_some() {
                self.input.mouse_delta += vec2(dx as f32, dy as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(entry) = &self.entry {
            entry.window.request_redraw();
        }
    }
}

/// Lock (or at least confine) and hide the cursor so motion arrives as raw deltas.
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        log::warn!("Cursor grab unavailable: {e}");
    }
    window.set_cursor_visible(false);
}
