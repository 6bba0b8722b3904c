use std::sync::Arc;
use std::time::Duration;

use cadence_input::Key;
use cadence_kernel::{Environment, Platform, PlatformError};
use cadence_render::DrawList;
use cadence_render_wgpu::{GpuContext, WgpuRenderer};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::keymap::map_key;

struct Gpu {
    context: GpuContext,
    renderer: WgpuRenderer,
}

/// Window-side state filled in by winit callbacks and drained into the
/// environment on every poll.
#[derive(Default)]
struct WindowState {
    title: String,
    size: (u32, u32),
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    focused: bool,
    close_requested: bool,
    focus_lost: bool,
    keys: Vec<(Key, bool)>,
    resized: Option<(u32, u32)>,
    cursor: Option<(f32, f32)>,
    error: Option<PlatformError>,
}

impl WindowState {
    fn create(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PlatformError> {
        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.size.0, self.size.1));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| PlatformError::Window(e.to_string()))?,
        );

        let size = window.inner_size();
        let context = GpuContext::new(window.clone(), size.width, size.height)
            .map_err(|e| PlatformError::Context(e.to_string()))?;
        let renderer = WgpuRenderer::new(context.device(), context.format(), size.width, size.height);

        self.resized = Some((size.width, size.height));
        self.focused = true;
        self.window = Some(window);
        self.gpu = Some(Gpu { context, renderer });
        Ok(())
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create(event_loop) {
            tracing::error!("{e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Focused(focused) => {
                if !focused {
                    self.focus_lost = true;
                }
                self.focused = focused;
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.context.resize(size.width, size.height);
                    let (w, h) = gpu.context.size();
                    gpu.renderer.resize(gpu.context.device(), w, h);
                }
                self.resized = Some((size.width, size.height));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some((position.x as f32, position.y as f32));
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    self.keys.push((key, state == ElementState::Pressed));
                }
            }
            _ => {}
        }
    }
}

/// winit window driven by event pumping, so the kernel scheduler owns the
/// frame loop instead of winit.
pub struct DesktopPlatform {
    event_loop: Option<EventLoop<()>>,
    state: WindowState,
}

impl DesktopPlatform {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            event_loop: None,
            state: WindowState {
                title: title.into(),
                size: (width, height),
                ..WindowState::default()
            },
        }
    }

    fn pump(&mut self) {
        let Some(event_loop) = &mut self.event_loop else {
            return;
        };
        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state) {
            tracing::debug!(code, "event loop exited");
            self.state.close_requested = true;
        }
    }

    fn drain_into(&mut self, env: &mut Environment) {
        for (key, pressed) in self.state.keys.drain(..) {
            env.input.set_key(key, pressed);
            if key == Key::Escape && pressed {
                self.state.close_requested = true;
            }
        }
        if std::mem::take(&mut self.state.focus_lost) {
            env.input.clear();
        }
        if let Some((x, y)) = self.state.cursor.take() {
            env.input.set_mouse(x, y);
        }
        if let Some((w, h)) = self.state.resized.take() {
            env.window.resize(w, h);
        }
    }
}

impl Platform for DesktopPlatform {
    fn open(&mut self, env: &mut Environment) -> Result<(), PlatformError> {
        let event_loop = EventLoop::new().map_err(|e| PlatformError::Window(e.to_string()))?;
        self.event_loop = Some(event_loop);
        self.pump();

        if let Some(e) = self.state.error.take() {
            return Err(e);
        }
        if self.state.window.is_none() {
            return Err(PlatformError::Window("window was not created".into()));
        }
        self.drain_into(env);
        tracing::info!(title = %self.state.title, "window opened");
        Ok(())
    }

    fn poll_events(&mut self, env: &mut Environment) {
        self.pump();
        self.drain_into(env);
    }

    fn is_focused(&self) -> bool {
        self.state.focused
    }

    fn close_requested(&self) -> bool {
        self.state.close_requested
    }

    fn present(&mut self, frame: &DrawList, env: &Environment) -> Result<(), PlatformError> {
        let Some(gpu) = &self.state.gpu else {
            return Ok(());
        };
        let Some(output) = gpu
            .context
            .acquire()
            .map_err(|e| PlatformError::Present(e.to_string()))?
        else {
            return Ok(());
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        gpu.renderer.render(
            gpu.context.device(),
            gpu.context.queue(),
            &view,
            frame,
            &env.camera,
            env.ambient_light,
        );
        output.present();
        Ok(())
    }

    fn shutdown(&mut self) {
        self.state.gpu = None;
        self.state.window = None;
        tracing::info!("window closed");
    }
}
