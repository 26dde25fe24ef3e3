use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    events::{LogListener, ViewerListener},
    host::{Container, FullscreenApi, ResizeHub},
    rendering::Renderer,
    scene_graph::Material,
    session::Session,
};

/// Pixels of wheel movement that count as one zoom step.
const PIXELS_PER_SCROLL_STEP: f32 = 100.0;

/// A winit window acting as the viewer's container.
pub struct WinitContainer {
    window: Arc<Window>,
    hub: ResizeHub,
}

impl WinitContainer {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            hub: ResizeHub::new(),
        }
    }
}

impl Container for WinitContainer {
    fn size(&self) -> (u32, u32) {
        let size = self
            .window
            .inner_size()
            .to_logical::<u32>(self.window.scale_factor());
        (size.width, size.height)
    }

    fn window_size(&self) -> (u32, u32) {
        match self.window.current_monitor() {
            Some(monitor) => {
                let size = monitor.size().to_logical::<u32>(monitor.scale_factor());
                (size.width, size.height)
            }
            None => self.size(),
        }
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    fn supports_fullscreen(&self, api: FullscreenApi) -> bool {
        // Desktop windows only have the one native entry point.
        api == FullscreenApi::Standard && self.window.current_monitor().is_some()
    }

    fn request_fullscreen(&self, _api: FullscreenApi) {
        self.window
            .set_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    fn resize_hub(&self) -> &ResizeHub {
        &self.hub
    }
}

/// What the binary asks the window to load once it exists.
#[derive(Debug, Clone)]
pub struct StartupLoad {
    pub mesh_url: String,
    pub material_url: Option<String>,
}

struct ViewerState {
    session: Session<WinitContainer>,
    renderer: Renderer,
}

#[derive(Default)]
struct PointerState {
    position: Option<Vec2>,
    orbiting: bool,
    panning: bool,
}

struct App {
    config: ViewerConfig,
    startup: Option<StartupLoad>,
    listeners: Vec<Box<dyn ViewerListener>>,
    state: Option<ViewerState>,
    pointer: PointerState,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig, startup: Option<StartupLoad>) -> Self {
        Self {
            config,
            startup,
            listeners: vec![Box::new(LogListener)],
            state: None,
            pointer: PointerState::default(),
            error: None,
        }
    }

    fn create_state(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<ViewerState> {
        let window_attributes = Window::default_attributes().with_title("meshview");
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let mut session =
            Session::prepare(WinitContainer::new(window.clone()), self.config.clone());
        for listener in self.listeners.drain(..) {
            session.add_boxed_listener(listener);
        }

        let fallback = Material::fallback(self.config.loader.fallback_color);
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            session.viewport(),
            session.camera(),
            fallback,
        ))?;

        if let Some(startup) = self.startup.take() {
            session.load_object(startup.mesh_url, startup.material_url.as_deref(), None);
        }

        window.request_redraw();
        Ok(ViewerState { session, renderer })
    }

    fn handle_key(state: &mut ViewerState, event_loop: &ActiveEventLoop, key: &Key) {
        match key {
            Key::Named(NamedKey::Escape) => {
                state.session.render_loop().stop();
                event_loop.exit();
            }
            Key::Character(c) if c.eq_ignore_ascii_case("r") => state.session.reset_camera(),
            Key::Character(c) if c.eq_ignore_ascii_case("c") => state.session.clear_scene(),
            Key::Character(c) if c.eq_ignore_ascii_case("f") => {
                if !state.session.go_fullscreen() {
                    log::warn!("Fullscreen is not available");
                }
            }
            _ => (),
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let scale = state.renderer.window.scale_factor() as f32;
        let position = Vec2::new(position.x as f32, position.y as f32) / scale;
        let delta = self
            .pointer
            .position
            .map(|last| position - last)
            .unwrap_or(Vec2::ZERO);
        self.pointer.position = Some(position);

        if delta == Vec2::ZERO {
            return;
        }

        if self.pointer.orbiting {
            state.session.controls_mut().rotate(delta);
        } else if self.pointer.panning {
            state.session.pan(delta);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match self.create_state(event_loop) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("Failed to start viewer: {:#}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(state) = self.state.as_ref() {
                    state.session.render_loop().stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(state) = self.state.as_ref() {
                    state.session.container().resize_hub().dispatch();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let Some(state) = self.state.as_mut() {
                        Self::handle_key(state, event_loop, &event.logical_key);
                    }
                }
            }
            WindowEvent::MouseInput { state: button_state, button, .. } => {
                let pressed = button_state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.pointer.orbiting = pressed,
                    MouseButton::Right | MouseButton::Middle => self.pointer.panning = pressed,
                    _ => (),
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(position),
            WindowEvent::CursorLeft { .. } => self.pointer.position = None,
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_SCROLL_STEP,
                };
                if let Some(state) = self.state.as_mut() {
                    state.session.controls_mut().zoom(steps);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(state) = self.state.as_mut() else {
                    return;
                };

                if !state.session.frame(Instant::now()) {
                    event_loop.exit();
                    return;
                }

                let session = &state.session;
                state.renderer.resize(session.viewport());
                state.renderer.sync_scene(session.scene());

                let lighting = session.lights().state(session.scene());
                if !state.renderer.render_or_recover(session.camera(), &lighting) {
                    session.render_loop().stop();
                    event_loop.exit();
                    return;
                }

                state.renderer.window.request_redraw();
            }
            _ => (),
        }
    }
}

/// Opens the viewer window and runs until it is closed or the loop is stopped.
pub fn run(config: ViewerConfig, startup: Option<StartupLoad>) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config, startup);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
