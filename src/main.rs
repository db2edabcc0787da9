use std::sync::Arc;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use gltf_viewer::cli::Cli;
use gltf_viewer::clock::{Clock, FpsCounter};
use gltf_viewer::host;
use gltf_viewer::input::PointerInput;
use gltf_viewer::render::Renderer;
use gltf_viewer::viewer::LoadOutcome;
use gltf_viewer::{Viewer, ViewerConfig};

const INITIAL_WINDOW_WIDTH: u32 = 800;
const INITIAL_WINDOW_HEIGHT: u32 = 600;

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    viewer: Option<Viewer>,
    input: PointerInput,
    clock: Clock,
    fps: FpsCounter,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            viewer: None,
            input: PointerInput::new(),
            clock: Clock::new(),
            fps: FpsCounter::default(),
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(renderer), Some(viewer)) =
            (&self.window, &mut self.renderer, &mut self.viewer)
        else {
            return;
        };

        let delta = self.clock.tick();
        if let Some(fps) = self.fps.tick(delta.elapsed) {
            log::debug!("FPS: {:.1}", fps);
        }

        if let Some(LoadOutcome::Loaded) = viewer.poll_load() {
            log::info!("Model ready");
        }

        let height = viewer.viewport().height as f32;
        let (camera, controls) = viewer.camera_controls();
        self.input.flush(controls, camera, height);
        viewer.step(delta.step);

        match renderer.render(viewer, window) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = window.inner_size();
                renderer.resize(size.width, size.height);
            }
            Err(e) => log::error!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("glTF Viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        host::announce(host::detect(self.config.host_bridge, &window));

        let size = window.inner_size();
        let mut viewer = Viewer::new(self.config.clone(), size.width, size.height);

        let renderer = match pollster::block_on(Renderer::new(window.clone(), &viewer)) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        viewer.begin_load();
        self.clock.reset();

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.viewer = Some(viewer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            event => {
                self.input.process_event(&event);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Cli::parse().into_config()?;
    log::info!("Viewing {:?}", config.model_path);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    log::info!("Controls: left drag to orbit, right drag to pan, wheel to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
