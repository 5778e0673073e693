//! Window and event loop handling.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::DemoConfig;
use crate::error::DemoError;
use crate::gpu::Renderer;
use crate::scene::{Scene, SceneAssets};
use crate::time::FrameClock;

pub(crate) struct App {
    config: DemoConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Option<Scene>,
    clock: FrameClock,
    error: Option<DemoError>,
}

impl App {
    pub(crate) fn new(config: DemoConfig) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            scene: None,
            clock: FrameClock::new(),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub(crate) fn take_error(&mut self) -> Option<DemoError> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), DemoError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();

        let scene = Scene::new(&self.config, size.width, size.height);
        let assets = SceneAssets::load(&self.config.assets);
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            &scene,
            &assets,
            self.config.sample_count(),
        ))?;

        self.window = Some(window);
        self.scene = Some(scene);
        self.renderer = Some(renderer);
        self.clock = FrameClock::new();
        Ok(())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(scene) = &mut self.scene {
            scene.shutdown();
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(scene), Some(renderer)) = (&mut self.scene, &mut self.renderer) else {
            return;
        };

        let dt = self.clock.tick();
        if !scene.tick(dt) {
            return;
        }

        match renderer.render(scene, self.clock.elapsed()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory, exiting");
                self.stop(event_loop);
                return;
            }
            Err(e) => log::error!("render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            if let Some(fps) = self.clock.take_fps_update() {
                window.set_title(&format!("{} - {:.0} fps", self.config.title, fps));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("startup failed: {}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(scene) = &mut self.scene {
            if scene.controls.handle_event(&event, &mut scene.camera) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => self.stop(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.stop(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                if let Some(scene) = &mut self.scene {
                    scene.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
