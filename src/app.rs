//! # Application Shell
//!
//! [`BothyApp`] opens a window, creates a [`Scene`] over the wgpu [`RenderEngine`],
//! loads the script's textures, lets the script build the scene and then routes key
//! presses to it. Animations started by the script are driven from the event loop:
//! the loop sleeps until the controller's next deadline and polls it on wake-up.
//!
//! Any error raised while building, drawing or handling input stops the event loop
//! and is returned from [`BothyApp::run`].

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::animation::AnimationController;
use crate::config::{AppConfig, SceneConfig};
use crate::error::{BothyError, Result};
use crate::gfx::backend::GraphicsBackend;
use crate::gfx::resources::FileImageLoader;
use crate::gfx::{rendering::RenderEngine, scene::Scene};

/// User code hosted by [`BothyApp`]
///
/// Generic over the backend so the same script can be driven headless through a
/// [`RecordingBackend`](crate::gfx::backend::RecordingBackend).
pub trait SceneScript<B: GraphicsBackend> {
    /// Camera, light and projection the scene starts with
    fn scene_config(&self) -> SceneConfig {
        SceneConfig::default()
    }

    /// Texture identifiers to load before [`SceneScript::build`]
    fn textures(&self) -> Vec<String> {
        Vec::new()
    }

    /// Populate the scene. Called once, after textures are loaded.
    fn build(&mut self, scene: &mut Scene<B>) -> Result<()>;

    /// React to a key press. The scene is redrawn afterwards.
    fn on_key(
        &mut self,
        key: KeyCode,
        scene: &mut Scene<B>,
        animations: &mut AnimationController<Scene<B>>,
    ) -> Result<()>;
}

pub struct BothyApp<S: SceneScript<RenderEngine>> {
    config: AppConfig,
    script: S,
}

struct AppState<S: SceneScript<RenderEngine>> {
    config: AppConfig,
    script: S,
    window: Option<Arc<Window>>,
    scene: Option<Scene<RenderEngine>>,
    animations: AnimationController<Scene<RenderEngine>>,
    error: Option<BothyError>,
}

impl<S: SceneScript<RenderEngine>> BothyApp<S> {
    pub fn new(config: AppConfig, script: S) -> Self {
        Self { config, script }
    }

    /// Run the application (consumes self and blocks until the window closes)
    pub fn run(self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = AppState {
            config: self.config,
            script: self.script,
            window: None,
            scene: None,
            animations: AnimationController::new(),
            error: None,
        };
        event_loop.run_app(&mut state)?;

        match state.error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

impl<S: SceneScript<RenderEngine>> AppState<S> {
    fn create_scene(&mut self, window: Arc<Window>) -> Result<Scene<RenderEngine>> {
        let PhysicalSize { width, height } = window.inner_size();
        let engine = pollster::block_on(RenderEngine::new(
            window,
            width,
            height,
            self.config.vsync,
        ))?;
        let mut scene = Scene::new(engine, (width, height), self.script.scene_config())?;

        let textures = self.script.textures();
        if !textures.is_empty() {
            let ids: Vec<&str> = textures.iter().map(String::as_str).collect();
            let loader = FileImageLoader::new(self.config.asset_root.clone());
            pollster::block_on(scene.load_textures(&ids, &loader))?;
        }

        self.script.build(&mut scene)?;
        Ok(scene)
    }

    fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };
        self.script.on_key(key, scene, &mut self.animations)?;
        scene.draw()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: BothyError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl<S: SceneScript<RenderEngine>> ApplicationHandler for AppState<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(
                    event_loop,
                    BothyError::Initialization(format!("window: {}", e)),
                );
                return;
            }
        };
        self.window = Some(window.clone());

        match self.create_scene(window.clone()) {
            Ok(scene) => {
                self.scene = Some(scene);
                window.request_redraw();
            }
            Err(error) => self.fail(event_loop, error),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if key_code == KeyCode::Escape {
                    event_loop.exit();
                    Ok(())
                } else {
                    self.handle_key(key_code)
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.backend_mut().resize(width, height);
                    scene.set_viewport(width, height);
                }
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
                Ok(())
            }
            WindowEvent::RedrawRequested => match self.scene.as_mut() {
                Some(scene) => scene.draw(),
                None => Ok(()),
            },
            _ => Ok(()),
        };

        if let Err(error) = result {
            self.fail(event_loop, error);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        if let Err(error) = self.animations.poll(Instant::now(), scene) {
            self.fail(event_loop, error);
            return;
        }

        match self.animations.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
