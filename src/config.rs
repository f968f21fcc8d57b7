//! Scene and application configuration
//!
//! Plain structs with defaults and chainable `with_*` setters. The defaults reproduce
//! the single-light demo setup the scene was designed around.

use std::path::PathBuf;

use cgmath::{Deg, Vector3};

/// Camera, lighting and projection parameters a [`Scene`](crate::gfx::scene::Scene)
/// starts with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub camera_position: Vector3<f32>,
    pub look_at: Vector3<f32>,
    pub light_position: Vector3<f32>,
    pub light_color: [f32; 3],
    pub ambient_color: [f32; 3],
    pub background_color: [f32; 3],
    pub fov_y: Deg<f32>,
    pub near: f32,
    pub far: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera_position: Vector3::new(0.0, 0.0, 15.0),
            look_at: Vector3::new(0.0, 0.0, -100.0),
            light_position: Vector3::new(-1.0, 1.0, 3.0),
            light_color: [0.6, 0.6, 0.6],
            ambient_color: [0.2, 0.2, 0.2],
            background_color: [0.0, 0.0, 0.0],
            fov_y: Deg(30.0),
            near: 1.0,
            far: 100.0,
        }
    }
}

impl SceneConfig {
    pub fn with_camera_position(mut self, position: Vector3<f32>) -> Self {
        self.camera_position = position;
        self
    }

    pub fn with_look_at(mut self, target: Vector3<f32>) -> Self {
        self.look_at = target;
        self
    }

    pub fn with_light_position(mut self, position: Vector3<f32>) -> Self {
        self.light_position = position;
        self
    }

    pub fn with_light_color(mut self, color: [f32; 3]) -> Self {
        self.light_color = color;
        self
    }

    pub fn with_ambient_color(mut self, color: [f32; 3]) -> Self {
        self.ambient_color = color;
        self
    }

    pub fn with_background_color(mut self, color: [f32; 3]) -> Self {
        self.background_color = color;
        self
    }

    /// Set the vertical field of view and the clip planes
    pub fn with_projection(mut self, fov_y: Deg<f32>, near: f32, far: f32) -> Self {
        self.fov_y = fov_y;
        self.near = near;
        self.far = far;
        self
    }
}

/// Window settings for [`BothyApp`](crate::app::BothyApp).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Directory texture identifiers are resolved against
    pub asset_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "bothy".to_string(),
            width: 1200,
            height: 800,
            vsync: true,
            asset_root: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }
}
