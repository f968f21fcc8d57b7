//! Bothy 3D Scene Engine
//!
//! A small hierarchical scene engine built on wgpu and winit: boxes and prisms
//! arranged in trees, lit by a single point light, optionally textured, and animated
//! by a ping-pong step driver.

pub mod animation;
pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;

// Re-export main types for convenience
pub use app::{BothyApp, SceneScript};
pub use error::{BothyError, Result};
pub use gfx::scene::Scene;
