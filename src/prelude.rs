//! # Bothy Prelude
//!
//! Commonly used types for scene scripts, so a typical application needs a single
//! import.
//!
//! ```no_run
//! use bothy::prelude::*;
//!
//! struct Tower;
//!
//! impl<B: GraphicsBackend> SceneScript<B> for Tower {
//!     fn build(&mut self, scene: &mut Scene<B>) -> Result<()> {
//!         scene.add_built([ShapeBuilder::cube(&[0.0, 0.0, 0.0], &[1.0, 4.0, 1.0], &[0.7, 0.7, 0.7])])?;
//!         Ok(())
//!     }
//!
//!     fn on_key(
//!         &mut self,
//!         _key: KeyCode,
//!         _scene: &mut Scene<B>,
//!         _animations: &mut AnimationController<Scene<B>>,
//!     ) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     BothyApp::new(AppConfig::default(), Tower).run()
//! }
//! ```

// Re-export core application types
pub use crate::app::{BothyApp, SceneScript};
pub use crate::config::{AppConfig, SceneConfig};
pub use crate::error::{BothyError, Result};

// Re-export scene types
pub use crate::animation::{AnimationController, CompletionCallback, Redraw, StepDirection};
pub use crate::gfx::backend::GraphicsBackend;
pub use crate::gfx::scene::{AxisHelper, IdTable, NodePath, Scene, Shape, ShapeBuilder, ShapeKind};

// Re-export common external dependencies
pub use cgmath::{Deg, Vector3};
pub use winit::keyboard::KeyCode;
