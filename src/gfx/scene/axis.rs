//! Axis helper
//!
//! Three line segments through the world origin, drawn unlit with the identity model
//! matrix regardless of where the helper sits among the roots.

use crate::error::Result;
use crate::gfx::backend::GraphicsBackend;
use crate::gfx::geometry::axis_lines;

use super::scene::SceneRenderer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisHelper {
    pub color: [f32; 3],
    pub visible: bool,
}

impl AxisHelper {
    pub fn new(color: [f32; 3]) -> Self {
        Self {
            color,
            visible: true,
        }
    }

    pub fn draw<B: GraphicsBackend>(&self, renderer: &mut SceneRenderer<B>) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        renderer.draw_lines(&axis_lines(), self.color)
    }
}

impl Default for AxisHelper {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0])
    }
}
