//! # Fixed Geometry
//!
//! Vertex, normal, texture-coordinate and index buffers for the shapes the scene
//! graph can draw. Buffers are built once and shared for the lifetime of the process.
//!
//! ## Supported Shapes
//!
//! - **Box**: unit cube spanning -0.5..0.5 on every axis
//! - **Prism**: triangular prism with its ridge along Z, same bounds as the box
//! - **Pivot**: no geometry at all, used for pure grouping nodes
//! - **Axis lines**: three line segments through the origin for debugging
//!
//! ## Usage
//!
//! ```rust
//! use bothy::gfx::geometry::{box_geometry, prism_geometry};
//!
//! assert_eq!(box_geometry().vertex_count(), 24);
//! assert_eq!(prism_geometry().triangle_count(), 8);
//! ```

pub mod primitives;

pub use primitives::*;

/// Geometry buffers ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Positions as a flat `x, y, z, x, y, z, ...` slice
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Normals as a flat `x, y, z, ...` slice
    pub fn flat_normals(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Texture coordinates multiplied by the repeat factors, flattened to `u, v, ...`
    pub fn scaled_tex_coords(&self, mul_u: f32, mul_v: f32) -> Vec<f32> {
        self.tex_coords
            .iter()
            .flat_map(|[u, v]| [u * mul_u, v * mul_v])
            .collect()
    }
}

/// Repeat an RGB color once per vertex, flattened to `r, g, b, r, g, b, ...`
pub fn repeat_color(color: [f32; 3], vertex_count: usize) -> Vec<f32> {
    std::iter::repeat_n(color, vertex_count).flatten().collect()
}
