//! Shape nodes of the scene graph
//!
//! A [`Shape`] owns its children outright, so the graph is always a tree. Each node
//! contributes two matrices when drawn:
//!
//! - the *hierarchical* matrix `Ry * Rz * Rx * T(position)`, accumulated down the tree
//! - the *size* matrix `S(size)`, applied only to the node's own geometry
//!
//! Children inherit the accumulated hierarchical matrix, never the scaled model
//! matrix, so a small child can sit on a large parent's face without being stretched.

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};

use crate::error::{BothyError, Result};
use crate::gfx::backend::GraphicsBackend;
use crate::gfx::geometry::{box_geometry, empty_geometry, prism_geometry, GeometryData};

use super::scene::SceneRenderer;

/// Which fixed geometry a shape draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Unit cube centred on the origin
    Box,
    /// Triangular prism with its ridge along Z
    Prism,
    /// No geometry; groups children around a pivot point
    Pivot,
}

impl ShapeKind {
    pub fn geometry(self) -> &'static GeometryData {
        match self {
            ShapeKind::Box => box_geometry(),
            ShapeKind::Prism => prism_geometry(),
            ShapeKind::Pivot => empty_geometry(),
        }
    }
}

/// Texture applied to a shape, with UV repeat factors
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTexture {
    pub id: String,
    pub mul_u: f32,
    pub mul_v: f32,
}

/// A node in the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    position: Vector3<f32>,
    size: Vector3<f32>,
    /// Euler angles in degrees, each kept in `[0, 360)`
    rotation: Vector3<f32>,
    color: [f32; 3],
    texture: Option<ShapeTexture>,
    children: Vec<Shape>,
}

impl Shape {
    /// Create a shape from untyped component slices.
    ///
    /// Each of `position`, `size` and `color` must hold exactly three values.
    pub fn new(kind: ShapeKind, position: &[f32], size: &[f32], color: &[f32]) -> Result<Self> {
        Ok(Self::from_vectors(
            kind,
            three("position", position)?.into(),
            three("size", size)?.into(),
            three("color", color)?,
        ))
    }

    pub fn from_vectors(
        kind: ShapeKind,
        position: Vector3<f32>,
        size: Vector3<f32>,
        color: [f32; 3],
    ) -> Self {
        Self {
            kind,
            position,
            size,
            rotation: Vector3::new(0.0, 0.0, 0.0),
            color,
            texture: None,
            children: Vec::new(),
        }
    }

    /// Geometry-less grouping node at `position`
    pub fn pivot(position: Vector3<f32>) -> Self {
        Self::from_vectors(
            ShapeKind::Pivot,
            position,
            Vector3::new(1.0, 1.0, 1.0),
            [1.0, 1.0, 1.0],
        )
    }

    /// Add to each Euler angle, wrapping the result into `[0, 360)`
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation = Vector3::new(
            wrap_degrees(self.rotation.x + dx),
            wrap_degrees(self.rotation.y + dy),
            wrap_degrees(self.rotation.z + dz),
        );
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vector3::new(wrap_degrees(x), wrap_degrees(y), wrap_degrees(z));
    }

    /// Replace the texture. An empty id leaves the shape untextured.
    pub fn set_texture(&mut self, id: &str, mul_u: f32, mul_v: f32) {
        self.texture = (!id.is_empty()).then(|| ShapeTexture {
            id: id.to_string(),
            mul_u,
            mul_v,
        });
    }

    pub fn set_texture_uniform(&mut self, id: &str, mul: f32) {
        self.set_texture(id, mul, mul);
    }

    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    /// Append a child. Ownership moves into this node, so cycles cannot be formed.
    pub fn add_child(&mut self, child: Shape) {
        self.children.push(child);
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    pub fn set_size(&mut self, size: Vector3<f32>) {
        self.size = size;
    }

    pub fn set_color(&mut self, color: [f32; 3]) {
        self.color = color;
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn size(&self) -> Vector3<f32> {
        self.size
    }

    /// Euler angles in degrees as `(x, y, z)`
    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn texture(&self) -> Option<&ShapeTexture> {
        self.texture.as_ref()
    }

    pub fn children(&self) -> &[Shape] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Shape] {
        &mut self.children
    }

    /// Follow a chain of child indices down from this node
    pub fn descendant(&self, indices: &[usize]) -> Option<&Shape> {
        indices
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn descendant_mut(&mut self, indices: &[usize]) -> Option<&mut Shape> {
        indices
            .iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Shape::node_count).sum::<usize>()
    }

    /// Rotation then translation, independent of the parent
    pub fn hierarchical_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_y(Deg(self.rotation.y))
            * Matrix4::from_angle_z(Deg(self.rotation.z))
            * Matrix4::from_angle_x(Deg(self.rotation.x))
            * Matrix4::from_translation(self.position)
    }

    pub fn size_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_nonuniform_scale(self.size.x, self.size.y, self.size.z)
    }

    /// Draw this subtree under the parent's accumulated hierarchical matrix
    pub fn draw<B: GraphicsBackend>(
        &self,
        renderer: &mut SceneRenderer<B>,
        inherited: &Matrix4<f32>,
    ) -> Result<()> {
        let hierarchical = *inherited * self.hierarchical_matrix();
        let model = hierarchical * self.size_matrix();

        renderer.draw_elements(
            &model,
            self.kind.geometry(),
            self.color,
            self.texture.as_ref(),
        )?;

        for child in &self.children {
            child.draw(renderer, &hierarchical)?;
        }
        Ok(())
    }
}

fn three(field: &str, values: &[f32]) -> Result<[f32; 3]> {
    <[f32; 3]>::try_from(values).map_err(|_| {
        BothyError::Validation(format!(
            "{} must have exactly 3 components, got {}",
            field,
            values.len()
        ))
    })
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Identity matrix every root is drawn under
pub fn root_matrix() -> Matrix4<f32> {
    Matrix4::identity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};
    use rand::Rng;

    fn cube(position: [f32; 3], size: [f32; 3]) -> Shape {
        Shape::new(ShapeKind::Box, &position, &size, &[1.0, 0.0, 0.0]).unwrap()
    }

    #[test]
    fn test_rotation_wraps_into_range() {
        let mut shape = cube([0.0; 3], [1.0; 3]);
        shape.rotate(350.0, -10.0, 720.0);
        shape.rotate(20.0, 0.0, 0.0);
        assert_eq!(shape.rotation(), Vector3::new(10.0, 350.0, 0.0));
    }

    #[test]
    fn test_accumulated_rotation_matches_sum_modulo_360() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let mut shape = cube([0.0; 3], [1.0; 3]);
            let mut sums = [0i64; 3];
            for _ in 0..rng.random_range(1..20) {
                let delta: [i64; 3] = [
                    rng.random_range(-720..=720),
                    rng.random_range(-720..=720),
                    rng.random_range(-720..=720),
                ];
                for axis in 0..3 {
                    sums[axis] += delta[axis];
                }
                shape.rotate(delta[0] as f32, delta[1] as f32, delta[2] as f32);
            }

            let rotation = shape.rotation();
            for (stored, sum) in [rotation.x, rotation.y, rotation.z].into_iter().zip(sums) {
                assert!((0.0..360.0).contains(&stored));
                assert_eq!(stored, sum.rem_euclid(360) as f32);
            }
        }
    }

    #[test]
    fn test_wrap_never_returns_modulus() {
        assert_eq!(wrap_degrees(-1e-8), 0.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
    }

    #[test]
    fn test_default_node_has_identity_hierarchical_matrix() {
        let shape = cube([0.0; 3], [3.0, 4.0, 5.0]);
        assert_eq!(shape.hierarchical_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_size_matrix_scales_only() {
        let shape = cube([1.0, 2.0, 3.0], [2.0, 3.0, 4.0]);
        let corner = shape.size_matrix() * Vector4::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(corner, Vector4::new(1.0, 1.5, 2.0, 1.0));
    }

    #[test]
    fn test_hierarchical_matrix_rotates_translation() {
        let mut shape = cube([1.0, 0.0, 0.0], [1.0; 3]);
        shape.rotate(0.0, 90.0, 0.0);
        let origin = shape.hierarchical_matrix().w.truncate();
        assert!((origin - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_wrong_component_count_is_rejected() {
        let result = Shape::new(ShapeKind::Box, &[1.0, 2.0], &[1.0; 3], &[1.0; 3]);
        assert!(matches!(result, Err(BothyError::Validation(message)) if message.contains("position")));

        assert!(Shape::new(ShapeKind::Prism, &[1.0, 2.0, 3.0], &[1.0; 3], &[1.0; 3]).is_ok());
        assert!(Shape::new(ShapeKind::Box, &[0.0; 3], &[1.0; 4], &[1.0; 3]).is_err());
        assert!(Shape::new(ShapeKind::Box, &[0.0; 3], &[1.0; 3], &[]).is_err());
    }

    #[test]
    fn test_empty_texture_id_clears_texture() {
        let mut shape = cube([0.0; 3], [1.0; 3]);
        shape.set_texture("res/redbrick.jpg", 2.0, 3.0);
        assert_eq!(shape.texture().map(|t| (t.mul_u, t.mul_v)), Some((2.0, 3.0)));

        shape.set_texture_uniform("", 4.0);
        assert!(shape.texture().is_none());
    }

    #[test]
    fn test_descendant_paths() {
        let mut root = Shape::pivot(Vector3::new(0.0, 0.0, 0.0));
        let mut wall = cube([0.0; 3], [1.0; 3]);
        wall.add_child(cube([0.0, 1.0, 0.0], [1.0; 3]));
        root.add_child(cube([5.0, 0.0, 0.0], [1.0; 3]));
        root.add_child(wall);

        assert_eq!(root.node_count(), 4);
        assert_eq!(root.descendant(&[]).map(Shape::kind), Some(ShapeKind::Pivot));
        assert_eq!(
            root.descendant(&[1, 0]).map(Shape::position),
            Some(Vector3::new(0.0, 1.0, 0.0))
        );
        assert!(root.descendant(&[0, 0]).is_none());

        if let Some(window) = root.descendant_mut(&[1, 0]) {
            window.set_color([0.0, 0.0, 1.0]);
        }
        assert_eq!(root.children()[1].children()[0].color(), [0.0, 0.0, 1.0]);
    }
}
