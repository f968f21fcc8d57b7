//! # Primitive Shape Buffers
//!
//! Box and prism buffers carry per-face normals and 0..1 texture coordinates so that
//! every face can be lit flat and textured independently.

use std::sync::OnceLock;

use super::GeometryData;

/// Half-length of each axis helper line
pub const AXIS_EXTENT: f32 = 20.0;

/// Shared unit cube buffers
pub fn box_geometry() -> &'static GeometryData {
    static CUBE: OnceLock<GeometryData> = OnceLock::new();
    CUBE.get_or_init(generate_cube)
}

/// Shared triangular prism buffers
pub fn prism_geometry() -> &'static GeometryData {
    static PRISM: OnceLock<GeometryData> = OnceLock::new();
    PRISM.get_or_init(generate_prism)
}

/// Empty buffers for grouping nodes
pub fn empty_geometry() -> &'static GeometryData {
    static EMPTY: OnceLock<GeometryData> = OnceLock::new();
    EMPTY.get_or_init(GeometryData::new)
}

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has proper normals pointing outward and UV coordinates from 0 to 1.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    #[rustfmt::skip]
    let tex_coords = [
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ];

    let face_normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.tex_coords = tex_coords.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| [*normal; 4])
        .collect();
    data.indices = quad_indices(6);

    data
}

/// Generate a triangular prism centered at the origin
///
/// The triangular cross-section lies in the XY plane with its apex at (0, 0.5) and
/// its base on y = -0.5; it is extruded from z = -0.5 to z = 0.5. Scaled by a node
/// size this is a gable roof.
pub fn generate_prism() -> GeometryData {
    let mut data = GeometryData::new();

    // Outward normal of the sloped faces: perpendicular to the (-0.5, 1) edge
    let slope = 1.0 / 5.0_f32.sqrt();

    #[rustfmt::skip]
    let positions = [
        // Front triangle
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.0,  0.5,  0.5],
        // Back triangle
        [ 0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [ 0.0,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
        // Right slope
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.0,  0.5, -0.5], [ 0.0,  0.5,  0.5],
        // Left slope
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [ 0.0,  0.5,  0.5], [ 0.0,  0.5, -0.5],
    ];

    #[rustfmt::skip]
    let normals = [
        [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0],
        [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0],
        [2.0 * slope, slope, 0.0], [2.0 * slope, slope, 0.0],
        [2.0 * slope, slope, 0.0], [2.0 * slope, slope, 0.0],
        [-2.0 * slope, slope, 0.0], [-2.0 * slope, slope, 0.0],
        [-2.0 * slope, slope, 0.0], [-2.0 * slope, slope, 0.0],
    ];

    #[rustfmt::skip]
    let tex_coords = [
        [0.0, 0.0], [1.0, 0.0], [0.5, 1.0],
        [0.0, 0.0], [1.0, 0.0], [0.5, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = normals.to_vec();
    data.tex_coords = tex_coords.to_vec();

    data.indices = vec![0, 1, 2, 3, 4, 5];
    data.indices
        .extend(quad_indices(3).into_iter().map(|index| index + 6));

    data
}

/// Line segments through the origin along X, Y and Z
pub fn axis_lines() -> [[f32; 3]; 6] {
    [
        [-AXIS_EXTENT, 0.0, 0.0],
        [AXIS_EXTENT, 0.0, 0.0],
        [0.0, AXIS_EXTENT, 0.0],
        [0.0, -AXIS_EXTENT, 0.0],
        [0.0, 0.0, -AXIS_EXTENT],
        [0.0, 0.0, AXIS_EXTENT],
    ]
}

/// Two counter-clockwise triangles per quad for `quads` consecutive 4-vertex quads
fn quad_indices(quads: u32) -> Vec<u32> {
    (0..quads)
        .flat_map(|quad| {
            let base = quad * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Every triangle must wind counter-clockwise when seen from its normal side
    fn assert_outward_winding(data: &GeometryData) {
        for triangle in data.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| data.vertices[triangle[i] as usize]);
            let face = cross(sub(b, a), sub(c, a));
            let normal = data.normals[triangle[0] as usize];
            assert!(dot(face, normal) > 0.0, "triangle {:?} winds inward", triangle);
        }
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.normals.len(), 24);
        assert_eq!(cube.tex_coords.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_outward_winding(&cube);
    }

    #[test]
    fn test_prism_generation() {
        let prism = generate_prism();
        assert_eq!(prism.vertex_count(), 18);
        assert_eq!(prism.triangle_count(), 8);
        assert_eq!(prism.normals.len(), prism.vertices.len());
        assert_eq!(prism.tex_coords.len(), prism.vertices.len());
        assert!(prism.indices.iter().all(|&i| (i as usize) < prism.vertex_count()));
        assert_outward_winding(&prism);

        for normal in &prism.normals {
            assert!((dot(*normal, *normal) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_shared_buffers() {
        assert!(std::ptr::eq(box_geometry(), box_geometry()));
        assert!(empty_geometry().is_empty());
        assert_eq!(axis_lines().len(), 6);
    }
}
