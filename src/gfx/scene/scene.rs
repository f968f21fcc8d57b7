//! Scene orchestration
//!
//! [`Scene`] owns the backend, the texture registry, the camera and light state and
//! the root list. Drawing clears the frame, walks every root under the identity
//! matrix and hands each node's geometry to [`SceneRenderer`], which performs the
//! per-draw attribute and uniform uploads in a fixed order.

use cgmath::{perspective, EuclideanSpace, Matrix, Matrix4, Point3, SquareMatrix, Vector3};

use crate::animation::Redraw;
use crate::config::SceneConfig;
use crate::error::{BothyError, Result};
use crate::gfx::backend::{GraphicsBackend, Primitive, ShaderBindings};
use crate::gfx::geometry::{repeat_color, GeometryData};
use crate::gfx::resources::{ImageLoader, TextureRegistry};

use super::axis::AxisHelper;
use super::builder::{build_roots, IdTable, NodePath, ShapeBuilder};
use super::shape::{root_matrix, Shape, ShapeTexture};

/// Texture unit every textured draw binds to
const TEXTURE_UNIT: u32 = 0;

/// A top-level entry of the scene
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Shape(Shape),
    Axis(AxisHelper),
}

/// Per-frame values shared by every draw
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameUniforms {
    view_projection: Matrix4<f32>,
    light_color: [f32; 3],
    light_position: [f32; 3],
    ambient_color: [f32; 3],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_projection: Matrix4::identity(),
            light_color: [0.0; 3],
            light_position: [0.0; 3],
            ambient_color: [0.0; 3],
        }
    }
}

/// The backend-facing half of a scene: everything a node needs to draw itself.
pub struct SceneRenderer<B: GraphicsBackend> {
    backend: B,
    bindings: ShaderBindings,
    textures: TextureRegistry,
    frame: FrameUniforms,
}

impl<B: GraphicsBackend> SceneRenderer<B> {
    fn new(backend: B) -> Result<Self> {
        let bindings = ShaderBindings::resolve(&backend)?;
        Ok(Self {
            backend,
            bindings,
            textures: TextureRegistry::new(),
            frame: FrameUniforms::default(),
        })
    }

    /// Draw indexed triangles for one node's geometry under `model`.
    ///
    /// Geometry without vertices is skipped.
    pub fn draw_elements(
        &mut self,
        model: &Matrix4<f32>,
        geometry: &GeometryData,
        color: [f32; 3],
        texture: Option<&ShapeTexture>,
    ) -> Result<()> {
        if geometry.is_empty() {
            return Ok(());
        }

        let normal_matrix = model
            .invert()
            .ok_or_else(|| {
                BothyError::Validation("model matrix is not invertible (zero size?)".to_string())
            })?
            .transpose();
        let texture_handle = texture
            .map(|texture| self.textures.get(&texture.id))
            .transpose()?;

        let b = self.bindings;
        let backend = &mut self.backend;

        backend.upload_attribute(b.position, geometry.flat_positions(), 3)?;
        backend.upload_attribute(b.color, &repeat_color(color, geometry.vertex_count()), 3)?;
        backend.upload_attribute(b.normal, geometry.flat_normals(), 3)?;
        backend.upload_indices(&geometry.indices)?;

        backend.set_uniform_mat4(b.mvp_matrix, &(self.frame.view_projection * *model))?;

        backend.set_uniform_bool(b.is_lighting, true)?;
        backend.set_uniform_mat4(b.normal_matrix, &normal_matrix)?;
        backend.set_uniform_mat4(b.model_matrix, model)?;
        backend.set_uniform_vec3(b.light_color, self.frame.light_color)?;
        backend.set_uniform_vec3(b.light_position, self.frame.light_position)?;
        backend.set_uniform_vec3(b.ambient_light, self.frame.ambient_color)?;

        match (texture, texture_handle) {
            (Some(texture), Some(handle)) => {
                let tex_coords = geometry.scaled_tex_coords(texture.mul_u, texture.mul_v);
                backend.upload_attribute(b.tex_coords, &tex_coords, 2)?;
                backend.bind_texture(TEXTURE_UNIT, handle)?;
                backend.set_uniform_sampler(b.sampler, TEXTURE_UNIT)?;
                backend.set_uniform_bool(b.use_textures, true)?;
            }
            _ => {
                backend.disable_attribute(b.tex_coords);
                backend.set_uniform_bool(b.use_textures, false)?;
            }
        }

        backend.draw_indexed(Primitive::Triangles, geometry.indices.len() as u32)
    }

    /// Draw unlit line segments with the identity model matrix
    pub fn draw_lines(&mut self, vertices: &[[f32; 3]], color: [f32; 3]) -> Result<()> {
        let b = self.bindings;
        let backend = &mut self.backend;

        backend.upload_attribute(b.position, bytemuck::cast_slice(vertices), 3)?;
        backend.upload_attribute(b.color, &repeat_color(color, vertices.len()), 3)?;
        backend.set_uniform_mat4(b.mvp_matrix, &self.frame.view_projection)?;
        backend.set_uniform_bool(b.is_lighting, false)?;
        backend.disable_attribute(b.tex_coords);
        backend.set_uniform_bool(b.use_textures, false)?;

        backend.draw_arrays(Primitive::Lines, vertices.len() as u32)
    }
}

/// Camera, light, textures and root trees drawn through one backend
pub struct Scene<B: GraphicsBackend> {
    renderer: SceneRenderer<B>,
    config: SceneConfig,
    viewport: (u32, u32),
    roots: Vec<SceneNode>,
}

impl<B: GraphicsBackend> Scene<B> {
    /// Create a scene over `backend` with a `(width, height)` viewport.
    ///
    /// Every attribute and uniform location is resolved here, so a backend whose
    /// program lacks one fails immediately with a binding error.
    pub fn new(backend: B, viewport: (u32, u32), config: SceneConfig) -> Result<Self> {
        let renderer = SceneRenderer::new(backend)?;
        log::info!(
            "Scene created with {}x{} viewport, camera at {:?}",
            viewport.0,
            viewport.1,
            config.camera_position
        );
        Ok(Self {
            renderer,
            config,
            viewport,
            roots: Vec::new(),
        })
    }

    pub fn set_background_color(&mut self, color: [f32; 3]) {
        self.config.background_color = color;
    }

    pub fn set_camera_position(&mut self, position: Vector3<f32>) {
        self.config.camera_position = position;
    }

    pub fn set_look_at(&mut self, target: Vector3<f32>) {
        self.config.look_at = target;
    }

    pub fn set_light_position(&mut self, position: Vector3<f32>) {
        self.config.light_position = position;
    }

    pub fn set_light_color(&mut self, color: [f32; 3]) {
        self.config.light_color = color;
    }

    pub fn set_ambient_color(&mut self, color: [f32; 3]) {
        self.config.ambient_color = color;
    }

    /// Resize the viewport, which changes the projection's aspect ratio
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn background_color(&self) -> [f32; 3] {
        self.config.background_color
    }

    pub fn camera_position(&self) -> Vector3<f32> {
        self.config.camera_position
    }

    pub fn look_at(&self) -> Vector3<f32> {
        self.config.look_at
    }

    pub fn light_position(&self) -> Vector3<f32> {
        self.config.light_position
    }

    pub fn light_color(&self) -> [f32; 3] {
        self.config.light_color
    }

    pub fn ambient_color(&self) -> [f32; 3] {
        self.config.ambient_color
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0.max(1) as f32 / self.viewport.1.max(1) as f32
    }

    /// Right-handed view matrix with a fixed +Y up vector
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.config.camera_position),
            Point3::from_vec(self.config.look_at),
            Vector3::unit_y(),
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(
            self.config.fov_y,
            self.aspect_ratio(),
            self.config.near,
            self.config.far,
        )
    }

    /// Fetch, upload and register every texture in `ids`.
    ///
    /// The loader's futures are joined as one batch, so they only overlap when the
    /// loader itself is asynchronous. If any image fails, nothing from this batch is
    /// registered.
    pub async fn load_textures<L: ImageLoader + ?Sized>(
        &mut self,
        ids: &[&str],
        loader: &L,
    ) -> Result<()> {
        let renderer = &mut self.renderer;
        renderer
            .textures
            .load_all(ids, loader, &mut renderer.backend)
            .await?;
        log::info!("Loaded {} textures", renderer.textures.len());
        Ok(())
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.renderer.textures
    }

    /// Append an independent tree and return the path of its root
    pub fn add_root(&mut self, root: Shape) -> NodePath {
        self.roots.push(SceneNode::Shape(root));
        NodePath::root(self.roots.len() - 1)
    }

    pub fn add_axis(&mut self, axis: AxisHelper) {
        self.roots.push(SceneNode::Axis(axis));
    }

    /// Finalize builders into new roots and return their identifier table.
    ///
    /// Paths in the returned table already account for roots added earlier. Nothing
    /// is added if any builder fails validation.
    pub fn add_built(
        &mut self,
        builders: impl IntoIterator<Item = ShapeBuilder>,
    ) -> Result<IdTable> {
        let (roots, table) = build_roots(builders)?;
        let table = table.offset(self.roots.len());
        self.roots.extend(roots.into_iter().map(SceneNode::Shape));
        Ok(table)
    }

    pub fn roots(&self) -> &[SceneNode] {
        &self.roots
    }

    pub fn node(&self, path: &NodePath) -> Result<&Shape> {
        let node = match self.roots.get(path.root_index()) {
            Some(SceneNode::Shape(root)) => root.descendant(path.indices()),
            _ => None,
        };
        node.ok_or_else(|| missing_node(path))
    }

    pub fn node_mut(&mut self, path: &NodePath) -> Result<&mut Shape> {
        let node = match self.roots.get_mut(path.root_index()) {
            Some(SceneNode::Shape(root)) => root.descendant_mut(path.indices()),
            _ => None,
        };
        node.ok_or_else(|| missing_node(path))
    }

    /// Resolve `name` through `ids` and return the live node
    pub fn node_by_id_mut(&mut self, ids: &IdTable, name: &str) -> Result<&mut Shape> {
        let path = ids.path(name)?;
        self.node_mut(path)
    }

    pub fn axes_mut(&mut self) -> impl Iterator<Item = &mut AxisHelper> {
        self.roots.iter_mut().filter_map(|node| match node {
            SceneNode::Axis(axis) => Some(axis),
            SceneNode::Shape(_) => None,
        })
    }

    /// Clear to the background color and draw every root under the identity matrix
    pub fn draw(&mut self) -> Result<()> {
        self.renderer.frame = FrameUniforms {
            view_projection: self.projection_matrix() * self.view_matrix(),
            light_color: self.config.light_color,
            light_position: self.config.light_position.into(),
            ambient_color: self.config.ambient_color,
        };

        self.renderer.backend.clear(self.config.background_color);
        let identity = root_matrix();
        for root in &self.roots {
            match root {
                SceneNode::Shape(shape) => shape.draw(&mut self.renderer, &identity)?,
                SceneNode::Axis(axis) => axis.draw(&mut self.renderer)?,
            }
        }
        self.renderer.backend.finish_frame()
    }

    pub fn backend(&self) -> &B {
        &self.renderer.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.renderer.backend
    }
}

impl<B: GraphicsBackend> Redraw for Scene<B> {
    fn redraw(&mut self) -> Result<()> {
        self.draw()
    }
}

fn missing_node(path: &NodePath) -> BothyError {
    BothyError::Validation(format!("no shape at {:?}", path))
}
