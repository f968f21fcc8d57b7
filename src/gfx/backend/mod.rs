//! # Graphics Backend Boundary
//!
//! The scene talks to the GPU through [`GraphicsBackend`], an immediate-mode style
//! interface: upload attribute buffers and uniforms by location, then issue a draw.
//! Two implementations ship with the crate:
//!
//! - [`RenderEngine`](crate::gfx::rendering::RenderEngine) - wgpu, renders to a window
//! - [`RecordingBackend`] - records every call in memory, for headless use and tests
//!
//! Locations are resolved once by name through [`ShaderBindings::resolve`]; a name the
//! compiled program does not declare is a [`BothyError::Binding`](crate::BothyError).

pub mod recording;

use cgmath::Matrix4;

use crate::error::Result;
use crate::gfx::resources::TextureImage;
use crate::gfx::shader;

pub use recording::{Command, RecordingBackend};

/// Opaque location of a vertex attribute in the compiled program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLocation(pub u32);

/// Opaque location of a uniform in the compiled program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Opaque handle of an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Primitive topology of a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Triangles,
    Lines,
}

/// Immediate-mode graphics adapter consumed by the scene.
///
/// Implementations hold the "current" attribute buffers, index buffer, uniforms and
/// bound texture; a draw call consumes whatever is current at that moment. Only one
/// owner may drive a backend at a time, which the `&mut self` receivers enforce.
pub trait GraphicsBackend {
    /// Look up a vertex attribute of the compiled program
    fn attribute_location(&self, name: &str) -> Result<AttributeLocation>;

    /// Look up a uniform of the compiled program
    fn uniform_location(&self, name: &str) -> Result<UniformLocation>;

    /// Clear color and depth buffers, starting a new frame
    fn clear(&mut self, color: [f32; 3]);

    /// Upload a float attribute buffer with `components` floats per vertex and enable it
    fn upload_attribute(
        &mut self,
        location: AttributeLocation,
        data: &[f32],
        components: u32,
    ) -> Result<()>;

    /// Disable an attribute so the next draws do not read it
    fn disable_attribute(&mut self, location: AttributeLocation);

    /// Upload the index buffer used by [`GraphicsBackend::draw_indexed`]
    fn upload_indices(&mut self, indices: &[u32]) -> Result<()>;

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Matrix4<f32>) -> Result<()>;

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]) -> Result<()>;

    fn set_uniform_bool(&mut self, location: UniformLocation, value: bool) -> Result<()>;

    /// Point a sampler uniform at a texture unit
    fn set_uniform_sampler(&mut self, location: UniformLocation, unit: u32) -> Result<()>;

    /// Upload decoded RGBA pixels and return a handle for later binding
    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureHandle>;

    /// Bind an uploaded texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<()>;

    /// Draw `count` indices from the current index buffer
    fn draw_indexed(&mut self, primitive: Primitive, count: u32) -> Result<()>;

    /// Draw `count` vertices from the current attribute buffers
    fn draw_arrays(&mut self, primitive: Primitive, count: u32) -> Result<()>;

    /// Submit everything drawn since the last [`GraphicsBackend::clear`]
    fn finish_frame(&mut self) -> Result<()>;
}

/// Every location the scene uploads to, resolved once up front
#[derive(Debug, Clone, Copy)]
pub struct ShaderBindings {
    pub position: AttributeLocation,
    pub color: AttributeLocation,
    pub normal: AttributeLocation,
    pub tex_coords: AttributeLocation,
    pub model_matrix: UniformLocation,
    pub mvp_matrix: UniformLocation,
    pub normal_matrix: UniformLocation,
    pub light_color: UniformLocation,
    pub light_position: UniformLocation,
    pub ambient_light: UniformLocation,
    pub is_lighting: UniformLocation,
    pub use_textures: UniformLocation,
    pub sampler: UniformLocation,
}

impl ShaderBindings {
    /// Resolve the full scene interface, failing on the first missing name
    pub fn resolve<B: GraphicsBackend + ?Sized>(backend: &B) -> Result<Self> {
        Ok(Self {
            position: backend.attribute_location(shader::A_POSITION)?,
            color: backend.attribute_location(shader::A_COLOR)?,
            normal: backend.attribute_location(shader::A_NORMAL)?,
            tex_coords: backend.attribute_location(shader::A_TEX_COORDS)?,
            model_matrix: backend.uniform_location(shader::U_MODEL_MATRIX)?,
            mvp_matrix: backend.uniform_location(shader::U_MVP_MATRIX)?,
            normal_matrix: backend.uniform_location(shader::U_NORMAL_MATRIX)?,
            light_color: backend.uniform_location(shader::U_LIGHT_COLOR)?,
            light_position: backend.uniform_location(shader::U_LIGHT_POSITION)?,
            ambient_light: backend.uniform_location(shader::U_AMBIENT_LIGHT)?,
            is_lighting: backend.uniform_location(shader::U_IS_LIGHTING)?,
            use_textures: backend.uniform_location(shader::U_USE_TEXTURES)?,
            sampler: backend.uniform_location(shader::U_SAMPLER)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BothyError;

    #[test]
    fn test_resolve_full_interface() {
        let backend = RecordingBackend::new();
        let bindings = ShaderBindings::resolve(&backend).unwrap();
        assert_ne!(bindings.position, bindings.tex_coords);
        assert_ne!(bindings.model_matrix, bindings.sampler);
    }

    #[test]
    fn test_missing_uniform_is_binding_error() {
        let backend = RecordingBackend::without(&[shader::U_AMBIENT_LIGHT]);
        match ShaderBindings::resolve(&backend) {
            Err(BothyError::Binding { name }) => assert_eq!(name, shader::U_AMBIENT_LIGHT),
            other => panic!("expected binding error, got {:?}", other.map(|_| ())),
        }
    }
}
