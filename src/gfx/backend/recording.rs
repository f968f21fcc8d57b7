//! In-memory backend that records every call
//!
//! Useful for running a scene without a window and for asserting on the exact upload
//! sequence a draw produces.

use cgmath::Matrix4;

use super::{AttributeLocation, GraphicsBackend, Primitive, TextureHandle, UniformLocation};
use crate::error::{BothyError, Result};
use crate::gfx::resources::TextureImage;
use crate::gfx::shader;

/// One recorded backend call. Locations are recorded by their program name.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear([f32; 3]),
    UploadAttribute {
        name: String,
        data: Vec<f32>,
        components: u32,
    },
    DisableAttribute(String),
    UploadIndices(Vec<u32>),
    UniformMat4 {
        name: String,
        value: Matrix4<f32>,
    },
    UniformVec3 {
        name: String,
        value: [f32; 3],
    },
    UniformBool {
        name: String,
        value: bool,
    },
    UniformSampler {
        name: String,
        unit: u32,
    },
    UploadTexture {
        handle: TextureHandle,
        width: u32,
        height: u32,
    },
    BindTexture {
        unit: u32,
        handle: TextureHandle,
    },
    DrawIndexed {
        primitive: Primitive,
        count: u32,
    },
    DrawArrays {
        primitive: Primitive,
        count: u32,
    },
    FinishFrame,
}

/// Backend whose "program" declares a configurable set of names
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    attributes: Vec<&'static str>,
    uniforms: Vec<&'static str>,
    commands: Vec<Command>,
    texture_count: u32,
    texture_limit: Option<u32>,
    frames: usize,
}

impl RecordingBackend {
    /// Backend declaring the complete scene shader interface
    pub fn new() -> Self {
        Self::without(&[])
    }

    /// Backend whose program lacks the given attribute or uniform names
    pub fn without(missing: &[&str]) -> Self {
        let keep = |name: &&str| !missing.contains(name);
        Self {
            attributes: shader::ATTRIBUTES.into_iter().filter(keep).collect(),
            uniforms: shader::UNIFORMS.into_iter().filter(keep).collect(),
            commands: Vec::new(),
            texture_count: 0,
            texture_limit: None,
            frames: 0,
        }
    }

    /// Backend that refuses texture uploads once `limit` textures exist
    pub fn with_texture_limit(mut self, limit: u32) -> Self {
        self.texture_limit = Some(limit);
        self
    }

    /// Every call recorded so far, oldest first
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drop recorded calls, keeping uploaded textures
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of completed frames
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Draw calls recorded so far
    pub fn draw_calls(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|command| {
            matches!(
                command,
                Command::DrawIndexed { .. } | Command::DrawArrays { .. }
            )
        })
    }

    /// Every value uploaded to a mat4 uniform, oldest first
    pub fn mat4_uploads<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Matrix4<f32>> + 'a {
        self.commands.iter().filter_map(move |command| match command {
            Command::UniformMat4 { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Last value uploaded to a bool uniform
    pub fn last_bool(&self, name: &str) -> Option<bool> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::UniformBool { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    fn attribute_name(&self, location: AttributeLocation) -> Result<String> {
        self.attributes
            .get(location.0 as usize)
            .map(|name| name.to_string())
            .ok_or_else(|| BothyError::binding(&format!("attribute #{}", location.0)))
    }

    fn uniform_name(&self, location: UniformLocation) -> Result<String> {
        self.uniforms
            .get(location.0 as usize)
            .map(|name| name.to_string())
            .ok_or_else(|| BothyError::binding(&format!("uniform #{}", location.0)))
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for RecordingBackend {
    fn attribute_location(&self, name: &str) -> Result<AttributeLocation> {
        self.attributes
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| AttributeLocation(index as u32))
            .ok_or_else(|| BothyError::binding(name))
    }

    fn uniform_location(&self, name: &str) -> Result<UniformLocation> {
        self.uniforms
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| UniformLocation(index as u32))
            .ok_or_else(|| BothyError::binding(name))
    }

    fn clear(&mut self, color: [f32; 3]) {
        self.commands.push(Command::Clear(color));
    }

    fn upload_attribute(
        &mut self,
        location: AttributeLocation,
        data: &[f32],
        components: u32,
    ) -> Result<()> {
        let name = self.attribute_name(location)?;
        self.commands.push(Command::UploadAttribute {
            name,
            data: data.to_vec(),
            components,
        });
        Ok(())
    }

    fn disable_attribute(&mut self, location: AttributeLocation) {
        if let Ok(name) = self.attribute_name(location) {
            self.commands.push(Command::DisableAttribute(name));
        }
    }

    fn upload_indices(&mut self, indices: &[u32]) -> Result<()> {
        self.commands.push(Command::UploadIndices(indices.to_vec()));
        Ok(())
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Matrix4<f32>) -> Result<()> {
        let name = self.uniform_name(location)?;
        self.commands.push(Command::UniformMat4 {
            name,
            value: *value,
        });
        Ok(())
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]) -> Result<()> {
        let name = self.uniform_name(location)?;
        self.commands.push(Command::UniformVec3 { name, value });
        Ok(())
    }

    fn set_uniform_bool(&mut self, location: UniformLocation, value: bool) -> Result<()> {
        let name = self.uniform_name(location)?;
        self.commands.push(Command::UniformBool { name, value });
        Ok(())
    }

    fn set_uniform_sampler(&mut self, location: UniformLocation, unit: u32) -> Result<()> {
        let name = self.uniform_name(location)?;
        self.commands.push(Command::UniformSampler { name, unit });
        Ok(())
    }

    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureHandle> {
        if self.texture_limit.is_some_and(|limit| self.texture_count >= limit) {
            return Err(BothyError::Initialization(format!(
                "texture #{} exceeds the backend limit",
                self.texture_count
            )));
        }
        let handle = TextureHandle(self.texture_count);
        self.texture_count += 1;
        self.commands.push(Command::UploadTexture {
            handle,
            width: image.width,
            height: image.height,
        });
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, handle: TextureHandle) -> Result<()> {
        if handle.0 >= self.texture_count {
            return Err(BothyError::ResourceLookup(format!("texture #{}", handle.0)));
        }
        self.commands.push(Command::BindTexture { unit, handle });
        Ok(())
    }

    fn draw_indexed(&mut self, primitive: Primitive, count: u32) -> Result<()> {
        self.commands.push(Command::DrawIndexed { primitive, count });
        Ok(())
    }

    fn draw_arrays(&mut self, primitive: Primitive, count: u32) -> Result<()> {
        self.commands.push(Command::DrawArrays { primitive, count });
        Ok(())
    }

    fn finish_frame(&mut self) -> Result<()> {
        self.frames += 1;
        self.commands.push(Command::FinishFrame);
        Ok(())
    }
}
