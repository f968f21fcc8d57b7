//! WGPU-based graphics backend
//!
//! [`RenderEngine`] implements [`GraphicsBackend`] on top of wgpu. Uploads between
//! [`GraphicsBackend::clear`] and [`GraphicsBackend::finish_frame`] only update the
//! engine's "current" state; every draw call snapshots that state. When the frame
//! finishes, all snapshots are packed into shared vertex and index buffers plus one
//! dynamic-offset uniform buffer and replayed in a single render pass.

use std::{iter, num::NonZeroU64, ops::Range, sync::Arc};

use bytemuck::{Pod, Zeroable};
use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::error::{BothyError, Result};
use crate::gfx::backend::{
    AttributeLocation, GraphicsBackend, Primitive, TextureHandle, UniformLocation,
};
use crate::gfx::resources::{TextureImage, TextureResource};
use crate::gfx::shader;

use super::pipeline_manager::{PipelineConfig, PipelineManager, ATTRIBUTE_COMPONENTS};

/// Maps OpenGL clip-space depth (-1..1) onto wgpu's (0..1)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Byte distance between consecutive draws in the uniform buffer
const UNIFORM_STRIDE: usize = 256;

const VERTEX_SHADER_NAME: &str = "scene_vertex";
const FRAGMENT_SHADER_NAME: &str = "scene_fragment";

/// Uniform block of the scene program, laid out to match WGSL `Uniforms`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub mvp: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub light_color: [f32; 3],
    _pad0: f32,
    pub light_position: [f32; 3],
    _pad1: f32,
    pub ambient: [f32; 3],
    pub is_lighting: u32,
    pub use_textures: u32,
    _pad2: [u32; 3],
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Attribute, index and uniform values that the next draw will consume
#[derive(Debug, Clone, Default)]
struct CurrentState {
    attributes: [Option<Vec<f32>>; 4],
    indices: Vec<u32>,
    uniforms: DrawUniforms,
    texture: Option<TextureHandle>,
}

/// Snapshot of the current state taken by a draw call
#[derive(Debug, Clone)]
struct RecordedDraw {
    primitive: Primitive,
    count: u32,
    indexed: bool,
    attributes: [Option<Vec<f32>>; 4],
    indices: Vec<u32>,
    uniforms: DrawUniforms,
    texture: Option<TextureHandle>,
}

impl RecordedDraw {
    fn vertex_count(&self) -> usize {
        self.attributes[0]
            .as_ref()
            .map_or(0, |positions| positions.len() / ATTRIBUTE_COMPONENTS[0] as usize)
    }
}

/// Byte ranges of one draw inside the frame's shared buffers
struct DrawRanges {
    vertices: [Range<u64>; 4],
    indices: Range<u64>,
}

/// Vertex and index buffers holding every draw of one frame
struct FrameGeometry {
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    ranges: Vec<DrawRanges>,
}

impl FrameGeometry {
    fn build(device: &wgpu::Device, draws: &[RecordedDraw]) -> Self {
        let mut arenas: [Vec<f32>; 4] = Default::default();
        let mut indices: Vec<u32> = Vec::new();
        let mut ranges = Vec::with_capacity(draws.len());

        for draw in draws {
            let vertex_count = draw.vertex_count();
            let vertices = std::array::from_fn(|slot| {
                let arena = &mut arenas[slot];
                let start = byte_len(arena.len());
                match &draw.attributes[slot] {
                    Some(data) => arena.extend_from_slice(data),
                    // Disabled attributes read zeros
                    None => arena.resize(
                        arena.len() + vertex_count * ATTRIBUTE_COMPONENTS[slot] as usize,
                        0.0,
                    ),
                }
                start..byte_len(arena.len())
            });

            let start = byte_len(indices.len());
            if draw.indexed {
                indices.extend_from_slice(&draw.indices);
            }
            ranges.push(DrawRanges {
                vertices,
                indices: start..byte_len(indices.len()),
            });
        }

        let vertex_buffers = arenas
            .iter()
            .zip(shader::ATTRIBUTES)
            .map(|(arena, name)| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(name),
                    contents: bytemuck::cast_slice(arena),
                    usage: wgpu::BufferUsages::VERTEX,
                })
            })
            .collect();
        let index_buffer = (!indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Frame Index Buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        Self {
            vertex_buffers,
            index_buffer,
            ranges,
        }
    }
}

fn byte_len(elements: usize) -> u64 {
    (elements * std::mem::size_of::<f32>()) as u64
}

/// An uploaded texture and the bind group that exposes it as `u_Sampler`
struct BoundTexture {
    _resource: TextureResource,
    bind_group: wgpu::BindGroup,
}

/// Core rendering engine managing GPU resources and draw calls
///
/// The RenderEngine handles all low-level graphics operations including:
/// - Surface and device management
/// - Shader compilation and pipeline creation
/// - Depth buffer handling
/// - Replaying the draws recorded through [`GraphicsBackend`]
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,

    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_capacity: usize,

    texture_layout: wgpu::BindGroupLayout,
    textures: Vec<BoundTexture>,
    white_texture: BoundTexture,

    declared_attributes: Vec<&'static str>,
    declared_uniforms: Vec<&'static str>,

    clear_color: [f32; 3],
    current: CurrentState,
    draws: Vec<RecordedDraw>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `vsync` - Whether presentation waits for the display refresh
    ///
    /// # Errors
    /// [`BothyError::Initialization`] if no surface, adapter or device can be created
    /// or if the scene program fails to compile.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| BothyError::Initialization(format!("surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| BothyError::Initialization(format!("adapter: {}", e)))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| BothyError::Initialization(format!("device: {}", e)))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| {
                BothyError::Initialization("surface reports no texture formats".to_string())
            })?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();

        let mut pipeline_manager =
            PipelineManager::new(device_handle.clone(), &[&uniform_layout, &texture_layout]);
        pipeline_manager.load_shader(VERTEX_SHADER_NAME, shader::VERTEX_SHADER)?;
        pipeline_manager.load_shader(FRAGMENT_SHADER_NAME, shader::FRAGMENT_SHADER)?;

        let base = PipelineConfig::default()
            .with_shaders(VERTEX_SHADER_NAME, FRAGMENT_SHADER_NAME)
            .with_depth_format(TextureResource::DEPTH_FORMAT)
            .with_color_format(format);
        pipeline_manager.register_pipeline(
            Primitive::Triangles,
            &base.clone().with_label("Scene Triangles"),
        )?;
        pipeline_manager.register_pipeline(
            Primitive::Lines,
            &base
                .with_label("Scene Lines")
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList),
        )?;

        let uniform_capacity = 64;
        let (uniform_buffer, uniform_bind_group) =
            create_uniform_buffer(&device_handle, &uniform_layout, uniform_capacity);

        let white_texture = bind_texture_image(
            &device_handle,
            &queue_handle,
            &texture_layout,
            &TextureImage::solid([255, 255, 255, 255]),
            "White Texture",
        );

        let sources = [shader::VERTEX_SHADER, shader::FRAGMENT_SHADER];
        let declared_attributes = shader::declared_names(&shader::ATTRIBUTES, &sources);
        let declared_uniforms = shader::declared_names(&shader::UNIFORMS, &sources);

        log::info!(
            "Render engine ready: {:?} surface {}x{}, adapter {}",
            format,
            config.width,
            config.height,
            adapter.get_info().name
        );

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            pipeline_manager,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity,
            texture_layout,
            textures: Vec::new(),
            white_texture,
            declared_attributes,
            declared_uniforms,
            clear_color: [0.0; 3],
            current: CurrentState::default(),
            draws: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    fn attribute_slot(&self, location: AttributeLocation) -> Result<usize> {
        let slot = location.0 as usize;
        if slot < shader::ATTRIBUTES.len() {
            Ok(slot)
        } else {
            Err(BothyError::binding(&format!("attribute #{}", location.0)))
        }
    }

    fn uniform_name(&self, location: UniformLocation) -> Result<&'static str> {
        shader::UNIFORMS
            .get(location.0 as usize)
            .copied()
            .ok_or_else(|| BothyError::binding(&format!("uniform #{}", location.0)))
    }

    fn record(&mut self, primitive: Primitive, count: u32, indexed: bool) -> Result<()> {
        if !self.current.attributes[0]
            .as_ref()
            .is_some_and(|positions| !positions.is_empty())
        {
            return Err(BothyError::Validation(format!(
                "draw issued without {}",
                shader::A_POSITION
            )));
        }
        // wgpu rejects empty buffer slices
        if count == 0 {
            return Ok(());
        }
        if indexed && count as usize > self.current.indices.len() {
            return Err(BothyError::Validation(format!(
                "draw of {} indices with {} uploaded",
                count,
                self.current.indices.len()
            )));
        }
        let use_textures = self.current.uniforms.use_textures != 0;
        self.draws.push(RecordedDraw {
            primitive,
            count,
            indexed,
            attributes: self.current.attributes.clone(),
            indices: if indexed {
                self.current.indices.clone()
            } else {
                Vec::new()
            },
            uniforms: self.current.uniforms,
            texture: self.current.texture.filter(|_| use_textures),
        });
        Ok(())
    }

    fn ensure_uniform_capacity(&mut self, draws: usize) {
        if draws <= self.uniform_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        let (buffer, bind_group) = create_uniform_buffer(&self.device, &self.uniform_layout, capacity);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
        log::debug!("Grew draw uniform buffer to {} draws", capacity);
    }

    fn render(&mut self, draws: &[RecordedDraw]) -> Result<()> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring and skipping frame");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.ensure_uniform_capacity(draws.len());
        let mut uniform_bytes = vec![0u8; draws.len() * UNIFORM_STRIDE];
        for (chunk, draw) in uniform_bytes.chunks_exact_mut(UNIFORM_STRIDE).zip(draws) {
            chunk.copy_from_slice(bytemuck::bytes_of(&draw.uniforms));
        }
        if !uniform_bytes.is_empty() {
            self.queue.write_buffer(&self.uniform_buffer, 0, &uniform_bytes);
        }

        let geometry = (!draws.is_empty()).then(|| FrameGeometry::build(&self.device, draws));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b] = self.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(geometry) = &geometry {
                for (index, (draw, ranges)) in draws.iter().zip(&geometry.ranges).enumerate() {
                    let pipeline = self
                        .pipeline_manager
                        .get_pipeline(draw.primitive)
                        .ok_or_else(|| {
                            BothyError::Initialization(format!(
                                "no pipeline for {:?}",
                                draw.primitive
                            ))
                        })?;
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(
                        0,
                        &self.uniform_bind_group,
                        &[(index * UNIFORM_STRIDE) as u32],
                    );

                    let texture = draw
                        .texture
                        .and_then(|handle| self.textures.get(handle.0 as usize))
                        .unwrap_or(&self.white_texture);
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);

                    for (slot, buffer) in geometry.vertex_buffers.iter().enumerate() {
                        render_pass
                            .set_vertex_buffer(slot as u32, buffer.slice(ranges.vertices[slot].clone()));
                    }

                    match (&geometry.index_buffer, draw.indexed) {
                        (Some(index_buffer), true) => {
                            render_pass.set_index_buffer(
                                index_buffer.slice(ranges.indices.clone()),
                                wgpu::IndexFormat::Uint32,
                            );
                            render_pass.draw_indexed(0..draw.count, 0, 0..1);
                        }
                        _ => render_pass.draw(0..draw.count, 0..1),
                    }
                }
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniform Buffer"),
        size: (capacity * UNIFORM_STRIDE) as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Uniform Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn bind_texture_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    image: &TextureImage,
    label: &str,
) -> BoundTexture {
    let resource = TextureResource::create_from_image(device, queue, image, label);
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&resource.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&resource.sampler),
            },
        ],
    });
    BoundTexture {
        _resource: resource,
        bind_group,
    }
}

impl GraphicsBackend for RenderEngine {
    fn attribute_location(&self, name: &str) -> Result<AttributeLocation> {
        if !self.declared_attributes.iter().any(|declared| *declared == name) {
            return Err(BothyError::binding(name));
        }
        shader::ATTRIBUTES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|slot| AttributeLocation(slot as u32))
            .ok_or_else(|| BothyError::binding(name))
    }

    fn uniform_location(&self, name: &str) -> Result<UniformLocation> {
        if !self.declared_uniforms.iter().any(|declared| *declared == name) {
            return Err(BothyError::binding(name));
        }
        shader::UNIFORMS
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| UniformLocation(index as u32))
            .ok_or_else(|| BothyError::binding(name))
    }

    fn clear(&mut self, color: [f32; 3]) {
        self.clear_color = color;
        self.draws.clear();
    }

    fn upload_attribute(
        &mut self,
        location: AttributeLocation,
        data: &[f32],
        components: u32,
    ) -> Result<()> {
        let slot = self.attribute_slot(location)?;
        if components != ATTRIBUTE_COMPONENTS[slot] {
            return Err(BothyError::Validation(format!(
                "{} takes {} components, got {}",
                shader::ATTRIBUTES[slot],
                ATTRIBUTE_COMPONENTS[slot],
                components
            )));
        }
        self.current.attributes[slot] = Some(data.to_vec());
        Ok(())
    }

    fn disable_attribute(&mut self, location: AttributeLocation) {
        if let Ok(slot) = self.attribute_slot(location) {
            self.current.attributes[slot] = None;
        }
    }

    fn upload_indices(&mut self, indices: &[u32]) -> Result<()> {
        self.current.indices = indices.to_vec();
        Ok(())
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Matrix4<f32>) -> Result<()> {
        let name = self.uniform_name(location)?;
        let uniforms = &mut self.current.uniforms;
        match name {
            shader::U_MODEL_MATRIX => uniforms.model = (*value).into(),
            shader::U_MVP_MATRIX => uniforms.mvp = (OPENGL_TO_WGPU_MATRIX * *value).into(),
            shader::U_NORMAL_MATRIX => uniforms.normal = (*value).into(),
            other => {
                return Err(BothyError::Validation(format!("{} is not a mat4", other)));
            }
        }
        Ok(())
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]) -> Result<()> {
        let name = self.uniform_name(location)?;
        let uniforms = &mut self.current.uniforms;
        match name {
            shader::U_LIGHT_COLOR => uniforms.light_color = value,
            shader::U_LIGHT_POSITION => uniforms.light_position = value,
            shader::U_AMBIENT_LIGHT => uniforms.ambient = value,
            other => {
                return Err(BothyError::Validation(format!("{} is not a vec3", other)));
            }
        }
        Ok(())
    }

    fn set_uniform_bool(&mut self, location: UniformLocation, value: bool) -> Result<()> {
        let name = self.uniform_name(location)?;
        let uniforms = &mut self.current.uniforms;
        match name {
            shader::U_IS_LIGHTING => uniforms.is_lighting = value as u32,
            shader::U_USE_TEXTURES => uniforms.use_textures = value as u32,
            other => {
                return Err(BothyError::Validation(format!("{} is not a bool", other)));
            }
        }
        Ok(())
    }

    fn set_uniform_sampler(&mut self, location: UniformLocation, unit: u32) -> Result<()> {
        let name = self.uniform_name(location)?;
        if name != shader::U_SAMPLER {
            return Err(BothyError::Validation(format!("{} is not a sampler", name)));
        }
        if unit != 0 {
            return Err(BothyError::Validation(format!(
                "only texture unit 0 is available, got {}",
                unit
            )));
        }
        Ok(())
    }

    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureHandle> {
        let handle = TextureHandle(self.textures.len() as u32);
        let texture = bind_texture_image(
            &self.device,
            &self.queue,
            &self.texture_layout,
            image,
            &format!("Texture #{}", handle.0),
        );
        self.textures.push(texture);
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<()> {
        if unit != 0 {
            return Err(BothyError::Validation(format!(
                "only texture unit 0 is available, got {}",
                unit
            )));
        }
        if texture.0 as usize >= self.textures.len() {
            return Err(BothyError::ResourceLookup(format!("texture #{}", texture.0)));
        }
        self.current.texture = Some(texture);
        Ok(())
    }

    fn draw_indexed(&mut self, primitive: Primitive, count: u32) -> Result<()> {
        self.record(primitive, count, true)
    }

    fn draw_arrays(&mut self, primitive: Primitive, count: u32) -> Result<()> {
        self.record(primitive, count, false)
    }

    fn finish_frame(&mut self) -> Result<()> {
        let draws = std::mem::take(&mut self.draws);
        self.render(&draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    #[test]
    fn test_uniform_block_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<DrawUniforms>(), UNIFORM_STRIDE);
        assert_eq!(std::mem::offset_of!(DrawUniforms, mvp), 64);
        assert_eq!(std::mem::offset_of!(DrawUniforms, normal), 128);
        assert_eq!(std::mem::offset_of!(DrawUniforms, light_color), 192);
        assert_eq!(std::mem::offset_of!(DrawUniforms, light_position), 208);
        assert_eq!(std::mem::offset_of!(DrawUniforms, ambient), 224);
        assert_eq!(std::mem::offset_of!(DrawUniforms, is_lighting), 236);
        assert_eq!(std::mem::offset_of!(DrawUniforms, use_textures), 240);
    }

    #[test]
    fn test_depth_remap() {
        let near = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z, 0.0);
        assert_eq!(far.z, 1.0);
        assert_ne!(OPENGL_TO_WGPU_MATRIX, Matrix4::identity());
    }

    #[test]
    fn test_disabled_attribute_vertex_count() {
        let draw = RecordedDraw {
            primitive: Primitive::Lines,
            count: 2,
            indexed: false,
            attributes: [Some(vec![0.0; 6]), Some(vec![1.0; 6]), None, None],
            indices: Vec::new(),
            uniforms: DrawUniforms::default(),
            texture: None,
        };
        assert_eq!(draw.vertex_count(), 2);
    }
}
