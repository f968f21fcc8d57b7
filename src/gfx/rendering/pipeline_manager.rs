//! Render pipeline management for the scene program
//!
//! Compiles the WGSL stages under a validation error scope and builds one pipeline per
//! primitive topology. Both pipelines share the bind group layouts and the four
//! single-attribute vertex buffer layouts.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::error::{BothyError, Result};
use crate::gfx::backend::Primitive;

/// Floats per vertex for each attribute slot, in shader location order
pub const ATTRIBUTE_COMPONENTS: [u32; 4] = [3, 3, 3, 2];

const ATTRIBUTE_FORMATS: [[VertexAttribute; 1]; 4] = [
    vertex_attr_array![0 => Float32x3],
    vertex_attr_array![1 => Float32x3],
    vertex_attr_array![2 => Float32x3],
    vertex_attr_array![3 => Float32x2],
];

/// One vertex buffer per attribute, so each can be uploaded or disabled on its own
pub fn vertex_buffer_layouts() -> [VertexBufferLayout<'static>; 4] {
    std::array::from_fn(|slot| VertexBufferLayout {
        array_stride: ATTRIBUTE_COMPONENTS[slot] as BufferAddress
            * std::mem::size_of::<f32>() as BufferAddress,
        step_mode: VertexStepMode::Vertex,
        attributes: &ATTRIBUTE_FORMATS[slot],
    })
}

/// Configuration for creating a render pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth_format: Option<TextureFormat>,
    pub color_format: TextureFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            vertex_shader: "vertex".to_string(),
            fragment_shader: "fragment".to_string(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth_format: None,
            color_format: TextureFormat::Bgra8Unorm,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    /// Sets the vertex and fragment shader modules by name
    pub fn with_shaders(mut self, vertex: &str, fragment: &str) -> Self {
        self.vertex_shader = vertex.to_string();
        self.fragment_shader = fragment.to_string();
        self
    }

    pub fn with_primitive_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.primitive_topology = topology;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }
}

/// Compiled shader modules and the pipelines built from them
pub struct PipelineManager {
    device: Arc<Device>,
    layout: PipelineLayout,
    shader_modules: HashMap<String, ShaderModule>,
    pipelines: HashMap<Primitive, RenderPipeline>,
}

impl PipelineManager {
    /// Creates a manager whose pipelines all use `bind_group_layouts`
    pub fn new(device: Arc<Device>, bind_group_layouts: &[&BindGroupLayout]) -> Self {
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });
        Self {
            device,
            layout,
            shader_modules: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a WGSL module, failing with the validation message if it is invalid
    pub fn load_shader(&mut self, name: &str, source: &str) -> Result<()> {
        self.device.push_error_scope(ErrorFilter::Validation);
        let shader_module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(BothyError::Initialization(format!(
                "shader '{}' failed to compile: {}",
                name, error
            )));
        }

        self.shader_modules.insert(name.to_string(), shader_module);
        Ok(())
    }

    /// Builds and stores the pipeline used for `primitive` draws
    pub fn register_pipeline(&mut self, primitive: Primitive, config: &PipelineConfig) -> Result<()> {
        let pipeline = self.create_pipeline_from_config(config)?;
        log::debug!("Created pipeline '{}'", config.label);
        self.pipelines.insert(primitive, pipeline);
        Ok(())
    }

    pub fn get_pipeline(&self, primitive: Primitive) -> Option<&RenderPipeline> {
        self.pipelines.get(&primitive)
    }

    pub fn has_shader(&self, name: &str) -> bool {
        self.shader_modules.contains_key(name)
    }

    fn shader(&self, name: &str) -> Result<&ShaderModule> {
        self.shader_modules
            .get(name)
            .ok_or_else(|| BothyError::Initialization(format!("shader '{}' not loaded", name)))
    }

    /// Creates a render pipeline from configuration
    fn create_pipeline_from_config(&self, config: &PipelineConfig) -> Result<RenderPipeline> {
        let vertex_module = self.shader(&config.vertex_shader)?;
        let fragment_module = self.shader(&config.fragment_shader)?;
        let vertex_buffers = vertex_buffer_layouts();

        let depth_stencil = config.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        self.device.push_error_scope(ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&self.layout),
                vertex: VertexState {
                    module: vertex_module,
                    entry_point: Some("vs_main"),
                    buffers: &vertex_buffers,
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(FragmentState {
                    module: fragment_module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(ColorTargetState {
                        format: config.color_format,
                        blend: Some(BlendState::REPLACE),
                        write_mask: ColorWrites::ALL,
                    })],
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: PrimitiveState {
                    topology: config.primitive_topology,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(BothyError::Initialization(format!(
                "pipeline '{}' failed to link: {}",
                config.label, error
            )));
        }

        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layouts_follow_attribute_slots() {
        let layouts = vertex_buffer_layouts();
        let strides: Vec<BufferAddress> = layouts.iter().map(|layout| layout.array_stride).collect();
        assert_eq!(strides, vec![12, 12, 12, 8]);
        for (slot, layout) in layouts.iter().enumerate() {
            assert_eq!(layout.attributes[0].shader_location, slot as u32);
        }
    }

    #[test]
    fn test_pipeline_config_builder() {
        let config = PipelineConfig::default()
            .with_label("Lines")
            .with_primitive_topology(PrimitiveTopology::LineList)
            .with_depth_format(TextureFormat::Depth32Float);
        assert_eq!(config.label, "Lines");
        assert_eq!(config.primitive_topology, PrimitiveTopology::LineList);
        assert_eq!(config.depth_format, Some(TextureFormat::Depth32Float));
        assert!(config.cull_mode.is_none());
    }
}
