// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The wgpu implementation of the graphics backend: surface and device setup, the
//! scene program's pipelines, and frame replay.

pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::{DrawUniforms, RenderEngine, OPENGL_TO_WGPU_MATRIX};
