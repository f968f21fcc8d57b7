//! # Graphics Module
//!
//! Everything between a shape tree and the GPU.
//!
//! ## Architecture Overview
//!
//! - **Backend** ([`backend`]) - the narrow upload/draw interface a scene talks to
//! - **Geometry** ([`geometry`]) - the unit box, prism and axis line data
//! - **Shader** ([`shader`]) - the scene program and the names it declares
//! - **Rendering** ([`rendering`]) - the wgpu implementation of the backend
//! - **Resources** ([`resources`]) - image loading and the texture registry
//! - **Scene** ([`scene`]) - shape trees, the builder and the scene itself
//!
//! ## Usage
//!
//! ```no_run
//! use bothy::gfx::{RenderEngine, scene::Scene};
//!
//! // The render engine is created by BothyApp once the window exists
//! // let engine = RenderEngine::new(window, width, height, true).await?;
//! // let scene = Scene::new(engine, (width, height), SceneConfig::default())?;
//! ```

pub mod backend;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod shader;

// Re-export commonly used types
pub use rendering::render_engine::RenderEngine;
