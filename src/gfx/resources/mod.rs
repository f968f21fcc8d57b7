// src/gfx/resources/mod.rs
//! Texture resources
//!
//! Image decoding and loading, the texture registry, and wgpu texture creation.

pub mod image_loader;
pub mod texture_registry;
pub mod texture_resource;

// Re-export main types
pub use image_loader::{FileImageLoader, ImageLoader, MemoryImageLoader, TextureImage};
pub use texture_registry::{TextureEntry, TextureRegistry};
pub use texture_resource::TextureResource;
