//! Decoded images and the loaders that fetch them
//!
//! Fetching is the only asynchronous operation in the crate. Loaders return boxed
//! futures so a whole batch can be joined and rejected as a unit.

use std::collections::HashMap;
use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{BothyError, Result};

/// RGBA8 pixels of a decoded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Wrap raw RGBA8 pixels, checking the buffer length against the dimensions
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(BothyError::Validation(format!(
                "{}x{} image needs {} RGBA bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// A 1x1 image of a single color
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: color.to_vec(),
        }
    }

    /// Decode PNG or JPEG bytes
    pub fn decode(bytes: &[u8], uri: &str) -> Result<Self> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| BothyError::texture_load(uri, e))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }
}

/// Source of images for the texture registry
pub trait ImageLoader {
    /// Fetch and decode the image identified by `uri`
    fn load_image<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<TextureImage>>;
}

/// Loads images from the filesystem, resolving identifiers against a root directory.
///
/// Reads are blocking, so a joined batch reads its files one after another.
#[derive(Debug, Clone, Default)]
pub struct FileImageLoader {
    root: PathBuf,
}

impl FileImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageLoader for FileImageLoader {
    fn load_image<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<TextureImage>> {
        async move {
            let path = self.root.join(uri);
            log::debug!("Reading texture image {}", path.display());

            let bytes = std::fs::read(&path).map_err(|e| BothyError::texture_load(uri, e))?;
            TextureImage::decode(&bytes, uri)
        }
        .boxed()
    }
}

/// Serves images that are already decoded in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, TextureImage>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: &str, image: TextureImage) {
        self.images.insert(uri.to_string(), image);
    }

    pub fn with_image(mut self, uri: &str, image: TextureImage) -> Self {
        self.insert(uri, image);
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load_image<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<TextureImage>> {
        let image = self
            .images
            .get(uri)
            .cloned()
            .ok_or_else(|| BothyError::texture_load(uri, "no such image"));
        futures::future::ready(image).boxed()
    }
}
