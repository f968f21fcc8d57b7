//! Texture registry
//!
//! Maps logical texture identifiers to uploaded texture handles. The registry is
//! filled by one batch load before the first draw; every lookup after that is
//! synchronous and an unknown identifier is an error, never an untextured fallback.

use std::collections::HashMap;

use crate::error::{BothyError, Result};
use crate::gfx::backend::{GraphicsBackend, TextureHandle};

use super::image_loader::{ImageLoader, TextureImage};

/// An uploaded texture together with the image it was created from
#[derive(Debug, Clone)]
pub struct TextureEntry {
    pub handle: TextureHandle,
    pub image: TextureImage,
}

#[derive(Debug, Default)]
pub struct TextureRegistry {
    entries: HashMap<String, TextureEntry>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every identifier as one joined batch, then upload and register them.
    ///
    /// The batch is all-or-nothing: if any image fails to load or upload, nothing
    /// from this batch is registered and the error is returned. Identifiers that
    /// are already registered are skipped.
    ///
    /// Uploads only start once every image has been fetched. If an upload fails
    /// partway, the handles the backend already created stay allocated there but
    /// are unreachable through the registry.
    pub async fn load_all<L, B>(&mut self, ids: &[&str], loader: &L, backend: &mut B) -> Result<()>
    where
        L: ImageLoader + ?Sized,
        B: GraphicsBackend + ?Sized,
    {
        let mut pending: Vec<&str> = Vec::new();
        for &id in ids {
            if !self.entries.contains_key(id) && !pending.contains(&id) {
                pending.push(id);
            }
        }

        let images =
            futures::future::try_join_all(pending.iter().map(|id| loader.load_image(id))).await?;

        let mut staged = Vec::with_capacity(images.len());
        for (id, image) in pending.iter().zip(images) {
            let handle = backend.upload_texture(&image)?;
            log::debug!(
                "Uploaded texture '{}' ({}x{}) as {:?}",
                id,
                image.width,
                image.height,
                handle
            );
            staged.push((id.to_string(), TextureEntry { handle, image }));
        }

        self.entries.extend(staged);
        Ok(())
    }

    /// Register an image that is already uploaded
    pub fn insert(&mut self, id: &str, handle: TextureHandle, image: TextureImage) {
        self.entries
            .insert(id.to_string(), TextureEntry { handle, image });
    }

    /// Handle of a loaded texture
    pub fn get(&self, id: &str) -> Result<TextureHandle> {
        self.entries
            .get(id)
            .map(|entry| entry.handle)
            .ok_or_else(|| BothyError::ResourceLookup(id.to_string()))
    }

    /// Source image retained for a loaded texture
    pub fn image(&self, id: &str) -> Option<&TextureImage> {
        self.entries.get(id).map(|entry| &entry.image)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::{Command, RecordingBackend};
    use crate::gfx::resources::MemoryImageLoader;

    fn loader() -> MemoryImageLoader {
        MemoryImageLoader::new()
            .with_image("res/redbrick.jpg", TextureImage::solid([180, 60, 40, 255]))
            .with_image("res/window.jpg", TextureImage::solid([90, 90, 120, 255]))
    }

    #[test]
    fn test_unloaded_lookup_fails() {
        let registry = TextureRegistry::new();
        assert!(matches!(
            registry.get("res/redbrick.jpg"),
            Err(BothyError::ResourceLookup(id)) if id == "res/redbrick.jpg"
        ));
    }

    #[test]
    fn test_loaded_handle_is_stable() {
        let mut registry = TextureRegistry::new();
        let mut backend = RecordingBackend::new();
        pollster::block_on(registry.load_all(
            &["res/redbrick.jpg", "res/window.jpg"],
            &loader(),
            &mut backend,
        ))
        .unwrap();

        let first = registry.get("res/window.jpg").unwrap();
        assert_eq!(registry.get("res/window.jpg").unwrap(), first);
        assert_ne!(registry.get("res/redbrick.jpg").unwrap(), first);
        assert_eq!(registry.image("res/window.jpg").unwrap().rgba, vec![90, 90, 120, 255]);
    }

    #[test]
    fn test_duplicates_and_reloads_upload_once() {
        let mut registry = TextureRegistry::new();
        let mut backend = RecordingBackend::new();
        let loader = loader();

        pollster::block_on(registry.load_all(
            &["res/window.jpg", "res/window.jpg"],
            &loader,
            &mut backend,
        ))
        .unwrap();
        pollster::block_on(registry.load_all(&["res/window.jpg"], &loader, &mut backend)).unwrap();

        let uploads = backend
            .commands()
            .iter()
            .filter(|command| matches!(command, Command::UploadTexture { .. }))
            .count();
        assert_eq!(uploads, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_batch_registers_nothing() {
        let mut registry = TextureRegistry::new();
        let mut backend = RecordingBackend::new();

        let result = pollster::block_on(registry.load_all(
            &["res/redbrick.jpg", "res/missing.jpg"],
            &loader(),
            &mut backend,
        ));

        assert!(matches!(result, Err(BothyError::TextureLoad { uri, .. }) if uri == "res/missing.jpg"));
        assert!(registry.is_empty());
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_failed_upload_registers_nothing() {
        let mut registry = TextureRegistry::new();
        let mut backend = RecordingBackend::new().with_texture_limit(1);

        let result = pollster::block_on(registry.load_all(
            &["res/redbrick.jpg", "res/window.jpg"],
            &loader(),
            &mut backend,
        ));

        assert!(matches!(result, Err(BothyError::Initialization(_))));
        assert!(registry.is_empty());
        assert!(registry.get("res/redbrick.jpg").is_err());
        let uploads = backend
            .commands()
            .iter()
            .filter(|command| matches!(command, Command::UploadTexture { .. }))
            .count();
        assert_eq!(uploads, 1);
    }
}
