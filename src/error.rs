//! # Error Types
//!
//! Every failure in bothy is fatal for the call that hit it: nothing is retried and
//! nothing falls back to a degraded render.
//!
//! - [`BothyError::Initialization`] - context, surface, device or shader creation failed
//! - [`BothyError::Binding`] - a named attribute or uniform is missing from the program
//! - [`BothyError::Validation`] - malformed construction input
//! - [`BothyError::ResourceLookup`] - a texture was drawn before it was loaded
//!
//! All public APIs return [`Result<T>`].

use thiserror::Error;

/// The main error type for the bothy scene graph.
#[derive(Error, Debug)]
pub enum BothyError {
    /// Graphics context, surface, device, buffer or shader creation failed.
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// A named attribute or uniform is absent from the compiled program.
    #[error("Shader binding '{name}' not found in program")]
    Binding { name: String },

    /// Construction input is malformed (wrong vector length, zero step count, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A texture identifier was requested but never loaded.
    #[error("Texture '{0}' has not been loaded")]
    ResourceLookup(String),

    /// Fetching or decoding an image for a texture failed.
    #[error("Failed to load texture '{uri}': {reason}")]
    TextureLoad { uri: String, reason: String },

    /// A symbolic node identifier is not present in the identifier table.
    #[error("Unknown node identifier '{0}'")]
    UnknownIdentifier(String),

    /// An animation is already running; overlapping animations are not allowed.
    #[error("An animation is already running")]
    AnimationBusy,

    /// The presentation surface could not provide a frame.
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl BothyError {
    pub(crate) fn binding(name: &str) -> Self {
        Self::Binding {
            name: name.to_string(),
        }
    }

    pub(crate) fn texture_load(uri: &str, reason: impl ToString) -> Self {
        Self::TextureLoad {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BothyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_item() {
        assert_eq!(
            BothyError::binding("u_Sampler").to_string(),
            "Shader binding 'u_Sampler' not found in program"
        );
        assert_eq!(
            BothyError::ResourceLookup("res/window.jpg".into()).to_string(),
            "Texture 'res/window.jpg' has not been loaded"
        );
        assert!(BothyError::texture_load("a.png", "no such file")
            .to_string()
            .contains("a.png"));
    }
}
