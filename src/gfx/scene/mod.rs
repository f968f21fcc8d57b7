//! # Scene Graph Module
//!
//! Owned shape trees, the scene that draws them, and the declarative builder that
//! constructs them from literal data.
//!
//! ## Key Components
//!
//! - [`Scene`] - camera, light, textures and roots, drawn through a [`GraphicsBackend`](crate::gfx::backend::GraphicsBackend)
//! - [`Shape`] - a node with position, size, rotation, color, optional texture and children
//! - [`ShapeBuilder`] - chainable construction with symbolic identifiers
//! - [`IdTable`] / [`NodePath`] - name to live-node lookup after building
//! - [`AxisHelper`] - unlit debugging axes
//!
//! ## Usage
//!
//! ```
//! use bothy::config::SceneConfig;
//! use bothy::gfx::backend::RecordingBackend;
//! use bothy::gfx::scene::{Scene, ShapeBuilder};
//!
//! let mut scene = Scene::new(RecordingBackend::new(), (800, 600), SceneConfig::default()).unwrap();
//! let ids = scene
//!     .add_built([ShapeBuilder::cube(&[0.0, 0.0, 0.0], &[2.0, 1.0, 1.0], &[0.8, 0.2, 0.2]).id("block")])
//!     .unwrap();
//!
//! scene.node_by_id_mut(&ids, "block").unwrap().rotate(0.0, 45.0, 0.0);
//! scene.draw().unwrap();
//! assert_eq!(scene.backend().draw_calls().count(), 1);
//! ```

pub mod axis;
pub mod builder;
pub mod scene;
pub mod shape;

// Re-export main types
pub use axis::AxisHelper;
pub use builder::{build_roots, IdTable, NodePath, ShapeBuilder};
pub use scene::{Scene, SceneNode, SceneRenderer};
pub use shape::{Shape, ShapeKind, ShapeTexture};
