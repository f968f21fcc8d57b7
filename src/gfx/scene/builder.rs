//! Declarative scene construction
//!
//! [`ShapeBuilder`] describes a shape tree from literal data. Finalizing it validates
//! every node, materializes the owned [`Shape`] tree and records each named node's
//! [`NodePath`] in an [`IdTable`]. Paths address the nodes the scene actually owns,
//! so mutating through a path changes what the next draw shows.
//!
//! ```
//! use bothy::gfx::scene::{build_roots, ShapeBuilder};
//!
//! let (roots, ids) = build_roots([ShapeBuilder::pivot(&[0.0, 0.0, 0.0])
//!     .id("house")
//!     .child(ShapeBuilder::cube(&[0.0, 1.0, 0.0], &[4.0, 2.0, 4.0], &[0.8, 0.8, 0.8]).id("walls"))])
//! .unwrap();
//!
//! assert_eq!(roots.len(), 1);
//! assert_eq!(ids.path("walls").unwrap().indices(), &[0]);
//! ```

use std::collections::HashMap;

use crate::error::{BothyError, Result};

use super::shape::{Shape, ShapeKind};

/// Location of a node: a root index followed by child indices
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    root: usize,
    indices: Vec<usize>,
}

impl NodePath {
    pub fn root(root: usize) -> Self {
        Self {
            root,
            indices: Vec::new(),
        }
    }

    /// Path of this node's `index`-th child
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self {
            root: self.root,
            indices,
        }
    }

    pub fn root_index(&self) -> usize {
        self.root
    }

    /// Child indices below the root
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Same path with the root index shifted by `offset`
    pub fn offset(&self, offset: usize) -> Self {
        Self {
            root: self.root + offset,
            indices: self.indices.clone(),
        }
    }
}

/// Symbolic name to node path mapping produced by finalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdTable {
    paths: HashMap<String, NodePath>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name. Each name may be used once per table.
    pub fn insert(&mut self, name: &str, path: NodePath) -> Result<()> {
        if self.paths.contains_key(name) {
            return Err(BothyError::Validation(format!(
                "identifier '{}' is assigned to more than one node",
                name
            )));
        }
        log::debug!("Registered node '{}' at {:?}", name, path);
        self.paths.insert(name.to_string(), path);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NodePath> {
        self.paths.get(name)
    }

    pub fn path(&self, name: &str) -> Result<&NodePath> {
        self.get(name)
            .ok_or_else(|| BothyError::UnknownIdentifier(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Shift every root index by `offset`
    pub fn offset(self, offset: usize) -> Self {
        Self {
            paths: self
                .paths
                .into_iter()
                .map(|(name, path)| (name, path.offset(offset)))
                .collect(),
        }
    }
}

/// Builder for one shape and its declared children
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
    kind: ShapeKind,
    position: Vec<f32>,
    size: Vec<f32>,
    color: Vec<f32>,
    rotation: [f32; 3],
    texture: Option<(String, f32, f32)>,
    children: Vec<ShapeBuilder>,
    id: Option<String>,
}

impl ShapeBuilder {
    pub fn new(kind: ShapeKind, position: &[f32], size: &[f32], color: &[f32]) -> Self {
        Self {
            kind,
            position: position.to_vec(),
            size: size.to_vec(),
            color: color.to_vec(),
            rotation: [0.0; 3],
            texture: None,
            children: Vec::new(),
            id: None,
        }
    }

    pub fn cube(position: &[f32], size: &[f32], color: &[f32]) -> Self {
        Self::new(ShapeKind::Box, position, size, color)
    }

    pub fn prism(position: &[f32], size: &[f32], color: &[f32]) -> Self {
        Self::new(ShapeKind::Prism, position, size, color)
    }

    /// Grouping node without geometry, e.g. a hinge for a door
    pub fn pivot(position: &[f32]) -> Self {
        Self::new(ShapeKind::Pivot, position, &[1.0; 3], &[1.0; 3])
    }

    pub fn rotate(mut self, dx: f32, dy: f32, dz: f32) -> Self {
        self.rotation[0] += dx;
        self.rotation[1] += dy;
        self.rotation[2] += dz;
        self
    }

    pub fn texture(mut self, id: &str, mul_u: f32, mul_v: f32) -> Self {
        self.texture = Some((id.to_string(), mul_u, mul_v));
        self
    }

    pub fn texture_uniform(self, id: &str, mul: f32) -> Self {
        self.texture(id, mul, mul)
    }

    /// Replace the declared children
    pub fn children(mut self, children: impl IntoIterator<Item = ShapeBuilder>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn child(mut self, child: ShapeBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Name this node in the identifier table
    pub fn id(mut self, name: &str) -> Self {
        self.id = Some(name.to_string());
        self
    }

    /// Materialize this node, then each child in declaration order.
    ///
    /// `path` is where the returned node will live once attached.
    pub fn finalize(self, table: &mut IdTable, path: NodePath) -> Result<Shape> {
        let mut shape = Shape::new(self.kind, &self.position, &self.size, &self.color)?;
        let [dx, dy, dz] = self.rotation;
        shape.rotate(dx, dy, dz);
        if let Some((id, mul_u, mul_v)) = &self.texture {
            shape.set_texture(id, *mul_u, *mul_v);
        }

        if let Some(name) = &self.id {
            table.insert(name, path.clone())?;
        }

        for (index, child) in self.children.into_iter().enumerate() {
            let node = child.finalize(table, path.child(index))?;
            shape.add_child(node);
        }
        Ok(shape)
    }
}

/// Finalize a list of root builders into owned trees and their identifier table
pub fn build_roots(
    builders: impl IntoIterator<Item = ShapeBuilder>,
) -> Result<(Vec<Shape>, IdTable)> {
    let mut table = IdTable::new();
    let roots = builders
        .into_iter()
        .enumerate()
        .map(|(index, builder)| builder.finalize(&mut table, NodePath::root(index)))
        .collect::<Result<Vec<_>>>()?;
    Ok((roots, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn house() -> ShapeBuilder {
        ShapeBuilder::pivot(&[0.0, 0.0, 0.0]).id("house").children([
            ShapeBuilder::cube(&[0.0, 1.0, 0.0], &[4.0, 2.0, 4.0], &[0.8, 0.8, 0.8])
                .texture_uniform("res/redbrick.jpg", 2.0)
                .child(
                    ShapeBuilder::pivot(&[-0.5, -0.5, 2.0])
                        .id("hinge")
                        .child(ShapeBuilder::cube(&[0.5, 0.0, 0.0], &[1.0, 1.5, 0.1], &[0.4, 0.2, 0.1]).id("door")),
                ),
            ShapeBuilder::prism(&[0.0, 2.5, 0.0], &[4.0, 1.0, 4.0], &[0.6, 0.1, 0.1])
                .rotate(0.0, 370.0, 0.0)
                .id("roof"),
        ])
    }

    #[test]
    fn test_finalize_records_paths() {
        let (roots, ids) = build_roots([house()]).unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids.path("house").unwrap(), &NodePath::root(0));
        assert_eq!(ids.path("door").unwrap().indices(), &[0, 0, 0]);
        assert_eq!(ids.path("roof").unwrap().indices(), &[1]);

        let roof = roots[0].descendant(ids.path("roof").unwrap().indices()).unwrap();
        assert_eq!(roof.kind(), ShapeKind::Prism);
        assert_eq!(roof.rotation(), Vector3::new(0.0, 10.0, 0.0));

        let walls = &roots[0].children()[0];
        assert_eq!(walls.texture().map(|t| t.mul_v), Some(2.0));
        assert_eq!(roots[0].node_count(), 5);
    }

    #[test]
    fn test_children_attach_in_declaration_order() {
        let (roots, _) = build_roots([ShapeBuilder::pivot(&[0.0; 3]).children(
            (0..4).map(|i| ShapeBuilder::cube(&[i as f32, 0.0, 0.0], &[1.0; 3], &[1.0; 3])),
        )])
        .unwrap();
        let xs: Vec<f32> = roots[0].children().iter().map(|c| c.position().x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_invalid_child_fails_whole_build() {
        let result = build_roots([ShapeBuilder::pivot(&[0.0; 3])
            .child(ShapeBuilder::cube(&[0.0, 0.0], &[1.0; 3], &[1.0; 3]))]);
        assert!(matches!(result, Err(BothyError::Validation(_))));
    }

    #[test]
    fn test_duplicate_identifier_is_rejected() {
        let result = build_roots([
            ShapeBuilder::cube(&[0.0; 3], &[1.0; 3], &[1.0; 3]).id("wall"),
            ShapeBuilder::cube(&[1.0, 0.0, 0.0], &[1.0; 3], &[1.0; 3]).id("wall"),
        ]);
        assert!(matches!(result, Err(BothyError::Validation(message)) if message.contains("wall")));
    }

    #[test]
    fn test_unknown_identifier() {
        let (_, ids) = build_roots([house()]).unwrap();
        assert!(ids.get("chimney").is_none());
        assert!(matches!(ids.path("chimney"), Err(BothyError::UnknownIdentifier(name)) if name == "chimney"));
    }

    #[test]
    fn test_offset_shifts_roots_only() {
        let (_, ids) = build_roots([house()]).unwrap();
        let shifted = ids.offset(3);
        let door = shifted.path("door").unwrap();
        assert_eq!(door.root_index(), 3);
        assert_eq!(door.indices(), &[0, 0, 0]);
        assert_eq!(door.depth(), 3);
    }
}
