//! Normalized data model: arrays and tree nodes.
//!
//! Both types are built once during ingestion and read-only afterwards;
//! the browsing shell only traverses them.

use std::collections::HashMap;

use super::source::AttrValue;
use super::{ElementKind, TypedBuffer};
use crate::error::{Result, StratusError};

/// A named N-dimensional variable with resolved data.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    name: String,
    dim_names: Vec<String>,
    buffer: TypedBuffer,
    attributes: HashMap<String, AttrValue>,
    is_coord: bool,
}

impl Array {
    pub(crate) fn new(
        name: String,
        dim_names: Vec<String>,
        buffer: TypedBuffer,
        attributes: HashMap<String, AttrValue>,
        is_coord: bool,
    ) -> Self {
        debug_assert_eq!(dim_names.len(), buffer.rank());
        Self {
            name,
            dim_names,
            buffer,
            attributes,
            is_coord,
        }
    }

    /// Array name, unique within its owning node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered dimension names; length equals the buffer rank.
    pub fn dim_names(&self) -> &[String] {
        &self.dim_names
    }

    /// The underlying typed buffer.
    pub fn buffer(&self) -> &TypedBuffer {
        &self.buffer
    }

    /// Attribute mapping.
    pub fn attributes(&self) -> &HashMap<String, AttrValue> {
        &self.attributes
    }

    /// Whether this array is a coordinate candidate for its dimension.
    pub fn is_coord(&self) -> bool {
        self.is_coord
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.buffer.rank()
    }

    /// Ordered dimension extents.
    pub fn shape(&self) -> &[usize] {
        self.buffer.shape()
    }

    /// Extent of dimension `dim`, if in range.
    pub fn extent(&self, dim: usize) -> Option<usize> {
        self.shape().get(dim).copied()
    }

    /// Element kind.
    pub fn kind(&self) -> ElementKind {
        self.buffer.kind()
    }
}

/// A node in the normalized dataset tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    name: String,
    path: String,
    arrays: Vec<Array>,
    dims: HashMap<String, usize>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    pub(crate) fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            arrays: Vec::new(),
            dims: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn push_array(&mut self, array: Array) {
        self.arrays.push(array);
    }

    pub(crate) fn push_child(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    /// Recompute the dims mapping from this node's own arrays.
    pub(crate) fn rebuild_dims(&mut self) {
        self.dims.clear();
        for array in &self.arrays {
            for (name, &extent) in array.dim_names().iter().zip(array.shape()) {
                self.dims.insert(name.clone(), extent);
            }
        }
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slash-separated path from the ingestion root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All arrays in container order.
    pub fn arrays(&self) -> &[Array] {
        &self.arrays
    }

    /// Arrays not flagged as coordinates.
    pub fn data_arrays(&self) -> impl Iterator<Item = &Array> {
        self.arrays.iter().filter(|a| !a.is_coord())
    }

    /// Arrays flagged as coordinate candidates.
    pub fn coord_arrays(&self) -> impl Iterator<Item = &Array> {
        self.arrays.iter().filter(|a| a.is_coord())
    }

    /// Fetch an array by name.
    pub fn array(&self, name: &str) -> Option<&Array> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    /// Dimension name to extent, derived from this node's own arrays.
    pub fn dims(&self) -> &HashMap<String, usize> {
        &self.dims
    }

    /// Child nodes in container order.
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Fetch a child by name.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.name() == name)
    }

    /// Names of the immediate children.
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name()).collect()
    }

    /// Whether the node holds neither arrays nor children.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty() && self.children.is_empty()
    }

    /// Descend a slash-separated path of child names.
    pub fn subtree(&self, path: &str) -> Option<&TreeNode> {
        let mut node = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            node = node.child(part)?;
        }
        Some(node)
    }

    /// Consume the tree, returning the subtree at `path`.
    pub fn into_subtree(self, path: &str) -> Result<TreeNode> {
        let requested = path.to_string();
        let mut node = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            match node.children.iter().position(|c| c.name() == part) {
                Some(i) => node = node.children.swap_remove(i),
                None => return Err(StratusError::group_not_found(requested)),
            }
        }
        Ok(node)
    }

    /// Coordinate array for a dimension name, if one exists.
    ///
    /// Candidates are rank-1 coordinate arrays whose single dimension name
    /// matches; one whose own name also matches wins.
    pub fn coord_for(&self, dim: &str) -> Option<&Array> {
        let mut fallback = None;
        for array in self.coord_arrays() {
            if array.dim_names().first().map(String::as_str) != Some(dim) {
                continue;
            }
            if array.name() == dim {
                return Some(array);
            }
            fallback.get_or_insert(array);
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn coord(name: &str, dim: &str, values: Vec<f64>) -> Array {
        let n = values.len();
        Array::new(
            name.to_string(),
            vec![dim.to_string()],
            TypedBuffer::Float(ArrayD::from_shape_vec(IxDyn(&[n]), values).unwrap()),
            HashMap::new(),
            true,
        )
    }

    fn tree() -> TreeNode {
        let mut leaf = TreeNode::new("inner", "outer/inner");
        leaf.push_array(coord("x", "x", vec![0.0, 1.0]));
        leaf.rebuild_dims();

        let mut mid = TreeNode::new("outer", "outer");
        mid.push_child(leaf);

        let mut root = TreeNode::new("root", "");
        root.push_child(mid);
        root
    }

    #[test]
    fn subtree_descends_paths() {
        let root = tree();
        assert!(root.subtree("outer/inner").is_some());
        assert!(root.subtree("/outer/inner/").is_some());
        assert!(root.subtree("outer/nope").is_none());
    }

    #[test]
    fn into_subtree_reports_missing_groups() {
        let err = tree().into_subtree("outer/nope").unwrap_err();
        assert!(err.to_string().contains("outer/nope"));
    }

    #[test]
    fn dims_come_from_own_arrays_only() {
        let root = tree();
        assert!(root.dims().is_empty());
        let inner = root.subtree("outer/inner").unwrap();
        assert_eq!(inner.dims().get("x"), Some(&2));
    }

    #[test]
    fn coord_lookup_prefers_name_match() {
        let mut node = TreeNode::new("n", "n");
        node.push_array(coord("elevation", "time", vec![1.0]));
        node.push_array(coord("time", "time", vec![2.0]));
        node.rebuild_dims();
        assert_eq!(node.coord_for("time").unwrap().name(), "time");
        assert!(node.coord_for("depth").is_none());
    }
}
