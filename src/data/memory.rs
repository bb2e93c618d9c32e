//! In-memory source container.
//!
//! `MemSource` implements [`SourceContainer`] over plain collections. It is
//! the only backend that produces reference-typed datasets (the netcdf
//! backend has no reference types to expose) and doubles as the fixture
//! container for tests.

use std::collections::HashMap;
use std::ops::Range;

use super::source::{
    normalize_path, region_of, AttrValue, ChildKind, RawDataset, RawValues, SourceContainer,
};
use crate::error::{Result, StratusError};

/// An in-memory dataset.
#[derive(Debug, Clone)]
pub struct MemDataset {
    shape: Vec<usize>,
    dim_names: Option<Vec<String>>,
    values: RawValues,
    attributes: HashMap<String, AttrValue>,
    unreadable: bool,
}

impl MemDataset {
    fn new(shape: Vec<usize>, values: RawValues) -> Self {
        Self {
            shape,
            dim_names: None,
            values,
            attributes: HashMap::new(),
            unreadable: false,
        }
    }

    /// Floating-point dataset.
    pub fn floats(shape: &[usize], values: Vec<f64>) -> Self {
        Self::new(shape.to_vec(), RawValues::Float(values))
    }

    /// Integer dataset.
    pub fn ints(shape: &[usize], values: Vec<i64>) -> Self {
        Self::new(shape.to_vec(), RawValues::Int(values))
    }

    /// Boolean dataset.
    pub fn bools(shape: &[usize], values: Vec<bool>) -> Self {
        Self::new(shape.to_vec(), RawValues::Bool(values))
    }

    /// Text dataset.
    pub fn text(shape: &[usize], values: Vec<String>) -> Self {
        Self::new(shape.to_vec(), RawValues::Text(values))
    }

    /// Reference dataset.
    pub fn refs(shape: &[usize], values: Vec<super::RefValue>) -> Self {
        Self::new(shape.to_vec(), RawValues::Refs(values))
    }

    /// Declare explicit dimension names.
    pub fn with_dims(mut self, names: &[&str]) -> Self {
        self.dim_names = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Attach an attribute.
    pub fn with_attr(mut self, name: &str, value: AttrValue) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    /// Mark the dataset as unreadable; reads fail, siblings must survive.
    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }
}

/// An in-memory group holding named datasets and subgroups in insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct MemGroup {
    datasets: Vec<(String, MemDataset)>,
    groups: Vec<(String, MemGroup)>,
}

impl MemGroup {
    /// Empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset (builder style).
    pub fn dataset(mut self, name: &str, dataset: MemDataset) -> Self {
        self.datasets.push((name.to_string(), dataset));
        self
    }

    /// Add a subgroup (builder style).
    pub fn group(mut self, name: &str, group: MemGroup) -> Self {
        self.groups.push((name.to_string(), group));
        self
    }

    fn child_group(&self, name: &str) -> Option<&MemGroup> {
        self.groups.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }

    fn child_dataset(&self, name: &str) -> Option<&MemDataset> {
        self.datasets.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }
}

enum Found<'a> {
    Group(&'a MemGroup),
    Dataset(&'a MemDataset),
}

/// In-memory [`SourceContainer`] implementation.
#[derive(Debug, Clone)]
pub struct MemSource {
    root: MemGroup,
}

impl MemSource {
    /// Wrap a root group as an open container.
    pub fn new(root: MemGroup) -> Self {
        Self { root }
    }

    fn find(&self, path: &str) -> Option<Found<'_>> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Some(Found::Group(&self.root));
        }
        let mut group = &self.root;
        let mut parts = path.split('/').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                if let Some(d) = group.child_dataset(part) {
                    return Some(Found::Dataset(d));
                }
                return group.child_group(part).map(Found::Group);
            }
            group = group.child_group(part)?;
        }
        None
    }

    fn dataset(&self, path: &str) -> Result<&MemDataset> {
        match self.find(path) {
            Some(Found::Dataset(d)) => {
                if d.unreadable {
                    Err(StratusError::Source(format!(
                        "unreadable dataset: {}",
                        path
                    )))
                } else {
                    Ok(d)
                }
            }
            _ => Err(StratusError::Source(format!("no such dataset: {}", path))),
        }
    }
}

impl SourceContainer for MemSource {
    fn list_children(&self, group_path: &str) -> Result<Vec<(String, ChildKind)>> {
        let group = match self.find(group_path) {
            Some(Found::Group(g)) => g,
            _ => {
                return Err(StratusError::Source(format!(
                    "no such group: {}",
                    group_path
                )))
            }
        };
        let mut children = Vec::with_capacity(group.datasets.len() + group.groups.len());
        for (name, _) in &group.datasets {
            children.push((name.clone(), ChildKind::Dataset));
        }
        for (name, _) in &group.groups {
            children.push((name.clone(), ChildKind::Group));
        }
        Ok(children)
    }

    fn read_dataset(&self, path: &str) -> Result<RawDataset> {
        let d = self.dataset(path)?;
        Ok(RawDataset {
            shape: d.shape.clone(),
            dim_names: d.dim_names.clone(),
            values: d.values.clone(),
        })
    }

    fn read_attributes(&self, path: &str) -> Result<HashMap<String, AttrValue>> {
        Ok(self.dataset(path)?.attributes.clone())
    }

    fn child_kind(&self, path: &str) -> Option<ChildKind> {
        match self.find(path)? {
            Found::Dataset(_) => Some(ChildKind::Dataset),
            Found::Group(_) => Some(ChildKind::Group),
        }
    }

    fn read_region(&self, path: &str, ranges: &[Range<usize>]) -> Result<RawDataset> {
        let d = self.dataset(path)?;
        let full = RawDataset {
            shape: d.shape.clone(),
            dim_names: d.dim_names.clone(),
            values: d.values.clone(),
        };
        region_of(&full, ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemSource {
        MemSource::new(
            MemGroup::new()
                .dataset("grid", MemDataset::floats(&[2, 3], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]))
                .group("obs", MemGroup::new().dataset("t", MemDataset::ints(&[2], vec![7, 8]))),
        )
    }

    #[test]
    fn lists_children_in_order() {
        let src = sample();
        let children = src.list_children("").unwrap();
        assert_eq!(
            children,
            vec![
                ("grid".to_string(), ChildKind::Dataset),
                ("obs".to_string(), ChildKind::Group),
            ]
        );
    }

    #[test]
    fn resolves_nested_paths() {
        let src = sample();
        assert_eq!(src.child_kind("obs/t"), Some(ChildKind::Dataset));
        assert_eq!(src.child_kind("obs"), Some(ChildKind::Group));
        assert_eq!(src.child_kind("missing"), None);
    }

    #[test]
    fn region_read_selects_sub_block() {
        let src = sample();
        let region = src.read_region("grid", &[0..2, 1..3]).unwrap();
        assert_eq!(region.shape, vec![2, 2]);
        assert_eq!(region.values, RawValues::Float(vec![1.0, 2.0, 4.0, 5.0]));
    }

    #[test]
    fn region_read_rejects_out_of_bounds() {
        let src = sample();
        assert!(src.read_region("grid", &[0..2, 1..4]).is_err());
        assert!(src.read_region("grid", &[0..2]).is_err());
    }

    #[test]
    fn unreadable_dataset_fails_reads() {
        let src = MemSource::new(
            MemGroup::new().dataset("bad", MemDataset::floats(&[1], vec![0.0]).unreadable()),
        );
        assert!(src.read_dataset("bad").is_err());
        // Still visible in the listing; only reads fail.
        assert_eq!(src.child_kind("bad"), Some(ChildKind::Dataset));
    }
}
