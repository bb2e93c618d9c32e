//! Source container abstraction.
//!
//! A [`SourceContainer`] is an open handle on a hierarchical binary file:
//! groups holding named datasets and subgroups, where dataset elements may
//! be indirect references into the same container. The handle is acquired
//! once per ingestion pass and every dereference goes through it.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use super::ElementKind;
use crate::error::Result;

/// Kind of an immediate child within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// A leaf dataset.
    Dataset,
    /// A nested group.
    Group,
}

/// A scalar or text attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Integer attribute.
    Int(i64),
    /// Floating-point attribute.
    Float(f64),
    /// Text attribute.
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// A raw reference element as stored in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum RefValue {
    /// Reference to a whole object (dataset or group) by container path.
    Object(String),
    /// Reference to a sliced region of a dataset.
    Region {
        /// Container path of the referenced dataset.
        path: String,
        /// Half-open index ranges, one per dimension of the target.
        ranges: Vec<Range<usize>>,
    },
    /// A null reference slot.
    Null,
}

/// Raw element storage for one dataset, in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValues {
    /// Integer elements.
    Int(Vec<i64>),
    /// Floating-point elements.
    Float(Vec<f64>),
    /// Boolean elements.
    Bool(Vec<bool>),
    /// Text elements.
    Text(Vec<String>),
    /// Reference elements, to be resolved before entering the model.
    Refs(Vec<RefValue>),
}

impl RawValues {
    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            RawValues::Int(v) => v.len(),
            RawValues::Float(v) => v.len(),
            RawValues::Bool(v) => v.len(),
            RawValues::Text(v) => v.len(),
            RawValues::Refs(v) => v.len(),
        }
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared element kind.
    pub fn kind(&self) -> ElementKind {
        match self {
            RawValues::Int(_) => ElementKind::Int,
            RawValues::Float(_) => ElementKind::Float,
            RawValues::Bool(_) => ElementKind::Bool,
            RawValues::Text(_) => ElementKind::Text,
            RawValues::Refs(_) => ElementKind::Reference,
        }
    }
}

/// A dataset as read from the container: shape, element kind, data, and the
/// format-declared dimension names when the format has them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataset {
    /// Ordered dimension extents.
    pub shape: Vec<usize>,
    /// Dimension names declared by the format, if any.
    pub dim_names: Option<Vec<String>>,
    /// Element storage.
    pub values: RawValues,
}

/// An open hierarchical container.
///
/// Paths are slash-separated and rooted at the container root; the empty
/// string (or `"/"`) names the root group itself.
pub trait SourceContainer {
    /// Immediate named children of a group, in container order.
    fn list_children(&self, group_path: &str) -> Result<Vec<(String, ChildKind)>>;

    /// Read a dataset's full buffer.
    fn read_dataset(&self, path: &str) -> Result<RawDataset>;

    /// Read a dataset's attribute mapping.
    fn read_attributes(&self, path: &str) -> Result<HashMap<String, AttrValue>>;

    /// Kind of the object at `path`, if it exists. Used to dereference
    /// object references against the open handle.
    fn child_kind(&self, path: &str) -> Option<ChildKind>;

    /// Read only the given region of a dataset, using the format's native
    /// slicing semantics.
    fn read_region(&self, path: &str, ranges: &[Range<usize>]) -> Result<RawDataset>;
}

/// Strip leading/trailing slashes from a container path.
pub(crate) fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Extract the region covered by `ranges` from a fully-read dataset.
pub(crate) fn region_of(raw: &RawDataset, ranges: &[Range<usize>]) -> crate::error::Result<RawDataset> {
    let flat = region_indices(&raw.shape, ranges)?;
    let values = match &raw.values {
        RawValues::Int(v) => RawValues::Int(pick(v, &flat)),
        RawValues::Float(v) => RawValues::Float(pick(v, &flat)),
        RawValues::Bool(v) => RawValues::Bool(pick(v, &flat)),
        RawValues::Text(v) => RawValues::Text(pick(v, &flat)),
        RawValues::Refs(v) => RawValues::Refs(pick(v, &flat)),
    };
    Ok(RawDataset {
        shape: ranges.iter().map(|r| r.end - r.start).collect(),
        dim_names: raw.dim_names.clone(),
        values,
    })
}

fn pick<T: Clone>(values: &[T], flat: &[usize]) -> Vec<T> {
    flat.iter().map(|&i| values[i].clone()).collect()
}

/// Row-major flat indices covered by `ranges` within `shape`.
fn region_indices(
    shape: &[usize],
    ranges: &[Range<usize>],
) -> crate::error::Result<Vec<usize>> {
    use crate::error::StratusError;

    if ranges.len() != shape.len() {
        return Err(StratusError::Source(format!(
            "region rank {} does not match dataset rank {}",
            ranges.len(),
            shape.len()
        )));
    }
    for (range, &extent) in ranges.iter().zip(shape) {
        if range.start > range.end || range.end > extent {
            return Err(StratusError::Source(format!(
                "region {}..{} out of bounds for extent {}",
                range.start, range.end, extent
            )));
        }
    }

    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }

    let total: usize = ranges.iter().map(|r| r.end - r.start).product();
    let mut flat = Vec::with_capacity(total);
    if total == 0 {
        return Ok(flat);
    }

    let mut index: Vec<usize> = ranges.iter().map(|r| r.start).collect();
    'outer: loop {
        flat.push(index.iter().zip(&strides).map(|(&i, &s)| i * s).sum());
        let mut dim = ranges.len();
        loop {
            if dim == 0 {
                break 'outer;
            }
            dim -= 1;
            index[dim] += 1;
            if index[dim] < ranges[dim].end {
                break;
            }
            index[dim] = ranges[dim].start;
        }
    }
    Ok(flat)
}

/// Join a parent path and child name into a container path.
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    let parent = normalize_path(parent);
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", parent, child)
    }
}
