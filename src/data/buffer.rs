//! Typed N-dimensional buffers and resolved reference values.

use ndarray::{ArrayD, IxDyn};
use std::collections::HashMap;

/// Element kind of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Signed integer elements.
    Int,
    /// Floating-point elements.
    Float,
    /// Boolean elements.
    Bool,
    /// Text elements.
    Text,
    /// Object/region reference elements.
    Reference,
}

/// An N-dimensional array of a single element kind.
///
/// The shape lives inside the `ndarray` storage; rank 0 (scalar) and zero
/// extents (empty array) are both valid.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedBuffer {
    /// Integer data.
    Int(ArrayD<i64>),
    /// Floating-point data.
    Float(ArrayD<f64>),
    /// Boolean data.
    Bool(ArrayD<bool>),
    /// Text data.
    Text(ArrayD<String>),
    /// Reference data, already resolved against the source container.
    Resolved(ArrayD<ResolvedRef>),
}

/// A single resolved reference element.
///
/// References are never retained raw in the normalized model; each element
/// of a reference-kind dataset becomes one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRef {
    /// The referenced dataset's contents (or region thereof).
    Array(TypedBuffer),
    /// One-level summary of a referenced group: child name to contents.
    GroupSummary(HashMap<String, SummaryEntry>),
    /// The reference could not be resolved.
    Absent,
}

/// One entry in a resolved group summary.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryEntry {
    /// A child dataset's contents.
    Data(TypedBuffer),
    /// A nested group, marked rather than expanded.
    Subgroup,
}

impl TypedBuffer {
    /// Element kind of this buffer.
    pub fn kind(&self) -> ElementKind {
        match self {
            TypedBuffer::Int(_) => ElementKind::Int,
            TypedBuffer::Float(_) => ElementKind::Float,
            TypedBuffer::Bool(_) => ElementKind::Bool,
            TypedBuffer::Text(_) => ElementKind::Text,
            TypedBuffer::Resolved(_) => ElementKind::Reference,
        }
    }

    /// Shape as ordered dimension extents.
    pub fn shape(&self) -> &[usize] {
        match self {
            TypedBuffer::Int(a) => a.shape(),
            TypedBuffer::Float(a) => a.shape(),
            TypedBuffer::Bool(a) => a.shape(),
            TypedBuffer::Text(a) => a.shape(),
            TypedBuffer::Resolved(a) => a.shape(),
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Total element count (product of extents).
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether elements can be viewed as `f64` for display.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypedBuffer::Int(_) | TypedBuffer::Float(_) | TypedBuffer::Bool(_)
        )
    }

    /// Element at `indices` as `f64`, for numeric buffers.
    ///
    /// Booleans map to 0.0/1.0. Returns `None` for non-numeric buffers or
    /// out-of-bounds indices.
    pub fn value_at(&self, indices: &[usize]) -> Option<f64> {
        match self {
            TypedBuffer::Int(a) => a.get(IxDyn(indices)).map(|&v| v as f64),
            TypedBuffer::Float(a) => a.get(IxDyn(indices)).copied(),
            TypedBuffer::Bool(a) => a.get(IxDyn(indices)).map(|&v| if v { 1.0 } else { 0.0 }),
            TypedBuffer::Text(_) | TypedBuffer::Resolved(_) => None,
        }
    }

    /// Display label for element `index` of a rank-1 buffer.
    ///
    /// Numeric values are formatted to 4 decimal places, text passes
    /// through. Returns `None` for reference buffers or out-of-bounds
    /// indices; callers fall back to positional labels.
    pub fn label_at(&self, index: usize) -> Option<String> {
        match self {
            TypedBuffer::Int(a) => a.get(IxDyn(&[index])).map(|&v| format!("{:.4}", v as f64)),
            TypedBuffer::Float(a) => a.get(IxDyn(&[index])).map(|&v| format!("{:.4}", v)),
            TypedBuffer::Bool(a) => a.get(IxDyn(&[index])).map(|&v| v.to_string()),
            TypedBuffer::Text(a) => a.get(IxDyn(&[index])).cloned(),
            TypedBuffer::Resolved(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    fn floats(shape: &[usize], values: Vec<f64>) -> TypedBuffer {
        TypedBuffer::Float(ArrayD::from_shape_vec(IxDyn(shape), values).unwrap())
    }

    #[test]
    fn kind_and_shape() {
        let buf = floats(&[2, 3], vec![0.0; 6]);
        assert_eq!(buf.kind(), ElementKind::Float);
        assert_eq!(buf.shape(), &[2, 3]);
        assert_eq!(buf.rank(), 2);
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn scalar_buffer_has_rank_zero() {
        let buf = floats(&[], vec![42.0]);
        assert_eq!(buf.rank(), 0);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.value_at(&[]), Some(42.0));
    }

    #[test]
    fn empty_extent_is_valid() {
        let buf = floats(&[0, 4], vec![]);
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn bool_values_map_to_01() {
        let buf = TypedBuffer::Bool(
            ArrayD::from_shape_vec(IxDyn(&[2]), vec![true, false]).unwrap(),
        );
        assert_eq!(buf.value_at(&[0]), Some(1.0));
        assert_eq!(buf.value_at(&[1]), Some(0.0));
    }

    #[test]
    fn labels_format_numerics_to_four_places() {
        let buf = floats(&[2], vec![1.5, 2.25]);
        assert_eq!(buf.label_at(0).as_deref(), Some("1.5000"));
        assert_eq!(buf.label_at(1).as_deref(), Some("2.2500"));

        let ints = TypedBuffer::Int(ArrayD::from_shape_vec(IxDyn(&[1]), vec![3]).unwrap());
        assert_eq!(ints.label_at(0).as_deref(), Some("3.0000"));
    }

    #[test]
    fn text_labels_pass_through() {
        let buf = TypedBuffer::Text(
            ArrayD::from_shape_vec(IxDyn(&[2]), vec!["a".to_string(), "b".to_string()]).unwrap(),
        );
        assert_eq!(buf.label_at(1).as_deref(), Some("b"));
        assert!(buf.value_at(&[1]).is_none());
    }
}
