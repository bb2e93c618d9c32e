//! The slice-and-project engine.
//!
//! Reduces an N-dimensional array to a 2D view: two dimensions are kept as
//! row and column axes, every other dimension is pinned to a fixed index.
//! Pure and stateless; recomputed on every selection change.

use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};

use crate::data::{Array, TreeNode};
use crate::error::{Result, StratusError};

/// Lookup seam for coordinate arrays during projection.
pub trait CoordProvider {
    /// Coordinate array registered for `dim`, if any.
    fn coord(&self, dim: &str) -> Option<&Array>;
}

impl CoordProvider for TreeNode {
    fn coord(&self, dim: &str) -> Option<&Array> {
        self.coord_for(dim)
    }
}

/// A provider with no coordinate arrays; all labels fall back to indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCoords;

impl CoordProvider for NoCoords {
    fn coord(&self, _dim: &str) -> Option<&Array> {
        None
    }
}

/// The 2D reduction of an N-dimensional array for display.
///
/// Transient: derived from an [`Array`] on demand, never cached across
/// selection changes, never written back.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceProjection {
    /// Reduced values; first axis is the row dimension, second the column.
    /// Non-finite source values appear as 0.0 here (display only).
    pub values: Array2<f64>,
    /// Row dimension name.
    pub row_dim: String,
    /// Column dimension name.
    pub col_dim: String,
    /// Row axis labels, one per row.
    pub row_labels: Vec<String>,
    /// Column axis labels, one per column.
    pub col_labels: Vec<String>,
    /// The fixed index used for every non-displayed dimension.
    pub fixed: BTreeMap<String, usize>,
}

/// Project `array` onto the (`row_dim`, `col_dim`) plane.
///
/// `fixed` maps a subset of the remaining dimension names to indices; any
/// remaining dimension not named there defaults to the floor midpoint of
/// its extent. Preconditions are rejected up front and never clamped:
/// distinct in-range display dimensions, fixed keys drawn from the
/// remaining dimensions, every index within its extent.
pub fn project(
    array: &Array,
    row_dim: usize,
    col_dim: usize,
    fixed: &HashMap<String, usize>,
    coords: &impl CoordProvider,
) -> Result<SliceProjection> {
    let rank = array.rank();
    if row_dim == col_dim {
        return Err(StratusError::SameDimension { dim: row_dim });
    }
    for index in [row_dim, col_dim] {
        if index >= rank {
            return Err(StratusError::DimensionOutOfRange { index, rank });
        }
    }
    if !array.buffer().is_numeric() {
        return Err(StratusError::NonNumeric { kind: array.kind() });
    }

    let shape = array.shape();
    let dims = array.dim_names();
    let remaining: Vec<usize> = (0..rank).filter(|&i| i != row_dim && i != col_dim).collect();

    // Reject fixed entries naming anything but a remaining dimension.
    for (name, &index) in fixed {
        match remaining.iter().find(|&&i| &dims[i] == name) {
            Some(&pos) => {
                let extent = shape[pos];
                if index >= extent {
                    return Err(StratusError::IndexOutOfBounds {
                        dim: name.clone(),
                        index,
                        extent,
                    });
                }
            }
            None => {
                return Err(StratusError::UnknownDimension { name: name.clone() });
            }
        }
    }

    // Full index specification: explicit where given, midpoint otherwise.
    let mut index_spec = vec![0usize; rank];
    let mut resolved = BTreeMap::new();
    for &pos in &remaining {
        let extent = shape[pos];
        let index = match fixed.get(&dims[pos]) {
            Some(&i) => i,
            None => extent / 2,
        };
        if index >= extent {
            return Err(StratusError::IndexOutOfBounds {
                dim: dims[pos].clone(),
                index,
                extent,
            });
        }
        index_spec[pos] = index;
        resolved.insert(dims[pos].clone(), index);
    }

    let rows = shape[row_dim];
    let cols = shape[col_dim];
    let buffer = array.buffer();
    let mut index = index_spec;
    let values = Array2::from_shape_fn((rows, cols), |(r, c)| {
        index[row_dim] = r;
        index[col_dim] = c;
        let v = buffer.value_at(&index).unwrap_or(f64::NAN);
        if v.is_finite() {
            v
        } else {
            0.0
        }
    });

    Ok(SliceProjection {
        values,
        row_dim: dims[row_dim].clone(),
        col_dim: dims[col_dim].clone(),
        row_labels: axis_labels(coords, &dims[row_dim], rows),
        col_labels: axis_labels(coords, &dims[col_dim], cols),
        fixed: resolved,
    })
}

/// Labels for one display axis: coordinate values when a matching
/// coordinate array exists, positional indices otherwise.
fn axis_labels(coords: &impl CoordProvider, dim: &str, extent: usize) -> Vec<String> {
    if let Some(coord) = coords.coord(dim) {
        if coord.rank() == 1 && coord.extent(0) == Some(extent) {
            let labels: Option<Vec<String>> =
                (0..extent).map(|i| coord.buffer().label_at(i)).collect();
            if let Some(labels) = labels {
                return labels;
            }
        }
    }
    (0..extent).map(|i| i.to_string()).collect()
}
