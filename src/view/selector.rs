//! Dimension selection state machine.
//!
//! The browsing shell owns one of these per displayed array. It tracks
//! which dimension occupies the row and column slots and the fixed index
//! for every other dimension, and recomputes the projection on each
//! transition. No rendering concerns live here.

use std::collections::{BTreeMap, HashMap};

use super::projection::{project, CoordProvider, SliceProjection};
use crate::data::Array;
use crate::error::{Result, StratusError};

/// Two-slot display dimension selection for one array.
///
/// Selecting a dimension into one slot removes it from the other slot's
/// candidate set. On a role change, the evicted dimension re-enters the
/// fixed set at its default midpoint and the promoted dimension leaves it;
/// all other fixed indices are preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct DimSelector {
    dims: Vec<(String, usize)>,
    row: usize,
    col: usize,
    fixed: BTreeMap<String, usize>,
}

impl DimSelector {
    /// Create a selector for `array` with the first two dimensions as
    /// (row, col) and midpoint defaults everywhere else.
    ///
    /// Arrays of rank < 2 have no 2D view to select.
    pub fn new(array: &Array) -> Result<Self> {
        let rank = array.rank();
        if rank < 2 {
            return Err(StratusError::DimensionOutOfRange { index: 1, rank });
        }
        let dims: Vec<(String, usize)> = array
            .dim_names()
            .iter()
            .cloned()
            .zip(array.shape().iter().copied())
            .collect();
        let fixed = dims
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != 0 && i != 1)
            .map(|(_, (name, extent))| (name.clone(), extent / 2))
            .collect();
        Ok(Self {
            dims,
            row: 0,
            col: 1,
            fixed,
        })
    }

    /// Dimension index currently in the row slot.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Dimension index currently in the column slot.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Name of the row dimension.
    pub fn row_dim(&self) -> &str {
        &self.dims[self.row].0
    }

    /// Name of the column dimension.
    pub fn col_dim(&self) -> &str {
        &self.dims[self.col].0
    }

    /// Current fixed index per non-displayed dimension.
    pub fn fixed(&self) -> &BTreeMap<String, usize> {
        &self.fixed
    }

    /// Dimension indices selectable for the row slot (everything except
    /// the column occupant).
    pub fn row_candidates(&self) -> Vec<usize> {
        (0..self.dims.len()).filter(|&i| i != self.col).collect()
    }

    /// Dimension indices selectable for the column slot.
    pub fn col_candidates(&self) -> Vec<usize> {
        (0..self.dims.len()).filter(|&i| i != self.row).collect()
    }

    /// Put `dim` in the row slot.
    pub fn select_row(&mut self, dim: usize) -> Result<()> {
        if dim >= self.dims.len() {
            return Err(StratusError::DimensionOutOfRange {
                index: dim,
                rank: self.dims.len(),
            });
        }
        if dim == self.col {
            return Err(StratusError::SameDimension { dim });
        }
        if dim != self.row {
            let evicted = self.row;
            self.row = dim;
            self.role_changed(evicted, dim);
        }
        Ok(())
    }

    /// Put `dim` in the column slot.
    pub fn select_col(&mut self, dim: usize) -> Result<()> {
        if dim >= self.dims.len() {
            return Err(StratusError::DimensionOutOfRange {
                index: dim,
                rank: self.dims.len(),
            });
        }
        if dim == self.row {
            return Err(StratusError::SameDimension { dim });
        }
        if dim != self.col {
            let evicted = self.col;
            self.col = dim;
            self.role_changed(evicted, dim);
        }
        Ok(())
    }

    /// Exchange the row and column slots. Fixed indices are untouched;
    /// the projection transposes.
    pub fn swap_axes(&mut self) {
        std::mem::swap(&mut self.row, &mut self.col);
    }

    /// Set the slice position of a currently-fixed dimension.
    pub fn set_fixed(&mut self, name: &str, index: usize) -> Result<()> {
        if !self.fixed.contains_key(name) {
            return Err(StratusError::UnknownDimension {
                name: name.to_string(),
            });
        }
        let extent = self
            .dims
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, e)| e)
            .unwrap_or(0);
        if index >= extent {
            return Err(StratusError::IndexOutOfBounds {
                dim: name.to_string(),
                index,
                extent,
            });
        }
        self.fixed.insert(name.to_string(), index);
        Ok(())
    }

    /// Recompute the projection for the current selection.
    pub fn project(
        &self,
        array: &Array,
        coords: &impl CoordProvider,
    ) -> Result<SliceProjection> {
        let fixed: HashMap<String, usize> =
            self.fixed.iter().map(|(k, &v)| (k.clone(), v)).collect();
        project(array, self.row, self.col, &fixed, coords)
    }

    // Promoted leaves the fixed set; evicted re-enters at its default.
    fn role_changed(&mut self, evicted: usize, promoted: usize) {
        let promoted_name = self.dims[promoted].0.clone();
        self.fixed.remove(&promoted_name);
        let (name, extent) = self.dims[evicted].clone();
        self.fixed.insert(name, extent / 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TypedBuffer;
    use crate::view::NoCoords;
    use ndarray::{ArrayD, IxDyn};
    use std::collections::HashMap as StdHashMap;

    fn rank4() -> Array {
        let len = 2 * 3 * 4 * 5;
        Array::new(
            "field".to_string(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            TypedBuffer::Float(
                ArrayD::from_shape_vec(IxDyn(&[2, 3, 4, 5]), (0..len).map(|i| i as f64).collect())
                    .unwrap(),
            ),
            StdHashMap::new(),
            false,
        )
    }

    fn rank1() -> Array {
        Array::new(
            "line".to_string(),
            vec!["line".into()],
            TypedBuffer::Float(ArrayD::from_shape_vec(IxDyn(&[3]), vec![0.0; 3]).unwrap()),
            StdHashMap::new(),
            true,
        )
    }

    #[test]
    fn defaults_to_first_two_dims_and_midpoints() {
        let array = rank4();
        let sel = DimSelector::new(&array).unwrap();
        assert_eq!((sel.row(), sel.col()), (0, 1));
        assert_eq!(sel.fixed().get("c"), Some(&2)); // 4 / 2
        assert_eq!(sel.fixed().get("d"), Some(&2)); // 5 / 2
    }

    #[test]
    fn rank1_arrays_have_no_selector() {
        assert!(DimSelector::new(&rank1()).is_err());
    }

    #[test]
    fn slots_exclude_each_other_from_candidates() {
        let array = rank4();
        let sel = DimSelector::new(&array).unwrap();
        assert!(!sel.row_candidates().contains(&sel.col()));
        assert!(!sel.col_candidates().contains(&sel.row()));
        assert!(sel.row_candidates().contains(&sel.row()));
    }

    #[test]
    fn selecting_the_other_slots_dim_is_rejected() {
        let array = rank4();
        let mut sel = DimSelector::new(&array).unwrap();
        assert!(matches!(
            sel.select_row(1),
            Err(StratusError::SameDimension { dim: 1 })
        ));
        assert!(matches!(
            sel.select_col(0),
            Err(StratusError::SameDimension { dim: 0 })
        ));
    }

    #[test]
    fn role_change_resets_only_the_dims_that_changed_role() {
        let array = rank4();
        let mut sel = DimSelector::new(&array).unwrap();
        sel.set_fixed("c", 3).unwrap();
        sel.set_fixed("d", 4).unwrap();

        // Promote "c" to the row slot: "a" becomes fixed at its midpoint,
        // "c" leaves the fixed set, "d" keeps its hand-set index.
        sel.select_row(2).unwrap();
        assert_eq!(sel.row_dim(), "c");
        assert_eq!(sel.fixed().get("a"), Some(&1)); // 2 / 2
        assert_eq!(sel.fixed().get("d"), Some(&4));
        assert!(sel.fixed().get("c").is_none());
    }

    #[test]
    fn set_fixed_is_bound_checked_and_slot_aware() {
        let array = rank4();
        let mut sel = DimSelector::new(&array).unwrap();
        assert!(matches!(
            sel.set_fixed("c", 4),
            Err(StratusError::IndexOutOfBounds { .. })
        ));
        // Display dimensions are not fixable.
        assert!(matches!(
            sel.set_fixed("a", 0),
            Err(StratusError::UnknownDimension { .. })
        ));
    }

    #[test]
    fn swap_axes_transposes_the_projection_and_keeps_fixed() {
        let array = rank4();
        let mut sel = DimSelector::new(&array).unwrap();
        sel.set_fixed("d", 1).unwrap();
        let before = sel.project(&array, &NoCoords).unwrap();
        sel.swap_axes();
        let after = sel.project(&array, &NoCoords).unwrap();
        assert_eq!(before.values, after.values.t());
        assert_eq!(before.row_labels, after.col_labels);
        assert_eq!(before.fixed, after.fixed);
    }

    #[test]
    fn selector_projection_matches_direct_projection() {
        let array = rank4();
        let mut sel = DimSelector::new(&array).unwrap();
        sel.select_col(3).unwrap();
        let via_selector = sel.project(&array, &NoCoords).unwrap();

        let mut fixed = StdHashMap::new();
        for (name, &index) in sel.fixed() {
            fixed.insert(name.clone(), index);
        }
        let direct = project(&array, sel.row(), sel.col(), &fixed, &NoCoords).unwrap();
        assert_eq!(via_selector, direct);
    }
}
