//! Error types for Stratus.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

use crate::data::ElementKind;

/// Result type alias for Stratus operations.
pub type Result<T> = std::result::Result<T, StratusError>;

/// Errors that can occur in Stratus.
#[derive(Debug, Error)]
pub enum StratusError {
    /// Failed to open a file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by the source container backend.
    #[error("Source error: {0}")]
    Source(String),

    /// Requested group path not present in the built tree.
    #[error("Group not found: {path}")]
    GroupNotFound {
        /// The requested sub-path.
        path: String,
    },

    /// Requested array not present in its node.
    #[error("Array not found: {name}")]
    ArrayNotFound {
        /// The requested array name.
        name: String,
    },

    /// Row and column dimensions of a projection must differ.
    #[error("Row and column dimensions must differ (both are {dim})")]
    SameDimension {
        /// The dimension index requested for both axes.
        dim: usize,
    },

    /// Dimension index outside the array's rank.
    #[error("Dimension index {index} out of range for rank {rank}")]
    DimensionOutOfRange {
        /// The offending dimension index.
        index: usize,
        /// The array's rank.
        rank: usize,
    },

    /// Fixed index outside the dimension's extent.
    #[error("Index {index} out of bounds for dimension '{dim}' of extent {extent}")]
    IndexOutOfBounds {
        /// The dimension name.
        dim: String,
        /// The offending index.
        index: usize,
        /// The dimension's extent.
        extent: usize,
    },

    /// Fixed index supplied for a dimension the array does not slice over.
    #[error("'{name}' is not a sliceable dimension of this array")]
    UnknownDimension {
        /// The offending dimension name.
        name: String,
    },

    /// Projection requested on a buffer without numeric elements.
    #[error("Cannot project {kind:?} data")]
    NonNumeric {
        /// The buffer's element kind.
        kind: ElementKind,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StratusError {
    /// Create a FileOpen error.
    pub fn file_open(path: PathBuf, source: std::io::Error) -> Self {
        Self::FileOpen { path, source }
    }

    /// Create a GroupNotFound error.
    pub fn group_not_found(path: impl Into<String>) -> Self {
        Self::GroupNotFound { path: path.into() }
    }

    /// Create an ArrayNotFound error.
    pub fn array_not_found(name: impl Into<String>) -> Self {
        Self::ArrayNotFound { name: name.into() }
    }
}

impl From<netcdf::Error> for StratusError {
    fn from(err: netcdf::Error) -> Self {
        Self::Source(err.to_string())
    }
}
