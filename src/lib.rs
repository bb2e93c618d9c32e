//! Stratus - a terminal-based explorer for hierarchical scientific data files.
//!
//! Stratus normalizes hierarchical array containers (netCDF/HDF5-style
//! groups of typed datasets) into an immutable tree, resolving any
//! object/region references along the way, and reduces N-dimensional
//! arrays to labeled 2D views for display.
//!
//! # Features
//!
//! - One-pass ingestion over a single open file handle
//! - Per-element reference resolution with absent markers for dangling refs
//! - Partial-failure tolerant tree building with a skip report
//! - Pure, stateless slice-and-project engine with coordinate labels
//! - Two-slot dimension selection state machine for browsing shells
//!
//! # Example
//!
//! ```ignore
//! use stratus::data::{ingest, NetcdfSource};
//! use stratus::view::{DimSelector, NoCoords};
//! use std::path::Path;
//!
//! let source = NetcdfSource::open(Path::new("data.nc"))?;
//! let ingested = ingest(&source, None)?;
//!
//! let node = &ingested.root;
//! let array = node.array("temperature").unwrap();
//! let selector = DimSelector::new(array)?;
//! let view = selector.project(array, node)?;
//! println!("{} x {}", view.row_labels.len(), view.col_labels.len());
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod data;
pub mod error;
pub mod view;

pub use error::{Result, StratusError};
