//! Data ingestion and representation.
//!
//! This module normalizes a raw hierarchical container (netCDF file or
//! in-memory fixture) into a tree of nodes holding typed, reference-free
//! arrays.

mod buffer;
mod builder;
mod memory;
mod netcdf_source;
mod node;
mod resolver;
mod source;

pub use buffer::{ElementKind, ResolvedRef, SummaryEntry, TypedBuffer};
pub use builder::{infer_dim_names, ingest, IngestReport, Ingested, SkippedLeaf};
pub use memory::{MemDataset, MemGroup, MemSource};
pub use netcdf_source::NetcdfSource;
pub use node::{Array, TreeNode};
pub use resolver::{resolve_dataset, Resolution};
pub use source::{AttrValue, ChildKind, RawDataset, RawValues, RefValue, SourceContainer};
