//! Reference resolution.
//!
//! Datasets whose elements are object/region references are rewritten, one
//! element at a time, into concrete values read through the same open
//! container handle. Everything else passes through untouched.

use ndarray::{ArrayD, IxDyn};
use std::collections::HashMap;
use tracing::warn;

use super::source::{join_path, ChildKind, RawDataset, RawValues, RefValue, SourceContainer};
use super::{ResolvedRef, SummaryEntry, TypedBuffer};
use crate::error::{Result, StratusError};

/// Upper bound on chained reference resolution. Past this, an element
/// resolves to [`ResolvedRef::Absent`].
const MAX_REF_DEPTH: usize = 32;

/// Outcome of resolving one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The resolved buffer.
    pub buffer: TypedBuffer,
    /// Number of elements that resolved to an absent marker.
    pub unresolved: usize,
}

/// Resolve a raw dataset against its source container.
///
/// Buffers whose element kind is not a reference pass through unchanged.
/// For reference buffers every element is dereferenced independently; an
/// element that cannot be resolved becomes [`ResolvedRef::Absent`] without
/// aborting its siblings, and the count of such elements is returned.
pub fn resolve_dataset(source: &dyn SourceContainer, raw: RawDataset) -> Result<Resolution> {
    let mut unresolved = 0;
    let buffer = resolve_values(source, raw, 0, &mut unresolved)?;
    Ok(Resolution { buffer, unresolved })
}

fn resolve_values(
    source: &dyn SourceContainer,
    raw: RawDataset,
    depth: usize,
    unresolved: &mut usize,
) -> Result<TypedBuffer> {
    let RawDataset { shape, values, .. } = raw;
    match values {
        RawValues::Int(v) => from_shape(&shape, v).map(TypedBuffer::Int),
        RawValues::Float(v) => from_shape(&shape, v).map(TypedBuffer::Float),
        RawValues::Bool(v) => from_shape(&shape, v).map(TypedBuffer::Bool),
        RawValues::Text(v) => from_shape(&shape, v).map(TypedBuffer::Text),
        RawValues::Refs(refs) => {
            let resolved: Vec<ResolvedRef> = refs
                .iter()
                .map(|r| resolve_ref(source, r, depth, unresolved))
                .collect();
            from_shape(&shape, resolved).map(TypedBuffer::Resolved)
        }
    }
}

fn from_shape<T>(shape: &[usize], values: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), values)
        .map_err(|e| StratusError::Source(format!("Invalid shape/data size: {}", e)))
}

fn resolve_ref(
    source: &dyn SourceContainer,
    reference: &RefValue,
    depth: usize,
    unresolved: &mut usize,
) -> ResolvedRef {
    if depth >= MAX_REF_DEPTH {
        warn!("reference chain exceeds depth {}", MAX_REF_DEPTH);
        *unresolved += 1;
        return ResolvedRef::Absent;
    }

    match reference {
        RefValue::Null => {
            *unresolved += 1;
            ResolvedRef::Absent
        }
        RefValue::Object(path) => match source.child_kind(path) {
            Some(ChildKind::Dataset) => match read_resolved(source, path, depth, unresolved) {
                Ok(buffer) => ResolvedRef::Array(buffer),
                Err(e) => {
                    warn!("reference to {} failed to read: {}", path, e);
                    *unresolved += 1;
                    ResolvedRef::Absent
                }
            },
            Some(ChildKind::Group) => match summarize_group(source, path, depth, unresolved) {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("reference to group {} failed to list: {}", path, e);
                    *unresolved += 1;
                    ResolvedRef::Absent
                }
            },
            None => {
                warn!("dangling reference: {}", path);
                *unresolved += 1;
                ResolvedRef::Absent
            }
        },
        RefValue::Region { path, ranges } => {
            let read = source
                .read_region(path, ranges)
                .and_then(|raw| resolve_values(source, raw, depth + 1, unresolved));
            match read {
                Ok(buffer) => ResolvedRef::Array(buffer),
                Err(e) => {
                    warn!("region reference into {} failed: {}", path, e);
                    *unresolved += 1;
                    ResolvedRef::Absent
                }
            }
        }
    }
}

fn read_resolved(
    source: &dyn SourceContainer,
    path: &str,
    depth: usize,
    unresolved: &mut usize,
) -> Result<TypedBuffer> {
    let raw = source.read_dataset(path)?;
    resolve_values(source, raw, depth + 1, unresolved)
}

/// One-level summary of a referenced group: datasets are read and resolved,
/// nested groups are tagged rather than expanded.
fn summarize_group(
    source: &dyn SourceContainer,
    path: &str,
    depth: usize,
    unresolved: &mut usize,
) -> Result<ResolvedRef> {
    let children = source.list_children(path)?;
    let mut summary = HashMap::with_capacity(children.len());
    for (name, kind) in children {
        match kind {
            ChildKind::Group => {
                summary.insert(name, SummaryEntry::Subgroup);
            }
            ChildKind::Dataset => {
                let child_path = join_path(path, &name);
                match read_resolved(source, &child_path, depth, unresolved) {
                    Ok(buffer) => {
                        summary.insert(name, SummaryEntry::Data(buffer));
                    }
                    Err(e) => {
                        warn!("skipping unreadable summary child {}: {}", child_path, e);
                    }
                }
            }
        }
    }
    Ok(ResolvedRef::GroupSummary(summary))
}
