//! Tree construction from a source container.
//!
//! Runs once at load time: walks the raw hierarchy recursively, resolves
//! references, and produces the read-only [`TreeNode`] tree plus a report
//! of everything that had to be skipped along the way.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::resolver::resolve_dataset;
use super::source::{join_path, ChildKind, SourceContainer};
use super::{Array, TreeNode};
use crate::error::{Result, StratusError};

/// Upper bound on group nesting; deeper groups are skipped and reported.
const MAX_GROUP_DEPTH: usize = 128;

/// A leaf (or subtree) omitted from the tree during ingestion.
#[derive(Debug, Clone)]
pub struct SkippedLeaf {
    /// Container path of the omitted entry.
    pub path: String,
    /// Why it was omitted.
    pub reason: String,
}

/// What ingestion had to leave out.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Leaves and subtrees omitted from the tree.
    pub skipped: Vec<SkippedLeaf>,
    /// Reference elements that resolved to the absent marker.
    pub unresolved_refs: usize,
}

impl IngestReport {
    /// Whether ingestion completed without omissions.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.unresolved_refs == 0
    }

    fn skip(&mut self, path: impl Into<String>, reason: impl ToString) {
        self.skipped.push(SkippedLeaf {
            path: path.into(),
            reason: reason.to_string(),
        });
    }
}

/// A built tree plus its ingestion report.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// The normalized tree root.
    pub root: TreeNode,
    /// Omissions and unresolved reference counts.
    pub report: IngestReport,
}

/// Ingest a whole container into a normalized tree.
///
/// Individual unreadable leaves are skipped and reported rather than
/// aborting the build; only a root that cannot be listed at all is fatal.
/// With `scope`, the named sub-path of the finished tree is returned
/// instead of the root; a missing scope is a [`StratusError::GroupNotFound`]
/// and no partial tree is returned.
pub fn ingest(source: &dyn SourceContainer, scope: Option<&str>) -> Result<Ingested> {
    let mut report = IngestReport::default();
    let root = build_group(source, "", "root", 0, &mut report)?;
    info!(
        "ingested tree: {} skipped, {} unresolved references",
        report.skipped.len(),
        report.unresolved_refs
    );

    let root = match scope {
        Some(path) => root.into_subtree(path)?,
        None => root,
    };
    Ok(Ingested { root, report })
}

fn build_group(
    source: &dyn SourceContainer,
    path: &str,
    name: &str,
    depth: usize,
    report: &mut IngestReport,
) -> Result<TreeNode> {
    let children = source.list_children(path)?;
    let mut node = TreeNode::new(name, path);

    for (child_name, kind) in children {
        let child_path = join_path(path, &child_name);
        match kind {
            ChildKind::Dataset => match load_array(source, &child_path, &child_name, report) {
                Ok(array) => node.push_array(array),
                Err(e) => {
                    warn!("skipping dataset {}: {}", child_path, e);
                    report.skip(child_path, e);
                }
            },
            ChildKind::Group => {
                if depth + 1 >= MAX_GROUP_DEPTH {
                    warn!("skipping group {}: nesting too deep", child_path);
                    report.skip(child_path, "group nesting too deep");
                    continue;
                }
                match build_group(source, &child_path, &child_name, depth + 1, report) {
                    Ok(child) => node.push_child(child),
                    Err(e) => {
                        warn!("skipping group {}: {}", child_path, e);
                        report.skip(child_path, e);
                    }
                }
            }
        }
    }

    node.rebuild_dims();
    Ok(node)
}

fn load_array(
    source: &dyn SourceContainer,
    path: &str,
    name: &str,
    report: &mut IngestReport,
) -> Result<Array> {
    let raw = source.read_dataset(path)?;
    let rank = raw.shape.len();
    let explicit = raw.dim_names.clone();
    debug!(
        "read {} ({:?}, {} elements)",
        path,
        raw.values.kind(),
        raw.values.len()
    );

    let resolution = resolve_dataset(source, raw)?;
    if resolution.unresolved > 0 {
        debug!(
            "{}: {} reference elements resolved to absent",
            path, resolution.unresolved
        );
    }
    report.unresolved_refs += resolution.unresolved;

    let attributes = match source.read_attributes(path) {
        Ok(attrs) => attrs,
        Err(e) => {
            warn!("attributes unreadable for {}: {}", path, e);
            HashMap::new()
        }
    };

    let dim_names = match explicit {
        Some(names) if names.len() == rank => names,
        Some(names) => {
            return Err(StratusError::Source(format!(
                "{} declares {} dimension names for rank {}",
                path,
                names.len(),
                rank
            )))
        }
        None => infer_dim_names(name, rank),
    };

    let is_coord = rank == 1;
    Ok(Array::new(
        name.to_string(),
        dim_names,
        resolution.buffer,
        attributes,
        is_coord,
    ))
}

/// Positional dimension names for a dataset without declared ones.
///
/// A rank-1 dataset indexes itself: its dimension carries the dataset's own
/// name, which is what makes it usable as a coordinate axis. Everything
/// else gets `{name}_dim_{i}`.
pub fn infer_dim_names(name: &str, rank: usize) -> Vec<String> {
    if rank == 1 {
        vec![name.to_string()]
    } else {
        (0..rank).map(|i| format!("{}_dim_{}", name, i)).collect()
    }
}
