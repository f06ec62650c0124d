//! Lazily built path → node id index.

use std::collections::HashMap;

use crate::traversal::{traverse, TraversalOptions};
use crate::{Error, NodeId, NodeKind, TreeClient};

/// Memoized mapping from relative file path to node id.
///
/// The mapping is built from a full traversal the first time it is needed
/// and kept until [`invalidate`](PathIndex::invalidate) is called. There is
/// no incremental update and no staleness detection: changes made by other
/// actors are only picked up after an invalidation.
///
/// Only files are indexed. If the remote tree holds two files with the same
/// relative path (same-named siblings), the one seen last wins and a warning
/// is logged.
pub struct PathIndex {
    root: NodeId,
    options: TraversalOptions,
    entries: Option<HashMap<String, NodeId>>,
}

impl PathIndex {
    pub fn new(root: NodeId, options: TraversalOptions) -> Self {
        Self {
            root,
            options,
            entries: None,
        }
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn options(&self) -> TraversalOptions {
        self.options
    }

    /// Whether a built mapping is currently held.
    pub fn is_built(&self) -> bool {
        self.entries.is_some()
    }

    /// The mapping, built through `client` if absent.
    ///
    /// A failed build leaves the index unbuilt.
    pub fn get<C: TreeClient + ?Sized>(
        &mut self,
        client: &C,
    ) -> Result<&HashMap<String, NodeId>, Error> {
        let entries = match self.entries.take() {
            Some(entries) => entries,
            None => self.build(client)?,
        };
        Ok(self.entries.insert(entries))
    }

    /// Look up a single path.
    pub fn lookup<C: TreeClient + ?Sized>(
        &mut self,
        client: &C,
        path: &str,
    ) -> Result<Option<NodeId>, Error> {
        Ok(self.get(client)?.get(path).cloned())
    }

    /// Drop the mapping; the next access rebuilds it.
    pub fn invalidate(&mut self) {
        if self.entries.take().is_some() {
            tracing::debug!(root = %self.root, "path index invalidated");
        }
    }

    fn build<C: TreeClient + ?Sized>(&self, client: &C) -> Result<HashMap<String, NodeId>, Error> {
        let mut entries = HashMap::new();
        for entry in traverse(client, &self.root, self.options) {
            let entry = entry?;
            if entry.kind == NodeKind::Folder {
                continue;
            }
            if let Some(previous) = entries.insert(entry.path.clone(), entry.id) {
                tracing::warn!(
                    path = %entry.path,
                    shadowed = %previous,
                    "duplicate path in remote tree, keeping the last one seen"
                );
            }
        }
        tracing::debug!(root = %self.root, files = entries.len(), "path index built");
        Ok(entries)
    }
}
