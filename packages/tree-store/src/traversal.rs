//! Depth-bounded walk of the remote tree.

use std::collections::VecDeque;

use crate::path;
use crate::{Error, NodeId, NodeKind, TreeClient};

/// Controls how far a traversal descends and what it skips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalOptions {
    /// `None` descends without limit. `Some(0)` lists the root's children
    /// only. A folder at level `L` (the root's children are level 0) is
    /// entered only while `L < max_depth`.
    pub max_depth: Option<usize>,

    /// Include names starting with `.`. Hidden folders are not entered
    /// unless this is set.
    pub include_hidden: bool,
}

impl TraversalOptions {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Whether a folder whose children sit at `level` may be listed at all.
    fn past_cutoff(&self, level: usize) -> bool {
        matches!(self.max_depth, Some(max) if level > max)
    }

    /// Whether a folder found at `level` is descended into.
    ///
    /// Kept separate from `past_cutoff`: the two guards use different
    /// comparisons and both are observable at the boundary.
    fn descends(&self, level: usize) -> bool {
        match self.max_depth {
            None => true,
            Some(max) => level < max,
        }
    }
}

/// One visible node found by a traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the traversal root.
    pub path: String,
    pub id: NodeId,
    pub kind: NodeKind,
}

struct PendingFolder {
    id: NodeId,
    prefix: String,
    level: usize,
}

/// Lazy iterator over the entries below a root folder.
///
/// Folders are listed one at a time as the iterator is advanced. The first
/// backend failure is yielded as an `Err` and ends the iteration. Sibling and
/// overall order are unspecified.
pub struct Traverse<'c, C: TreeClient + ?Sized> {
    client: &'c C,
    options: TraversalOptions,
    folders: Vec<PendingFolder>,
    ready: VecDeque<Entry>,
    failed: bool,
}

/// Walk the tree below `root`.
///
/// Each call starts a fresh walk; nothing is cached.
pub fn traverse<'c, C: TreeClient + ?Sized>(
    client: &'c C,
    root: &NodeId,
    options: TraversalOptions,
) -> Traverse<'c, C> {
    Traverse {
        client,
        options,
        folders: vec![PendingFolder {
            id: root.clone(),
            prefix: String::new(),
            level: 0,
        }],
        ready: VecDeque::new(),
        failed: false,
    }
}

impl<C: TreeClient + ?Sized> Traverse<'_, C> {
    fn expand(&mut self, folder: PendingFolder) -> Result<(), Error> {
        if self.options.past_cutoff(folder.level) {
            return Ok(());
        }

        tracing::debug!(folder = %folder.id, level = folder.level, "listing folder");
        let children = self.client.list_children(&folder.id, None, None)?;

        for child in children {
            if !self.options.include_hidden && path::is_hidden(&child.name) {
                continue;
            }

            let child_path = path::join(&folder.prefix, &child.name);
            if child.is_folder() && self.options.descends(folder.level) {
                self.folders.push(PendingFolder {
                    id: child.id.clone(),
                    prefix: child_path.clone(),
                    level: folder.level + 1,
                });
            }

            self.ready.push_back(Entry {
                path: child_path,
                id: child.id,
                kind: child.kind,
            });
        }

        Ok(())
    }
}

impl<C: TreeClient + ?Sized> Iterator for Traverse<'_, C> {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(entry) = self.ready.pop_front() {
                return Some(Ok(entry));
            }

            let folder = self.folders.pop()?;
            if let Err(e) = self.expand(folder) {
                self.failed = true;
                self.folders.clear();
                self.ready.clear();
                return Some(Err(e));
            }
        }
    }
}
