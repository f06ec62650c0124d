//! Folder resolution for writes.

use crate::path;
use crate::{Error, NodeId, NodeKind, TreeClient};

/// Find or create the folder chain leading to the leaf of `target`.
///
/// Walks the folder segments of `target` from `root`, descending into the
/// first existing folder with a matching name and creating one when none
/// exists. Returns the id of the folder that should hold the leaf, which is
/// `root` itself when `target` has a single segment.
///
/// Folders created before a failure are left in place.
pub fn resolve_parent<C: TreeClient + ?Sized>(
    client: &C,
    root: &NodeId,
    target: &str,
) -> Result<NodeId, Error> {
    let (folders, _leaf) = path::split_leaf(target)?;

    let mut current = root.clone();
    for name in folders {
        let existing = client.list_children(&current, Some(name), Some(NodeKind::Folder))?;
        current = match existing.into_iter().next() {
            Some(folder) => folder.id,
            None => {
                let created = client.create_node(&current, name, NodeKind::Folder, None)?;
                tracing::debug!(parent = %current, folder = %created.id, name, "created folder");
                created.id
            }
        };
    }

    Ok(current)
}
