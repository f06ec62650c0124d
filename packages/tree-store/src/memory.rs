//! In-memory tree backend.
//!
//! `MemoryTree` implements [`TreeClient`] over a local node table. It counts
//! every call per operation and can be told to start failing, which makes it
//! the backend of choice for tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::{Error, NodeId, NodeKind, PermissionRole, PermissionType, RemoteNode, TreeClient};

/// A [`TreeClient`] operation, for call counting and failure injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    ListChildren,
    CreateNode,
    GetContent,
    SetContent,
    Delete,
    GrantPermission,
    ShareLink,
}

/// Number of calls made per operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_children: usize,
    pub create_node: usize,
    pub get_content: usize,
    pub set_content: usize,
    pub delete: usize,
    pub grant_permission: usize,
    pub share_link: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_children
            + self.create_node
            + self.get_content
            + self.set_content
            + self.delete
            + self.grant_permission
            + self.share_link
    }

    fn slot(&mut self, op: Operation) -> &mut usize {
        match op {
            Operation::ListChildren => &mut self.list_children,
            Operation::CreateNode => &mut self.create_node,
            Operation::GetContent => &mut self.get_content,
            Operation::SetContent => &mut self.set_content,
            Operation::Delete => &mut self.delete,
            Operation::GrantPermission => &mut self.grant_permission,
            Operation::ShareLink => &mut self.share_link,
        }
    }
}

/// A permission granted through [`TreeClient::grant_permission`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grant {
    pub id: NodeId,
    pub permission_type: PermissionType,
    pub role: PermissionRole,
}

struct StoredNode {
    node: RemoteNode,
    content: Bytes,
}

#[derive(Default)]
struct State {
    // creation order
    nodes: Vec<StoredNode>,
    grants: Vec<Grant>,
    calls: CallCounts,
    failures: Vec<(Operation, usize)>,
}

impl State {
    fn find(&self, id: &NodeId) -> Option<&StoredNode> {
        self.nodes.iter().find(|n| &n.node.id == id)
    }

    fn find_mut(&mut self, id: &NodeId) -> Option<&mut StoredNode> {
        self.nodes.iter_mut().find(|n| &n.node.id == id)
    }

    fn insert(
        &mut self,
        parent: Option<&NodeId>,
        name: &str,
        kind: NodeKind,
        content: Bytes,
    ) -> RemoteNode {
        let node = RemoteNode {
            id: NodeId::new(uuid::Uuid::new_v4().simple().to_string()),
            name: name.to_string(),
            kind,
            parent: parent.cloned(),
        };
        self.nodes.push(StoredNode {
            node: node.clone(),
            content,
        });
        node
    }

    /// Count a call and decide whether it fails.
    fn record(&mut self, op: Operation) -> Result<(), Error> {
        let slot = self.calls.slot(op);
        *slot += 1;
        let made = *slot;

        let budget = self
            .failures
            .iter()
            .find(|(failing, _)| *failing == op)
            .map(|(_, successes)| *successes);
        match budget {
            Some(successes) if made > successes => Err(Error::transport(format!(
                "injected {:?} failure on call {}",
                op, made
            ))),
            _ => Ok(()),
        }
    }

    fn folder(&self, id: &NodeId) -> Result<&StoredNode, Error> {
        match self.find(id) {
            Some(stored) if stored.node.is_folder() => Ok(stored),
            Some(_) => Err(Error::transport(format!("{} is not a folder", id))),
            None => Err(Error::transport(format!("node {} not found", id))),
        }
    }

    fn file_mut(&mut self, id: &NodeId) -> Result<&mut StoredNode, Error> {
        match self.find_mut(id) {
            Some(stored) if !stored.node.is_folder() => Ok(stored),
            Some(_) => Err(Error::transport(format!("{} is a folder", id))),
            None => Err(Error::transport(format!("node {} not found", id))),
        }
    }
}

/// In-memory [`TreeClient`].
///
/// # Example
///
/// ```rust
/// use drivefs_tree_store::{MemoryTree, DriveStore, PathReader, PathWriter, TraversalOptions};
///
/// let tree = MemoryTree::new();
/// let mut store = DriveStore::new(&tree, tree.root(), TraversalOptions::unbounded());
///
/// store.write("docs/readme.txt", b"hello".into()).unwrap();
/// assert_eq!(&store.read("docs/readme.txt").unwrap()[..], b"hello");
/// assert_eq!(tree.calls().create_node, 2);
/// ```
pub struct MemoryTree {
    root: NodeId,
    state: Mutex<State>,
}

impl MemoryTree {
    /// Create a tree holding only an empty root folder.
    pub fn new() -> Self {
        let mut state = State::default();
        let root = state.insert(None, "", NodeKind::Folder, Bytes::new()).id;
        Self {
            root,
            state: Mutex::new(state),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a folder without counting a call.
    pub fn add_folder(&self, parent: &NodeId, name: &str) -> NodeId {
        self.lock()
            .insert(Some(parent), name, NodeKind::Folder, Bytes::new())
            .id
    }

    /// Add a file without counting a call.
    pub fn add_file(&self, parent: &NodeId, name: &str, content: &[u8]) -> NodeId {
        self.lock()
            .insert(
                Some(parent),
                name,
                NodeKind::File,
                Bytes::copy_from_slice(content),
            )
            .id
    }

    /// Children of `parent` named `name`, in creation order, without
    /// counting a call.
    pub fn find_children(&self, parent: &NodeId, name: &str) -> Vec<RemoteNode> {
        self.lock()
            .nodes
            .iter()
            .filter(|n| n.node.parent.as_ref() == Some(parent) && n.node.name == name)
            .map(|n| n.node.clone())
            .collect()
    }

    /// Content of a node, without counting a call.
    pub fn content(&self, id: &NodeId) -> Option<Bytes> {
        self.lock().find(id).map(|n| n.content.clone())
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn grants(&self) -> Vec<Grant> {
        self.lock().grants.clone()
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn reset_calls(&self) {
        self.lock().calls = CallCounts::default();
    }

    /// Let `successes` more calls of `op` through (counting calls already
    /// made), then fail every later one with a transport error.
    pub fn fail_after(&self, op: Operation, successes: usize) {
        let mut state = self.lock();
        let already = *state.calls.slot(op);
        state.failures.retain(|(failing, _)| *failing != op);
        state.failures.push((op, already + successes));
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.lock().failures.clear();
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeClient for MemoryTree {
    fn list_children(
        &self,
        parent: &NodeId,
        name: Option<&str>,
        kind: Option<NodeKind>,
    ) -> Result<Vec<RemoteNode>, Error> {
        let mut state = self.lock();
        state.record(Operation::ListChildren)?;
        state.folder(parent)?;

        Ok(state
            .nodes
            .iter()
            .map(|n| &n.node)
            .filter(|n| n.parent.as_ref() == Some(parent))
            .filter(|n| name.map_or(true, |name| n.name == name))
            .filter(|n| kind.map_or(true, |kind| n.kind == kind))
            .cloned()
            .collect())
    }

    fn create_node(
        &self,
        parent: &NodeId,
        name: &str,
        kind: NodeKind,
        content: Option<Bytes>,
    ) -> Result<RemoteNode, Error> {
        let mut state = self.lock();
        state.record(Operation::CreateNode)?;
        state.folder(parent)?;
        Ok(state.insert(Some(parent), name, kind, content.unwrap_or_default()))
    }

    fn get_content(&self, id: &NodeId) -> Result<Bytes, Error> {
        let mut state = self.lock();
        state.record(Operation::GetContent)?;
        Ok(state.file_mut(id)?.content.clone())
    }

    fn set_content(&self, id: &NodeId, content: Bytes) -> Result<(), Error> {
        let mut state = self.lock();
        state.record(Operation::SetContent)?;
        state.file_mut(id)?.content = content;
        Ok(())
    }

    fn delete(&self, id: &NodeId) -> Result<(), Error> {
        let mut state = self.lock();
        state.record(Operation::Delete)?;
        if state.find(id).is_none() {
            return Err(Error::transport(format!("node {} not found", id)));
        }

        // take the whole subtree with it
        let mut doomed = vec![id.clone()];
        let mut i = 0;
        while i < doomed.len() {
            let current = doomed[i].clone();
            doomed.extend(
                state
                    .nodes
                    .iter()
                    .filter(|n| n.node.parent.as_ref() == Some(&current))
                    .map(|n| n.node.id.clone()),
            );
            i += 1;
        }
        state.nodes.retain(|n| !doomed.contains(&n.node.id));
        Ok(())
    }

    fn grant_permission(
        &self,
        id: &NodeId,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<(), Error> {
        let mut state = self.lock();
        state.record(Operation::GrantPermission)?;
        if state.find(id).is_none() {
            return Err(Error::transport(format!("node {} not found", id)));
        }
        state.grants.push(Grant {
            id: id.clone(),
            permission_type,
            role,
        });
        Ok(())
    }

    fn share_link(&self, id: &NodeId) -> Result<String, Error> {
        let mut state = self.lock();
        state.record(Operation::ShareLink)?;
        if state.find(id).is_none() {
            return Err(Error::transport(format!("node {} not found", id)));
        }
        Ok(format!("memory://{}", id))
    }
}
