//! The tree API the store is built on.

use bytes::Bytes;

use crate::{Error, NodeId, NodeKind, PermissionRole, PermissionType, RemoteNode};

/// Object-ID based access to a remote folder/file tree.
///
/// Implementations block until the backend answers and report every backend
/// failure as [`Error::Transport`]. Trashed or otherwise invisible nodes must
/// not be returned by [`list_children`](TreeClient::list_children).
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn TreeClient>`.
pub trait TreeClient: Send + Sync {
    /// List the children of `parent`, optionally restricted to an exact
    /// `name` and/or a `kind`.
    fn list_children(
        &self,
        parent: &NodeId,
        name: Option<&str>,
        kind: Option<NodeKind>,
    ) -> Result<Vec<RemoteNode>, Error>;

    /// Create a node named `name` under `parent`. `content` is only
    /// meaningful for files.
    fn create_node(
        &self,
        parent: &NodeId,
        name: &str,
        kind: NodeKind,
        content: Option<Bytes>,
    ) -> Result<RemoteNode, Error>;

    /// Fetch the content of a file node.
    fn get_content(&self, id: &NodeId) -> Result<Bytes, Error>;

    /// Replace the content of a file node.
    fn set_content(&self, id: &NodeId, content: Bytes) -> Result<(), Error>;

    /// Delete a node.
    fn delete(&self, id: &NodeId) -> Result<(), Error>;

    /// Grant a permission on a node.
    fn grant_permission(
        &self,
        id: &NodeId,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<(), Error>;

    /// The canonical access link of a node.
    fn share_link(&self, id: &NodeId) -> Result<String, Error>;

    /// Turn a user-supplied folder reference into a root id.
    ///
    /// The default accepts a bare id: any non-empty string without `/`,
    /// `?` or whitespace.
    fn resolve_folder_ref(&self, reference: &str) -> Result<NodeId, Error> {
        let reference = reference.trim();
        if reference.is_empty()
            || reference.contains(|c: char| c == '/' || c == '?' || c.is_whitespace())
        {
            return Err(Error::invalid_input(format!(
                "invalid folder reference: {}",
                reference
            )));
        }
        Ok(NodeId::new(reference))
    }
}

// Blanket implementations for references and boxes

impl<T: TreeClient + ?Sized> TreeClient for &T {
    fn list_children(
        &self,
        parent: &NodeId,
        name: Option<&str>,
        kind: Option<NodeKind>,
    ) -> Result<Vec<RemoteNode>, Error> {
        (**self).list_children(parent, name, kind)
    }

    fn create_node(
        &self,
        parent: &NodeId,
        name: &str,
        kind: NodeKind,
        content: Option<Bytes>,
    ) -> Result<RemoteNode, Error> {
        (**self).create_node(parent, name, kind, content)
    }

    fn get_content(&self, id: &NodeId) -> Result<Bytes, Error> {
        (**self).get_content(id)
    }

    fn set_content(&self, id: &NodeId, content: Bytes) -> Result<(), Error> {
        (**self).set_content(id, content)
    }

    fn delete(&self, id: &NodeId) -> Result<(), Error> {
        (**self).delete(id)
    }

    fn grant_permission(
        &self,
        id: &NodeId,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<(), Error> {
        (**self).grant_permission(id, permission_type, role)
    }

    fn share_link(&self, id: &NodeId) -> Result<String, Error> {
        (**self).share_link(id)
    }

    fn resolve_folder_ref(&self, reference: &str) -> Result<NodeId, Error> {
        (**self).resolve_folder_ref(reference)
    }
}

impl<T: TreeClient + ?Sized> TreeClient for Box<T> {
    fn list_children(
        &self,
        parent: &NodeId,
        name: Option<&str>,
        kind: Option<NodeKind>,
    ) -> Result<Vec<RemoteNode>, Error> {
        self.as_ref().list_children(parent, name, kind)
    }

    fn create_node(
        &self,
        parent: &NodeId,
        name: &str,
        kind: NodeKind,
        content: Option<Bytes>,
    ) -> Result<RemoteNode, Error> {
        self.as_ref().create_node(parent, name, kind, content)
    }

    fn get_content(&self, id: &NodeId) -> Result<Bytes, Error> {
        self.as_ref().get_content(id)
    }

    fn set_content(&self, id: &NodeId, content: Bytes) -> Result<(), Error> {
        self.as_ref().set_content(id, content)
    }

    fn delete(&self, id: &NodeId) -> Result<(), Error> {
        self.as_ref().delete(id)
    }

    fn grant_permission(
        &self,
        id: &NodeId,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<(), Error> {
        self.as_ref().grant_permission(id, permission_type, role)
    }

    fn share_link(&self, id: &NodeId) -> Result<String, Error> {
        self.as_ref().share_link(id)
    }

    fn resolve_folder_ref(&self, reference: &str) -> Result<NodeId, Error> {
        self.as_ref().resolve_folder_ref(reference)
    }
}
