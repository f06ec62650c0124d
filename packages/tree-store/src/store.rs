//! Key-value façade over a [`TreeClient`].
//!
//! Two capability sets are offered:
//! - [`PathReader`]: keys, length, membership, reads and share links
//! - [`PathWriter`]: writes and deletes
//!
//! [`DriveReader`] implements only the first; [`DriveStore`] wraps a
//! `DriveReader` and adds the second.

use std::collections::hash_map;

use bytes::Bytes;
use serde::Deserialize;

use crate::index::PathIndex;
use crate::path;
use crate::resolver::resolve_parent;
use crate::traversal::TraversalOptions;
use crate::{Error, NodeId, NodeKind, PermissionRole, PermissionType, Record, TreeClient};

/// Construction parameters for a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Folder reference, resolved by the client into the root id.
    pub root: String,

    /// See [`TraversalOptions::max_depth`].
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// See [`TraversalOptions::include_hidden`].
    #[serde(default)]
    pub include_hidden: bool,
}

impl StoreConfig {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions {
            max_depth: self.max_depth,
            include_hidden: self.include_hidden,
        }
    }
}

/// Iterator over the keys of a store's current index.
pub struct Keys<'a> {
    inner: hash_map::Keys<'a, String, NodeId>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}

/// Read-only access to a path-keyed store.
///
/// Methods take `&mut self` because the index is built lazily.
pub trait PathReader {
    /// Keys of the current index, building it if needed. Call again to
    /// iterate again.
    fn keys(&mut self) -> Result<Keys<'_>, Error>;

    /// Number of keys.
    fn len(&mut self) -> Result<usize, Error>;

    fn is_empty(&mut self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    fn contains(&mut self, path: &str) -> Result<bool, Error>;

    /// Content at `path`, unmodified.
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` - `path` is not in the index.
    /// * `Error::Transport` - the backend failed.
    fn read(&mut self, path: &str) -> Result<Bytes, Error>;

    /// Grant a permission on the node at `path` and return its link.
    fn share_url(
        &mut self,
        path: &str,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<String, Error>;
}

/// Mutating access to a path-keyed store.
pub trait PathWriter {
    /// Store `value` at `path`, creating intermediate folders as needed and
    /// replacing the content of an existing file.
    ///
    /// Keys the configured traversal skips (hidden names without
    /// `include_hidden`, or folders below `max_depth`) are still written,
    /// but stay invisible to `read`, `contains` and `keys` afterwards.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidInput` - `value` is not bytes, or `path` is malformed.
    ///   Nothing is sent to the backend in that case.
    /// * `Error::Transport` - the backend failed. Folders created before the
    ///   failure remain.
    fn write(&mut self, path: &str, value: Record) -> Result<(), Error>;

    /// Remove the file at `path`.
    fn delete(&mut self, path: &str) -> Result<(), Error>;
}

/// Combined read/write access.
pub trait PathStore: PathReader + PathWriter {}
impl<T: PathReader + PathWriter> PathStore for T {}

/// Read-only store rooted at a remote folder.
pub struct DriveReader<C: TreeClient> {
    client: C,
    index: PathIndex,
}

impl<C: TreeClient> DriveReader<C> {
    /// Create a reader over an already resolved root.
    pub fn new(client: C, root: NodeId, options: TraversalOptions) -> Self {
        Self {
            client,
            index: PathIndex::new(root, options),
        }
    }

    /// Create a reader, resolving `config.root` through the client.
    pub fn open(client: C, config: &StoreConfig) -> Result<Self, Error> {
        let root = client.resolve_folder_ref(&config.root)?;
        tracing::debug!(root = %root, ?config.max_depth, "opening store");
        Ok(Self::new(client, root, config.traversal_options()))
    }

    pub fn root(&self) -> &NodeId {
        self.index.root()
    }

    pub fn options(&self) -> TraversalOptions {
        self.index.options()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Discard the cached index so the next access sees remote changes
    /// made by other actors.
    pub fn refresh(&mut self) {
        self.index.invalidate();
    }

    fn lookup(&mut self, path: &str) -> Result<NodeId, Error> {
        self.index
            .lookup(&self.client, path)?
            .ok_or_else(|| Error::not_found(path))
    }
}

impl<C: TreeClient> PathReader for DriveReader<C> {
    fn keys(&mut self) -> Result<Keys<'_>, Error> {
        let entries = self.index.get(&self.client)?;
        Ok(Keys {
            inner: entries.keys(),
        })
    }

    fn len(&mut self) -> Result<usize, Error> {
        Ok(self.index.get(&self.client)?.len())
    }

    fn contains(&mut self, path: &str) -> Result<bool, Error> {
        Ok(self.index.get(&self.client)?.contains_key(path))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn read(&mut self, path: &str) -> Result<Bytes, Error> {
        let id = self.lookup(path)?;
        self.client.get_content(&id)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn share_url(
        &mut self,
        path: &str,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<String, Error> {
        let id = self.lookup(path)?;
        self.client.grant_permission(&id, permission_type, role)?;
        self.client.share_link(&id)
    }
}

/// Read-write store rooted at a remote folder.
pub struct DriveStore<C: TreeClient> {
    reader: DriveReader<C>,
}

impl<C: TreeClient> DriveStore<C> {
    pub fn new(client: C, root: NodeId, options: TraversalOptions) -> Self {
        Self {
            reader: DriveReader::new(client, root, options),
        }
    }

    pub fn open(client: C, config: &StoreConfig) -> Result<Self, Error> {
        Ok(Self {
            reader: DriveReader::open(client, config)?,
        })
    }

    pub fn root(&self) -> &NodeId {
        self.reader.root()
    }

    pub fn client(&self) -> &C {
        self.reader.client()
    }

    pub fn refresh(&mut self) {
        self.reader.refresh();
    }

    /// Give up write access.
    pub fn into_reader(self) -> DriveReader<C> {
        self.reader
    }
}

impl<C: TreeClient> From<DriveReader<C>> for DriveStore<C> {
    fn from(reader: DriveReader<C>) -> Self {
        Self { reader }
    }
}

impl<C: TreeClient> PathReader for DriveStore<C> {
    fn keys(&mut self) -> Result<Keys<'_>, Error> {
        self.reader.keys()
    }

    fn len(&mut self) -> Result<usize, Error> {
        self.reader.len()
    }

    fn contains(&mut self, path: &str) -> Result<bool, Error> {
        self.reader.contains(path)
    }

    fn read(&mut self, path: &str) -> Result<Bytes, Error> {
        self.reader.read(path)
    }

    fn share_url(
        &mut self,
        path: &str,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<String, Error> {
        self.reader.share_url(path, permission_type, role)
    }
}

impl<C: TreeClient> PathWriter for DriveStore<C> {
    #[tracing::instrument(level = "debug", skip(self, value))]
    fn write(&mut self, path: &str, value: Record) -> Result<(), Error> {
        let content = value.into_bytes()?;
        let (_, leaf) = path::split_leaf(path)?;

        let client = &self.reader.client;
        let parent = resolve_parent(client, self.reader.root(), path)?;

        let existing = client.list_children(&parent, Some(leaf), Some(NodeKind::File))?;
        match existing.first() {
            Some(file) => client.set_content(&file.id, content)?,
            None => {
                client.create_node(&parent, leaf, NodeKind::File, Some(content))?;
            }
        }

        self.reader.refresh();
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn delete(&mut self, path: &str) -> Result<(), Error> {
        let id = self.reader.lookup(path)?;
        self.reader.client.delete(&id)?;
        self.reader.refresh();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTree;

    #[test]
    fn config_from_json_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"root": "abc"}"#).unwrap();
        assert_eq!(config, StoreConfig::new("abc"));
        assert_eq!(config.traversal_options(), TraversalOptions::unbounded());
    }

    #[test]
    fn config_from_json_full() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"root": "abc", "max_depth": 0, "include_hidden": true}"#)
                .unwrap();
        assert_eq!(config.max_depth, Some(0));
        assert!(config.include_hidden);
    }

    #[test]
    fn open_rejects_bad_folder_reference() {
        let tree = MemoryTree::new();
        let err = DriveReader::open(&tree, &StoreConfig::new("not/an/id"))
            .err()
            .unwrap();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn open_resolves_root() {
        let tree = MemoryTree::new();
        let reader = DriveReader::open(&tree, &StoreConfig::new(tree.root().as_str())).unwrap();
        assert_eq!(reader.root(), &tree.root());
    }

    #[test]
    fn keys_iterator_reports_exact_size() {
        let tree = MemoryTree::new();
        tree.add_file(&tree.root(), "a", b"1");
        tree.add_file(&tree.root(), "b", b"2");
        let mut reader = DriveReader::new(&tree, tree.root(), TraversalOptions::unbounded());
        assert_eq!(reader.keys().unwrap().len(), 2);
    }

    #[test]
    fn write_updates_existing_file_in_place() {
        let tree = MemoryTree::new();
        let id = tree.add_file(&tree.root(), "f.txt", b"old");
        let mut store = DriveStore::new(&tree, tree.root(), TraversalOptions::unbounded());

        store.write("f.txt", Record::from(b"new")).unwrap();

        assert_eq!(tree.calls().create_node, 0);
        assert_eq!(tree.calls().set_content, 1);
        assert_eq!(store.read("f.txt").unwrap(), Bytes::from_static(b"new"));
        assert_eq!(tree.find_children(&tree.root(), "f.txt")[0].id, id);
    }

    #[test]
    fn into_reader_keeps_index_root() {
        let tree = MemoryTree::new();
        let store = DriveStore::new(&tree, tree.root(), TraversalOptions::unbounded());
        let reader = store.into_reader();
        assert_eq!(reader.root(), &tree.root());
    }
}
