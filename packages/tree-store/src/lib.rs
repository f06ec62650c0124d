//! # drivefs-tree-store
//!
//! A flat, path-keyed key-value view over a remote folder/file tree that is
//! only reachable through an object-ID based API.
//!
//! - [`TreeClient`]: the tree API (list, create, fetch, update, delete, share)
//! - [`traverse`]: depth-bounded walk yielding `(path, id)` entries
//! - [`PathIndex`]: lazily built path → id mapping, invalidated on mutation
//! - [`resolve_parent`]: finds or creates the folders leading to a key
//! - [`DriveReader`] / [`DriveStore`]: the read-only and read-write façades
//!
//! Everything is synchronous. Backend failures are returned unchanged and
//! never retried.
//!
//! # Example
//!
//! ```rust
//! use drivefs_tree_store::{DriveStore, MemoryTree, PathReader, PathWriter, StoreConfig};
//!
//! let tree = MemoryTree::new();
//! let config = StoreConfig::new(tree.root().as_str());
//! let mut store = DriveStore::open(&tree, &config).unwrap();
//!
//! store.write("reports/2024/q1.csv", b"a,b\n1,2\n".into()).unwrap();
//! assert!(store.contains("reports/2024/q1.csv").unwrap());
//! assert_eq!(store.len().unwrap(), 1);
//! ```

pub use bytes::Bytes;

mod client;
mod error;
mod index;
pub mod memory;
mod node;
pub mod path;
mod resolver;
mod store;
mod traversal;

pub use client::TreeClient;
pub use error::Error;
pub use index::PathIndex;
pub use memory::MemoryTree;
pub use node::{NodeId, NodeKind, PermissionRole, PermissionType, Record, RemoteNode};
pub use resolver::resolve_parent;
pub use store::{DriveReader, DriveStore, Keys, PathReader, PathStore, PathWriter, StoreConfig};
pub use traversal::{traverse, Entry, Traverse, TraversalOptions};
