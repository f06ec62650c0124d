//! Remote node model and the value types exchanged with the backend.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Opaque handle of a remote node.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

/// Whether a node is a file or a folder.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

/// A file or folder entry as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

impl RemoteNode {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

/// A value handed to `write`.
///
/// Only [`Record::Bytes`] can be stored. Writing any other variant is
/// rejected with [`Error::InvalidInput`] before the backend is contacted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Bytes(Bytes),
    Text(String),
}

impl Record {
    pub fn into_bytes(self) -> Result<Bytes, Error> {
        match self {
            Record::Bytes(bytes) => Ok(bytes),
            Record::Text(_) => Err(Error::invalid_input(
                "value must be a byte sequence, got text",
            )),
        }
    }
}

impl From<Bytes> for Record {
    fn from(bytes: Bytes) -> Self {
        Record::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Record {
    fn from(bytes: Vec<u8>) -> Self {
        Record::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Record {
    fn from(bytes: &'static [u8]) -> Self {
        Record::Bytes(Bytes::from_static(bytes))
    }
}

impl<const N: usize> From<&'static [u8; N]> for Record {
    fn from(bytes: &'static [u8; N]) -> Self {
        Record::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for Record {
    fn from(text: String) -> Self {
        Record::Text(text)
    }
}

impl From<&str> for Record {
    fn from(text: &str) -> Self {
        Record::Text(text.to_string())
    }
}

/// Who a share permission is granted to.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    #[default]
    Anyone,
    User,
    Group,
    Domain,
}

impl PermissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionType::Anyone => "anyone",
            PermissionType::User => "user",
            PermissionType::Group => "group",
            PermissionType::Domain => "domain",
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anyone" => Ok(PermissionType::Anyone),
            "user" => Ok(PermissionType::User),
            "group" => Ok(PermissionType::Group),
            "domain" => Ok(PermissionType::Domain),
            other => Err(Error::invalid_input(format!(
                "unknown permission type '{}'",
                other
            ))),
        }
    }
}

/// What a share permission allows.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionRole {
    #[default]
    Reader,
    Writer,
    Commenter,
}

impl PermissionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionRole::Reader => "reader",
            PermissionRole::Writer => "writer",
            PermissionRole::Commenter => "commenter",
        }
    }
}

impl fmt::Display for PermissionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reader" => Ok(PermissionRole::Reader),
            "writer" => Ok(PermissionRole::Writer),
            "commenter" => Ok(PermissionRole::Commenter),
            other => Err(Error::invalid_input(format!(
                "unknown permission role '{}'",
                other
            ))),
        }
    }
}
