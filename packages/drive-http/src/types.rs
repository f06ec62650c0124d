//! Drive v3 wire types.

use serde::{Deserialize, Serialize};

use drivefs_tree_store::{NodeId, NodeKind, PermissionRole, PermissionType, RemoteNode};

/// MIME type Drive uses to mark folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested for every file resource.
pub const FILE_FIELDS: &str = "id,name,mimeType,parents";

/// A file resource, restricted to the fields the store uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl DriveFile {
    pub fn kind(&self) -> NodeKind {
        if self.mime_type == FOLDER_MIME_TYPE {
            NodeKind::Folder
        } else {
            NodeKind::File
        }
    }

    pub fn into_node(self) -> RemoteNode {
        let kind = self.kind();
        RemoteNode {
            id: NodeId::new(self.id),
            name: self.name,
            kind,
            parent: self.parents.into_iter().next().map(NodeId::new),
        }
    }
}

/// One page of `files.list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Metadata sent when creating a file or folder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile<'a> {
    pub name: &'a str,
    pub parents: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'a str>,
}

/// Body of `permissions.create`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPermission {
    #[serde(rename = "type")]
    pub permission_type: PermissionType,
    pub role: PermissionRole,
}

/// Response of `files.get` with `fields=webViewLink`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkFields {
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Response of the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Build a `files.list` query for the non-trashed children of `parent`.
pub fn children_query(parent: &str, name: Option<&str>, kind: Option<NodeKind>) -> String {
    let mut query = format!("'{}' in parents and trashed=false", escape(parent));
    if let Some(name) = name {
        query.push_str(&format!(" and name='{}'", escape(name)));
    }
    match kind {
        Some(NodeKind::Folder) => {
            query.push_str(&format!(" and mimeType='{}'", FOLDER_MIME_TYPE));
        }
        Some(NodeKind::File) => {
            query.push_str(&format!(" and mimeType!='{}'", FOLDER_MIME_TYPE));
        }
        None => {}
    }
    query
}

/// Escape a string literal for the Drive query language.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_detection() {
        let file: DriveFile = serde_json::from_str(
            r#"{"id": "1", "name": "docs", "mimeType": "application/vnd.google-apps.folder", "parents": ["root"]}"#,
        )
        .unwrap();
        let node = file.into_node();
        assert_eq!(node.kind, NodeKind::Folder);
        assert_eq!(node.parent, Some(NodeId::new("root")));
    }

    #[test]
    fn plain_file_without_parents() {
        let file: DriveFile =
            serde_json::from_str(r#"{"id": "2", "name": "a.txt", "mimeType": "text/plain"}"#)
                .unwrap();
        let node = file.into_node();
        assert_eq!(node.kind, NodeKind::File);
        assert_eq!(node.parent, None);
    }

    #[test]
    fn query_for_all_children() {
        assert_eq!(
            children_query("abc", None, None),
            "'abc' in parents and trashed=false"
        );
    }

    #[test]
    fn query_with_name_and_kind() {
        assert_eq!(
            children_query("abc", Some("docs"), Some(NodeKind::Folder)),
            "'abc' in parents and trashed=false and name='docs' \
             and mimeType='application/vnd.google-apps.folder'"
        );
        assert!(children_query("abc", Some("x"), Some(NodeKind::File)).ends_with(
            "and mimeType!='application/vnd.google-apps.folder'"
        ));
    }

    #[test]
    fn query_escapes_quotes() {
        assert_eq!(
            children_query("abc", Some("it's\\here"), None),
            "'abc' in parents and trashed=false and name='it\\'s\\\\here'"
        );
    }

    #[test]
    fn permission_body() {
        let body = serde_json::to_value(NewPermission {
            permission_type: PermissionType::Anyone,
            role: PermissionRole::Reader,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"type": "anyone", "role": "reader"}));
    }

    #[test]
    fn new_folder_metadata() {
        let body = serde_json::to_value(NewFile {
            name: "docs",
            parents: ["root"],
            mime_type: Some(FOLDER_MIME_TYPE),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "name": "docs",
                "parents": ["root"],
                "mimeType": FOLDER_MIME_TYPE,
            })
        );
    }
}
