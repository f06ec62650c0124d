use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use url::Url;

use drivefs_tree_store::{
    Error as StoreError, NodeId, NodeKind, PermissionRole, PermissionType, RemoteNode, TreeClient,
};

use crate::error::Error;
use crate::locator;
use crate::types::{
    children_query, DriveFile, FileList, NewFile, NewPermission, ShareLinkFields, FILE_FIELDS,
    FOLDER_MIME_TYPE,
};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/";

const MULTIPART_BOUNDARY: &str = "drivefs-part-boundary-5f0c2a";
const PAGE_SIZE: &str = "1000";

/// A [`TreeClient`] backed by the Google Drive v3 REST API.
///
/// Every call is a blocking HTTP request authenticated with a bearer token.
/// Non-success responses become errors carrying the status and body; nothing
/// is retried.
///
/// # Example
///
/// ```ignore
/// use drivefs_http::DriveClient;
/// use drivefs_tree_store::{DriveReader, PathReader, StoreConfig};
///
/// let client = DriveClient::new("ya29.token")?;
/// let mut reader = DriveReader::open(client, &StoreConfig::new(folder_url))?;
/// for key in reader.keys()? {
///     println!("{}", key);
/// }
/// ```
pub struct DriveClient {
    client: Client,
    api_base: Url,
    access_token: String,
}

impl DriveClient {
    /// Create a client for the public API with a 30 second timeout.
    pub fn new(access_token: impl Into<String>) -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Self::with_client(client, DEFAULT_API_BASE, access_token)
    }

    /// Create a client with a custom reqwest client and API base URL.
    pub fn with_client(
        client: Client,
        api_base: &str,
        access_token: impl Into<String>,
    ) -> Result<Self, Error> {
        let api_base = if api_base.ends_with('/') {
            Url::parse(api_base)?
        } else {
            Url::parse(&format!("{}/", api_base))?
        };

        Ok(Self {
            client,
            api_base,
            access_token: access_token.into(),
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        self.api_base.join(path).map_err(Error::from)
    }

    fn file_url(&self, id: &NodeId) -> Result<Url, Error> {
        self.url(&format!("drive/v3/files/{}", id))
    }

    /// Authenticate, send, and turn non-success statuses into errors.
    fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.bearer_auth(&self.access_token).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                message: format!(
                    "{} {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    body
                )
                .trim_end()
                .to_string(),
            });
        }

        Ok(response)
    }

    fn list_all(&self, query: &str) -> Result<Vec<DriveFile>, Error> {
        let url = self.url("drive/v3/files")?;
        let fields = format!("nextPageToken,files({})", FILE_FIELDS);

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.client.get(url.clone()).query(&[
                ("q", query),
                ("fields", fields.as_str()),
                ("pageSize", PAGE_SIZE),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: FileList = self.send(request)?.json()?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(query, count = files.len(), "listed files");
        Ok(files)
    }

    fn create(
        &self,
        parent: &NodeId,
        name: &str,
        kind: NodeKind,
        content: Option<Bytes>,
    ) -> Result<DriveFile, Error> {
        let metadata = NewFile {
            name,
            parents: [parent.as_str()],
            mime_type: match kind {
                NodeKind::Folder => Some(FOLDER_MIME_TYPE),
                NodeKind::File => None,
            },
        };

        let request = match (kind, content) {
            (NodeKind::File, Some(content)) => {
                let url = self.url("upload/drive/v3/files")?;
                let body = multipart_related(&serde_json::to_vec(&metadata)?, &content);
                self.client
                    .post(url)
                    .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
                    .header(
                        CONTENT_TYPE,
                        format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
                    )
                    .body(body)
            }
            _ => self
                .client
                .post(self.url("drive/v3/files")?)
                .query(&[("fields", FILE_FIELDS)])
                .json(&metadata),
        };

        let created: DriveFile = self.send(request)?.json()?;
        tracing::debug!(id = %created.id, name, ?kind, "created node");
        Ok(created)
    }

    fn download(&self, id: &NodeId) -> Result<Bytes, Error> {
        let request = self.client.get(self.file_url(id)?).query(&[("alt", "media")]);
        Ok(self.send(request)?.bytes()?)
    }

    fn upload(&self, id: &NodeId, content: Bytes) -> Result<(), Error> {
        let url = self.url(&format!("upload/drive/v3/files/{}", id))?;
        let request = self
            .client
            .patch(url)
            .query(&[("uploadType", "media")])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content);
        self.send(request)?;
        Ok(())
    }

    fn remove(&self, id: &NodeId) -> Result<(), Error> {
        self.send(self.client.delete(self.file_url(id)?))?;
        Ok(())
    }

    fn add_permission(
        &self,
        id: &NodeId,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<(), Error> {
        let url = self.url(&format!("drive/v3/files/{}/permissions", id))?;
        let body = NewPermission {
            permission_type,
            role,
        };
        self.send(self.client.post(url).json(&body))?;
        Ok(())
    }

    fn web_view_link(&self, id: &NodeId) -> Result<String, Error> {
        let request = self
            .client
            .get(self.file_url(id)?)
            .query(&[("fields", "webViewLink")]);
        let fields: ShareLinkFields = self.send(request)?.json()?;
        fields.web_view_link.ok_or(Error::MissingField {
            field: "webViewLink",
        })
    }
}

/// Body of a `multipart/related` upload: JSON metadata, then the content.
fn multipart_related(metadata: &[u8], content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

impl TreeClient for DriveClient {
    fn list_children(
        &self,
        parent: &NodeId,
        name: Option<&str>,
        kind: Option<NodeKind>,
    ) -> Result<Vec<RemoteNode>, StoreError> {
        let query = children_query(parent.as_str(), name, kind);
        let files = self.list_all(&query)?;
        Ok(files.into_iter().map(DriveFile::into_node).collect())
    }

    fn create_node(
        &self,
        parent: &NodeId,
        name: &str,
        kind: NodeKind,
        content: Option<Bytes>,
    ) -> Result<RemoteNode, StoreError> {
        let mut node = self.create(parent, name, kind, content)?.into_node();
        if node.name.is_empty() {
            node.name = name.to_string();
        }
        if node.parent.is_none() {
            node.parent = Some(parent.clone());
        }
        Ok(node)
    }

    fn get_content(&self, id: &NodeId) -> Result<Bytes, StoreError> {
        Ok(self.download(id)?)
    }

    fn set_content(&self, id: &NodeId, content: Bytes) -> Result<(), StoreError> {
        Ok(self.upload(id, content)?)
    }

    fn delete(&self, id: &NodeId) -> Result<(), StoreError> {
        Ok(self.remove(id)?)
    }

    fn grant_permission(
        &self,
        id: &NodeId,
        permission_type: PermissionType,
        role: PermissionRole,
    ) -> Result<(), StoreError> {
        Ok(self.add_permission(id, permission_type, role)?)
    }

    fn share_link(&self, id: &NodeId) -> Result<String, StoreError> {
        Ok(self.web_view_link(id)?)
    }

    /// Accepts a folder link or a bare folder id.
    fn resolve_folder_ref(&self, reference: &str) -> Result<NodeId, StoreError> {
        let reference = reference.trim();
        if let Some(id) = locator::extract_folder_id(reference) {
            return Ok(NodeId::new(id));
        }
        if locator::is_bare_id(reference) {
            return Ok(NodeId::new(reference));
        }
        Err(StoreError::InvalidInput {
            message: format!("Invalid folder URL: {}", reference),
        })
    }
}
