use reqwest::blocking::Client;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drivefs_http::types::FOLDER_MIME_TYPE;
use drivefs_http::DriveClient;
use drivefs_tree_store::{
    Bytes, DriveStore, Error, NodeId, NodeKind, PathReader, PathWriter, PermissionRole,
    PermissionType, StoreConfig, TreeClient,
};

fn client(uri: &str) -> DriveClient {
    DriveClient::with_client(Client::new(), uri, "test-token").unwrap()
}

fn file(id: &str, name: &str, mime_type: &str) -> serde_json::Value {
    json!({"id": id, "name": name, "mimeType": mime_type, "parents": ["root"]})
}

#[tokio::test]
async fn test_list_children_follows_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "'root' in parents and trashed=false"))
        .and(query_param("pageToken", "page2"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [file("2", "docs", FOLDER_MIME_TYPE)]
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "'root' in parents and trashed=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [file("1", "a.txt", "text/plain")],
            "nextPageToken": "page2"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let children = tokio::task::spawn_blocking(move || {
        client(&uri)
            .list_children(&NodeId::new("root"), None, None)
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(children.len(), 2);
    assert_eq!(children[0].name, "a.txt");
    assert_eq!(children[0].kind, NodeKind::File);
    assert_eq!(children[1].name, "docs");
    assert_eq!(children[1].kind, NodeKind::Folder);
}

#[tokio::test]
async fn test_error_status_is_a_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/abc"))
        .respond_with(ResponseTemplate::new(403).set_body_string("rate limit exceeded"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        client(&uri).get_content(&NodeId::new("abc")).unwrap_err()
    })
    .await
    .unwrap();

    match err {
        Error::Transport { message } => {
            assert!(message.contains("403"));
            assert!(message.contains("rate limit exceeded"));
        }
        other => panic!("expected transport failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_content_returns_raw_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/abc"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 255, 10, 13]))
        .mount(&server)
        .await;

    let uri = server.uri();
    let content = tokio::task::spawn_blocking(move || {
        client(&uri).get_content(&NodeId::new("abc")).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(content, Bytes::from_static(&[0, 255, 10, 13]));
}

#[tokio::test]
async fn test_create_folder_sends_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .and(body_json(json!({
            "name": "docs",
            "parents": ["root"],
            "mimeType": FOLDER_MIME_TYPE
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(file("new-folder", "docs", FOLDER_MIME_TYPE)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let node = tokio::task::spawn_blocking(move || {
        client(&uri)
            .create_node(&NodeId::new("root"), "docs", NodeKind::Folder, None)
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(node.id, NodeId::new("new-folder"));
    assert!(node.is_folder());
    assert_eq!(node.parent, Some(NodeId::new("root")));
}

#[tokio::test]
async fn test_share_url_grants_then_fetches_link() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files/abc/permissions"))
        .and(body_json(json!({"type": "anyone", "role": "reader"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "perm"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/abc"))
        .and(query_param("fields", "webViewLink"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webViewLink": "https://drive.google.com/file/d/abc/view"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let link = tokio::task::spawn_blocking(move || {
        let client = client(&uri);
        client
            .grant_permission(
                &NodeId::new("abc"),
                PermissionType::Anyone,
                PermissionRole::Reader,
            )
            .unwrap();
        client.share_link(&NodeId::new("abc")).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(link, "https://drive.google.com/file/d/abc/view");
}

#[tokio::test]
async fn test_delete_request() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || client(&uri).delete(&NodeId::new("abc")))
        .await
        .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_store_write_creates_folder_then_uploads() {
    let server = MockServer::start().await;
    let folder_query =
        format!("'root' in parents and trashed=false and name='dir' and mimeType='{}'", FOLDER_MIME_TYPE);
    let file_query = format!(
        "'dir-id' in parents and trashed=false and name='file.txt' and mimeType!='{}'",
        FOLDER_MIME_TYPE
    );

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", folder_query.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(file("dir-id", "dir", FOLDER_MIME_TYPE)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", file_query.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("\"name\":\"file.txt\""))
        .and(body_string_contains("Nested content"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(file("file-id", "file.txt", "text/plain")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let mut store = DriveStore::open(client(&uri), &StoreConfig::new("root")).unwrap();
        store.write("dir/file.txt", b"Nested content".into())
    })
    .await
    .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_store_write_updates_existing_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [file("existing", "f.txt", "text/plain")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/upload/drive/v3/files/existing"))
        .and(query_param("uploadType", "media"))
        .and(body_string_contains("version 2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file("existing", "f.txt", "text/plain")))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let mut store = DriveStore::open(client(&uri), &StoreConfig::new("root")).unwrap();
        store.write("f.txt", b"version 2".into())
    })
    .await
    .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_store_keys_from_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "'root' in parents and trashed=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                file("1", "a.txt", "text/plain"),
                file("2", ".hidden", "text/plain"),
                file("3", "sub", FOLDER_MIME_TYPE)
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "'3' in parents and trashed=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [file("4", "b.txt", "text/plain")]
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let keys = tokio::task::spawn_blocking(move || {
        let mut store = DriveStore::open(
            client(&uri),
            &StoreConfig::new("https://drive.google.com/drive/folders/root"),
        )
        .unwrap();
        let mut keys: Vec<String> = store.keys().unwrap().map(str::to_string).collect();
        keys.sort();
        keys
    })
    .await
    .unwrap();

    assert_eq!(keys, vec!["a.txt", "sub/b.txt"]);
}
