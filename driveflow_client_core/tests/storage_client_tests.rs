//! Integration tests for the Drive storage client against a local mock
//! server.

use driveflow_client_core::{ApiError, ClientConfig, Credentials, Error, StorageClient};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

fn client_for(server: &ServerGuard) -> StorageClient {
    let config = ClientConfig::with_base_url(&server.url());
    let credentials = Arc::new(Credentials::from_token("test-token"));
    StorageClient::new(config, credentials).unwrap()
}

fn file_json(id: &str, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "mimeType": "text/csv" })
}

#[tokio::test]
async fn test_list_files() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/files")
        .match_query(Matcher::UrlEncoded("pageSize".into(), "100".into()))
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "files": [file_json("f1", "a.csv"), file_json("f2", "b.csv")] }).to_string(),
        )
        .create_async()
        .await;

    let files = client_for(&server).list(None, None).await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].id, "f1");
    assert_eq!(files[1].name, "b.csv");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_scopes_query_to_folder() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/files")
        .match_query(Matcher::UrlEncoded(
            "q".into(),
            "'folder9' in parents and name='report.csv'".into(),
        ))
        .with_status(200)
        .with_body(json!({ "files": [] }).to_string())
        .create_async()
        .await;

    let found = client_for(&server)
        .find_by_name("report.csv", Some("folder9"))
        .await
        .unwrap();
    assert!(found.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_find_by_name_hit() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files")
        .match_query(Matcher::UrlEncoded("q".into(), "name='report.csv'".into()))
        .with_status(200)
        .with_body(json!({ "files": [file_json("f7", "report.csv")] }).to_string())
        .create_async()
        .await;

    let found = client_for(&server)
        .find_by_name("report.csv", None)
        .await
        .unwrap();
    assert_eq!(found.unwrap().id, "f7");
}

#[tokio::test]
async fn test_download_bytes() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/f1")
        .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
        .with_status(200)
        .with_body("hello,world\n")
        .create_async()
        .await;

    let bytes = client_for(&server).download_bytes("f1").await.unwrap();
    assert_eq!(bytes, b"hello,world\n");
}

#[tokio::test]
async fn test_download_to_local_path() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/f1")
        .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
        .with_status(200)
        .with_body("content")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("downloaded.txt");
    client_for(&server).download("f1", &dest).await.unwrap();
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "content");
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/missing")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(json!({ "error": { "code": 404, "message": "File not found" } }).to_string())
        .create_async()
        .await;

    let error = client_for(&server)
        .download_bytes("missing")
        .await
        .unwrap_err();
    match error {
        Error::Api(api) => {
            assert!(matches!(api, ApiError::NotFound { .. }));
            assert!(api.is_permanent());
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_permission_denied_is_classified() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/locked")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(json!({ "error": { "code": 403, "message": "Forbidden" } }).to_string())
        .create_async()
        .await;

    let error = client_for(&server)
        .download_bytes("locked")
        .await
        .unwrap_err();
    match error {
        Error::Api(ApiError::PermissionDenied { resource }) => {
            assert!(resource.contains("locked"));
        }
        other => panic!("Expected PermissionDenied, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/f1")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("backend unavailable")
        .create_async()
        .await;

    let error = client_for(&server)
        .download_bytes("f1")
        .await
        .unwrap_err();
    match error {
        Error::Api(api) => assert!(api.is_transient()),
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_then_find_by_name_round_trip() {
    let mut server = Server::new_async().await;
    let upload = server
        .mock("POST", "/upload/files")
        .match_query(Matcher::UrlEncoded("uploadType".into(), "multipart".into()))
        .match_header(
            "content-type",
            Matcher::Regex("multipart/related".to_string()),
        )
        .match_body(Matcher::Regex(r#""name":"data.txt""#.to_string()))
        .with_status(200)
        .with_body(file_json("new1", "data.txt").to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/files")
        .match_query(Matcher::UrlEncoded("q".into(), "name='data.txt'".into()))
        .with_status(200)
        .with_body(json!({ "files": [file_json("new1", "data.txt")] }).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let uploaded = client
        .upload_bytes(b"line1\nline2\n".to_vec(), "data.txt", None, Some("text/plain"))
        .await
        .unwrap();
    let found = client.find_by_name("data.txt", None).await.unwrap().unwrap();
    assert_eq!(found.name, uploaded.name);
    assert_eq!(found.id, uploaded.id);
    upload.assert_async().await;
}

#[tokio::test]
async fn test_upload_missing_local_file_is_io_error() {
    let server = Server::new_async().await;
    let error = client_for(&server)
        .upload(
            std::path::Path::new("/no/such/file.csv"),
            None,
            None,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Io(_)));
}

#[tokio::test]
async fn test_update_replaces_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/upload/files/f1")
        .match_query(Matcher::UrlEncoded("uploadType".into(), "media".into()))
        .match_header("content-type", "text/csv")
        .match_body("x,y\n")
        .with_status(200)
        .with_body(file_json("f1", "data.csv").to_string())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("data.csv");
    std::fs::write(&source, "x,y\n").unwrap();
    client_for(&server)
        .update("f1", &source, Some("text/csv"))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_file() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/files/f1")
        .with_status(204)
        .create_async()
        .await;

    client_for(&server).delete("f1").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_folder() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/files")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "name": "exports",
            "mimeType": "application/vnd.google-apps.folder",
        })))
        .with_status(200)
        .with_body(
            json!({
                "id": "dir1",
                "name": "exports",
                "mimeType": "application/vnd.google-apps.folder",
            })
            .to_string(),
        )
        .create_async()
        .await;

    let folder = client_for(&server)
        .create_folder("exports", None)
        .await
        .unwrap();
    assert_eq!(folder.id, "dir1");
    assert!(folder.is_folder());
}
