//! Integration tests for the composed two-step workflows against a local
//! mock server. Both remote stores are served by the same mock, so these
//! tests can assert that a failing first step leaves the second store
//! untouched.

use driveflow_client_core::{
    ApiError, ClientConfig, Credentials, DelimitedRows, Error, FileLocator, LineRows, RowBatch,
    ValueInput, Workflow,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

fn workflow_for(server: &ServerGuard) -> Workflow {
    let config = ClientConfig::with_base_url(&server.url());
    let credentials = Arc::new(Credentials::from_token("test-token"));
    Workflow::new(config, credentials).unwrap()
}

#[tokio::test]
async fn test_fetch_and_tabulate_by_id() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/f1")
        .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
        .with_status(200)
        .with_body("a,b\nc,d\n")
        .create_async()
        .await;
    let write = server
        .mock("PUT", "/spreadsheets/s1/values/Sheet1%21A1")
        .match_query(Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()))
        .match_body(Matcher::PartialJson(json!({
            "values": [["a", "b"], ["c", "d"]],
        })))
        .with_status(200)
        .with_body(json!({ "updatedRows": 2, "updatedColumns": 2, "updatedCells": 4 }).to_string())
        .create_async()
        .await;

    let summary = workflow_for(&server)
        .fetch_and_tabulate(
            &FileLocator::Id("f1".into()),
            "s1",
            "Sheet1!A1",
            &DelimitedRows::default(),
        )
        .await
        .unwrap();
    assert_eq!(summary.updated_cells, 4);
    write.assert_async().await;
}

#[tokio::test]
async fn test_fetch_and_tabulate_resolves_name() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files")
        .match_query(Matcher::UrlEncoded("q".into(), "name='log.txt'".into()))
        .with_status(200)
        .with_body(json!({ "files": [{ "id": "f9", "name": "log.txt" }] }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/files/f9")
        .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
        .with_status(200)
        .with_body("line one\nline two\n")
        .create_async()
        .await;
    let write = server
        .mock("PUT", "/spreadsheets/s1/values/Sheet1%21A1")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "values": [["line one"], ["line two"]],
        })))
        .with_status(200)
        .with_body(json!({ "updatedRows": 2, "updatedColumns": 1, "updatedCells": 2 }).to_string())
        .create_async()
        .await;

    let locator = FileLocator::Name {
        name: "log.txt".into(),
        folder_id: None,
    };
    let summary = workflow_for(&server)
        .fetch_and_tabulate(&locator, "s1", "Sheet1!A1", &LineRows)
        .await
        .unwrap();
    assert_eq!(summary.updated_rows, 2);
    write.assert_async().await;
}

#[tokio::test]
async fn test_fetch_missing_name_never_touches_tabular_store() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "files": [] }).to_string())
        .create_async()
        .await;
    let write = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let locator = FileLocator::Name {
        name: "absent.csv".into(),
        folder_id: None,
    };
    let error = workflow_for(&server)
        .fetch_and_tabulate(&locator, "s1", "Sheet1!A1", &LineRows)
        .await
        .unwrap_err();
    match error {
        Error::Api(ApiError::NotFound { resource }) => {
            assert!(resource.contains("absent.csv"));
        }
        other => panic!("Expected NotFound, got {other:?}"),
    }
    write.assert_async().await;
}

#[tokio::test]
async fn test_fetch_download_failure_never_touches_tabular_store() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/f1")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(json!({ "error": { "code": 404, "message": "File not found" } }).to_string())
        .create_async()
        .await;
    let write = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let error = workflow_for(&server)
        .fetch_and_tabulate(&FileLocator::Id("f1".into()), "s1", "Sheet1!A1", &LineRows)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Api(ApiError::NotFound { .. })));
    write.assert_async().await;
}

#[tokio::test]
async fn test_tabulate_and_store_uploads_csv() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/spreadsheets/s1/values/Sheet1%21A1%3AB2")
        .with_status(200)
        .with_body(json!({ "values": [["Header1", "Header2"], ["Value1", "Value2"]] }).to_string())
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/upload/files")
        .match_query(Matcher::UrlEncoded("uploadType".into(), "multipart".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""name":"export.csv""#.to_string()),
            Matcher::Regex("Header1,Header2".to_string()),
            Matcher::Regex("Value1,Value2".to_string()),
        ]))
        .with_status(200)
        .with_body(json!({ "id": "out1", "name": "export.csv", "mimeType": "text/csv" }).to_string())
        .create_async()
        .await;

    let file = workflow_for(&server)
        .tabulate_and_store("s1", Some("Sheet1!A1:B2"), None, None, "export.csv")
        .await
        .unwrap();
    assert_eq!(file.name, "export.csv");
    assert_eq!(file.id, "out1");
    upload.assert_async().await;
}

#[tokio::test]
async fn test_tabulate_read_failure_never_uploads() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/spreadsheets/s1/values/Sheet1%21A1%3AB2")
        .with_status(403)
        .with_body(json!({ "error": { "code": 403, "message": "Forbidden" } }).to_string())
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/upload/files")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let error = workflow_for(&server)
        .tabulate_and_store("s1", Some("Sheet1!A1:B2"), None, None, "export.csv")
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        Error::Api(ApiError::PermissionDenied { .. })
    ));
    upload.assert_async().await;
}

#[tokio::test]
async fn test_write_rows_routes_append_flag() {
    let mut server = Server::new_async().await;
    let append = server
        .mock("POST", "/spreadsheets/s1/values/Sheet1%21A1:append")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "updates": { "updatedRows": 1, "updatedCells": 1 } }).to_string())
        .create_async()
        .await;
    let overwrite = server
        .mock("PUT", "/spreadsheets/s1/values/Sheet1%21A1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "updatedRows": 1, "updatedColumns": 1, "updatedCells": 1 }).to_string())
        .create_async()
        .await;

    let workflow = workflow_for(&server);
    let batch = RowBatch::from_strings(vec![vec!["x"]]);
    workflow
        .write_rows("s1", "Sheet1!A1", &batch, true, ValueInput::Raw)
        .await
        .unwrap();
    workflow
        .write_rows("s1", "Sheet1!A1", &batch, false, ValueInput::UserEntered)
        .await
        .unwrap();
    append.assert_async().await;
    overwrite.assert_async().await;
}
