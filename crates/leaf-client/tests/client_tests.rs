//! `PredictClient` against a mock server.

use leaf_client::{ClientConfig, ClientError, PredictClient};
use serde_json::json;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, endpoint: &str) -> PredictClient {
    let config = ClientConfig::new(&format!("{}{}", server.uri(), endpoint)).unwrap();
    PredictClient::new(config).unwrap()
}

fn image_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("neem.jpg");
    std::fs::write(&path, b"fake jpeg bytes").unwrap();
    path
}

#[tokio::test]
async fn test_posts_multipart_and_returns_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict/"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predicted_class": "Neem",
            "confidence": 0.93
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&server, "/predict/");

    let response = client.predict_file(&image_file(&dir)).await.unwrap();
    assert_eq!(response["predicted_class"], "Neem");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"neem.jpg\""));
    assert!(body.contains("fake jpeg bytes"));
}

#[tokio::test]
async fn test_typed_responses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predicted_class": "Tulsi",
            "confidence": 12.5
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict/raw/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "prediction": [[0.1, 0.7, 0.2]] })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = image_file(&dir);

    let labelled = client_for(&server, "/predict/")
        .predict_labelled(&image)
        .await
        .unwrap();
    assert_eq!(labelled.predicted_class, "Tulsi");

    let raw = client_for(&server, "/predict/raw/")
        .predict_raw(&image)
        .await
        .unwrap();
    assert_eq!(raw.prediction, vec![vec![0.1, 0.7, 0.2]]);
}

#[tokio::test]
async fn test_error_status_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": "Error processing image: the uploaded file is not a readable image",
            "code": "decode_error"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = client_for(&server, "/predict/")
        .predict_file(&image_file(&dir))
        .await
        .unwrap_err();

    assert!(err.is_server_error());
    match err {
        ClientError::Status {
            status,
            detail,
            body,
        } => {
            assert_eq!(status, 500);
            assert!(detail.starts_with("Error processing image"));
            let body = body.expect("JSON error body");
            assert_eq!(body["code"], "decode_error");
            assert_eq!(body["detail"], detail.as_str());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = client_for(&server, "/predict/")
        .predict_file(&image_file(&dir))
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, detail, body } => {
            assert_eq!(status, 502);
            assert_eq!(detail, "Bad Gateway");
            assert!(body.is_none());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let err = client_for(&server, "/predict/")
        .predict_file(&dir.path().join("missing.png"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Io(_)));
}
